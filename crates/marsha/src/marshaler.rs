use std::io::{Read, Write};

use marsha_cbor::sequence::{self, Progress};
use marsha_cbor::{ByteCount, Error, Result, SequenceError};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::record::{Record, RecordSeq};
use crate::stream::{Decoder, Encoder};

/// The uniform marshaling contract every backend implements.
///
/// Backends provide the four single-item stream operations; the byte-buffer forms, the record
/// sequence forms and the stream wrappers are derived from them.
///
/// Record operations fail with `NotRegistered` for record types the backend does not know.
/// Decoding fails with `EndOfInput` when the source is exhausted before the first byte of an
/// item, leaving the target untouched.
pub trait Marshaler {
	fn encode_primitive<T: Serialize + ?Sized>(
		&self,
		value: &T,
		out: &mut dyn Write,
	) -> Result<ByteCount>;

	fn decode_primitive<T: DeserializeOwned>(
		&self,
		input: &mut dyn Read,
		target: &mut T,
	) -> Result<ByteCount>;

	fn encode_record<R: Record>(&self, record: &R, out: &mut dyn Write) -> Result<ByteCount>;

	fn decode_record<R: Record>(&self, input: &mut dyn Read, target: &mut R) -> Result<ByteCount>;

	fn marshal_primitive<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
		let mut out: Vec<u8> = Vec::new();
		self.encode_primitive(value, &mut out)?;
		Ok(out)
	}

	/// Decodes exactly one item from `bytes`.
	///
	/// On `TrailingBytes` the target already holds the decoded item.
	fn unmarshal_primitive<T: DeserializeOwned>(
		&self,
		bytes: &[u8],
		target: &mut T,
	) -> Result<ByteCount> {
		let mut rest = bytes;
		let read = self.decode_primitive(&mut rest, target)?;
		ensure_consumed(rest)?;
		Ok(read)
	}

	fn marshal_record<R: Record>(&self, record: &R) -> Result<Vec<u8>> {
		let mut out: Vec<u8> = Vec::new();
		self.encode_record(record, &mut out)?;
		Ok(out)
	}

	/// Decodes exactly one record from `bytes`.
	///
	/// On `TrailingBytes` the target may already hold the decoded record; backends that decode
	/// into a fresh value leave it untouched.
	fn unmarshal_record<R: Record>(&self, bytes: &[u8], target: &mut R) -> Result<ByteCount> {
		let mut rest = bytes;
		let read = self.decode_record(&mut rest, target)?;
		ensure_consumed(rest)?;
		Ok(read)
	}

	/// Encodes every record of `seq` back to back, with no count or length prefix.
	fn encode_records<S: RecordSeq>(
		&self,
		seq: &S,
		out: &mut dyn Write,
	) -> std::result::Result<Progress, SequenceError> {
		sequence::encode_each(seq.records(), |record| {
			self.encode_record(record, &mut *out)
		})
	}

	/// Decodes records from `input` and appends them to `seq` until the input ends cleanly.
	///
	/// Only fully decoded records are appended. On failure the error carries how many were.
	fn decode_records<S: RecordSeq>(
		&self,
		input: &mut dyn Read,
		seq: &mut S,
	) -> std::result::Result<Progress, SequenceError> {
		sequence::decode_until_end(|| {
			let mut record = seq.new_record();
			let read = self.decode_record(&mut *input, &mut record)?;
			seq.append(record);
			Ok(read)
		})
	}

	fn marshal_records<S: RecordSeq>(&self, seq: &S) -> std::result::Result<Vec<u8>, SequenceError> {
		let mut out: Vec<u8> = Vec::new();
		self.encode_records(seq, &mut out)?;
		Ok(out)
	}

	fn unmarshal_records<S: RecordSeq>(
		&self,
		bytes: &[u8],
		seq: &mut S,
	) -> std::result::Result<Progress, SequenceError> {
		let mut rest = bytes;
		self.decode_records(&mut rest, seq)
	}

	/// Wraps `sink` in an encoder whose operations never interleave.
	fn encoder<W: Write>(&self, sink: W) -> Encoder<'_, Self, W>
	where
		Self: Sized,
	{
		Encoder::new(self, sink)
	}

	/// Wraps `source` in a decoder whose operations never interleave.
	fn decoder<R: Read>(&self, source: R) -> Decoder<'_, Self, R>
	where
		Self: Sized,
	{
		Decoder::new(self, source)
	}
}

fn ensure_consumed(rest: &[u8]) -> Result<()> {
	if rest.is_empty() {
		Ok(())
	} else {
		Err(Error::TrailingBytes {
			trailing: rest.len(),
		})
	}
}
