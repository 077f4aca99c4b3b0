//! Stream-bound encoders and decoders.
//!
//! A stream has ordering semantics, so each wrapper serializes its operations with a lock held
//! for the whole item (or the whole sequence). They can be shared across threads by reference.

use std::io::{Read, Write};

use marsha_cbor::sequence::Progress;
use marsha_cbor::{ByteCount, Result, SequenceError};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::marshaler::Marshaler;
use crate::record::{Record, RecordSeq};

pub struct Encoder<'m, M, W> {
	marshaler: &'m M,
	sink: Mutex<W>,
}

impl<'m, M: Marshaler, W: Write> Encoder<'m, M, W> {
	pub fn new(marshaler: &'m M, sink: W) -> Self {
		Self {
			marshaler,
			sink: Mutex::new(sink),
		}
	}

	pub fn encode_primitive<T: Serialize + ?Sized>(&self, value: &T) -> Result<ByteCount> {
		let mut sink = self.sink.lock();
		self.marshaler.encode_primitive(value, &mut *sink)
	}

	pub fn encode_record<R: Record>(&self, record: &R) -> Result<ByteCount> {
		let mut sink = self.sink.lock();
		self.marshaler.encode_record(record, &mut *sink)
	}

	pub fn encode_records<S: RecordSeq>(&self, seq: &S) -> std::result::Result<Progress, SequenceError> {
		let mut sink = self.sink.lock();
		self.marshaler.encode_records(seq, &mut *sink)
	}

	pub fn into_inner(self) -> W {
		self.sink.into_inner()
	}
}

pub struct Decoder<'m, M, R> {
	marshaler: &'m M,
	source: Mutex<R>,
}

impl<'m, M: Marshaler, R: Read> Decoder<'m, M, R> {
	pub fn new(marshaler: &'m M, source: R) -> Self {
		Self {
			marshaler,
			source: Mutex::new(source),
		}
	}

	/// Decodes the next item. At the end of the stream this fails with `EndOfInput` and leaves
	/// `target` untouched.
	pub fn decode_primitive<T: DeserializeOwned>(&self, target: &mut T) -> Result<ByteCount> {
		let mut source = self.source.lock();
		self.marshaler.decode_primitive(&mut *source, target)
	}

	pub fn decode_record<T: Record>(&self, target: &mut T) -> Result<ByteCount> {
		let mut source = self.source.lock();
		self.marshaler.decode_record(&mut *source, target)
	}

	/// Decodes records until the stream ends, appending each to `seq`.
	pub fn decode_records<S: RecordSeq>(
		&self,
		seq: &mut S,
	) -> std::result::Result<Progress, SequenceError> {
		let mut source = self.source.lock();
		self.marshaler.decode_records(&mut *source, seq)
	}

	pub fn into_inner(self) -> R {
		self.source.into_inner()
	}
}
