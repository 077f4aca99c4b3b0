//! Record sequence framing.
//!
//! A sequence is the concatenation of its records' encodings: no count, no length prefix. Records
//! are self-delimiting, so decoding simply reads record after record until the stream ends cleanly
//! at a record boundary.

use crate::{ByteCount, Error, Result, SequenceError};

/// Records and bytes handled by a sequence operation so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
	pub records: usize,
	pub bytes: ByteCount,
}

impl Progress {
	fn advance(&mut self, bytes: ByteCount) {
		self.records += 1;
		self.bytes += bytes;
	}

	fn fail(self, error: Error) -> SequenceError {
		SequenceError {
			records: self.records,
			bytes: self.bytes,
			error,
		}
	}
}

/// Encodes every item in order with `encode_one`, stopping at the first failure.
pub fn encode_each<I, F>(items: I, mut encode_one: F) -> std::result::Result<Progress, SequenceError>
where
	I: IntoIterator,
	F: FnMut(I::Item) -> Result<ByteCount>,
{
	let mut progress = Progress::default();
	for item in items {
		match encode_one(item) {
			Ok(bytes) => progress.advance(bytes),
			Err(error) => return Err(progress.fail(error)),
		}
	}
	Ok(progress)
}

/// Runs `decode_one` until the stream ends at a record boundary.
///
/// `decode_one` decodes one record and appends it only on success. [`Error::EndOfInput`] (reported
/// only when no byte of the next record was read) ends the loop successfully; every other error,
/// including a record cut short, aborts it.
pub fn decode_until_end<F>(mut decode_one: F) -> std::result::Result<Progress, SequenceError>
where
	F: FnMut() -> Result<ByteCount>,
{
	let mut progress = Progress::default();
	loop {
		match decode_one() {
			Ok(bytes) => progress.advance(bytes),
			Err(Error::EndOfInput) => return Ok(progress),
			Err(error) => return Err(progress.fail(error)),
		}
	}
}
