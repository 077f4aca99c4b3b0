use std::io::{self, Read};

/// Reader adapter counting the bytes pulled through it, optionally recording them.
///
/// The count separates a clean end of stream (nothing read for the record) from a record cut off
/// part way.
pub(crate) struct Tally<'a, R: ?Sized> {
	inner: &'a mut R,
	consumed: u64,
	record: Option<&'a mut Vec<u8>>,
}

impl<'a, R: Read + ?Sized> Tally<'a, R> {
	pub(crate) fn new(inner: &'a mut R) -> Self {
		Self {
			inner,
			consumed: 0,
			record: None,
		}
	}

	pub(crate) fn recording(inner: &'a mut R, record: &'a mut Vec<u8>) -> Self {
		Self {
			inner,
			consumed: 0,
			record: Some(record),
		}
	}

	pub(crate) fn consumed(&self) -> u64 {
		self.consumed
	}
}

impl<R: Read + ?Sized> Read for Tally<'_, R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let n = self.inner.read(buf)?;
		self.consumed += n as u64;
		if let Some(record) = self.record.as_mut() {
			record.extend_from_slice(&buf[..n]);
		}
		Ok(n)
	}
}
