//! Runtime support for precompiled record codecs.
//!
//! A record type with a hand-written or generated codec implements [`FastCodec`] on top of
//! [`CborWriter`] and [`CborReader`]. Both speak the same canonical subset the ruleset path emits
//! (definite lengths, minimal heads), so a faithful fast codec produces byte-identical output.
//!
//! The reader reports typed errors for everything it detects itself: no failure from this module
//! goes through text classification.

use std::io::{self, Read, Write};

use marsha_link::{LINK_TAG, Link};

use crate::{ByteCount, Error, Result};

/// A record's precompiled encoder and decoder.
pub trait FastCodec {
	/// Writes one record. Returns the bytes written.
	fn encode_fast(&self, out: &mut dyn Write) -> Result<ByteCount>;

	/// Reads one record into `self`. Returns the bytes consumed.
	///
	/// Implementations decode into locals and assign at the end, so `self` keeps its previous
	/// contents when decoding fails.
	fn decode_fast(&mut self, input: &mut dyn Read) -> Result<ByteCount>;
}

/// CBOR major type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Major {
	Unsigned,
	Negative,
	Bytes,
	Text,
	Array,
	Map,
	Tag,
	Simple,
}

impl Major {
	fn from_bits(bits: u8) -> Self {
		match bits {
			0 => Major::Unsigned,
			1 => Major::Negative,
			2 => Major::Bytes,
			3 => Major::Text,
			4 => Major::Array,
			5 => Major::Map,
			6 => Major::Tag,
			_ => Major::Simple,
		}
	}

	fn bits(self) -> u8 {
		match self {
			Major::Unsigned => 0,
			Major::Negative => 1,
			Major::Bytes => 2,
			Major::Text => 3,
			Major::Array => 4,
			Major::Map => 5,
			Major::Tag => 6,
			Major::Simple => 7,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Major::Unsigned => "an unsigned integer",
			Major::Negative => "a negative integer",
			Major::Bytes => "a byte string",
			Major::Text => "a text string",
			Major::Array => "an array",
			Major::Map => "a map",
			Major::Tag => "a tag",
			Major::Simple => "a simple value",
		}
	}
}

/// A decoded item head: major type plus its argument.
///
/// For [`Major::Simple`] the argument is the simple value (20 false, 21 true, 22 null) or the raw
/// float bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	pub major: Major,
	pub arg: u64,
}

const SIMPLE_FALSE: u64 = 20;
const SIMPLE_TRUE: u64 = 21;
const SIMPLE_NULL: u64 = 22;

/// Canonical CBOR writer over any sink, counting the bytes it writes.
pub struct CborWriter<'a> {
	out: &'a mut dyn Write,
	written: usize,
}

impl<'a> CborWriter<'a> {
	pub fn new(out: &'a mut dyn Write) -> Self {
		Self { out, written: 0 }
	}

	pub fn written(&self) -> ByteCount {
		ByteCount::Exact(self.written)
	}

	fn put(&mut self, bytes: &[u8]) -> Result<()> {
		self.out.write_all(bytes)?;
		self.written += bytes.len();
		Ok(())
	}

	/// Writes a head in its shortest form.
	pub fn head(&mut self, major: Major, arg: u64) -> Result<()> {
		let m = major.bits() << 5;
		if arg < 24 {
			self.put(&[m | arg as u8])
		} else if arg <= u64::from(u8::MAX) {
			self.put(&[m | 24, arg as u8])
		} else if arg <= u64::from(u16::MAX) {
			let mut buf = [m | 25, 0, 0];
			buf[1..].copy_from_slice(&(arg as u16).to_be_bytes());
			self.put(&buf)
		} else if arg <= u64::from(u32::MAX) {
			let mut buf = [m | 26, 0, 0, 0, 0];
			buf[1..].copy_from_slice(&(arg as u32).to_be_bytes());
			self.put(&buf)
		} else {
			let mut buf = [m | 27, 0, 0, 0, 0, 0, 0, 0, 0];
			buf[1..].copy_from_slice(&arg.to_be_bytes());
			self.put(&buf)
		}
	}

	pub fn map_header(&mut self, len: usize) -> Result<()> {
		self.head(Major::Map, len as u64)
	}

	pub fn array_header(&mut self, len: usize) -> Result<()> {
		self.head(Major::Array, len as u64)
	}

	pub fn text(&mut self, text: &str) -> Result<()> {
		self.head(Major::Text, text.len() as u64)?;
		self.put(text.as_bytes())
	}

	pub fn bytes(&mut self, bytes: &[u8]) -> Result<()> {
		self.head(Major::Bytes, bytes.len() as u64)?;
		self.put(bytes)
	}

	pub fn u64(&mut self, n: u64) -> Result<()> {
		self.head(Major::Unsigned, n)
	}

	pub fn i64(&mut self, n: i64) -> Result<()> {
		if n >= 0 {
			self.head(Major::Unsigned, n as u64)
		} else {
			self.head(Major::Negative, !(n as u64))
		}
	}

	pub fn bool(&mut self, b: bool) -> Result<()> {
		self.head(Major::Simple, if b { SIMPLE_TRUE } else { SIMPLE_FALSE })
	}

	pub fn null(&mut self) -> Result<()> {
		self.head(Major::Simple, SIMPLE_NULL)
	}

	/// Writes a link as tag 42 around `0x00 || link bytes`.
	pub fn link(&mut self, link: &Link) -> Result<()> {
		let payload = link.to_tagged_payload()?;
		self.head(Major::Tag, LINK_TAG)?;
		self.bytes(&payload)
	}
}

/// Canonical CBOR reader over any source, counting the bytes it consumes.
///
/// Running out of input before the first byte is [`Error::EndOfInput`]; running out later is
/// [`Error::Truncated`].
pub struct CborReader<'a> {
	input: &'a mut dyn Read,
	consumed: u64,
}

impl<'a> CborReader<'a> {
	pub fn new(input: &'a mut dyn Read) -> Self {
		Self { input, consumed: 0 }
	}

	pub fn consumed(&self) -> ByteCount {
		ByteCount::Exact(self.consumed as usize)
	}

	fn eof(&self) -> Error {
		if self.consumed == 0 {
			Error::EndOfInput
		} else {
			Error::Truncated {
				consumed: self.consumed,
			}
		}
	}

	fn byte(&mut self) -> Result<u8> {
		let mut buf = [0u8; 1];
		loop {
			match self.input.read(&mut buf) {
				Ok(0) => return Err(self.eof()),
				Ok(_) => {
					self.consumed += 1;
					return Ok(buf[0]);
				}
				Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
				Err(err) => return Err(err.into()),
			}
		}
	}

	fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
		for slot in buf {
			*slot = self.byte()?;
		}
		Ok(())
	}

	fn payload(&mut self, len: u64) -> Result<Vec<u8>> {
		let mut buf = Vec::new();
		let read = (&mut *self.input).take(len).read_to_end(&mut buf)?;
		self.consumed += read as u64;
		if (read as u64) < len {
			return Err(self.eof());
		}
		Ok(buf)
	}

	/// Reads the next head, rejecting indefinite lengths and non-minimal arguments.
	pub fn head(&mut self) -> Result<Header> {
		let offset = self.consumed as usize;
		let initial = self.byte()?;
		let major = Major::from_bits(initial >> 5);
		let info = initial & 0x1f;
		let arg = match info {
			0..=23 => u64::from(info),
			24 => {
				let n = u64::from(self.byte()?);
				if major == Major::Simple {
					if n < 32 {
						return Err(Error::Syntax { offset });
					}
				} else if n < 24 {
					return Err(non_minimal(major));
				}
				n
			}
			25 => {
				let mut buf = [0u8; 2];
				self.fill(&mut buf)?;
				let n = u64::from(u16::from_be_bytes(buf));
				if n <= u64::from(u8::MAX) && major != Major::Simple {
					return Err(non_minimal(major));
				}
				n
			}
			26 => {
				let mut buf = [0u8; 4];
				self.fill(&mut buf)?;
				let n = u64::from(u32::from_be_bytes(buf));
				if n <= u64::from(u16::MAX) && major != Major::Simple {
					return Err(non_minimal(major));
				}
				n
			}
			27 => {
				let mut buf = [0u8; 8];
				self.fill(&mut buf)?;
				let n = u64::from_be_bytes(buf);
				if n <= u64::from(u32::MAX) && major != Major::Simple {
					return Err(non_minimal(major));
				}
				n
			}
			31 => {
				return Err(Error::NonCanonical {
					detail: format!("indefinite-length {}", major.name()),
				});
			}
			_ => return Err(Error::Syntax { offset }),
		};
		Ok(Header { major, arg })
	}

	/// Reads a head of the given major type and returns its argument.
	pub fn expect(&mut self, major: Major) -> Result<u64> {
		let header = self.head()?;
		if header.major != major {
			return Err(Error::mismatch(
				major.name(),
				format!("found {}", header.major.name()),
			));
		}
		Ok(header.arg)
	}

	pub fn map_header(&mut self) -> Result<u64> {
		self.expect(Major::Map)
	}

	pub fn array_header(&mut self) -> Result<u64> {
		self.expect(Major::Array)
	}

	pub fn text(&mut self) -> Result<String> {
		let len = self.expect(Major::Text)?;
		let offset = self.consumed as usize;
		let raw = self.payload(len)?;
		String::from_utf8(raw).map_err(|_| Error::Syntax { offset })
	}

	pub fn bytes(&mut self) -> Result<Vec<u8>> {
		let len = self.expect(Major::Bytes)?;
		self.payload(len)
	}

	pub fn u64(&mut self) -> Result<u64> {
		self.expect(Major::Unsigned)
	}

	pub fn i64(&mut self) -> Result<i64> {
		let header = self.head()?;
		let out_of_range = || Error::mismatch("an i64", format!("integer out of range ({header:?})"));
		match header.major {
			Major::Unsigned => i64::try_from(header.arg).map_err(|_| out_of_range()),
			Major::Negative => i64::try_from(header.arg)
				.map(|n| -1 - n)
				.map_err(|_| out_of_range()),
			other => Err(Error::mismatch(
				"an integer",
				format!("found {}", other.name()),
			)),
		}
	}

	pub fn bool(&mut self) -> Result<bool> {
		match self.expect(Major::Simple)? {
			SIMPLE_FALSE => Ok(false),
			SIMPLE_TRUE => Ok(true),
			other => Err(Error::mismatch("a bool", format!("simple value {other}"))),
		}
	}

	/// Reads a map key and checks it names `field`.
	pub fn key(&mut self, field: &'static str) -> Result<()> {
		let name = self.text()?;
		if name != field {
			return Err(Error::mismatch(
				field,
				format!("unknown field `{name}`, expected `{field}`"),
			));
		}
		Ok(())
	}

	/// Reads a tag 42 link, validating its payload.
	pub fn link(&mut self) -> Result<Link> {
		let tag = self.expect(Major::Tag)?;
		if tag != LINK_TAG {
			return Err(Error::mismatch("a link", format!("found tag {tag}")));
		}
		let payload = self.bytes()?;
		Ok(Link::from_tagged_payload(&payload)?)
	}
}

fn non_minimal(major: Major) -> Error {
	Error::NonCanonical {
		detail: format!("non-minimal head for {}", major.name()),
	}
}

#[cfg(test)]
mod tests;
