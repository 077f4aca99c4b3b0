use std::fmt;
use std::ops::{Add, AddAssign};

/// Bytes produced or consumed by one operation.
///
/// Some codecs cannot tell how many bytes they touched and report [`ByteCount::Unsupported`]
/// instead of a made-up number. Sums involving an unsupported count stay unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteCount {
	Exact(usize),
	Unsupported,
}

impl ByteCount {
	pub const ZERO: ByteCount = ByteCount::Exact(0);

	pub fn get(self) -> Option<usize> {
		match self {
			ByteCount::Exact(n) => Some(n),
			ByteCount::Unsupported => None,
		}
	}

	/// Legacy sentinel form: `-1` when unsupported.
	pub fn as_signed(self) -> i64 {
		match self {
			ByteCount::Exact(n) => n as i64,
			ByteCount::Unsupported => -1,
		}
	}
}

impl Default for ByteCount {
	fn default() -> Self {
		ByteCount::ZERO
	}
}

impl From<usize> for ByteCount {
	fn from(n: usize) -> Self {
		ByteCount::Exact(n)
	}
}

impl Add for ByteCount {
	type Output = ByteCount;

	fn add(self, rhs: ByteCount) -> ByteCount {
		match (self, rhs) {
			(ByteCount::Exact(a), ByteCount::Exact(b)) => ByteCount::Exact(a + b),
			_ => ByteCount::Unsupported,
		}
	}
}

impl AddAssign for ByteCount {
	fn add_assign(&mut self, rhs: ByteCount) {
		*self = *self + rhs;
	}
}

impl fmt::Display for ByteCount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ByteCount::Exact(n) => write!(f, "{n} bytes"),
			ByteCount::Unsupported => f.write_str("unknown bytes"),
		}
	}
}
