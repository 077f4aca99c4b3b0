use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::{LinkError, MULTIBASE_BINARY, Malformed, Result, multihash, varint};

const V0_MULTIHASH_CODE: u8 = 0x12;
const V0_DIGEST_LEN: u8 = 0x20;
const V0_LEN: usize = 34;

/// Link layout version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
	/// Bare SHA2-256 multihash, implied dag-pb codec.
	#[default]
	V0,
	/// Versioned layout with an explicit content codec.
	V1,
}

/// A content address.
///
/// `Link::default()` is the undefined link; it holds no bytes and cannot be encoded.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link {
	bytes: Box<[u8]>,
	layout: Layout,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Layout {
	version: Version,
	codec: u64,
	multihash_code: u64,
	digest_start: usize,
}

impl Link {
	/// Builds a version 0 link from a SHA2-256 digest.
	pub fn new_v0(digest: [u8; 32]) -> Self {
		let mut bytes = Vec::with_capacity(V0_LEN);
		bytes.push(V0_MULTIHASH_CODE);
		bytes.push(V0_DIGEST_LEN);
		bytes.extend_from_slice(&digest);
		Self {
			bytes: bytes.into_boxed_slice(),
			layout: Layout {
				version: Version::V0,
				codec: crate::codec::DAG_PB,
				multihash_code: multihash::SHA2_256,
				digest_start: 2,
			},
		}
	}

	/// Builds a version 1 link from its parts.
	pub fn new_v1(codec: u64, multihash_code: u64, digest: &[u8]) -> Self {
		let mut bytes = Vec::with_capacity(digest.len() + 8);
		varint::write(1, &mut bytes);
		varint::write(codec, &mut bytes);
		varint::write(multihash_code, &mut bytes);
		varint::write(digest.len() as u64, &mut bytes);
		let digest_start = bytes.len();
		bytes.extend_from_slice(digest);
		Self {
			bytes: bytes.into_boxed_slice(),
			layout: Layout {
				version: Version::V1,
				codec,
				multihash_code,
				digest_start,
			},
		}
	}

	/// Hashes `data` with SHA2-256 and returns the version 1 link addressing it.
	pub fn sha256(codec: u64, data: &[u8]) -> Self {
		let digest = Sha256::digest(data);
		Self::new_v1(codec, multihash::SHA2_256, &digest)
	}

	/// Parses raw link bytes (without the multibase prefix).
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		if bytes.is_empty() {
			return Err(LinkError::Empty);
		}
		if bytes.len() == V0_LEN && bytes[0] == V0_MULTIHASH_CODE && bytes[1] == V0_DIGEST_LEN {
			let mut digest = [0u8; 32];
			digest.copy_from_slice(&bytes[2..]);
			return Ok(Self::new_v0(digest));
		}

		let mut cursor = bytes;
		let version = varint::read(&mut cursor)?;
		if version != 1 {
			return Err(Malformed::UnsupportedVersion(version).into());
		}
		let codec = varint::read(&mut cursor)?;
		let multihash_code = varint::read(&mut cursor)?;
		let declared = varint::read(&mut cursor)?;
		if declared != cursor.len() as u64 {
			return Err(Malformed::DigestLength {
				declared,
				actual: cursor.len(),
			}
			.into());
		}
		Ok(Self {
			bytes: bytes.into(),
			layout: Layout {
				version: Version::V1,
				codec,
				multihash_code,
				digest_start: bytes.len() - cursor.len(),
			},
		})
	}

	/// Encodes the link as a tag payload: the binary multibase prefix followed by the link bytes.
	pub fn to_tagged_payload(&self) -> Result<Vec<u8>> {
		if !self.is_defined() {
			return Err(LinkError::Empty);
		}
		let mut payload = Vec::with_capacity(self.bytes.len() + 1);
		payload.push(MULTIBASE_BINARY);
		payload.extend_from_slice(&self.bytes);
		Ok(payload)
	}

	/// Decodes a tag payload produced by [`Link::to_tagged_payload`].
	pub fn from_tagged_payload(payload: &[u8]) -> Result<Self> {
		let (&prefix, rest) = payload.split_first().ok_or(LinkError::Empty)?;
		if prefix != MULTIBASE_BINARY {
			return Err(LinkError::InvalidMultibase { prefix });
		}
		Self::from_bytes(rest).map_err(|err| match err {
			LinkError::Empty => LinkError::Invalid(Malformed::Missing),
			other => other,
		})
	}

	/// Returns `false` for the undefined link.
	pub fn is_defined(&self) -> bool {
		!self.bytes.is_empty()
	}

	/// Raw link bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		self.bytes.to_vec()
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn version(&self) -> Version {
		self.layout.version
	}

	/// Multicodec of the addressed content.
	pub fn codec(&self) -> u64 {
		self.layout.codec
	}

	pub fn multihash_code(&self) -> u64 {
		self.layout.multihash_code
	}

	/// Hash digest bytes.
	pub fn digest(&self) -> &[u8] {
		&self.bytes[self.layout.digest_start..]
	}
}

/// Multibase base16 (`f` prefix, lowercase).
impl fmt::Display for Link {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("f")?;
		for byte in self.bytes.iter() {
			write!(f, "{byte:02x}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for Link {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_defined() {
			write!(f, "Link({self})")
		} else {
			f.write_str("Link(undefined)")
		}
	}
}

impl FromStr for Link {
	type Err = LinkError;

	fn from_str(s: &str) -> Result<Self> {
		let hex = s.strip_prefix('f').ok_or(Malformed::Text)?;
		if !hex.is_ascii() || hex.len() % 2 != 0 {
			return Err(Malformed::Text.into());
		}
		let bytes = (0..hex.len())
			.step_by(2)
			.map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Malformed::Text))
			.collect::<std::result::Result<Vec<u8>, _>>()?;
		Self::from_bytes(&bytes)
	}
}
