/// Failures while building, validating or unwrapping a [`crate::Link`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
	/// The link is undefined, or its tagged payload carries no bytes.
	#[error("empty link")]
	Empty,
	/// The tagged payload does not start with the binary multibase prefix.
	#[error("link payload is not binary multibase (prefix {prefix:#04x})")]
	InvalidMultibase { prefix: u8 },
	/// The link bytes do not describe a valid content address.
	#[error("invalid link: {0}")]
	Invalid(#[from] Malformed),
}

/// Structural problems found while parsing link bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
	#[error("input ended inside a varint")]
	TruncatedVarint,
	#[error("varint is longer than 9 bytes")]
	OverlongVarint,
	#[error("varint is not minimally encoded")]
	NonMinimalVarint,
	#[error("unsupported link version {0}")]
	UnsupportedVersion(u64),
	#[error("digest length mismatch: declared {declared}, found {actual}")]
	DigestLength { declared: u64, actual: usize },
	#[error("no link bytes")]
	Missing,
	#[error("not a base16 multibase string")]
	Text,
}

pub type Result<T> = std::result::Result<T, LinkError>;
