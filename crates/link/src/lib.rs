//! Content-address links.
//!
//! A [`Link`] is a self-describing hash identifier (the CID layout: version, content codec and a
//! multihash). Inside CBOR documents a link travels as tag [`LINK_TAG`] wrapping a byte string
//! whose first byte is the binary multibase prefix [`MULTIBASE_BINARY`].
//!
//! This crate only models the value and its byte layout. Registering the tag rule with a codec is
//! the job of `marsha-cbor`.

mod error;
mod link;
mod serde_impl;
mod varint;

pub use error::{LinkError, Malformed, Result};
pub use link::{Link, Version};

/// CBOR tag reserved for content-address links.
pub const LINK_TAG: u64 = 42;

/// Leading payload byte announcing a binary (identity) multibase encoding.
pub const MULTIBASE_BINARY: u8 = 0x00;

/// Well-known multicodec identifiers.
pub mod codec {
	/// Raw binary content.
	pub const RAW: u64 = 0x55;
	/// MerkleDAG protobuf.
	pub const DAG_PB: u64 = 0x70;
	/// MerkleDAG CBOR.
	pub const DAG_CBOR: u64 = 0x71;
}

/// Well-known multihash function identifiers.
pub mod multihash {
	/// Identity "hash" (digest is the content itself).
	pub const IDENTITY: u64 = 0x00;
	/// SHA2-256.
	pub const SHA2_256: u64 = 0x12;
}

#[cfg(test)]
mod tests;
