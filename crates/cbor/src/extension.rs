//! Tag rules: custom encodings for values carried under a reserved CBOR tag.

use ciborium::Value;
use marsha_link::{LINK_TAG, Link};

use crate::Result;
use crate::shape::describe;

/// A custom descriptor bound to one CBOR tag.
///
/// The ruleset hands every tagged payload it meets to the extension registered for that tag.
/// `encode_payload` maps the serialized payload to its wire form; `decode_payload` validates a
/// wire payload and maps it back.
pub trait Extension: Send + Sync + 'static {
	/// Stable name, used to tell identical registrations apart from conflicting ones.
	fn name(&self) -> &'static str;

	fn tag(&self) -> u64;

	fn encode_payload(&self, payload: Value) -> Result<Value>;

	fn decode_payload(&self, payload: Value) -> Result<Value>;
}

/// Tag 42 rule for content-address links.
///
/// Serialized links carry their raw bytes; on the wire the payload is `0x00 || link bytes`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkExtension;

impl Extension for LinkExtension {
	fn name(&self) -> &'static str {
		"link"
	}

	fn tag(&self) -> u64 {
		LINK_TAG
	}

	fn encode_payload(&self, payload: Value) -> Result<Value> {
		let raw = expect_bytes(payload)?;
		let link = Link::from_bytes(&raw)?;
		Ok(Value::Bytes(link.to_tagged_payload()?))
	}

	fn decode_payload(&self, payload: Value) -> Result<Value> {
		let wire = expect_bytes(payload)?;
		let link = Link::from_tagged_payload(&wire)?;
		Ok(Value::Bytes(link.to_bytes()))
	}
}

fn expect_bytes(payload: Value) -> Result<Vec<u8>> {
	match payload {
		Value::Bytes(bytes) => Ok(bytes),
		other => Err(crate::Error::mismatch(
			"link",
			format!("link payload is {}, not a byte string", describe(&other)),
		)),
	}
}
