//! Links serialize through the CBOR data model as tag 42 around the raw link bytes.
//!
//! The multibase prefix is added and checked by the codec's registered link rule, so a link
//! serialized here is not yet wire-ready on its own.

use ciborium::Value;
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{LINK_TAG, Link};

impl Serialize for Link {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		Value::Tag(LINK_TAG, Box::new(Value::Bytes(self.to_bytes()))).serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for Link {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		match Value::deserialize(deserializer)? {
			Value::Tag(LINK_TAG, inner) => match *inner {
				Value::Bytes(bytes) => Link::from_bytes(&bytes).map_err(|err| {
					D::Error::invalid_value(Unexpected::Bytes(&bytes), &err.to_string().as_str())
				}),
				_ => Err(D::Error::invalid_type(
					Unexpected::Other("non-bytes link payload"),
					&"a byte string",
				)),
			},
			Value::Tag(tag, _) => Err(D::Error::invalid_value(
				Unexpected::Unsigned(tag),
				&"link tag 42",
			)),
			_ => Err(D::Error::invalid_type(
				Unexpected::Other("untagged value"),
				&"a link (tag 42)",
			)),
		}
	}
}
