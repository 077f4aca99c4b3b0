//! Error classification at the serde/ciborium boundary.
//!
//! Everything this crate decodes itself reports typed errors directly. The only failures that
//! arrive as text are serde custom messages (from `Deserialize`/`Serialize` impls and ciborium's
//! value conversions). Those are sorted here into the three outcomes the callers can act on; an
//! unmatched message is surfaced as [`Error::Unclassified`] and logged as a defect.

use std::io;

use ciborium::{de, ser, value};

use crate::Error;

/// Outcome of classifying a boundary failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
	TypeMismatch,
	EndOfInput,
	Unclassified,
}

const TYPE_MISMATCH_MARKERS: &[&str] = &[
	"invalid type",
	"invalid value",
	"invalid length",
	"missing field",
	"unknown field",
	"unknown variant",
	"wrong type",
];

const END_OF_INPUT_MARKERS: &[&str] = &["EOF", "end of input"];

/// Classifies a failure message reported by serde or ciborium.
pub fn classify(message: &str) -> Class {
	if TYPE_MISMATCH_MARKERS.iter().any(|m| message.contains(m)) {
		Class::TypeMismatch
	} else if END_OF_INPUT_MARKERS.iter().any(|m| message.contains(m)) {
		Class::EndOfInput
	} else {
		Class::Unclassified
	}
}

/// Turns a boundary failure message into an [`Error`] for a value of type `expected`.
///
/// `consumed` is how many bytes of the current record had been read when the message was raised,
/// or `None` when no stream was involved. End-of-input text maps to [`Error::EndOfInput`] only
/// when nothing of the record was read.
pub(crate) fn reclassify(message: String, expected: &'static str, consumed: Option<u64>) -> Error {
	match (classify(&message), consumed) {
		(Class::TypeMismatch, _) => Error::mismatch(expected, message),
		(Class::EndOfInput, Some(0)) => Error::EndOfInput,
		(Class::EndOfInput, Some(consumed)) => Error::Truncated { consumed },
		(Class::EndOfInput, None) | (Class::Unclassified, _) => unclassified(message),
	}
}

pub(crate) fn unclassified(message: String) -> Error {
	tracing::error!(%message, "unclassified codec failure");
	Error::Unclassified(message)
}

/// Maps a ciborium read failure. `consumed` is how many bytes of the current record were read.
pub(crate) fn decode_error(err: de::Error<io::Error>, consumed: u64, expected: &'static str) -> Error {
	match err {
		de::Error::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof => {
			if consumed == 0 {
				Error::EndOfInput
			} else {
				Error::Truncated { consumed }
			}
		}
		de::Error::Io(io) => Error::Io(io),
		de::Error::Syntax(offset) => Error::Syntax { offset },
		de::Error::Semantic(_, message) => reclassify(message, expected, Some(consumed)),
		de::Error::RecursionLimitExceeded => Error::RecursionLimit,
	}
}

pub(crate) fn encode_error(err: ser::Error<io::Error>) -> Error {
	match err {
		ser::Error::Io(io) => Error::Io(io),
		ser::Error::Value(message) => unclassified(message),
	}
}

/// Maps a failure converting between a typed value and the CBOR value model.
///
/// Conversions run on in-memory values and never report [`Error::EndOfInput`].
pub(crate) fn value_error(err: value::Error, expected: &'static str) -> Error {
	match err {
		value::Error::Custom(message) => reclassify(message, expected, None),
	}
}
