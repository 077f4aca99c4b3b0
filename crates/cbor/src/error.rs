//! Error taxonomy shared by the registry, the runtime and the generated-codec helpers.

use std::io;

use marsha_link::LinkError;

use crate::ByteCount;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The record type was never registered.
	NotRegistered,
	/// The input's structure does not fit the target record shape.
	TypeMismatch,
	/// The stream ended before the first byte of a new record.
	EndOfInput,
	/// A link payload carried no bytes, or an undefined link was encoded.
	EmptyLink,
	/// A link payload did not start with the binary multibase prefix.
	InvalidMultibase,
	/// A link payload did not parse as a content address.
	InvalidLink,
	/// The input is not well-formed canonical CBOR.
	Malformed,
	/// A conflicting registration was rejected.
	Duplicate,
	/// A record shape could not be derived or built.
	InvalidShape,
	/// The handle does not offer the requested capability.
	NotApplicable,
	/// The underlying reader or writer failed.
	Io,
	/// A failure nothing in this crate recognizes.
	Unclassified,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("record type not registered: {type_name}")]
	NotRegistered { type_name: &'static str },

	#[error("record type does not match {expected}: {detail}")]
	TypeMismatch {
		expected: &'static str,
		detail: String,
	},

	#[error("end of input")]
	EndOfInput,

	#[error("input ended inside a record after {consumed} bytes")]
	Truncated { consumed: u64 },

	#[error("malformed CBOR at byte {offset}")]
	Syntax { offset: usize },

	#[error("nesting exceeds the recursion limit")]
	RecursionLimit,

	#[error("{trailing} trailing bytes after record")]
	TrailingBytes { trailing: usize },

	#[error("input is not canonically encoded: {detail}")]
	NonCanonical { detail: String },

	#[error(transparent)]
	Link(#[from] LinkError),

	#[error("conflicting registration for {key}")]
	Duplicate { key: String },

	#[error("invalid record shape for {type_name}: {detail}")]
	InvalidShape {
		type_name: &'static str,
		detail: String,
	},

	#[error("{type_name} has no generated codec")]
	NotApplicable { type_name: &'static str },

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error("unclassified codec failure: {0}")]
	Unclassified(String),
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::NotRegistered { .. } => ErrorKind::NotRegistered,
			Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
			Error::EndOfInput => ErrorKind::EndOfInput,
			Error::Truncated { .. }
			| Error::Syntax { .. }
			| Error::RecursionLimit
			| Error::TrailingBytes { .. }
			| Error::NonCanonical { .. } => ErrorKind::Malformed,
			Error::Link(LinkError::Empty) => ErrorKind::EmptyLink,
			Error::Link(LinkError::InvalidMultibase { .. }) => ErrorKind::InvalidMultibase,
			Error::Link(LinkError::Invalid(_)) => ErrorKind::InvalidLink,
			Error::Duplicate { .. } => ErrorKind::Duplicate,
			Error::InvalidShape { .. } => ErrorKind::InvalidShape,
			Error::NotApplicable { .. } => ErrorKind::NotApplicable,
			Error::Io(_) => ErrorKind::Io,
			Error::Unclassified(_) => ErrorKind::Unclassified,
		}
	}

	/// True for the clean end of a record stream.
	pub fn is_end_of_input(&self) -> bool {
		matches!(self, Error::EndOfInput)
	}

	pub(crate) fn mismatch(expected: &'static str, detail: impl Into<String>) -> Self {
		Error::TypeMismatch {
			expected,
			detail: detail.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;

/// A record sequence stopped early.
///
/// `records` counts the records fully encoded or decoded (and appended) before `error`.
#[derive(Debug, thiserror::Error)]
#[error("record sequence failed after {records} records: {error}")]
pub struct SequenceError {
	pub records: usize,
	pub bytes: ByteCount,
	#[source]
	pub error: Error,
}

impl SequenceError {
	pub fn kind(&self) -> ErrorKind {
		self.error.kind()
	}
}
