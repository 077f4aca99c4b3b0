//! Uniform marshaling of primitives, records and record sequences.
//!
//! [`Marshaler`] is the contract application code programs against; [`Marsha`] implements it
//! with the canonical CBOR codec from `marsha-cbor`. Record types implement [`Record`] (usually
//! with an empty impl) and are registered once before use:
//!
//! ```
//! use marsha::{Marsha, Marshaler, Record};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Data {
//! 	#[serde(rename = "Data")]
//! 	data: String,
//! }
//!
//! impl Record for Data {}
//!
//! let marsha = Marsha::new();
//! marsha.register(&Data::default())?;
//!
//! let bytes = marsha.marshal_record(&Data { data: "test".into() })?;
//! let mut out = Data::default();
//! marsha.unmarshal_record(&bytes, &mut out)?;
//! assert_eq!(out.data, "test");
//! # Ok::<(), marsha::Error>(())
//! ```

mod marsha;
mod marshaler;
mod options;
mod record;
mod stream;

pub use marsha::Marsha;
pub use marsha_cbor::sequence::Progress;
pub use marsha_cbor::{
	ByteCount, CborReader, CborWriter, CodecOptions, DuplicatePolicy, Error, ErrorKind, FastCodec,
	KeySort, Link, OptionsError, RecordShape, Registration, Result, SequenceError,
};
pub use marshaler::Marshaler;
pub use options::{Dispatch, MarshaOptions};
pub use record::{Record, RecordSeq};
pub use stream::{Decoder, Encoder};
