//! Canonical CBOR record codec.
//!
//! # Layout
//!
//! - [`registry`]: the [`SchemaRegistry`], publishing immutable [`Ruleset`] snapshots.
//! - [`shape`], [`extension`]: the two kinds of registered descriptors.
//! - [`codec`]: the pooled [`Codec`] runtime (marshal, unmarshal, encode, decode).
//! - [`sequence`]: unprefixed record sequences, terminated by a clean end of input.
//! - [`generated`]: writer and reader helpers for precompiled record codecs.
//! - [`classify`]: the only place failure text from serde is interpreted.
//!
//! Encoded output is canonical: definite lengths, shortest heads and map keys sorted by the
//! configured [`KeySort`], so equal records always produce equal bytes.

pub mod classify;
pub mod codec;
mod count;
mod error;
pub mod extension;
pub mod generated;
mod io;
pub mod options;
pub mod pool;
pub mod registry;
pub mod ruleset;
pub mod sequence;
pub mod shape;

pub use codec::Codec;
pub use count::ByteCount;
pub use error::{Error, ErrorKind, Result, SequenceError};
pub use extension::{Extension, LinkExtension};
pub use generated::{CborReader, CborWriter, FastCodec};
pub use marsha_link::Link;
pub use options::{CodecOptions, DuplicatePolicy, KeySort, OptionsError};
pub use registry::{Registration, SchemaRegistry};
pub use ruleset::{Entry, EntryKey, Ruleset};
pub use sequence::Progress;
pub use shape::{FieldSpec, RecordShape, ShapeBuilder};
