use std::any::type_name;
use std::io::{Read, Write};

use marsha_cbor::{
	ByteCount, Codec, Error, Extension, RecordShape, Registration, Result, SchemaRegistry,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::marshaler::Marshaler;
use crate::options::{Dispatch, MarshaOptions};
use crate::record::Record;

/// CBOR backend: the canonical ruleset codec, with precompiled record codecs routed per
/// [`Dispatch`].
///
/// A record type must be registered before any record operation, whichever path it takes.
#[derive(Debug)]
pub struct Marsha {
	codec: Codec,
	dispatch: Dispatch,
}

impl Default for Marsha {
	fn default() -> Self {
		Self::with_options(MarshaOptions::default())
	}
}

impl Marsha {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: MarshaOptions) -> Self {
		tracing::debug!(dispatch = ?options.dispatch, codec = ?options.codec, "creating marsha");
		Self {
			codec: Codec::with_options(options.codec),
			dispatch: options.dispatch,
		}
	}

	pub fn with_dispatch(dispatch: Dispatch) -> Self {
		Self::with_options(MarshaOptions {
			dispatch,
			..MarshaOptions::default()
		})
	}

	pub fn dispatch(&self) -> Dispatch {
		self.dispatch
	}

	pub fn codec(&self) -> &Codec {
		&self.codec
	}

	pub fn registry(&self) -> &SchemaRegistry {
		self.codec.registry()
	}

	/// Registers a record type by passing a sample of it.
	pub fn register<R: Record>(&self, sample: &R) -> Result<Registration> {
		self.codec.register(sample)
	}

	pub fn register_shape(&self, shape: RecordShape) -> Result<Registration> {
		self.codec.register_shape(shape)
	}

	pub fn register_extension<E: Extension>(&self, extension: E) -> Result<Registration> {
		self.codec.register_extension(extension)
	}

	pub fn is_registered<R: Record>(&self) -> bool {
		self.codec.is_registered::<R>()
	}

	fn require<R: Record>(&self) -> Result<()> {
		if self.codec.is_registered::<R>() {
			Ok(())
		} else {
			Err(Error::NotRegistered {
				type_name: type_name::<R>(),
			})
		}
	}

	/// Picks the precompiled codec, if the dispatch mode allows and requires it.
	fn route<R: Record, C>(&self, fast: Option<C>) -> Result<Option<C>> {
		match self.dispatch {
			Dispatch::CanonicalOnly => Ok(None),
			Dispatch::PreferGenerated => Ok(fast),
			Dispatch::GeneratedOnly => match fast {
				Some(fast) => Ok(Some(fast)),
				None => {
					tracing::debug!(record = type_name::<R>(), "no generated codec");
					Err(Error::NotApplicable {
						type_name: type_name::<R>(),
					})
				}
			},
		}
	}
}

impl Marshaler for Marsha {
	fn encode_primitive<T: Serialize + ?Sized>(
		&self,
		value: &T,
		out: &mut dyn Write,
	) -> Result<ByteCount> {
		self.codec.encode_primitive(value, out).map(ByteCount::from)
	}

	fn decode_primitive<T: DeserializeOwned>(
		&self,
		input: &mut dyn Read,
		target: &mut T,
	) -> Result<ByteCount> {
		self.codec.decode_primitive(input, target).map(ByteCount::from)
	}

	fn encode_record<R: Record>(&self, record: &R, out: &mut dyn Write) -> Result<ByteCount> {
		self.require::<R>()?;
		match self.route::<R, _>(record.as_fast_codec())? {
			Some(fast) => fast.encode_fast(out),
			None => self.codec.encode(record, out).map(ByteCount::from),
		}
	}

	fn decode_record<R: Record>(&self, input: &mut dyn Read, target: &mut R) -> Result<ByteCount> {
		self.require::<R>()?;
		match self.route::<R, _>(target.as_fast_codec_mut())? {
			Some(fast) => fast.decode_fast(input),
			None => self.codec.decode(input, target).map(ByteCount::from),
		}
	}

	fn unmarshal_primitive<T: DeserializeOwned>(
		&self,
		bytes: &[u8],
		target: &mut T,
	) -> Result<ByteCount> {
		self.codec.unmarshal_primitive(bytes, target).map(ByteCount::from)
	}

	/// On the ruleset path the target is left untouched by every failure, `TrailingBytes`
	/// included. A generated codec writes the target as it decodes.
	fn unmarshal_record<R: Record>(&self, bytes: &[u8], target: &mut R) -> Result<ByteCount> {
		self.require::<R>()?;
		match self.route::<R, _>(target.as_fast_codec_mut())? {
			Some(fast) => {
				let mut rest = bytes;
				let read = fast.decode_fast(&mut rest)?;
				if !rest.is_empty() {
					return Err(Error::TrailingBytes {
						trailing: rest.len(),
					});
				}
				Ok(read)
			}
			None => self.codec.unmarshal(bytes, target).map(ByteCount::from),
		}
	}
}
