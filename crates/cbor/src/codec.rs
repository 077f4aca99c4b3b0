//! Pooled canonical codec runtime.
//!
//! Every operation pins one ruleset snapshot at entry and runs against it to the end, so a
//! registration racing with an encode or decode is either fully visible to it or not at all.
//!
//! Record operations (`marshal`, `encode`, ...) require the record type to be registered and check
//! decoded input against its shape. Primitive operations accept any serde type and skip both,
//! while still applying the ruleset's extensions and key ordering.

use std::any::type_name;
use std::io::{Read, Write};
use std::sync::Arc;

use ciborium::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::extension::Extension;
use crate::io::Tally;
use crate::options::CodecOptions;
use crate::pool::{DecoderState, EncoderState, Pool};
use crate::registry::{Registration, SchemaRegistry};
use crate::ruleset::Ruleset;
use crate::sequence::{self, Progress};
use crate::shape::RecordShape;
use crate::{ByteCount, Error, Result, SequenceError, classify};

#[derive(Debug)]
pub struct Codec {
	registry: SchemaRegistry,
	options: CodecOptions,
	encoders: Pool<EncoderState>,
	decoders: Pool<DecoderState>,
}

impl Default for Codec {
	fn default() -> Self {
		Self::new()
	}
}

impl Codec {
	pub fn new() -> Self {
		Self::with_options(CodecOptions::default())
	}

	pub fn with_options(options: CodecOptions) -> Self {
		Self {
			registry: SchemaRegistry::new(options.duplicate_policy, options.key_sort),
			encoders: Pool::new(options.pool_capacity),
			decoders: Pool::new(options.pool_capacity),
			options,
		}
	}

	pub fn options(&self) -> &CodecOptions {
		&self.options
	}

	pub fn registry(&self) -> &SchemaRegistry {
		&self.registry
	}

	pub fn encoder_pool(&self) -> &Pool<EncoderState> {
		&self.encoders
	}

	pub fn decoder_pool(&self) -> &Pool<DecoderState> {
		&self.decoders
	}

	/// Pins the current ruleset.
	pub fn ruleset(&self) -> Arc<Ruleset> {
		self.registry.snapshot()
	}

	/// Registers `T` by deriving its shape from `sample`.
	pub fn register<T: Serialize + 'static>(&self, sample: &T) -> Result<Registration> {
		self.registry.register(sample)
	}

	pub fn register_shape(&self, shape: RecordShape) -> Result<Registration> {
		self.registry.register_shape(shape)
	}

	pub fn register_extension<E: Extension>(&self, extension: E) -> Result<Registration> {
		self.registry.register_extension(extension)
	}

	pub fn is_registered<T: 'static>(&self) -> bool {
		self.registry.is_registered::<T>()
	}

	pub fn marshal<T: Serialize + 'static>(&self, value: &T) -> Result<Vec<u8>> {
		let ruleset = self.ruleset();
		SchemaRegistry::require::<T>(&ruleset)?;
		self.marshal_with(&ruleset, value, type_name::<T>())
	}

	pub fn marshal_primitive<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
		self.marshal_with(&self.ruleset(), value, type_name::<T>())
	}

	/// Decodes exactly one record from `bytes` into `target`, returning the bytes consumed.
	///
	/// `target` is only written on success.
	pub fn unmarshal<T: DeserializeOwned + 'static>(
		&self,
		bytes: &[u8],
		target: &mut T,
	) -> Result<usize> {
		let ruleset = self.ruleset();
		let shape = SchemaRegistry::require::<T>(&ruleset)?;
		self.unmarshal_with(&ruleset, Some(shape), bytes, target)
	}

	pub fn unmarshal_primitive<T: DeserializeOwned>(
		&self,
		bytes: &[u8],
		target: &mut T,
	) -> Result<usize> {
		self.unmarshal_with(&self.ruleset(), None, bytes, target)
	}

	/// Encodes one record onto `sink`, returning the bytes written.
	pub fn encode<T: Serialize + 'static>(&self, value: &T, sink: &mut dyn Write) -> Result<usize> {
		let ruleset = self.ruleset();
		SchemaRegistry::require::<T>(&ruleset)?;
		self.encode_with(&ruleset, value, type_name::<T>(), sink)
	}

	pub fn encode_primitive<T: Serialize + ?Sized>(
		&self,
		value: &T,
		sink: &mut dyn Write,
	) -> Result<usize> {
		self.encode_with(&self.ruleset(), value, type_name::<T>(), sink)
	}

	/// Decodes the next record from `source` into `target`, returning the bytes consumed.
	///
	/// Fails with [`Error::EndOfInput`] when `source` is exhausted before the record's first byte,
	/// and with [`Error::Truncated`] when it ends inside the record.
	pub fn decode<T: DeserializeOwned + 'static>(
		&self,
		source: &mut dyn Read,
		target: &mut T,
	) -> Result<usize> {
		let ruleset = self.ruleset();
		let shape = SchemaRegistry::require::<T>(&ruleset)?;
		self.decode_into(&ruleset, Some(shape), source, target)
	}

	pub fn decode_primitive<T: DeserializeOwned>(
		&self,
		source: &mut dyn Read,
		target: &mut T,
	) -> Result<usize> {
		self.decode_into(&self.ruleset(), None, source, target)
	}

	/// Encodes `values` back to back onto `sink`.
	pub fn encode_sequence<'a, T, I>(
		&self,
		values: I,
		sink: &mut dyn Write,
	) -> std::result::Result<Progress, SequenceError>
	where
		T: Serialize + 'static,
		I: IntoIterator<Item = &'a T>,
	{
		let ruleset = self.ruleset();
		let expected = type_name::<T>();
		if let Err(error) = SchemaRegistry::require::<T>(&ruleset) {
			return Err(SequenceError {
				records: 0,
				bytes: ByteCount::ZERO,
				error,
			});
		}
		sequence::encode_each(values, |value| {
			self.encode_with(&ruleset, value, expected, &mut *sink)
				.map(ByteCount::from)
		})
	}

	/// Decodes records from `source` until it ends at a record boundary.
	///
	/// Each record is decoded into a fresh value from `empty` and handed to `append` once complete.
	pub fn decode_sequence<T, F, A>(
		&self,
		source: &mut dyn Read,
		mut empty: F,
		mut append: A,
	) -> std::result::Result<Progress, SequenceError>
	where
		T: DeserializeOwned + 'static,
		F: FnMut() -> T,
		A: FnMut(T),
	{
		let ruleset = self.ruleset();
		let shape = match SchemaRegistry::require::<T>(&ruleset) {
			Ok(shape) => shape,
			Err(error) => {
				return Err(SequenceError {
					records: 0,
					bytes: ByteCount::ZERO,
					error,
				});
			}
		};
		sequence::decode_until_end(|| {
			let mut record = empty();
			let consumed = self.decode_into(&ruleset, Some(shape), &mut *source, &mut record)?;
			append(record);
			Ok(ByteCount::from(consumed))
		})
	}

	fn marshal_with<T: Serialize + ?Sized>(
		&self,
		ruleset: &Ruleset,
		value: &T,
		expected: &'static str,
	) -> Result<Vec<u8>> {
		let mut out: Vec<u8> = Vec::new();
		self.encode_with(ruleset, value, expected, &mut out)?;
		Ok(out)
	}

	fn encode_with<T: Serialize + ?Sized>(
		&self,
		ruleset: &Ruleset,
		value: &T,
		expected: &'static str,
		sink: &mut dyn Write,
	) -> Result<usize> {
		let value =
			Value::serialized(value).map_err(|err| classify::value_error(err, expected))?;
		let wire = ruleset.to_wire(value)?;

		let mut state = self.encoders.checkout(ruleset.generation());
		ciborium::into_writer(&wire, &mut state.buf).map_err(classify::encode_error)?;
		sink.write_all(&state.buf)?;
		Ok(state.buf.len())
	}

	fn unmarshal_with<T: DeserializeOwned>(
		&self,
		ruleset: &Ruleset,
		shape: Option<&RecordShape>,
		bytes: &[u8],
		target: &mut T,
	) -> Result<usize> {
		let mut rest = bytes;
		let (value, consumed) = self.decode_with(ruleset, shape, &mut rest)?;
		if !rest.is_empty() {
			return Err(Error::TrailingBytes { trailing: rest.len() });
		}
		*target = value;
		Ok(consumed)
	}

	fn decode_into<T: DeserializeOwned>(
		&self,
		ruleset: &Ruleset,
		shape: Option<&RecordShape>,
		source: &mut dyn Read,
		target: &mut T,
	) -> Result<usize> {
		let (value, consumed) = self.decode_with(ruleset, shape, source)?;
		*target = value;
		Ok(consumed)
	}

	fn decode_with<T: DeserializeOwned>(
		&self,
		ruleset: &Ruleset,
		shape: Option<&RecordShape>,
		source: &mut dyn Read,
	) -> Result<(T, usize)> {
		let expected = shape.map_or_else(type_name::<T>, RecordShape::type_name);
		let mut state = self.decoders.checkout(ruleset.generation());
		let state = &mut *state;

		let strict = self.options.strict_decoding;
		let (wire, consumed) = {
			let mut tally = if strict {
				Tally::recording(&mut *source, &mut state.raw)
			} else {
				Tally::new(&mut *source)
			};
			let read = ciborium::de::from_reader_with_recursion_limit::<Value, _>(
				&mut tally,
				self.options.recursion_limit,
			);
			match read {
				Ok(wire) => (wire, tally.consumed()),
				Err(err) => return Err(classify::decode_error(err, tally.consumed(), expected)),
			}
		};

		if strict {
			let canonical = ruleset.canonicalize(wire.clone())?;
			ciborium::into_writer(&canonical, &mut state.canonical).map_err(classify::encode_error)?;
			if state.canonical != state.raw {
				return Err(Error::NonCanonical {
					detail: format!("{expected} differs from its canonical encoding"),
				});
			}
		}

		if let Some(shape) = shape {
			shape.check(&wire)?;
		}
		let value = ruleset
			.from_wire(wire)?
			.deserialized::<T>()
			.map_err(|err| classify::value_error(err, expected))?;
		Ok((value, consumed as usize))
	}
}
