//! Record shapes: the structural identity of a registered record type.

use std::any::{TypeId, type_name};
use std::cmp::Ordering;
use std::sync::Arc;

use ciborium::Value;
use serde::Serialize;

use crate::{Error, Result};

/// One top-level field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
	name: Box<str>,
	optional: bool,
}

impl FieldSpec {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Optional fields may be absent from an encoded record (omitted when empty).
	pub fn is_optional(&self) -> bool {
		self.optional
	}
}

/// Structural descriptor of a record type.
///
/// Fields are kept in canonical order (shorter names first, then bytewise), which is also the order
/// they take on the wire under the default key sort.
#[derive(Debug, Clone)]
pub struct RecordShape {
	type_id: TypeId,
	type_name: &'static str,
	fields: Arc<[FieldSpec]>,
}

impl PartialEq for RecordShape {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id && self.fields == other.fields
	}
}

impl Eq for RecordShape {}

impl RecordShape {
	/// Derives a shape by serializing `sample` and reading its top-level map keys.
	///
	/// Fields skipped by the sample's serializer are not part of the derived shape; declare them
	/// through [`ShapeBuilder::optional`].
	pub fn from_sample<T: Serialize + 'static>(sample: &T) -> Result<Self> {
		Self::derive_builder(sample)?.build()
	}

	/// Derives a builder from `sample`, to be refined before building.
	pub fn derive_builder<T: Serialize + 'static>(sample: &T) -> Result<ShapeBuilder> {
		let type_name = type_name::<T>();
		let value = Value::serialized(sample).map_err(|err| Error::InvalidShape {
			type_name,
			detail: err.to_string(),
		})?;
		let Value::Map(entries) = value else {
			return Err(Error::InvalidShape {
				type_name,
				detail: format!("sample serializes to {}, not a map", describe(&value)),
			});
		};
		let mut builder = Self::builder::<T>();
		for (key, _) in entries {
			match key {
				Value::Text(name) => builder = builder.field(name),
				other => {
					return Err(Error::InvalidShape {
						type_name,
						detail: format!("field key is {}, not text", describe(&other)),
					});
				}
			}
		}
		Ok(builder)
	}

	/// Starts a hand-written descriptor for `T`.
	pub fn builder<T: 'static>() -> ShapeBuilder {
		ShapeBuilder {
			type_id: TypeId::of::<T>(),
			type_name: type_name::<T>(),
			fields: Vec::new(),
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn fields(&self) -> &[FieldSpec] {
		&self.fields
	}

	pub fn field(&self, name: &str) -> Option<&FieldSpec> {
		self.position(name).map(|i| &self.fields[i])
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.fields
			.binary_search_by(|f| canonical_name_cmp(&f.name, name))
			.ok()
	}

	/// Checks that `value` is a map whose keys fit this shape.
	pub(crate) fn check(&self, value: &Value) -> Result<()> {
		let Value::Map(entries) = value else {
			return Err(Error::mismatch(
				self.type_name,
				format!("expected a map, found {}", describe(value)),
			));
		};

		let mut seen = vec![false; self.fields.len()];
		for (key, _) in entries {
			let Value::Text(name) = key else {
				return Err(Error::mismatch(
					self.type_name,
					format!("map key is {}, not a field name", describe(key)),
				));
			};
			match self.position(name) {
				Some(i) if seen[i] => {
					return Err(Error::mismatch(
						self.type_name,
						format!("duplicate field `{name}`"),
					));
				}
				Some(i) => seen[i] = true,
				None => {
					return Err(Error::mismatch(
						self.type_name,
						format!("unknown field `{name}`"),
					));
				}
			}
		}

		if let Some(missing) = self
			.fields
			.iter()
			.zip(&seen)
			.find(|(field, seen)| !field.optional && !**seen)
		{
			return Err(Error::mismatch(
				self.type_name,
				format!("missing field `{}`", missing.0.name),
			));
		}
		Ok(())
	}
}

/// Builder for hand-written or refined [`RecordShape`]s.
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
	type_id: TypeId,
	type_name: &'static str,
	fields: Vec<FieldSpec>,
}

impl ShapeBuilder {
	/// Adds a required field.
	pub fn field(mut self, name: impl Into<Box<str>>) -> Self {
		self.fields.push(FieldSpec {
			name: name.into(),
			optional: false,
		});
		self
	}

	/// Adds an optional field, or marks an already added field optional.
	pub fn optional(mut self, name: impl Into<Box<str>>) -> Self {
		let name = name.into();
		match self.fields.iter_mut().find(|f| f.name == name) {
			Some(existing) => existing.optional = true,
			None => self.fields.push(FieldSpec {
				name,
				optional: true,
			}),
		}
		self
	}

	pub fn build(mut self) -> Result<RecordShape> {
		self.fields
			.sort_by(|a, b| canonical_name_cmp(&a.name, &b.name));
		if let Some(pair) = self.fields.windows(2).find(|w| w[0].name == w[1].name) {
			return Err(Error::InvalidShape {
				type_name: self.type_name,
				detail: format!("field `{}` declared twice", pair[0].name),
			});
		}
		Ok(RecordShape {
			type_id: self.type_id,
			type_name: self.type_name,
			fields: self.fields.into(),
		})
	}
}

fn canonical_name_cmp(a: &str, b: &str) -> Ordering {
	a.len()
		.cmp(&b.len())
		.then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

/// Short human name of a value's CBOR type, for error details.
pub(crate) fn describe(value: &Value) -> String {
	match value {
		Value::Integer(_) => "an integer".into(),
		Value::Bytes(_) => "a byte string".into(),
		Value::Float(_) => "a float".into(),
		Value::Text(_) => "a text string".into(),
		Value::Bool(_) => "a bool".into(),
		Value::Null => "null".into(),
		Value::Tag(tag, _) => format!("tag {tag}"),
		Value::Array(_) => "an array".into(),
		Value::Map(_) => "a map".into(),
		_ => "an unknown value".into(),
	}
}
