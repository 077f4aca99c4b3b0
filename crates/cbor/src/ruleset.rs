//! Immutable compiled rulesets.
//!
//! A [`Ruleset`] is the snapshot every encode and decode runs against: the registered record
//! shapes, the tag extensions and the key ordering policy. Registries never mutate a published
//! ruleset; they build the next generation and swap it in.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ciborium::Value;
use rustc_hash::FxHashMap;

use crate::extension::Extension;
use crate::options::KeySort;
use crate::shape::RecordShape;
use crate::{Error, Result, classify};

/// One registered descriptor.
#[derive(Clone)]
pub enum Entry {
	Record(RecordShape),
	Extension(Arc<dyn Extension>),
}

/// Identity of an entry; at most one entry per key lives in a ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKey {
	Record(TypeId),
	Tag(u64),
}

impl Entry {
	pub fn key(&self) -> EntryKey {
		match self {
			Entry::Record(shape) => EntryKey::Record(shape.type_id()),
			Entry::Extension(ext) => EntryKey::Tag(ext.tag()),
		}
	}

	/// Human label for logs and errors.
	pub fn label(&self) -> String {
		match self {
			Entry::Record(shape) => shape.type_name().to_string(),
			Entry::Extension(ext) => format!("{} (tag {})", ext.name(), ext.tag()),
		}
	}

	/// True when `other` describes this entry's key exactly as this entry does.
	pub(crate) fn same_descriptor(&self, other: &Entry) -> bool {
		match (self, other) {
			(Entry::Record(a), Entry::Record(b)) => a == b,
			(Entry::Extension(a), Entry::Extension(b)) => a.tag() == b.tag() && a.name() == b.name(),
			_ => false,
		}
	}
}

impl fmt::Debug for Entry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Entry::Record(shape) => f.debug_tuple("Record").field(shape).finish(),
			Entry::Extension(ext) => f
				.debug_struct("Extension")
				.field("name", &ext.name())
				.field("tag", &ext.tag())
				.finish(),
		}
	}
}

#[derive(Clone, Copy)]
enum Walk {
	/// Apply extension encoders and sort map keys.
	ToWire,
	/// Apply extension decoders.
	FromWire,
	/// Sort map keys only; used to re-derive the canonical bytes of decoded input.
	SortOnly,
}

pub struct Ruleset {
	generation: u64,
	key_sort: KeySort,
	entries: Arc<[Entry]>,
	records: FxHashMap<TypeId, usize>,
	tags: FxHashMap<u64, usize>,
}

impl Ruleset {
	/// Compiles `entries` into a ruleset. Later entries win over earlier ones with the same key.
	pub(crate) fn build(generation: u64, key_sort: KeySort, entries: Vec<Entry>) -> Self {
		let mut records = FxHashMap::default();
		let mut tags = FxHashMap::default();
		for (i, entry) in entries.iter().enumerate() {
			match entry.key() {
				EntryKey::Record(id) => records.insert(id, i),
				EntryKey::Tag(tag) => tags.insert(tag, i),
			};
		}
		Self {
			generation,
			key_sort,
			entries: entries.into(),
			records,
			tags,
		}
	}

	/// Publication counter; every registry rebuild increments it.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn key_sort(&self) -> KeySort {
		self.key_sort
	}

	/// Entries in registration order.
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, key: EntryKey) -> bool {
		match key {
			EntryKey::Record(id) => self.records.contains_key(&id),
			EntryKey::Tag(tag) => self.tags.contains_key(&tag),
		}
	}

	pub(crate) fn position(&self, key: EntryKey) -> Option<usize> {
		match key {
			EntryKey::Record(id) => self.records.get(&id).copied(),
			EntryKey::Tag(tag) => self.tags.get(&tag).copied(),
		}
	}

	pub fn record(&self, id: TypeId) -> Option<&RecordShape> {
		let i = *self.records.get(&id)?;
		match &self.entries[i] {
			Entry::Record(shape) => Some(shape),
			Entry::Extension(_) => None,
		}
	}

	pub fn record_for<T: 'static>(&self) -> Option<&RecordShape> {
		self.record(TypeId::of::<T>())
	}

	pub fn extension(&self, tag: u64) -> Option<&Arc<dyn Extension>> {
		let i = *self.tags.get(&tag)?;
		match &self.entries[i] {
			Entry::Extension(ext) => Some(ext),
			Entry::Record(_) => None,
		}
	}

	/// Rewrites a serialized value into its canonical wire form.
	pub(crate) fn to_wire(&self, value: Value) -> Result<Value> {
		self.walk(value, Walk::ToWire)
	}

	/// Validates and rewrites a decoded wire value back into its serde form.
	pub(crate) fn from_wire(&self, value: Value) -> Result<Value> {
		self.walk(value, Walk::FromWire)
	}

	/// Sorts every map in `value` without touching tagged payloads.
	pub(crate) fn canonicalize(&self, value: Value) -> Result<Value> {
		self.walk(value, Walk::SortOnly)
	}

	fn walk(&self, value: Value, mode: Walk) -> Result<Value> {
		Ok(match value {
			Value::Map(entries) => {
				let entries = entries
					.into_iter()
					.map(|(k, v)| Ok((self.walk(k, mode)?, self.walk(v, mode)?)))
					.collect::<Result<Vec<_>>>()?;
				match mode {
					Walk::FromWire => Value::Map(entries),
					Walk::ToWire | Walk::SortOnly => Value::Map(self.sort_map(entries)?),
				}
			}
			Value::Array(items) => Value::Array(
				items
					.into_iter()
					.map(|v| self.walk(v, mode))
					.collect::<Result<Vec<_>>>()?,
			),
			Value::Tag(tag, inner) => {
				let inner = self.walk(*inner, mode)?;
				let payload = match (mode, self.extension(tag)) {
					(Walk::ToWire, Some(ext)) => ext.encode_payload(inner)?,
					(Walk::FromWire, Some(ext)) => ext.decode_payload(inner)?,
					_ => inner,
				};
				Value::Tag(tag, Box::new(payload))
			}
			other => other,
		})
	}

	fn sort_map(&self, entries: Vec<(Value, Value)>) -> Result<Vec<(Value, Value)>> {
		let mut keyed = entries
			.into_iter()
			.map(|(k, v)| Ok((encode_key(&k)?, k, v)))
			.collect::<Result<Vec<_>>>()?;
		let cmp: fn(&[u8], &[u8]) -> Ordering = match self.key_sort {
			KeySort::LengthFirst => length_first,
			KeySort::Bytewise => <[u8] as Ord>::cmp,
		};
		keyed.sort_by(|a, b| cmp(&a.0, &b.0));
		if keyed.windows(2).any(|w| w[0].0 == w[1].0) {
			return Err(Error::NonCanonical {
				detail: "duplicate map key".into(),
			});
		}
		Ok(keyed.into_iter().map(|(_, k, v)| (k, v)).collect())
	}
}

impl fmt::Debug for Ruleset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ruleset")
			.field("generation", &self.generation)
			.field("key_sort", &self.key_sort)
			.field("entries", &self.entries)
			.finish()
	}
}

fn length_first(a: &[u8], b: &[u8]) -> Ordering {
	a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn encode_key(key: &Value) -> Result<Vec<u8>> {
	let mut buf = Vec::new();
	ciborium::into_writer(key, &mut buf).map_err(classify::encode_error)?;
	Ok(buf)
}

#[cfg(test)]
mod tests;
