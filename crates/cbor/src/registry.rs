//! Schema registry: copy-on-write publication of rulesets.
//!
//! # Role
//!
//! The registry owns the current [`Ruleset`] behind an [`ArcSwap`]. Readers pin a snapshot with a
//! wait-free load and keep it for the whole operation. Writers build the next ruleset from the
//! pinned one and publish it with compare-and-swap, retrying when another writer got there first.
//!
//! # Invariants
//!
//! - A published ruleset is never mutated.
//! - At most one entry per [`EntryKey`](crate::ruleset::EntryKey) lives in a ruleset.
//! - Every successful publication increments the generation by one.
//! - Re-registering an identical descriptor publishes nothing.

use std::any::type_name;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::extension::{Extension, LinkExtension};
use crate::options::{DuplicatePolicy, KeySort};
use crate::ruleset::{Entry, Ruleset};
use crate::shape::RecordShape;
use crate::{Error, Result};

/// Outcome of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
	/// A new entry was appended.
	Added { generation: u64 },
	/// A conflicting entry was replaced in place (`LastWins`).
	Replaced { generation: u64 },
	/// Nothing was published: the descriptor was already registered, or `FirstWins` kept the
	/// existing one.
	Unchanged { generation: u64 },
}

impl Registration {
	pub fn generation(self) -> u64 {
		match self {
			Registration::Added { generation }
			| Registration::Replaced { generation }
			| Registration::Unchanged { generation } => generation,
		}
	}
}

pub struct SchemaRegistry {
	snap: ArcSwap<Ruleset>,
	policy: DuplicatePolicy,
}

impl Default for SchemaRegistry {
	fn default() -> Self {
		Self::new(DuplicatePolicy::default(), KeySort::default())
	}
}

impl SchemaRegistry {
	/// Creates a registry holding only the link extension.
	pub fn new(policy: DuplicatePolicy, key_sort: KeySort) -> Self {
		let link: Arc<dyn Extension> = Arc::new(LinkExtension);
		let seed = Ruleset::build(0, key_sort, vec![Entry::Extension(link)]);
		Self {
			snap: ArcSwap::from_pointee(seed),
			policy,
		}
	}

	pub fn policy(&self) -> DuplicatePolicy {
		self.policy
	}

	/// Pins the current ruleset.
	pub fn snapshot(&self) -> Arc<Ruleset> {
		self.snap.load_full()
	}

	pub fn generation(&self) -> u64 {
		self.snap.load().generation()
	}

	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.snap.load().is_empty()
	}

	pub fn is_registered<T: 'static>(&self) -> bool {
		self.snap.load().record_for::<T>().is_some()
	}

	/// Registers `T` by deriving its shape from `sample`.
	pub fn register<T: Serialize + 'static>(&self, sample: &T) -> Result<Registration> {
		let shape = RecordShape::from_sample(sample)?;
		self.register_entry(Entry::Record(shape))
	}

	/// Registers a hand-built record shape.
	pub fn register_shape(&self, shape: RecordShape) -> Result<Registration> {
		self.register_entry(Entry::Record(shape))
	}

	/// Registers a tag extension.
	pub fn register_extension<E: Extension>(&self, extension: E) -> Result<Registration> {
		self.register_entry(Entry::Extension(Arc::new(extension)))
	}

	pub fn register_entry(&self, entry: Entry) -> Result<Registration> {
		let key = entry.key();
		loop {
			let cur = self.snap.load_full();

			let mut entries = cur.entries().to_vec();
			let outcome = match cur.position(key) {
				Some(i) if entries[i].same_descriptor(&entry) => {
					return Ok(Registration::Unchanged {
						generation: cur.generation(),
					});
				}
				Some(i) => match self.policy {
					DuplicatePolicy::Reject => {
						tracing::warn!(
							key = %entry.label(),
							generation = cur.generation(),
							"rejected conflicting registration"
						);
						return Err(Error::Duplicate { key: entry.label() });
					}
					DuplicatePolicy::FirstWins => {
						tracing::debug!(
							key = %entry.label(),
							generation = cur.generation(),
							"kept existing registration"
						);
						return Ok(Registration::Unchanged {
							generation: cur.generation(),
						});
					}
					DuplicatePolicy::LastWins => {
						entries[i] = entry.clone();
						Registration::Replaced {
							generation: cur.generation() + 1,
						}
					}
				},
				None => {
					entries.push(entry.clone());
					Registration::Added {
						generation: cur.generation() + 1,
					}
				}
			};

			let next = Arc::new(Ruleset::build(
				cur.generation() + 1,
				cur.key_sort(),
				entries,
			));
			let len = next.len();
			let prev = self.snap.compare_and_swap(&cur, next);
			if Arc::ptr_eq(&prev, &cur) {
				tracing::debug!(
					key = %entry.label(),
					generation = outcome.generation(),
					entries = len,
					"published ruleset"
				);
				return Ok(outcome);
			}
			tracing::trace!(key = %entry.label(), "ruleset changed during registration, retrying");
		}
	}

	/// Fails with [`Error::NotRegistered`] unless `T` has a record entry in `ruleset`.
	pub(crate) fn require<T: 'static>(ruleset: &Ruleset) -> Result<&RecordShape> {
		ruleset.record_for::<T>().ok_or(Error::NotRegistered {
			type_name: type_name::<T>(),
		})
	}
}

impl std::fmt::Debug for SchemaRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SchemaRegistry")
			.field("policy", &self.policy)
			.field("ruleset", &*self.snap.load())
			.finish()
	}
}

#[cfg(test)]
mod tests;
