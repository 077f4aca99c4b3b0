use std::collections::HashSet;
use std::thread;

use marsha_link::LINK_TAG;
use serde::Serialize;

use super::*;
use crate::ErrorKind;
use crate::ruleset::EntryKey;

#[derive(Serialize, Default)]
struct Data {
	#[serde(rename = "Data")]
	data: String,
}

#[derive(Serialize, Default)]
struct Probe<const N: usize> {
	id: u64,
}

fn narrow() -> RecordShape {
	RecordShape::builder::<Data>().field("Other").build().unwrap()
}

#[test]
fn test_new_registry_holds_link_rule() {
	let registry = SchemaRegistry::default();
	let snap = registry.snapshot();
	assert_eq!(snap.generation(), 0);
	assert_eq!(snap.len(), 1);
	assert!(snap.contains(EntryKey::Tag(LINK_TAG)));
	assert!(!registry.is_registered::<Data>());
}

#[test]
fn test_register_publishes_next_generation() {
	let registry = SchemaRegistry::default();
	let outcome = registry.register(&Data::default()).unwrap();
	assert_eq!(outcome, Registration::Added { generation: 1 });
	assert!(registry.is_registered::<Data>());
	assert_eq!(registry.generation(), 1);
	assert_eq!(registry.len(), 2);
}

#[test]
fn test_identical_registration_is_a_no_op() {
	let registry = SchemaRegistry::default();
	registry.register(&Data::default()).unwrap();
	let again = registry.register(&Data::default()).unwrap();
	assert_eq!(again, Registration::Unchanged { generation: 1 });
	assert_eq!(registry.len(), 2);
	assert_eq!(registry.register_extension(LinkExtension).unwrap().generation(), 1);
}

#[test]
fn test_conflict_rejected_by_default() {
	let registry = SchemaRegistry::default();
	registry.register(&Data::default()).unwrap();
	let err = registry.register_shape(narrow()).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Duplicate);
	assert_eq!(registry.generation(), 1);
}

#[test]
fn test_conflict_first_wins_keeps_existing() {
	let registry = SchemaRegistry::new(DuplicatePolicy::FirstWins, KeySort::default());
	registry.register(&Data::default()).unwrap();
	let outcome = registry.register_shape(narrow()).unwrap();
	assert_eq!(outcome, Registration::Unchanged { generation: 1 });
	let snap = registry.snapshot();
	assert!(snap.record_for::<Data>().unwrap().field("Data").is_some());
}

#[test]
fn test_conflict_last_wins_replaces_in_place() {
	let registry = SchemaRegistry::new(DuplicatePolicy::LastWins, KeySort::default());
	registry.register(&Data::default()).unwrap();
	let outcome = registry.register_shape(narrow()).unwrap();
	assert_eq!(outcome, Registration::Replaced { generation: 2 });
	let snap = registry.snapshot();
	assert_eq!(snap.len(), 2);
	assert!(snap.record_for::<Data>().unwrap().field("Other").is_some());
}

#[test]
fn test_pinned_snapshot_is_isolated() {
	let registry = SchemaRegistry::default();
	let pinned = registry.snapshot();
	registry.register(&Data::default()).unwrap();
	assert!(pinned.record_for::<Data>().is_none());
	assert_eq!(pinned.generation(), 0);
	assert!(registry.snapshot().record_for::<Data>().is_some());
}

#[test]
fn test_require_reports_unregistered_type() {
	let registry = SchemaRegistry::default();
	let snap = registry.snapshot();
	let err = SchemaRegistry::require::<Data>(&snap).unwrap_err();
	assert!(matches!(err, Error::NotRegistered { type_name } if type_name.ends_with("Data")));
}

macro_rules! register_probes {
	($registry:expr, $scope:expr, $($n:literal),*) => {
		$(
			$scope.spawn(|| {
				$registry.register(&Probe::<$n>::default()).unwrap();
			});
		)*
	};
}

#[test]
fn test_concurrent_registration_keeps_every_shape_once() {
	let registry = SchemaRegistry::default();
	thread::scope(|s| {
		register_probes!(registry, s, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15);
	});

	let snap = registry.snapshot();
	assert_eq!(snap.len(), 17);
	assert_eq!(snap.generation(), 16);
	let unique: HashSet<_> = snap.entries().iter().map(Entry::key).collect();
	assert_eq!(unique.len(), snap.len());
	assert!(registry.is_registered::<Probe<0>>());
	assert!(registry.is_registered::<Probe<15>>());
}

#[test]
fn test_readers_never_see_partial_rulesets() {
	let registry = SchemaRegistry::default();
	thread::scope(|s| {
		s.spawn(|| {
			let mut last = 0;
			for _ in 0..2_000 {
				let snap = registry.snapshot();
				assert!(snap.generation() >= last);
				assert_eq!(snap.len() as u64, snap.generation() + 1);
				last = snap.generation();
			}
		});
		register_probes!(registry, s, 100, 101, 102, 103, 104, 105, 106, 107);
	});
	assert_eq!(registry.len(), 9);
}
