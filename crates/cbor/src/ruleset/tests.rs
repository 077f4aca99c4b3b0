use std::any::TypeId;

use ciborium::Value;
use marsha_link::{LINK_TAG, Link, codec};
use pretty_assertions::assert_eq;

use super::*;
use crate::extension::LinkExtension;
use crate::{ErrorKind, RecordShape};

#[derive(serde::Serialize, Default)]
struct Point {
	x: i64,
	y: i64,
}

fn ruleset(key_sort: KeySort) -> Ruleset {
	let link: Arc<dyn Extension> = Arc::new(LinkExtension);
	let point = RecordShape::from_sample(&Point::default()).unwrap();
	Ruleset::build(
		3,
		key_sort,
		vec![Entry::Extension(link), Entry::Record(point)],
	)
}

fn text(s: &str) -> Value {
	Value::Text(s.into())
}

fn bytes_of(value: &Value) -> Vec<u8> {
	let mut out = Vec::new();
	ciborium::into_writer(value, &mut out).unwrap();
	out
}

#[test]
fn test_lookup_by_key() {
	let rs = ruleset(KeySort::LengthFirst);
	assert_eq!(rs.generation(), 3);
	assert_eq!(rs.len(), 2);
	assert!(rs.contains(EntryKey::Tag(LINK_TAG)));
	assert!(rs.contains(EntryKey::Record(TypeId::of::<Point>())));
	assert!(rs.record_for::<Point>().is_some());
	assert!(rs.record_for::<String>().is_none());
	assert_eq!(rs.extension(LINK_TAG).unwrap().name(), "link");
	assert!(rs.extension(7).is_none());
}

#[test]
fn test_later_entry_wins_on_build() {
	let first = RecordShape::builder::<Point>().field("x").build().unwrap();
	let second = RecordShape::from_sample(&Point::default()).unwrap();
	let rs = Ruleset::build(
		1,
		KeySort::LengthFirst,
		vec![Entry::Record(first), Entry::Record(second.clone())],
	);
	assert_eq!(rs.record_for::<Point>(), Some(&second));
}

#[test]
fn test_insertion_order_does_not_change_bytes() {
	let rs = ruleset(KeySort::LengthFirst);
	let a = Value::Map(vec![
		(text("bbb"), Value::Integer(1.into())),
		(text("a"), Value::Integer(2.into())),
		(text("cc"), Value::Map(vec![(text("z"), Value::Null), (text("y"), Value::Null)])),
	]);
	let b = Value::Map(vec![
		(text("cc"), Value::Map(vec![(text("y"), Value::Null), (text("z"), Value::Null)])),
		(text("a"), Value::Integer(2.into())),
		(text("bbb"), Value::Integer(1.into())),
	]);
	let a = rs.to_wire(a).unwrap();
	let b = rs.to_wire(b).unwrap();
	assert_eq!(bytes_of(&a), bytes_of(&b));

	let Value::Map(entries) = a else {
		panic!("expected map");
	};
	let keys: Vec<_> = entries.iter().map(|(k, _)| k.clone()).collect();
	assert_eq!(keys, vec![text("a"), text("cc"), text("bbb")]);
}

#[test]
fn test_key_sort_policies_differ_on_mixed_keys() {
	let map = || {
		Value::Map(vec![
			(text("a"), Value::Null),
			(Value::Integer(1000.into()), Value::Null),
		])
	};

	let Value::Map(length_first) = ruleset(KeySort::LengthFirst).to_wire(map()).unwrap() else {
		panic!("expected map");
	};
	assert_eq!(length_first[0].0, text("a"));

	let Value::Map(bytewise) = ruleset(KeySort::Bytewise).to_wire(map()).unwrap() else {
		panic!("expected map");
	};
	assert_eq!(bytewise[0].0, Value::Integer(1000.into()));
}

#[test]
fn test_duplicate_map_keys_are_not_canonical() {
	let rs = ruleset(KeySort::LengthFirst);
	let map = Value::Map(vec![(text("a"), Value::Null), (text("a"), Value::Bool(true))]);
	let err = rs.canonicalize(map).unwrap_err();
	assert!(matches!(err, Error::NonCanonical { .. }));
}

#[test]
fn test_link_rule_prefixes_and_strips_multibase() {
	let rs = ruleset(KeySort::LengthFirst);
	let link = Link::sha256(codec::RAW, b"hello");
	let serialized = Value::Tag(LINK_TAG, Box::new(Value::Bytes(link.to_bytes())));

	let wire = rs.to_wire(serialized.clone()).unwrap();
	let mut expected = vec![0x00];
	expected.extend_from_slice(link.as_bytes());
	assert_eq!(wire, Value::Tag(LINK_TAG, Box::new(Value::Bytes(expected))));

	assert_eq!(rs.from_wire(wire).unwrap(), serialized);
}

#[test]
fn test_link_rule_errors() {
	let rs = ruleset(KeySort::LengthFirst);
	let tagged = |payload: Vec<u8>| Value::Tag(LINK_TAG, Box::new(Value::Bytes(payload)));

	let cases = [
		(tagged(vec![]), ErrorKind::EmptyLink),
		(tagged(vec![0x01, 0x12, 0x20]), ErrorKind::InvalidMultibase),
		(tagged(vec![0x00, 0x01, 0x55]), ErrorKind::InvalidLink),
		(
			Value::Tag(LINK_TAG, Box::new(text("not bytes"))),
			ErrorKind::TypeMismatch,
		),
	];
	for (wire, kind) in cases {
		assert_eq!(rs.from_wire(wire).unwrap_err().kind(), kind);
	}

	let undefined = Value::Tag(LINK_TAG, Box::new(Value::Bytes(Vec::new())));
	assert_eq!(rs.to_wire(undefined).unwrap_err().kind(), ErrorKind::EmptyLink);
}

#[test]
fn test_unknown_tags_pass_through() {
	let rs = ruleset(KeySort::LengthFirst);
	let value = Value::Tag(1, Box::new(Value::Integer(1_700_000_000.into())));
	assert_eq!(rs.to_wire(value.clone()).unwrap(), value);
	assert_eq!(rs.from_wire(value.clone()).unwrap(), value);
}
