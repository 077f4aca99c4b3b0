use ciborium::Value;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

#[test]
fn sha256_link_layout() {
	let link = Link::sha256(codec::DAG_CBOR, b"hello");
	assert!(link.is_defined());
	assert_eq!(link.version(), Version::V1);
	assert_eq!(link.codec(), codec::DAG_CBOR);
	assert_eq!(link.multihash_code(), multihash::SHA2_256);
	assert_eq!(link.digest().len(), 32);
	assert_eq!(&link.as_bytes()[..4], &[0x01, 0x71, 0x12, 0x20]);
}

#[test]
fn v0_link_parses_back() {
	let link = Link::new_v0([7u8; 32]);
	let parsed = Link::from_bytes(link.as_bytes()).unwrap();
	assert_eq!(parsed, link);
	assert_eq!(parsed.version(), Version::V0);
	assert_eq!(parsed.codec(), codec::DAG_PB);
	assert_eq!(parsed.digest(), &[7u8; 32]);
}

#[test]
fn default_link_is_undefined() {
	let link = Link::default();
	assert!(!link.is_defined());
	assert_eq!(link.to_tagged_payload(), Err(LinkError::Empty));
	assert_eq!(format!("{link:?}"), "Link(undefined)");
}

#[test]
fn tagged_payload_prefix() {
	let link = Link::sha256(codec::RAW, b"payload");
	let payload = link.to_tagged_payload().unwrap();
	assert_eq!(payload[0], MULTIBASE_BINARY);
	assert_eq!(&payload[1..], link.as_bytes());
	assert_eq!(Link::from_tagged_payload(&payload).unwrap(), link);
}

#[test]
fn tagged_payload_errors() {
	assert_eq!(Link::from_tagged_payload(&[]), Err(LinkError::Empty));
	assert_eq!(
		Link::from_tagged_payload(&[0x51, 0x01]),
		Err(LinkError::InvalidMultibase { prefix: 0x51 })
	);
	assert_eq!(
		Link::from_tagged_payload(&[0x00]),
		Err(LinkError::Invalid(Malformed::Missing))
	);
	assert_eq!(
		Link::from_tagged_payload(&[0x00, 0x02, 0x71]),
		Err(LinkError::Invalid(Malformed::UnsupportedVersion(2)))
	);
}

#[test]
fn digest_length_must_match() {
	let mut bytes = Link::sha256(codec::RAW, b"x").to_bytes();
	bytes.pop();
	assert_eq!(
		Link::from_bytes(&bytes),
		Err(LinkError::Invalid(Malformed::DigestLength {
			declared: 32,
			actual: 31
		}))
	);
}

#[test]
fn non_minimal_varint_rejected() {
	// Version 1 written as two bytes.
	assert_eq!(
		Link::from_bytes(&[0x81, 0x00, 0x55, 0x00, 0x00]),
		Err(LinkError::Invalid(Malformed::NonMinimalVarint))
	);
	assert_eq!(
		Link::from_bytes(&[0x01, 0x80]),
		Err(LinkError::Invalid(Malformed::TruncatedVarint))
	);
}

#[test]
fn display_and_parse() {
	let link = Link::new_v1(codec::RAW, multihash::IDENTITY, b"hi");
	let text = link.to_string();
	assert_eq!(text, "f015500026869");
	assert_eq!(text.parse::<Link>().unwrap(), link);
	assert_eq!(
		"b015500".parse::<Link>(),
		Err(LinkError::Invalid(Malformed::Text))
	);
}

#[test]
fn serializes_as_tag() {
	let link = Link::sha256(codec::DAG_CBOR, b"node");
	let value = Value::serialized(&link).unwrap();
	assert_eq!(
		value,
		Value::Tag(LINK_TAG, Box::new(Value::Bytes(link.to_bytes())))
	);
	let back: Link = value.deserialized().unwrap();
	assert_eq!(back, link);
}

#[test]
fn untagged_value_is_rejected() {
	let err = Value::Bytes(vec![1, 2, 3]).deserialized::<Link>().unwrap_err();
	assert!(err.to_string().contains("invalid type"), "{err}");
}

proptest! {
	#[test]
	fn v1_roundtrip(codec in any::<u64>(), code in any::<u64>(), digest in prop::collection::vec(any::<u8>(), 0..64)) {
		let link = Link::new_v1(codec, code, &digest);
		let parsed = Link::from_bytes(link.as_bytes()).unwrap();
		prop_assert_eq!(parsed.codec(), codec);
		prop_assert_eq!(parsed.multihash_code(), code);
		prop_assert_eq!(parsed.digest(), digest.as_slice());
		prop_assert_eq!(parsed, link);
	}
}
