use marsha_link::{Link, codec};

use super::*;
use crate::ErrorKind;

fn written(f: impl FnOnce(&mut CborWriter<'_>) -> Result<()>) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	let mut w = CborWriter::new(&mut out);
	f(&mut w).unwrap();
	assert_eq!(w.written(), ByteCount::Exact(out.len()));
	out
}

#[test]
fn test_heads_are_minimal() {
	let cases: [(u64, &[u8]); 6] = [
		(0, &[0x00]),
		(23, &[0x17]),
		(24, &[0x18, 24]),
		(256, &[0x19, 0x01, 0x00]),
		(65_536, &[0x1a, 0x00, 0x01, 0x00, 0x00]),
		(1 << 32, &[0x1b, 0, 0, 0, 1, 0, 0, 0, 0]),
	];
	for (n, expected) in cases {
		assert_eq!(written(|w| w.u64(n)), expected, "{n}");
	}
}

#[test]
fn test_signed_integers() {
	assert_eq!(written(|w| w.i64(-1)), [0x20]);
	assert_eq!(written(|w| w.i64(-500)), [0x39, 0x01, 0xf3]);

	for n in [0, 5, -1, -24, -25, i64::MIN, i64::MAX] {
		let bytes = written(|w| w.i64(n));
		let mut input = &bytes[..];
		assert_eq!(CborReader::new(&mut input).i64().unwrap(), n);
	}
}

#[test]
fn test_reader_mirrors_writer() {
	let link = Link::sha256(codec::DAG_CBOR, b"block");
	let bytes = written(|w| {
		w.map_header(2)?;
		w.text("a")?;
		w.bool(true)?;
		w.text("l")?;
		w.array_header(2)?;
		w.link(&link)?;
		w.bytes(b"\x00\x01")
	});

	let mut input = &bytes[..];
	let mut r = CborReader::new(&mut input);
	assert_eq!(r.map_header().unwrap(), 2);
	r.key("a").unwrap();
	assert!(r.bool().unwrap());
	r.key("l").unwrap();
	assert_eq!(r.array_header().unwrap(), 2);
	assert_eq!(r.link().unwrap(), link);
	assert_eq!(r.bytes().unwrap(), vec![0x00, 0x01]);
	assert_eq!(r.consumed(), ByteCount::Exact(bytes.len()));
}

#[test]
fn test_empty_input_is_end_of_input() {
	let mut input: &[u8] = &[];
	let err = CborReader::new(&mut input).map_header().unwrap_err();
	assert!(err.is_end_of_input());
}

#[test]
fn test_short_input_is_truncated() {
	let mut input: &[u8] = &[0x64, b'D', b'a'];
	let err = CborReader::new(&mut input).text().unwrap_err();
	assert!(matches!(err, Error::Truncated { consumed: 3 }), "{err:?}");

	let mut input: &[u8] = &[0x19, 0x01];
	let err = CborReader::new(&mut input).u64().unwrap_err();
	assert!(matches!(err, Error::Truncated { consumed: 2 }), "{err:?}");
}

#[test]
fn test_wrong_major_is_type_mismatch() {
	let mut input: &[u8] = &[0x61, b'x'];
	let err = CborReader::new(&mut input).map_header().unwrap_err();
	assert_eq!(err.kind(), ErrorKind::TypeMismatch);

	let mut input: &[u8] = &[0x61, b'x'];
	let err = CborReader::new(&mut input).key("y").unwrap_err();
	assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_non_canonical_heads_rejected() {
	for bytes in [&[0x18, 0x05][..], &[0x19, 0x00, 0x10], &[0xbf], &[0x5f]] {
		let mut input = bytes;
		let err = CborReader::new(&mut input).head().unwrap_err();
		assert!(matches!(err, Error::NonCanonical { .. }), "{bytes:?}");
	}

	let mut input: &[u8] = &[0x1c];
	let err = CborReader::new(&mut input).head().unwrap_err();
	assert!(matches!(err, Error::Syntax { offset: 0 }));
}

#[test]
fn test_two_byte_simple_values_below_32_rejected() {
	for bytes in [&[0xf8, 0x14][..], &[0xf8, 0x00], &[0xf8, 0x1f]] {
		let mut input = bytes;
		let err = CborReader::new(&mut input).head().unwrap_err();
		assert!(matches!(err, Error::Syntax { offset: 0 }), "{bytes:?}");
	}

	let mut input: &[u8] = &[0xf8, 0x20];
	let header = CborReader::new(&mut input).head().unwrap();
	assert_eq!(header.major, Major::Simple);
	assert_eq!(header.arg, 0x20);
}

#[test]
fn test_link_errors() {
	let mut wrong_tag: &[u8] = &[0xc1, 0x41, 0x00];
	assert_eq!(
		CborReader::new(&mut wrong_tag).link().unwrap_err().kind(),
		ErrorKind::TypeMismatch
	);

	let mut empty: &[u8] = &[0xd8, 0x2a, 0x40];
	assert_eq!(
		CborReader::new(&mut empty).link().unwrap_err().kind(),
		ErrorKind::EmptyLink
	);

	let mut prefix: &[u8] = &[0xd8, 0x2a, 0x42, 0x01, 0x01];
	assert_eq!(
		CborReader::new(&mut prefix).link().unwrap_err().kind(),
		ErrorKind::InvalidMultibase
	);

	let mut out: Vec<u8> = Vec::new();
	let err = CborWriter::new(&mut out).link(&Link::default()).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::EmptyLink);
	assert!(out.is_empty());
}

#[test]
fn test_invalid_utf8_text() {
	let mut input: &[u8] = &[0x62, 0xff, 0xfe];
	let err = CborReader::new(&mut input).text().unwrap_err();
	assert!(matches!(err, Error::Syntax { offset: 1 }));
}
