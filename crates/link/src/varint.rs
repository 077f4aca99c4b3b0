//! Unsigned LEB128 varints as used by multiformats (at most 9 bytes, minimal form).

use crate::Malformed;

const MAX_LEN: usize = 9;

pub(crate) fn write(mut n: u64, out: &mut Vec<u8>) {
	while n >= 0x80 {
		out.push((n as u8) | 0x80);
		n >>= 7;
	}
	out.push(n as u8);
}

/// Reads one varint from the front of `input`, advancing it.
pub(crate) fn read(input: &mut &[u8]) -> Result<u64, Malformed> {
	let mut value = 0u64;
	for (i, &byte) in input.iter().enumerate() {
		if i == MAX_LEN {
			return Err(Malformed::OverlongVarint);
		}
		value |= u64::from(byte & 0x7f) << (7 * i);
		if byte & 0x80 == 0 {
			// A zero final byte after continuation bytes could have been dropped.
			if byte == 0 && i > 0 {
				return Err(Malformed::NonMinimalVarint);
			}
			*input = &input[i + 1..];
			return Ok(value);
		}
	}
	if input.len() >= MAX_LEN {
		Err(Malformed::OverlongVarint)
	} else {
		Err(Malformed::TruncatedVarint)
	}
}
