//! Codec options.
//!
//! Every field has a default, so an empty TOML table is a valid configuration.

use serde::Deserialize;

/// How a registration conflicting with an existing entry is resolved.
///
/// Re-registering an identical descriptor is always a no-op; the policy only applies when the
/// incoming descriptor differs from the registered one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
	/// Fail with [`crate::Error::Duplicate`].
	#[default]
	Reject,
	/// Keep the registered descriptor and ignore the incoming one.
	FirstWins,
	/// Replace the registered descriptor in place.
	LastWins,
}

/// Map key ordering applied to every encoded map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeySort {
	/// RFC 7049 canonical order: shorter encoded keys first, then bytewise.
	#[default]
	LengthFirst,
	/// RFC 8949 core deterministic order: bytewise over the encoded keys.
	Bytewise,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecOptions {
	pub duplicate_policy: DuplicatePolicy,
	pub key_sort: KeySort,
	/// Idle encoder and decoder instances kept per pool.
	pub pool_capacity: usize,
	/// Reject input whose bytes differ from the canonical encoding of the decoded value.
	pub strict_decoding: bool,
	/// Maximum nesting depth accepted while decoding.
	pub recursion_limit: usize,
}

impl Default for CodecOptions {
	fn default() -> Self {
		Self {
			duplicate_policy: DuplicatePolicy::default(),
			key_sort: KeySort::default(),
			pool_capacity: 16,
			strict_decoding: false,
			recursion_limit: 256,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
	#[error("invalid codec options: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("recursion_limit must be at least 1")]
	ZeroRecursionLimit,
}

impl CodecOptions {
	/// Parses options from a TOML document.
	pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
		let options: Self = toml::from_str(text)?;
		options.validate()?;
		Ok(options)
	}

	pub fn validate(&self) -> Result<(), OptionsError> {
		if self.recursion_limit == 0 {
			return Err(OptionsError::ZeroRecursionLimit);
		}
		Ok(())
	}
}
