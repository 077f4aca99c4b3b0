use marsha_cbor::{CodecOptions, OptionsError};
use serde::Deserialize;

/// Which codec path record operations take.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dispatch {
	/// Use a record's precompiled codec when it has one, the ruleset otherwise.
	#[default]
	PreferGenerated,
	/// Use precompiled codecs only; records without one fail with `NotApplicable`.
	GeneratedOnly,
	/// Always use the ruleset.
	CanonicalOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarshaOptions {
	pub dispatch: Dispatch,
	pub codec: CodecOptions,
}

impl MarshaOptions {
	/// Parses options from a TOML document; the codec settings live in a `[codec]` table.
	pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
		let options: Self = toml::from_str(text)?;
		options.codec.validate()?;
		Ok(options)
	}
}
