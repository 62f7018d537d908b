//! Redacted signing secrets.

// self
use crate::{_prelude::*, error::ConfigError};

/// Required length of each signing secret and of the derived mixin key.
pub const MIXIN_KEY_LEN: usize = 32;

/// A 32-character ASCII signing secret whose formatters never reveal the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretKey(String);
impl SecretKey {
	/// Validates and wraps a secret.
	pub fn new(value: impl Into<String>) -> Result<Self, ConfigError> {
		let value = value.into();

		validate(&value)?;

		Ok(Self(value))
	}

	/// Extracts the secret from an asset URL such as
	/// `https://i0.hdslb.com/bfs/wbi/7cd084941338484aae1ad9425b84077c.png`: the file stem of the
	/// last path segment is the key.
	pub fn from_asset_url(url: &Url) -> Result<Self, ConfigError> {
		let file = url.path_segments().and_then(|mut segments| segments.next_back()).unwrap_or("");
		let stem = file.split_once('.').map_or(file, |(stem, _)| stem);

		Self::new(stem)
	}

	/// Returns the secret. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for SecretKey {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<SecretKey> for String {
	fn from(value: SecretKey) -> Self {
		value.0
	}
}
impl Debug for SecretKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretKey").field(&"<redacted>").finish()
	}
}
impl Display for SecretKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

fn validate(value: &str) -> Result<(), ConfigError> {
	if !value.is_ascii() {
		return Err(ConfigError::NonAsciiKey);
	}
	if value.len() != MIXIN_KEY_LEN {
		return Err(ConfigError::InvalidKeyLength { expected: MIXIN_KEY_LEN, actual: value.len() });
	}

	Ok(())
}

/// The image key and sub key issued together by the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
	/// Image key (`img_key`).
	pub img: SecretKey,
	/// Sub key (`sub_key`).
	pub sub: SecretKey,
}
impl KeyPair {
	/// Validates both secrets.
	pub fn new(img: impl Into<String>, sub: impl Into<String>) -> Result<Self, ConfigError> {
		Ok(Self { img: SecretKey::new(img)?, sub: SecretKey::new(sub)? })
	}

	/// Extracts both secrets from their asset URLs; see [`SecretKey::from_asset_url`].
	pub fn from_asset_urls(img_url: &Url, sub_url: &Url) -> Result<Self, ConfigError> {
		Ok(Self { img: SecretKey::from_asset_url(img_url)?, sub: SecretKey::from_asset_url(sub_url)? })
	}
}
