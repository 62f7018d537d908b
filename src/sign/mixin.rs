//! Mixin key derivation.

// self
use crate::{
	_prelude::*,
	sign::key::{KeyPair, MIXIN_KEY_LEN, SecretKey},
};

/// Permutation over the 64 characters of `img_key + sub_key`; the first [`MIXIN_KEY_LEN`]
/// entries pick the mixin key.
pub const MIXIN_KEY_ENC_TAB: [usize; 64] = [
	46, 47, 18, 2, 53, 8, 23, 32, 15, 50, 10, 31, 58, 3, 45, 35, 27, 43, 5, 49, 33, 9, 42, 19, 29,
	28, 14, 39, 12, 38, 41, 13, 37, 48, 7, 16, 24, 55, 40, 61, 26, 17, 0, 1, 60, 51, 30, 4, 22, 25,
	54, 21, 56, 59, 6, 63, 57, 62, 11, 36, 20, 34, 44, 52,
];

/// Picks `img_key.len()` characters out of `img_key + sub_key` following [`MIXIN_KEY_ENC_TAB`].
pub fn mix_keys(img_key: &SecretKey, sub_key: &SecretKey) -> String {
	let raw = [img_key.expose().as_bytes(), sub_key.expose().as_bytes()].concat();

	MIXIN_KEY_ENC_TAB[..img_key.expose().len()].iter().map(|&idx| char::from(raw[idx])).collect()
}

/// Key material appended to the canonical query before digesting.
#[derive(Clone, PartialEq, Eq)]
pub struct MixinKey(String);
impl MixinKey {
	/// Derives the mixin key for a key pair.
	pub fn derive(keys: &KeyPair) -> Self {
		Self(mix_keys(&keys.img, &keys.sub))
	}

	/// Returns the key. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Always [`MIXIN_KEY_LEN`].
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Never true for a derived key.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for MixinKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("MixinKey").field(&"<redacted>").finish()
	}
}

const _: () = assert!(MIXIN_KEY_LEN * 2 == MIXIN_KEY_ENC_TAB.len());
