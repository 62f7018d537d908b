//! Removal of characters the platform strips before verifying a signature.

// self
use crate::sign::Params;

/// Characters dropped from every parameter value.
pub const UNWANTED_CHARS: [char; 5] = ['!', '\'', '(', ')', '*'];

/// Returns `value` without any [`UNWANTED_CHARS`].
pub fn sanitize_value(value: &str) -> String {
	value.chars().filter(|c| !UNWANTED_CHARS.contains(c)).collect()
}

/// Strips [`UNWANTED_CHARS`] from every value; keys and ordering are untouched.
pub fn sanitize(mut params: Params) -> Params {
	for value in params.values_mut() {
		if value.contains(UNWANTED_CHARS) {
			*value = sanitize_value(value);
		}
	}

	params
}
