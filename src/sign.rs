//! WBI-style request signing.
//!
//! Two rotating 32-character secrets (the image key and the sub key) are folded into a mixin key
//! through a fixed permutation table. Signing sanitizes caller parameters, stamps them with the
//! current unix time, serializes them in key order, and digests that query string with the mixin
//! key appended. The hex digest travels as the `w_rid` parameter.

pub mod key;
pub mod mixin;
pub mod sanitize;
pub mod signer;

pub use key::*;
pub use mixin::*;
pub use sanitize::*;
pub use signer::*;

// self
use crate::_prelude::*;

/// Request parameters in canonical (ascending key) order.
pub type Params = BTreeMap<String, String>;

/// Builds [`Params`] from any iterator of key/value pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<String>,
{
	pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Serializes parameters as a query string in ascending key order.
///
/// Keys and values are percent-encoded the way `encodeURIComponent` does: spaces become `%20`
/// rather than `+`, and `! ' ( ) * ~` stay literal. Values reach this point sanitized, so only
/// keys can still carry the first five.
pub fn canonical_query(params: &Params) -> String {
	let mut buf = String::new();

	for (idx, (key, value)) in params.iter().enumerate() {
		if idx > 0 {
			buf.push('&');
		}

		push_component(&mut buf, key);
		buf.push('=');
		push_component(&mut buf, value);
	}

	buf
}

fn push_component(buf: &mut String, value: &str) {
	for chunk in url::form_urlencoded::byte_serialize(value.as_bytes()) {
		// `byte_serialize` emits a lone "+" for a space; a literal plus arrives as "%2B".
		match chunk {
			"+" => buf.push_str("%20"),
			"%21" => buf.push('!'),
			"%27" => buf.push('\''),
			"%28" => buf.push('('),
			"%29" => buf.push(')'),
			"%7E" => buf.push('~'),
			_ => buf.push_str(chunk),
		}
	}
}
