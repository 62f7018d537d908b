//! Bounded worker pool for short-lived fetch jobs, paired with a WBI-style request signer that
//! turns caller parameters plus two rotating secrets into an authenticated query string.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod feed;
pub mod fetch;
pub mod obs;
pub mod pool;
pub mod sign;
pub mod task;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::sign::{KeyPair, RequestSigner};

	/// Image key fixture captured from a real nav response.
	pub const IMG_KEY: &str = "7cd084941338484aae1ad9425b84077c";
	/// Sub key fixture captured from a real nav response.
	pub const SUB_KEY: &str = "4932caff0ff746eab6f01bf08b70ac45";

	/// Builds the key pair used across signer tests.
	pub fn fixture_keys() -> KeyPair {
		KeyPair::new(IMG_KEY, SUB_KEY).expect("Fixture keys should be valid.")
	}

	/// Builds the key pair with the two secrets swapped, a distinct key generation.
	pub fn swapped_keys() -> KeyPair {
		KeyPair::new(SUB_KEY, IMG_KEY).expect("Swapped fixture keys should be valid.")
	}

	/// Builds a signer backed by [`fixture_keys`].
	pub fn fixture_signer() -> RequestSigner {
		RequestSigner::new(fixture_keys())
	}

	/// Instant of the published signing example (`wts=1702204169`).
	pub fn fixture_instant() -> OffsetDateTime {
		OffsetDateTime::from_unix_timestamp(1_702_204_169).expect("Fixture timestamp is valid.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use parking_lot::{Condvar, Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
