//! Crate-level error types shared by the pool, the signer, and the fetch task.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Worker pool misuse.
	#[error(transparent)]
	Pool(#[from] PoolError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while talking to the platform.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Failures raised by [`WorkerPool`](crate::pool::WorkerPool).
#[derive(Debug, ThisError)]
pub enum PoolError {
	/// The pool no longer accepts tasks because [`stop`](crate::pool::WorkerPool::stop) ran.
	#[error("Worker pool is closed and no longer accepts tasks.")]
	Closed,
	/// The OS refused to spawn a worker thread.
	#[error("Worker thread could not be spawned.")]
	Spawn {
		/// Underlying spawn failure.
		#[source]
		source: std::io::Error,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A signing secret does not have the required length.
	#[error("Signing key must be {expected} characters long, got {actual}.")]
	InvalidKeyLength {
		/// Required key length.
		expected: usize,
		/// Observed key length.
		actual: usize,
	},
	/// A signing secret contains non-ASCII characters.
	#[error("Signing key must only contain ASCII characters.")]
	NonAsciiKey,
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A global tracing subscriber could not be installed.
	#[error("Logger could not be installed.")]
	LoggerInstall {
		/// Underlying subscriber failure.
		#[source]
		source: BoxError,
	},
}
impl From<url::ParseError> for ConfigError {
	fn from(e: url::ParseError) -> Self {
		Self::InvalidEndpoint { source: e }
	}
}

/// Transport-level failures (network, status, payload decoding).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Platform answered with a non-success HTTP status.
	#[error("Platform responded with HTTP status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// Response body could not be decoded into the requested type.
	#[error("Platform returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self {
		Self::Transport(e.into())
	}
}
