//! Explicit logger configuration.
//!
//! Nothing in this crate installs a subscriber on first use. Binaries build a [`LogConfig`] at
//! startup (usually via [`LogConfig::from_env`]) and call [`LogConfig::install`] once before
//! spawning pools.

// self
use crate::_prelude::*;

/// Environment variable selecting [`LogMode`].
pub const APP_ENV_VAR: &str = "APP_ENV";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Output flavor for the installed subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogMode {
	/// Human-readable console output.
	Development,
	/// One JSON object per line.
	Production,
}
impl LogMode {
	/// Level used when none is configured explicitly.
	pub const fn default_level(self) -> LogLevel {
		match self {
			LogMode::Development => LogLevel::Debug,
			LogMode::Production => LogLevel::Info,
		}
	}
}

/// Minimum severity emitted by the subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
	/// `debug` and above.
	Debug,
	/// `info` and above.
	Info,
	/// `warn` and above.
	Warn,
	/// `error` only.
	Error,
}
impl LogLevel {
	/// Parses a level name; unknown names fall back to [`LogLevel::Info`].
	pub fn parse_lossy(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"debug" => LogLevel::Debug,
			"warn" => LogLevel::Warn,
			"error" => LogLevel::Error,
			_ => LogLevel::Info,
		}
	}

	/// Returns the directive understood by `EnvFilter`.
	pub const fn as_str(self) -> &'static str {
		match self {
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
		}
	}
}
impl Display for LogLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Logger settings resolved once at process start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
	/// Output flavor.
	pub mode: LogMode,
	/// Minimum level.
	pub level: LogLevel,
}
impl LogConfig {
	/// Creates a config using the mode's default level.
	pub const fn new(mode: LogMode) -> Self {
		Self { mode, level: mode.default_level() }
	}

	/// Overrides the level.
	pub const fn with_level(mut self, level: LogLevel) -> Self {
		self.level = level;

		self
	}

	/// Resolves the config from the process environment.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Resolves the config from an arbitrary key lookup.
	///
	/// `APP_ENV` of `prod`/`production` selects [`LogMode::Production`], any other value selects
	/// [`LogMode::Development`], and an unset variable defaults to production. `LOG_LEVEL`
	/// overrides the mode's default level.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let mode = match lookup(APP_ENV_VAR).filter(|v| !v.is_empty()) {
			Some(env) if env == "prod" || env == "production" => LogMode::Production,
			Some(_) => LogMode::Development,
			None => LogMode::Production,
		};
		let config = Self::new(mode);

		match lookup(LOG_LEVEL_VAR).filter(|v| !v.is_empty()) {
			Some(level) => config.with_level(LogLevel::parse_lossy(&level)),
			None => config,
		}
	}

	/// Installs a global `tracing` subscriber matching this config.
	///
	/// `RUST_LOG` directives, when present, take precedence over [`LogConfig::level`]. Fails with
	/// [`ConfigError::LoggerInstall`](crate::error::ConfigError::LoggerInstall) if a global
	/// subscriber is already set.
	#[cfg(feature = "tracing")]
	pub fn install(self) -> Result<()> {
		// crates.io
		use tracing_subscriber::{EnvFilter, fmt};
		// self
		use crate::error::ConfigError;

		let filter = EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));
		let builder = fmt().with_env_filter(filter).with_thread_names(true);

		match self.mode {
			LogMode::Production => builder.json().try_init(),
			LogMode::Development => builder.compact().with_ansi(true).try_init(),
		}
		.map_err(|e| ConfigError::LoggerInstall { source: e })?;

		tracing::info!(mode = ?self.mode, level = self.level.as_str(), "logger installed");

		Ok(())
	}

	/// Without the `tracing` feature there is nothing to install.
	#[cfg(not(feature = "tracing"))]
	pub fn install(self) -> Result<()> {
		let _ = self;

		Ok(())
	}
}
impl Default for LogConfig {
	fn default() -> Self {
		Self::new(LogMode::Production)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	#[cfg(feature = "tracing")] use crate::error::ConfigError;

	fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
		move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v).to_owned())
	}

	#[test]
	fn app_env_selects_mode_and_default_level() {
		assert_eq!(
			LogConfig::from_lookup(lookup(&[("APP_ENV", "prod")])),
			LogConfig { mode: LogMode::Production, level: LogLevel::Info }
		);
		assert_eq!(
			LogConfig::from_lookup(lookup(&[("APP_ENV", "production")])).mode,
			LogMode::Production
		);
		assert_eq!(
			LogConfig::from_lookup(lookup(&[("APP_ENV", "local")])),
			LogConfig { mode: LogMode::Development, level: LogLevel::Debug }
		);
		assert_eq!(LogConfig::from_lookup(lookup(&[])), LogConfig::default());
	}

	#[test]
	fn log_level_overrides_and_falls_back() {
		let config =
			LogConfig::from_lookup(lookup(&[("APP_ENV", "dev"), ("LOG_LEVEL", "warn")]));

		assert_eq!(config.level, LogLevel::Warn);

		let config = LogConfig::from_lookup(lookup(&[("LOG_LEVEL", "verbose")]));

		assert_eq!(config.level, LogLevel::Info);
	}

	#[cfg(feature = "tracing")]
	#[test]
	fn second_install_is_a_config_error() {
		let config = LogConfig::new(LogMode::Development).with_level(LogLevel::Error);
		// The first install may race other tests in this binary; only the second must fail.
		let _ = config.install();
		let err = config.install().expect_err("A global subscriber is already set.");

		assert!(matches!(err, Error::Config(ConfigError::LoggerInstall { .. })));
		assert_eq!(err.to_string(), "Logger could not be installed.");
	}
}
