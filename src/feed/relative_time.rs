//! Compact "time ago" labels.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Label used for anything less than a minute old.
pub const JUST_NOW: &str = "just now";

/// Formats instants relative to "now": `just now`, `{n}m`, `{n}h`, `{n}d`, `{n}mo`, `{n}y`.
///
/// Months are 30 days and years 365 days, both floored. Instants in the future read as
/// "just now".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelativeTime {
	just_now: Cow<'static, str>,
}
impl RelativeTime {
	/// Creates a formatter using [`JUST_NOW`].
	pub const fn new() -> Self {
		Self { just_now: Cow::Borrowed(JUST_NOW) }
	}

	/// Replaces the "just now" token, e.g. with a localized string.
	pub fn with_just_now(mut self, token: impl Into<Cow<'static, str>>) -> Self {
		self.just_now = token.into();

		self
	}

	/// Formats `then` relative to the current UTC time.
	pub fn format(&self, then: OffsetDateTime) -> String {
		self.format_at(then, OffsetDateTime::now_utc())
	}

	/// Formats `then` relative to `now`.
	pub fn format_at(&self, then: OffsetDateTime, now: OffsetDateTime) -> String {
		let elapsed = now - then;

		if elapsed < Duration::MINUTE {
			return self.just_now.clone().into_owned();
		}
		if elapsed < Duration::HOUR {
			return format!("{}m", elapsed.whole_minutes());
		}
		if elapsed < Duration::DAY {
			return format!("{}h", elapsed.whole_hours());
		}

		match elapsed.whole_days() {
			days @ ..30 => format!("{days}d"),
			days @ ..365 => format!("{}mo", days / 30),
			days => format!("{}y", days / 365),
		}
	}
}
impl Default for RelativeTime {
	fn default() -> Self {
		Self::new()
	}
}

/// Formats `then` relative to the current UTC time with the default labels.
pub fn relative_time(then: OffsetDateTime) -> String {
	RelativeTime::new().format(then)
}
