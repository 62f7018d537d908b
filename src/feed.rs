//! Fetched items and the list helpers applied before presenting them.

pub mod relative_time;

pub use relative_time::*;

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// One item fetched from the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
	/// Platform identifier.
	pub id: String,
	/// Display title.
	pub title: String,
	/// Author or channel name.
	#[serde(default)]
	pub author: String,
	/// Publication instant, carried as unix seconds on the wire.
	#[serde(with = "time::serde::timestamp")]
	pub posted_at: OffsetDateTime,
}
impl FeedItem {
	/// Creates an item.
	pub fn new(id: impl Into<String>, title: impl Into<String>, posted_at: OffsetDateTime) -> Self {
		Self { id: id.into(), title: title.into(), author: String::new(), posted_at }
	}

	/// Sets the author.
	pub fn with_author(mut self, author: impl Into<String>) -> Self {
		self.author = author.into();

		self
	}
}

/// Ordered collection of [`FeedItem`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedList(Vec<FeedItem>);
impl FeedList {
	/// Creates a list from items in any order.
	pub fn new(items: impl IntoIterator<Item = FeedItem>) -> Self {
		Self(items.into_iter().collect())
	}

	/// Orders items newest first; items posted at the same instant keep their relative order.
	pub fn sort_by_newest(mut self) -> Self {
		self.0.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));

		self
	}

	/// Keeps the first `n` items; `n <= 0` keeps everything.
	pub fn limit(mut self, n: isize) -> Self {
		match usize::try_from(n) {
			Ok(n) if n > 0 => self.0.truncate(n),
			_ => {},
		}

		self
	}

	/// Returns the items.
	pub fn into_inner(self) -> Vec<FeedItem> {
		self.0
	}
}
impl Deref for FeedList {
	type Target = [FeedItem];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl FromIterator<FeedItem> for FeedList {
	fn from_iter<I: IntoIterator<Item = FeedItem>>(iter: I) -> Self {
		Self::new(iter)
	}
}
impl Extend<FeedItem> for FeedList {
	fn extend<I: IntoIterator<Item = FeedItem>>(&mut self, iter: I) {
		self.0.extend(iter);
	}
}
