//! Optional result-sink capability threaded through tasks.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	task::{Task, TaskError, TaskResult},
};

/// Receives the outcome of every task it is attached to.
pub trait TaskSink
where
	Self: 'static + Send + Sync,
{
	/// Called once, on the worker thread, after the wrapped task finished.
	fn record(&self, outcome: std::result::Result<(), &TaskError>);
}

/// Wraps a task so its outcome is forwarded to a [`TaskSink`] before reaching the pool.
pub struct Reported<T, S>
where
	S: ?Sized,
{
	task: T,
	sink: Arc<S>,
}
impl<T, S> Reported<T, S>
where
	T: Task,
	S: ?Sized + TaskSink,
{
	/// Attaches `sink` to `task`.
	pub fn new(task: T, sink: Arc<S>) -> Self {
		Self { task, sink }
	}
}
impl<T, S> Task for Reported<T, S>
where
	T: Task,
	S: ?Sized + TaskSink,
{
	fn execute(self: Box<Self>) -> TaskResult {
		let Self { task, sink } = *self;
		let result = Box::new(task).execute();

		sink.record(result.as_ref().map(|_| ()));

		result
	}
}
impl<T, S> Debug for Reported<T, S>
where
	S: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Reported(..)")
	}
}

/// Thread-safe success/failure tally.
#[derive(Debug, Default)]
pub struct OutcomeCounter {
	success: AtomicU64,
	failure: AtomicU64,
}
impl OutcomeCounter {
	/// Returns the number of tasks that finished successfully.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of tasks that reported an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of recorded outcomes.
	pub fn total(&self) -> u64 {
		self.successes() + self.failures()
	}
}
impl TaskSink for OutcomeCounter {
	fn record(&self, outcome: std::result::Result<(), &TaskError>) {
		match outcome {
			Ok(()) => self.success.fetch_add(1, Ordering::Relaxed),
			Err(_) => self.failure.fetch_add(1, Ordering::Relaxed),
		};
	}
}
