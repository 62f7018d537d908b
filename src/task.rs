//! The unit of work executed by [`WorkerPool`](crate::pool::WorkerPool).
//!
//! A [`Task`] runs exactly once on exactly one worker and is consumed by doing so. The pool never
//! inspects the outcome beyond logging it; callers that need aggregated results wrap their task
//! in [`Reported`] (see [`sink`]) or record into their own state from inside the task.

pub mod sink;

pub use sink::*;

// self
use crate::_prelude::*;

/// Failure reported by a task.
pub type TaskError = Box<dyn StdError + Send + Sync>;

/// Result returned from [`Task::execute`].
pub type TaskResult = std::result::Result<(), TaskError>;

/// Capability for anything the pool can run.
///
/// The receiver is `Box<Self>` so every task is consumed by its single execution. Any closure
/// `FnOnce() -> TaskResult` that is `Send + 'static` is a task.
pub trait Task
where
	Self: 'static + Send,
{
	/// Runs the task to completion on the calling worker thread.
	fn execute(self: Box<Self>) -> TaskResult;
}
impl<F> Task for F
where
	F: 'static + Send + FnOnce() -> TaskResult,
{
	fn execute(self: Box<Self>) -> TaskResult {
		(*self)()
	}
}

/// Boxed task as stored in the pool queue.
pub type BoxedTask = Box<dyn Task>;

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, ThisError)]
	#[error("Boom.")]
	struct Boom;

	struct Flag(Arc<Mutex<bool>>);
	impl Task for Flag {
		fn execute(self: Box<Self>) -> TaskResult {
			*self.0.lock() = true;

			Err(Box::new(Boom))
		}
	}

	#[test]
	fn closures_and_structs_are_tasks() {
		let ran = Arc::new(Mutex::new(false));
		let closure: BoxedTask = Box::new({
			let ran = ran.clone();

			move || -> TaskResult {
				*ran.lock() = true;

				Ok(())
			}
		});

		assert!(closure.execute().is_ok());
		assert!(*ran.lock());

		let flag = Arc::new(Mutex::new(false));
		let err = Box::new(Flag(flag.clone())).execute().expect_err("Flag task always fails.");

		assert_eq!(err.to_string(), "Boom.");
		assert!(*flag.lock());
	}
}
