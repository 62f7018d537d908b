//! Fixed-size worker pool draining a bounded task queue.
//!
//! A [`WorkerPool`] owns `workers` OS threads and a queue holding at most `2 × workers` pending
//! tasks. [`WorkerPool::submit`] blocks while the queue is full, so fast producers stall instead
//! of growing memory. Lifecycle: [`PoolState::Idle`] until [`WorkerPool::start`], then
//! [`PoolState::Running`], [`PoolState::Draining`] while [`WorkerPool::stop`] waits for queued
//! and in-flight work, and finally [`PoolState::Stopped`].
//!
//! Task failures never reach the submitter. Workers log them, count them, and move on to the
//! next task. A panicking task is caught and treated as a failure.
//!
//! A task may call [`WorkerPool::stop`] or drop the last handle to its own pool. The worker
//! running it is then left out of the join and exits on its own once the task returns.

mod in_flight;

// std
use std::{
	panic::{self, AssertUnwindSafe},
	thread::{self, JoinHandle, ThreadId},
};
// crates.io
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Once;
// self
use crate::{
	_prelude::*,
	error::PoolError,
	obs::{self, PoolSpan, TaskOutcome},
	pool::in_flight::InFlight,
	task::{BoxedTask, Task},
};

/// Worker count used when the caller asks for zero or fewer workers.
pub const DEFAULT_WORKERS: usize = 10;
/// Name given to pools that were not named explicitly.
pub const DEFAULT_POOL_NAME: &str = "wbi-pool";

/// Sizing and naming for a [`WorkerPool`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PoolConfigRepr")]
pub struct PoolConfig {
	workers: usize,
	name: String,
	stack_size: Option<usize>,
}
impl PoolConfig {
	/// Creates a config for `workers` threads; values `<= 0` fall back to [`DEFAULT_WORKERS`].
	pub fn new(workers: isize) -> Self {
		let workers = usize::try_from(workers).ok().filter(|n| *n > 0).unwrap_or(DEFAULT_WORKERS);

		Self { workers, name: DEFAULT_POOL_NAME.into(), stack_size: None }
	}

	/// Names the pool; worker threads are called `{name}-{index}`.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();

		self
	}

	/// Sets the stack size, in bytes, of every worker thread; `None` keeps the platform default.
	pub fn with_stack_size(mut self, stack_size: impl Into<Option<usize>>) -> Self {
		self.stack_size = stack_size.into();

		self
	}

	/// Returns the number of worker threads.
	pub fn workers(&self) -> usize {
		self.workers
	}

	/// Returns the pool name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the configured worker stack size.
	pub fn stack_size(&self) -> Option<usize> {
		self.stack_size
	}

	/// Returns the queue capacity, always twice the worker count.
	pub fn queue_capacity(&self) -> usize {
		self.workers * 2
	}
}
impl Default for PoolConfig {
	fn default() -> Self {
		Self::new(0)
	}
}

#[derive(Deserialize)]
struct PoolConfigRepr {
	#[serde(default)]
	workers: i64,
	#[serde(default)]
	name: Option<String>,
	#[serde(default)]
	stack_size: Option<usize>,
}
impl From<PoolConfigRepr> for PoolConfig {
	fn from(repr: PoolConfigRepr) -> Self {
		let config =
			Self::new(isize::try_from(repr.workers).unwrap_or(0)).with_stack_size(repr.stack_size);

		match repr.name {
			Some(name) if !name.is_empty() => config.with_name(name),
			_ => config,
		}
	}
}

/// Lifecycle phase of a [`WorkerPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolState {
	/// Created; no workers spawned yet.
	Idle,
	/// Workers are draining the queue.
	Running,
	/// `stop` closed the queue and waits for outstanding work.
	Draining,
	/// Every worker exited.
	Stopped,
}
impl PoolState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PoolState::Idle => "idle",
			PoolState::Running => "running",
			PoolState::Draining => "draining",
			PoolState::Stopped => "stopped",
		}
	}
}
impl Display for PoolState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Bounded pool of persistent worker threads.
///
/// All methods take `&self`; wrap the pool in an [`Arc`] to submit from several threads.
/// Dropping the pool performs [`WorkerPool::stop`].
pub struct WorkerPool {
	config: PoolConfig,
	sender: RwLock<Option<Sender<BoxedTask>>>,
	receiver: Receiver<BoxedTask>,
	start_once: Once,
	workers: Mutex<Vec<JoinHandle<()>>>,
	worker_ids: RwLock<Vec<ThreadId>>,
	in_flight: Arc<InFlight>,
	state: Mutex<PoolState>,
}
impl WorkerPool {
	/// Creates an idle pool with `workers` threads (`<= 0` selects [`DEFAULT_WORKERS`]).
	pub fn new(workers: isize) -> Self {
		Self::with_config(PoolConfig::new(workers))
	}

	/// Creates an idle pool from an explicit config.
	pub fn with_config(config: PoolConfig) -> Self {
		let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity());

		Self {
			config,
			sender: RwLock::new(Some(sender)),
			receiver,
			start_once: Once::new(),
			workers: Mutex::new(Vec::new()),
			worker_ids: RwLock::new(Vec::new()),
			in_flight: Default::default(),
			state: Mutex::new(PoolState::Idle),
		}
	}

	/// Returns the configured worker count.
	pub fn worker_count(&self) -> usize {
		self.config.workers()
	}

	/// Returns the capacity of the pending-task queue.
	pub fn queue_capacity(&self) -> usize {
		self.receiver.capacity().unwrap_or_else(|| self.config.queue_capacity())
	}

	/// Returns the current lifecycle phase.
	pub fn state(&self) -> PoolState {
		*self.state.lock()
	}

	/// Returns the number of submitted tasks that have not finished yet.
	pub fn in_flight(&self) -> usize {
		self.in_flight.current()
	}

	/// Spawns the worker threads.
	///
	/// Only the first call has an effect; later calls (including calls after
	/// [`stop`](Self::stop)) return `Ok(())` without spawning anything.
	///
	/// If a worker cannot be spawned the queue is closed and the pool ends up
	/// [`PoolState::Stopped`]. Workers spawned before the failure drain what is queued;
	/// [`stop`](Self::stop) (or dropping the pool) joins them and runs any leftovers inline.
	pub fn start(&self) -> Result<()> {
		let mut result = Ok(());

		self.start_once.call_once(|| result = self.spawn_workers());

		result.map_err(Error::from)
	}

	fn spawn_workers(&self) -> Result<(), PoolError> {
		let mut workers = self.workers.lock();
		let mut worker_ids = self.worker_ids.write();

		self.set_state(PoolState::Running);

		for index in 0..self.config.workers() {
			let receiver = self.receiver.clone();
			let in_flight = self.in_flight.clone();
			let span = PoolSpan::worker(self.config.name(), index);
			let mut builder = thread::Builder::new().name(format!("{}-{index}", self.config.name()));

			if let Some(stack_size) = self.config.stack_size() {
				builder = builder.stack_size(stack_size);
			}

			match builder.spawn(move || run_worker(receiver, in_flight, span)) {
				Ok(handle) => {
					worker_ids.push(handle.thread().id());
					workers.push(handle);
				},
				Err(source) => {
					self.close();
					self.set_state(PoolState::Stopped);

					return Err(PoolError::Spawn { source });
				},
			}
		}

		Ok(())
	}

	/// Enqueues a task.
	///
	/// Blocks while the queue is full. Tasks submitted before [`start`](Self::start) wait in the
	/// queue. Fails with [`PoolError::Closed`] once [`stop`](Self::stop) has begun; the task is
	/// dropped without running.
	pub fn submit<T>(&self, task: T) -> Result<(), PoolError>
	where
		T: Task,
	{
		self.submit_boxed(Box::new(task))
	}

	/// Enqueues an already boxed task.
	pub fn submit_boxed(&self, task: BoxedTask) -> Result<(), PoolError> {
		let Some(sender) = self.sender.read().clone() else {
			return Err(PoolError::Closed);
		};

		self.in_flight.add();

		if sender.send(task).is_err() {
			self.in_flight.done();

			return Err(PoolError::Closed);
		}

		Ok(())
	}

	/// Blocks until every task submitted so far has finished.
	///
	/// The pool stays open. Tasks submitted concurrently with the wait are also waited for. With
	/// no worker to run queued tasks (never started, or every spawn failed) this blocks until
	/// [`start`](Self::start) or [`stop`](Self::stop) runs them.
	pub fn wait(&self) {
		self.in_flight.wait();
	}

	/// Drain barrier: [`wait`](Self::wait), then run `callback` on the calling thread.
	pub fn wait_with_callback<F>(&self, callback: F)
	where
		F: FnOnce(),
	{
		self.wait();

		callback();
	}

	/// Closes the queue and blocks until every queued and in-flight task has finished and all
	/// workers have exited.
	///
	/// Idempotent; concurrent callers all return after shutdown completes. If the pool was never
	/// started, queued tasks run on the calling thread.
	///
	/// Called from inside a task, the calling worker is not joined: it finishes the current task
	/// after `stop` returns. If another thread is already stopping the pool, the call only closes
	/// the queue and returns, leaving the join to that thread.
	pub fn stop(&self) {
		// Claims the start guard so no worker can be spawned from here on.
		self.start_once.call_once(|| {});

		let current = thread::current().id();
		let on_worker = self.worker_ids.read().contains(&current);
		let mut workers = if on_worker {
			match self.workers.try_lock() {
				Some(workers) => workers,
				None => {
					self.close();

					return;
				},
			}
		} else {
			self.workers.lock()
		};

		self.close();

		for handle in workers.drain(..) {
			if handle.thread().id() != current {
				let _ = handle.join();
			}
		}
		// Leftovers only exist when no other worker was left to drain the queue.
		for task in self.receiver.iter() {
			execute(task, &self.in_flight);
		}

		self.set_state(PoolState::Stopped);
	}

	/// Drops the pool's sender so no further task can be queued.
	fn close(&self) {
		if self.sender.write().take().is_some() && self.state() == PoolState::Running {
			self.set_state(PoolState::Draining);
		}
	}

	fn set_state(&self, state: PoolState) {
		let mut current = self.state.lock();

		if *current != state {
			*current = state;

			obs::trace_pool_state(self.config.name(), state, self.config.workers());
		}
	}
}
impl Drop for WorkerPool {
	fn drop(&mut self) {
		self.stop();
	}
}
impl Debug for WorkerPool {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("WorkerPool")
			.field("config", &self.config)
			.field("state", &self.state())
			.field("in_flight", &self.in_flight())
			.finish()
	}
}

fn run_worker(receiver: Receiver<BoxedTask>, in_flight: Arc<InFlight>, span: PoolSpan) {
	let _guard = span.entered();

	for task in receiver.iter() {
		execute(task, &in_flight);
	}
}

fn execute(task: BoxedTask, in_flight: &InFlight) {
	let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task.execute())) {
		Ok(Ok(())) => TaskOutcome::Success,
		Ok(Err(e)) => {
			let error: &dyn StdError = &*e;

			obs::trace_task_outcome(TaskOutcome::Failure, Some(error));

			TaskOutcome::Failure
		},
		Err(_) => {
			obs::trace_task_outcome(TaskOutcome::Panic, None);

			TaskOutcome::Panic
		},
	};

	obs::record_task_outcome(outcome);
	in_flight.done();
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn worker_count_normalizes_non_positive_values() {
		for (requested, expected) in [(5, 5), (1, 1), (0, DEFAULT_WORKERS), (-1, DEFAULT_WORKERS)] {
			let pool = WorkerPool::new(requested);

			assert_eq!(pool.worker_count(), expected);
			assert_eq!(pool.queue_capacity(), expected * 2);
			assert_eq!(pool.state(), PoolState::Idle);
		}
	}

	#[test]
	fn config_deserializes_with_defaults() {
		let config: PoolConfig = serde_json::from_str("{\"workers\":-3}")
			.expect("Pool config with negative workers should deserialize.");

		assert_eq!(config.workers(), DEFAULT_WORKERS);
		assert_eq!(config.name(), DEFAULT_POOL_NAME);

		let config: PoolConfig = serde_json::from_str("{\"workers\":4,\"name\":\"pages\"}")
			.expect("Pool config should deserialize.");

		assert_eq!(config, PoolConfig::new(4).with_name("pages"));
		assert_eq!(config.queue_capacity(), 8);
		assert_eq!(config.stack_size(), None);

		let config: PoolConfig = serde_json::from_str("{\"workers\":2,\"stack_size\":262144}")
			.expect("Pool config with a stack size should deserialize.");

		assert_eq!(config.stack_size(), Some(256 * 1024));
	}

	// A petabyte stack cannot be mapped, so the very first spawn fails.
	#[cfg(target_pointer_width = "64")]
	#[test]
	fn failed_spawn_closes_the_pool() {
		let pool = WorkerPool::with_config(PoolConfig::new(2).with_stack_size(1_usize << 50));
		let ran = Arc::new(Mutex::new(0));

		{
			let ran = ran.clone();

			pool.submit(move || -> crate::task::TaskResult {
				*ran.lock() += 1;

				Ok(())
			})
			.expect("Submitting before start should succeed.");
		}

		let err = pool.start().expect_err("Spawning with an unmappable stack should fail.");

		assert!(matches!(err, Error::Pool(PoolError::Spawn { .. })));
		assert_eq!(pool.state(), PoolState::Stopped);
		assert!(matches!(pool.submit(|| -> crate::task::TaskResult { Ok(()) }), Err(PoolError::Closed)));
		assert!(pool.start().is_ok());

		pool.stop();

		assert_eq!(*ran.lock(), 1);
		assert_eq!(pool.in_flight(), 0);
	}

	#[test]
	fn stop_on_unstarted_pool_runs_queued_tasks_inline() {
		let pool = WorkerPool::new(2);
		let ran = Arc::new(Mutex::new(Vec::new()));

		for i in 0..3 {
			let ran = ran.clone();

			pool.submit(move || -> crate::task::TaskResult {
				ran.lock().push(i);

				Ok(())
			})
			.expect("Submitting to an open pool should succeed.");
		}

		pool.stop();

		assert_eq!(*ran.lock(), vec![0, 1, 2]);
		assert_eq!(pool.state(), PoolState::Stopped);
		assert_eq!(pool.in_flight(), 0);
		assert!(pool.start().is_ok());

		let rejected = pool.submit(|| -> crate::task::TaskResult { Ok(()) });

		assert!(matches!(rejected, Err(PoolError::Closed)));
	}
}
