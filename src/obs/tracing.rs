// self
use crate::{_prelude::*, obs::TaskOutcome, pool::PoolState};

/// Span carried into a worker thread.
///
/// Spans do not follow a value across `thread::spawn`, so the pool builds one per worker up
/// front and moves it into the thread explicitly.
#[derive(Clone, Debug)]
pub struct PoolSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl PoolSpan {
	/// Creates a new span tagged with the pool name + worker index.
	pub fn worker(pool: &str, worker: usize) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("wbi_pool.worker", pool, worker);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (pool, worker);

			Self {}
		}
	}

	/// Enters the span for the lifetime of the returned guard.
	pub fn entered(self) -> PoolSpanGuard {
		#[cfg(feature = "tracing")]
		{
			PoolSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			PoolSpanGuard {}
		}
	}
}

/// RAII guard returned by [`PoolSpan::entered`].
pub struct PoolSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for PoolSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PoolSpanGuard(..)")
	}
}

/// Logs a pool lifecycle transition.
pub fn trace_pool_state(pool: &str, state: PoolState, workers: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(pool, state = state.as_str(), workers, "worker pool state changed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (pool, state, workers);
	}
}

/// Logs a task that did not finish successfully; successes stay silent.
pub fn trace_task_outcome(outcome: TaskOutcome, error: Option<&dyn StdError>) {
	#[cfg(feature = "tracing")]
	{
		match (outcome, error) {
			(TaskOutcome::Success, _) => {},
			(_, Some(error)) => tracing::warn!(outcome = outcome.as_str(), %error, "task failed"),
			(_, None) => tracing::warn!(outcome = outcome.as_str(), "task failed"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, error);
	}
}
