//! Observability helpers for the worker pool and the signer.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `wbi_pool.worker` with the `pool` and
//!   `worker` fields, and to install a subscriber through [`LogConfig`].
//! - Enable `metrics` to increment the `wbi_pool_task_total` counter for every finished task,
//!   labeled by `outcome`.

pub mod log;

mod metrics;
mod tracing;

pub use log::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each executed task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
	/// Task returned `Ok`.
	Success,
	/// Task returned an error.
	Failure,
	/// Task panicked; the worker caught it and moved on.
	Panic,
}
impl TaskOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TaskOutcome::Success => "success",
			TaskOutcome::Failure => "failure",
			TaskOutcome::Panic => "panic",
		}
	}
}
impl Display for TaskOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
