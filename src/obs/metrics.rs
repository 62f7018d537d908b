// self
use crate::obs::TaskOutcome;

/// Records a task outcome via the global metrics recorder (when enabled).
pub fn record_task_outcome(outcome: TaskOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("wbi_pool_task_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
