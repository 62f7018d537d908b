//! Counter of submitted-but-unfinished tasks with a blocking drain wait.

// self
use crate::_prelude::*;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
	count: Mutex<usize>,
	drained: Condvar,
}
impl InFlight {
	pub(crate) fn add(&self) {
		*self.count.lock() += 1;
	}

	pub(crate) fn done(&self) {
		let mut count = self.count.lock();

		*count = count.saturating_sub(1);

		if *count == 0 {
			self.drained.notify_all();
		}
	}

	pub(crate) fn current(&self) -> usize {
		*self.count.lock()
	}

	/// Blocks until the count reaches zero.
	pub(crate) fn wait(&self) {
		let mut count = self.count.lock();

		while *count > 0 {
			self.drained.wait(&mut count);
		}
	}
}
