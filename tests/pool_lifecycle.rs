// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	thread,
	time::Duration,
};
// crates.io
use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
// self
use wbi_pool::{
	error::PoolError,
	pool::{PoolState, WorkerPool},
	task::{OutcomeCounter, Reported, TaskResult},
};

fn counting(counter: &Arc<AtomicUsize>, delay: Duration) -> impl FnOnce() -> TaskResult + Send + 'static {
	let counter = counter.clone();

	move || {
		if !delay.is_zero() {
			thread::sleep(delay);
		}

		counter.fetch_add(1, Ordering::SeqCst);

		Ok(())
	}
}

#[test]
fn stop_waits_for_every_submitted_task() {
	let pool = WorkerPool::new(3);
	let executed = Arc::new(AtomicUsize::new(0));

	pool.start().expect("Workers should spawn.");

	for _ in 0..5 {
		pool.submit(counting(&executed, Duration::from_millis(5)))
			.expect("Submitting to a running pool should succeed.");
	}

	pool.stop();

	assert_eq!(executed.load(Ordering::SeqCst), 5);
	assert_eq!(pool.state(), PoolState::Stopped);
	assert_eq!(pool.in_flight(), 0);
}

#[test]
fn concurrency_never_exceeds_worker_count() {
	let pool = WorkerPool::new(10);
	let current = Arc::new(AtomicUsize::new(0));
	let peak = Arc::new(AtomicUsize::new(0));

	pool.start().expect("Workers should spawn.");

	for _ in 0..50 {
		let current = current.clone();
		let peak = peak.clone();

		pool.submit(move || -> TaskResult {
			let now = current.fetch_add(1, Ordering::SeqCst) + 1;

			peak.fetch_max(now, Ordering::SeqCst);
			thread::sleep(Duration::from_millis(10));
			current.fetch_sub(1, Ordering::SeqCst);

			Ok(())
		})
		.expect("Submitting to a running pool should succeed.");
	}

	pool.wait();
	pool.stop();

	let peak = peak.load(Ordering::SeqCst);

	assert!(peak <= 10, "observed {peak} concurrent tasks");
	assert!(peak > 1, "tasks never overlapped");
}

#[test]
fn repeated_start_spawns_workers_once() {
	let pool = WorkerPool::new(3);
	let executed = Arc::new(AtomicUsize::new(0));

	pool.start().expect("First start should spawn workers.");
	pool.start().expect("Second start is a no-op.");
	pool.start().expect("Third start is a no-op.");
	pool.submit(counting(&executed, Duration::ZERO)).expect("Submitting should succeed.");
	pool.stop();

	assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_task_does_not_block_siblings() {
	let pool = WorkerPool::new(2);
	let counter = Arc::new(OutcomeCounter::default());

	pool.start().expect("Workers should spawn.");
	pool.submit(Reported::new(|| -> TaskResult { Err("mock error".into()) }, counter.clone()))
		.expect("Submitting the failing task should succeed.");
	pool.submit(Reported::new(|| -> TaskResult { Ok(()) }, counter.clone()))
		.expect("Submitting the succeeding task should succeed.");
	pool.stop();

	assert_eq!(counter.failures(), 1);
	assert_eq!(counter.successes(), 1);
}

#[test]
fn panicking_task_keeps_the_worker_alive() {
	let pool = WorkerPool::new(1);
	let executed = Arc::new(AtomicUsize::new(0));

	pool.start().expect("Workers should spawn.");
	pool.submit(|| -> TaskResult { panic!("task exploded") })
		.expect("Submitting the panicking task should succeed.");
	pool.submit(counting(&executed, Duration::ZERO)).expect("Submitting should succeed.");
	pool.wait();

	assert_eq!(executed.load(Ordering::SeqCst), 1);

	pool.stop();
}

#[test]
fn wait_with_callback_runs_after_prior_tasks() {
	let pool = WorkerPool::new(2);
	let executed = Arc::new(AtomicUsize::new(0));
	let observed = Mutex::new(None);

	pool.start().expect("Workers should spawn.");

	for _ in 0..3 {
		pool.submit(counting(&executed, Duration::from_millis(10)))
			.expect("Submitting should succeed.");
	}

	pool.wait_with_callback(|| *observed.lock() = Some(executed.load(Ordering::SeqCst)));

	assert_eq!(*observed.lock(), Some(3));
	assert_eq!(pool.state(), PoolState::Running);

	// The pool stays usable after the barrier.
	pool.submit(counting(&executed, Duration::ZERO)).expect("Pool should still accept tasks.");
	pool.stop();

	assert_eq!(executed.load(Ordering::SeqCst), 4);
}

#[test]
fn full_queue_applies_backpressure() {
	let pool = Arc::new(WorkerPool::new(1));
	let executed = Arc::new(AtomicUsize::new(0));
	let gate = Arc::new(Mutex::new(()));
	let held = gate.lock();

	pool.start().expect("Workers should spawn.");

	// One task occupies the worker, two fill the queue.
	for _ in 0..3 {
		let gate = gate.clone();
		let executed = executed.clone();

		pool.submit(move || -> TaskResult {
			drop(gate.lock());
			executed.fetch_add(1, Ordering::SeqCst);

			Ok(())
		})
		.expect("Submitting within capacity should not block.");
	}

	let submitter = {
		let pool = pool.clone();
		let executed = executed.clone();

		thread::spawn(move || pool.submit(counting(&executed, Duration::ZERO)))
	};

	thread::sleep(Duration::from_millis(50));

	assert!(!submitter.is_finished(), "submit should block while the queue is full");

	drop(held);

	submitter.join().expect("Submitter should not panic.").expect("Blocked submit should succeed.");
	pool.stop();

	assert_eq!(executed.load(Ordering::SeqCst), 4);
}

#[test]
fn submit_after_stop_is_rejected() {
	let pool = WorkerPool::new(2);

	pool.start().expect("Workers should spawn.");
	pool.stop();
	pool.stop();

	let rejected = pool.submit(|| -> TaskResult { Ok(()) });

	assert!(matches!(rejected, Err(PoolError::Closed)));
	assert_eq!(pool.in_flight(), 0);
}

#[test]
fn concurrent_submitters_lose_nothing() {
	let pool = Arc::new(WorkerPool::new(4));
	let executed = Arc::new(AtomicUsize::new(0));

	pool.start().expect("Workers should spawn.");

	let producers: Vec<_> = (0..4)
		.map(|_| {
			let pool = pool.clone();
			let executed = executed.clone();

			thread::spawn(move || {
				for _ in 0..25 {
					pool.submit(counting(&executed, Duration::ZERO))
						.expect("Submitting to a running pool should succeed.");
				}
			})
		})
		.collect();

	for producer in producers {
		producer.join().expect("Producer should not panic.");
	}

	pool.stop();

	assert_eq!(executed.load(Ordering::SeqCst), 100);
}

#[test]
fn stop_from_inside_a_task_completes_shutdown() {
	let pool = Arc::new(WorkerPool::new(1));
	let executed = Arc::new(AtomicUsize::new(0));
	let (go_tx, go_rx) = crossbeam_channel::bounded::<()>(1);
	let (done_tx, done_rx) = crossbeam_channel::bounded(1);

	pool.start().expect("Workers should spawn.");

	{
		let owned = pool.clone();
		let executed = executed.clone();

		pool.submit(move || -> TaskResult {
			go_rx.recv()?;
			owned.stop();
			done_tx.send((owned.state(), executed.load(Ordering::SeqCst)))?;

			Ok(())
		})
		.expect("Submitting the stopping task should succeed.");
	}

	// Queued behind the stopping task on the only worker.
	for _ in 0..2 {
		pool.submit(counting(&executed, Duration::ZERO)).expect("Submitting should succeed.");
	}

	go_tx.send(()).expect("Stopping task should be waiting.");

	let (state, executed_before_return) = done_rx
		.recv_timeout(Duration::from_secs(5))
		.expect("Stopping task should finish instead of failing to join itself.");

	assert_eq!(state, PoolState::Stopped);
	assert_eq!(executed_before_return, 2);
	assert!(matches!(pool.submit(|| -> TaskResult { Ok(()) }), Err(PoolError::Closed)));

	// The outer stop finds nothing left to join.
	pool.stop();

	assert_eq!(pool.state(), PoolState::Stopped);
}

#[test]
fn dropping_the_last_handle_inside_a_task_completes_shutdown() {
	let pool = Arc::new(WorkerPool::new(2));
	let (go_tx, go_rx) = crossbeam_channel::bounded::<()>(1);
	let (done_tx, done_rx) = crossbeam_channel::bounded(1);

	pool.start().expect("Workers should spawn.");

	{
		let owned = pool.clone();

		pool.submit(move || -> TaskResult {
			go_rx.recv()?;
			drop(owned);
			done_tx.send(())?;

			Ok(())
		})
		.expect("Submitting the owning task should succeed.");
	}

	drop(pool);
	go_tx.send(()).expect("Owning task should be waiting.");

	done_rx
		.recv_timeout(Duration::from_secs(5))
		.expect("Task should keep running after dropping the pool.");

	assert!(matches!(
		done_rx.recv_timeout(Duration::from_secs(5)),
		Err(RecvTimeoutError::Disconnected)
	));
}
