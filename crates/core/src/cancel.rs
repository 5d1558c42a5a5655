//! Cooperative cancellation shared between a host and in-flight dispatches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Cancellation signal checked by the pipeline between stages.
///
/// Clones share state: the host keeps one handle and passes another into
/// [`execute`](crate::service::CommandService::execute). Cancellation is
/// cooperative, so a stage that is already running finishes its current step
/// before the signal is observed.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
	inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
	flag: AtomicBool,
	notify: Notify,
}

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	/// Signals cancellation and wakes every waiter. Idempotent.
	pub fn cancel(&self) {
		self.inner.flag.store(true, Ordering::SeqCst);
		self.inner.notify.notify_waiters();
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.flag.load(Ordering::SeqCst)
	}

	/// Resolves once cancellation has been signalled.
	///
	/// Registers the waiter before re-checking the flag to prevent a lost
	/// wakeup between the check and the await.
	pub async fn cancelled(&self) {
		loop {
			let notified = self.inner.notify.notified();
			if self.is_cancelled() {
				return;
			}
			notified.await;
		}
	}
}
