// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for popup sign-in attempts.
#[derive(Debug, Default)]
pub struct AttemptMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	premature_closes: AtomicU64,
}
impl AttemptMetrics {
	/// Returns the total number of sign-in attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of attempts that resolved with a token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of attempts that failed for any reason.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how many failures were popups closed before completion.
	pub fn premature_closes(&self) -> u64 {
		self.premature_closes.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_premature_close(&self) {
		self.premature_closes.fetch_add(1, Ordering::Relaxed);
	}
}
