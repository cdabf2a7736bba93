// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gateway activity.
#[derive(Debug, Default)]
pub struct GatewayMetrics {
	dispatches: AtomicU64,
	throttled: AtomicU64,
	retries: AtomicU64,
	refresh_attempts: AtomicU64,
	refresh_success: AtomicU64,
	refresh_failure: AtomicU64,
}
impl GatewayMetrics {
	/// Returns the number of dispatches that reached the network.
	pub fn dispatches(&self) -> u64 {
		self.dispatches.load(Ordering::Relaxed)
	}

	/// Returns the number of dispatches that had to wait for the throttle.
	pub fn throttled(&self) -> u64 {
		self.throttled.load(Ordering::Relaxed)
	}

	/// Returns the number of post-refresh retries.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the total number of refresh attempts (including singleflight reuses).
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful refreshes.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed refreshes.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_dispatch(&self) {
		self.dispatches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_throttled(&self) {
		self.throttled.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failure.fetch_add(1, Ordering::Relaxed);
	}
}
