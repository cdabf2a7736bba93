//! Fixed-interval pacing for outbound dispatches.

// crates.io
use tokio::time::Instant;
// self
use crate::_prelude::*;

/// Result of consulting a [`FixedIntervalThrottle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The dispatch may be sent immediately.
	Allow,
	/// The dispatch must wait for the enclosed duration first.
	Delay(StdDuration),
}

/// Enforces a minimum spacing between the terminal outcome of one dispatch and the send of the
/// next. There is no burst allowance: idle time never accumulates credit.
#[derive(Clone, Debug)]
pub struct FixedIntervalThrottle {
	interval: StdDuration,
	last_dispatch: Option<Instant>,
}
impl FixedIntervalThrottle {
	/// Creates a throttle that has not dispatched yet.
	pub fn new(interval: StdDuration) -> Self {
		Self { interval, last_dispatch: None }
	}

	/// Configured minimum spacing.
	pub fn interval(&self) -> StdDuration {
		self.interval
	}

	/// Instant recorded by the most recent [`FixedIntervalThrottle::record`].
	pub fn last_dispatch(&self) -> Option<Instant> {
		self.last_dispatch
	}

	/// Computes `max(0, interval - (now - last_dispatch))`.
	pub fn evaluate(&self, now: Instant) -> RateLimitDecision {
		let Some(last) = self.last_dispatch else {
			return RateLimitDecision::Allow;
		};
		let elapsed = now.saturating_duration_since(last);

		match self.interval.checked_sub(elapsed) {
			Some(delay) if !delay.is_zero() => RateLimitDecision::Delay(delay),
			_ => RateLimitDecision::Allow,
		}
	}

	/// Records the terminal outcome of a dispatch.
	pub fn record(&mut self, at: Instant) {
		self.last_dispatch = Some(at);
	}
}
