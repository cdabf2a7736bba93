//! Optional observability helpers for gateway operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `music_gateway.operation` with the
//!   `operation` and `stage` fields, plus debug events for throttle waits, refreshes, and
//!   failures.
//! - Enable `metrics` to increment the `music_gateway_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Emits a `tracing::debug!` event when the `tracing` feature is enabled.
macro_rules! debug_event {
	($($arg:tt)*) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::debug!($($arg)*);
		}
	};
}
pub(crate) use debug_event;

/// Operation kinds observed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Throttled, authenticated API call.
	Dispatch,
	/// Credential refresh against the companion backend.
	Refresh,
	/// Authorization redirect construction or callback handling.
	Authorize,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Dispatch => "dispatch",
			OperationKind::Refresh => "refresh",
			OperationKind::Authorize => "authorize",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a gateway operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
