//! Serialized dispatch path: throttle wait, bearer injection, single refresh-and-retry.
//!
//! Every call to [`Gateway::dispatch`] acquires the gateway's dispatch gate and keeps it until
//! the call reaches a terminal outcome, so the spacing enforced by the throttle holds across all
//! concurrent callers sharing the gateway. A 401 from the API triggers exactly one credential
//! refresh followed by exactly one reissue; the reissue does not wait for the throttle again.

// crates.io
use oauth2::{AsyncHttpClient, HttpRequest, http::StatusCode};
use tokio::time::{self, Instant};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	gateway::{FixedIntervalThrottle, Gateway, RateLimitDecision},
	http::{ApiHttpClient, ResponseMetadataSlot},
	obs::{self, OperationKind, OperationOutcome, OperationSpan, debug_event},
	request::{ApiRequest, ApiResponse},
	transport::TransportErrorMapper,
};

/// Remaining reissue allowance for one logical dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryBudget {
	/// The single post-refresh reissue is still available.
	#[default]
	Fresh,
	/// The reissue has been used; a further 401 is surfaced as-is.
	Spent,
}
impl RetryBudget {
	/// Consumes the budget, returning `true` if a reissue was still available.
	pub fn spend(&mut self) -> bool {
		match std::mem::replace(self, RetryBudget::Spent) {
			RetryBudget::Fresh => true,
			RetryBudget::Spent => false,
		}
	}
}

/// Records the last-dispatch instant when dropped, including when the dispatch future is
/// cancelled mid-send.
struct DispatchStamp<'a>(&'a Mutex<FixedIntervalThrottle>);
impl Drop for DispatchStamp<'_> {
	fn drop(&mut self) {
		self.0.lock().record(Instant::now());
	}
}

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends `request` with the current access credential and returns the successful response.
	///
	/// # Errors
	///
	/// - [`Error::Unauthenticated`] when no access credential exists (returned immediately,
	///   without waiting or touching the last-dispatch instant) or when the refresh triggered by
	///   a 401 fails.
	/// - [`Error::RequestFailed`] for any non-2xx outcome after at most one reissue.
	/// - Transport and configuration failures are returned as-is and are never retried.
	pub async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: OperationKind = OperationKind::Dispatch;

		let span = OperationSpan::new(KIND, "dispatch");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.dispatch_serialized(request)).await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, OperationOutcome::Success),
			Err(e) => {
				debug_event!(error = %e, "Dispatch failed.");
				obs::record_outcome(KIND, OperationOutcome::Failure);
			},
		}

		result
	}

	async fn dispatch_serialized(&self, request: ApiRequest) -> Result<ApiResponse> {
		if !self.is_authenticated() {
			return Err(Error::unauthenticated("no access credential is available"));
		}

		let _gate = self.dispatch_gate.lock().await;

		self.wait_for_slot().await;

		// A predecessor's failed refresh may have cleared the session while this call queued.
		let Some(access) = self.current_access() else {
			return Err(Error::unauthenticated("no access credential is available"));
		};

		self.metrics.record_dispatch();

		let _stamp = DispatchStamp(&self.throttle);

		self.send_with_refresh(&request, access).await
	}

	async fn wait_for_slot(&self) {
		let decision = self.throttle.lock().evaluate(Instant::now());

		if let RateLimitDecision::Delay(delay) = decision {
			self.metrics.record_throttled();

			debug_event!(?delay, "Dispatch delayed by the fixed-interval throttle.");

			time::sleep(delay).await;
		}
	}

	async fn send_with_refresh(
		&self,
		request: &ApiRequest,
		access: TokenSecret,
	) -> Result<ApiResponse> {
		let mut budget = RetryBudget::Fresh;
		let mut access = access;

		loop {
			let response =
				self.execute(OperationKind::Dispatch, request.to_http(&access)?).await?;

			if response.is_success() {
				return Ok(response);
			}
			if response.status() == StatusCode::UNAUTHORIZED && budget.spend() {
				debug_event!("Access credential rejected; refreshing once.");

				self.expire_if_current(&access);

				access = self.refresh_rejected(Some(&access)).await?;

				self.metrics.record_retry();

				continue;
			}

			return Err(response.into_failure());
		}
	}

	fn expire_if_current(&self, rejected: &TokenSecret) {
		let mut credentials = self.credentials.write();

		if credentials.access_token() == Some(rejected) {
			credentials.expire();
		}
	}

	/// Executes one wire request through the configured transport.
	pub(crate) async fn execute(
		&self,
		kind: OperationKind,
		request: HttpRequest,
	) -> Result<ApiResponse> {
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());

		match handle.call(request).await {
			Ok(response) => Ok(ApiResponse::from_http(response)),
			Err(e) => Err(self.transport_mapper.map_transport_error(kind, slot.take().as_ref(), e)),
		}
	}
}
