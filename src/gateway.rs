//! The request gateway: a throttled, bearer-authenticated dispatcher that refreshes a rejected
//! access credential once per logical call.

pub mod dispatch;
mod metrics;
pub mod refresh;
pub mod session;
pub mod throttle;

pub use dispatch::RetryBudget;
pub use metrics::GatewayMetrics;
pub use throttle::{FixedIntervalThrottle, RateLimitDecision};

// crates.io
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::{CredentialState, Credentials, TokenSecret},
	http::ApiHttpClient,
	service::ServiceDescriptor,
	store::CredentialStore,
	transport::TransportErrorMapper,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport stack.
pub type ReqwestGateway = Gateway<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Serializes outbound API calls against a single service descriptor.
///
/// The gateway owns the HTTP client, the credential store, the in-memory credential pair and
/// the dispatch throttle. Clones share all of that state, so one logical session can be handed
/// to many tasks while the minimum spacing between dispatches stays global.
#[derive(Clone)]
pub struct Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Durable store holding the credential pair.
	pub store: Arc<dyn CredentialStore>,
	/// Service descriptor that defines endpoints, scopes, and pacing.
	pub descriptor: ServiceDescriptor,
	/// Shared in-process counters.
	pub metrics: Arc<GatewayMetrics>,
	credentials: Arc<RwLock<Credentials>>,
	throttle: Arc<Mutex<FixedIntervalThrottle>>,
	dispatch_gate: Arc<AsyncMutex<()>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a gateway that reuses the caller-provided transport + mapper pair.
	///
	/// The gateway starts without credentials; call [`Gateway::restore`] or
	/// [`Gateway::complete_authorization`] before dispatching.
	pub fn with_http_client(
		store: Arc<dyn CredentialStore>,
		descriptor: ServiceDescriptor,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let throttle = FixedIntervalThrottle::new(descriptor.dispatch_interval);

		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			descriptor,
			metrics: Default::default(),
			credentials: Default::default(),
			throttle: Arc::new(Mutex::new(throttle)),
			dispatch_gate: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Current lifecycle state of the access credential.
	pub fn credential_state(&self) -> CredentialState {
		self.credentials.read().state()
	}

	/// Returns `true` when an access credential is available.
	pub fn is_authenticated(&self) -> bool {
		self.credentials.read().access_token().is_some()
	}

	/// Instant at which the most recent dispatch reached a terminal outcome.
	pub fn last_dispatch(&self) -> Option<Instant> {
		self.throttle.lock().last_dispatch()
	}

	/// Resolves an API path against the descriptor's API base URL.
	pub fn api_url(&self, path: &str) -> Result<Url> {
		self.descriptor.api_url(path)
	}

	pub(crate) fn current_access(&self) -> Option<TokenSecret> {
		self.credentials.read().access_token().cloned()
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new gateway for the provided descriptor.
	///
	/// The gateway provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly.
	pub fn new(store: Arc<dyn CredentialStore>, descriptor: ServiceDescriptor) -> Self {
		Self::with_http_client(
			store,
			descriptor,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("descriptor", &self.descriptor)
			.field("credential_state", &self.credential_state())
			.finish()
	}
}
