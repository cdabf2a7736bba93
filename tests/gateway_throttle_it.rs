#![cfg(feature = "reqwest")]

// std
use std::{
	collections::VecDeque,
	sync::atomic::{AtomicBool, Ordering},
};
// crates.io
use tokio::time::{self, Instant};
// self
use music_gateway::{
	_preludet::*,
	auth::{CredentialState, TokenSecret},
	error::Error,
	gateway::Gateway,
	http::{ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::OperationKind,
	oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{StatusCode, header::AUTHORIZATION},
	},
	request::ApiRequest,
	service::ServiceDescriptor,
	store::{CredentialStore, MemoryStore, StoreError, StoreFuture},
	transport::{self, TransportErrorMapper},
};

const INTERVAL: StdDuration = StdDuration::from_millis(1_000);
/// Scripted status that never answers.
const STALL: u16 = 0;

#[derive(Clone, Debug)]
struct Sent {
	at: Instant,
	path: String,
	authorization: Option<String>,
}

#[derive(Default)]
struct Script {
	api: VecDeque<(u16, &'static str)>,
	refresh: VecDeque<(u16, &'static str)>,
	sent: Vec<Sent>,
}

/// Transport that answers from a script and records when each request left.
#[derive(Clone, Default)]
struct ScriptedClient(Arc<Mutex<Script>>);
impl ScriptedClient {
	fn push_api(&self, status: u16, body: &'static str) {
		self.0.lock().api.push_back((status, body));
	}

	fn push_refresh(&self, status: u16, body: &'static str) {
		self.0.lock().refresh.push_back((status, body));
	}

	fn sent(&self) -> Vec<Sent> {
		self.0.lock().sent.clone()
	}

	fn sent_to(&self, path: &str) -> Vec<Sent> {
		self.sent().into_iter().filter(|sent| sent.path == path).collect()
	}
}
impl ApiHttpClient for ScriptedClient {
	type Handle = ScriptedHandle;
	type TransportError = std::io::Error;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ScriptedHandle { script: self.0.clone(), slot }
	}
}

struct ScriptedHandle {
	script: Arc<Mutex<Script>>,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for ScriptedHandle {
	type Error = HttpClientError<std::io::Error>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let script = self.script.clone();
		let slot = self.slot.clone();

		Box::pin(async move {
			let path = request.uri().path().to_owned();
			let authorization = request
				.headers()
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let (status, body) = {
				let mut script = script.lock();

				script.sent.push(Sent { at: Instant::now(), path: path.clone(), authorization });

				let queue =
					if path == "/refresh_token" { &mut script.refresh } else { &mut script.api };

				queue.pop_front().unwrap_or((200, "{}"))
			};

			if status == STALL {
				std::future::pending::<()>().await;
			}

			slot.store(ResponseMetadata { status: Some(status), retry_after: None });

			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() =
				StatusCode::from_u16(status).expect("Scripted status should be valid.");

			Ok(response)
		})
	}
}

struct ScriptedMapper;
impl TransportErrorMapper<std::io::Error> for ScriptedMapper {
	fn map_transport_error(
		&self,
		_operation: OperationKind,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<std::io::Error>,
	) -> Error {
		transport::map_generic_error(error)
	}
}

/// Memory-backed store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
	inner: MemoryStore,
	fail_writes: AtomicBool,
}
impl CredentialStore for FlakyStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>> {
		self.inner.get(key)
	}

	fn set<'a>(&'a self, key: &'a str, value: TokenSecret) -> StoreFuture<'a, ()> {
		if self.fail_writes.load(Ordering::SeqCst) {
			return Box::pin(async {
				Err::<(), _>(StoreError::Backend { message: "disk full".into() })
			});
		}

		self.inner.set(key, value)
	}

	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>> {
		self.inner.remove(key)
	}
}

fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}

fn descriptor() -> ServiceDescriptor {
	ServiceDescriptor::builder("client-throttle")
		.authorization_endpoint(url("https://accounts.example.com/authorize"))
		.api_base(url("https://api.example.com/"))
		.refresh_endpoint(url("https://app.example.com/refresh_token"))
		.redirect_uri(url("https://app.example.com/callback"))
		.dispatch_interval(INTERVAL)
		.build()
		.expect("Descriptor fixture should build.")
}

async fn gateway(
	signed_in: bool,
) -> (Gateway<ScriptedClient, ScriptedMapper>, ScriptedClient, Arc<MemoryStore>) {
	let client = ScriptedClient::default();
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();

	if signed_in {
		store
			.set("access_token", TokenSecret::new("access-1"))
			.await
			.expect("Seeding the access token should succeed.");
		store
			.set("refresh_token", TokenSecret::new("refresh-1"))
			.await
			.expect("Seeding the refresh token should succeed.");
	}

	let gateway = Gateway::with_http_client(
		store,
		descriptor(),
		Arc::new(client.clone()),
		Arc::new(ScriptedMapper),
	);

	gateway.restore().await.expect("Restoring credentials should succeed.");

	(gateway, client, store_backend)
}

fn me(gateway: &Gateway<ScriptedClient, ScriptedMapper>) -> ApiRequest {
	ApiRequest::get(gateway.api_url("v1/me").expect("API path should join."))
}

#[tokio::test(start_paused = true)]
async fn back_to_back_dispatches_are_spaced_by_the_interval() {
	let (gateway, client, _) = gateway(true).await;

	gateway.dispatch(me(&gateway)).await.expect("First dispatch should succeed.");
	gateway.dispatch(me(&gateway)).await.expect("Second dispatch should succeed.");

	let sent = client.sent();

	assert_eq!(sent.len(), 2);
	assert!(sent[1].at - sent[0].at >= INTERVAL);
	assert_eq!(gateway.metrics.throttled(), 1);
}

#[tokio::test(start_paused = true)]
async fn partial_idle_time_shortens_the_wait() {
	let (gateway, client, _) = gateway(true).await;

	gateway.dispatch(me(&gateway)).await.expect("First dispatch should succeed.");
	time::advance(StdDuration::from_millis(900)).await;

	let before = Instant::now();

	gateway.dispatch(me(&gateway)).await.expect("Second dispatch should succeed.");

	let sent = client.sent();

	assert!(sent[1].at - before >= StdDuration::from_millis(100));
	assert!(sent[1].at - sent[0].at >= INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn idle_time_beyond_the_interval_sends_immediately() {
	let (gateway, client, _) = gateway(true).await;

	gateway.dispatch(me(&gateway)).await.expect("First dispatch should succeed.");
	time::advance(StdDuration::from_secs(5)).await;

	let before = Instant::now();

	gateway.dispatch(me(&gateway)).await.expect("Second dispatch should succeed.");

	assert_eq!(client.sent()[1].at, before);
	assert_eq!(gateway.metrics.throttled(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_dispatches_still_advance_the_timestamp() {
	let (gateway, client, _) = gateway(true).await;

	client.push_api(500, r#"{"error":{"status":500,"message":"Server error"}}"#);

	let err = gateway.dispatch(me(&gateway)).await.expect_err("500 should surface as an error.");

	assert!(matches!(err, Error::RequestFailed { status: 500, .. }));
	assert!(gateway.last_dispatch().is_some());

	gateway.dispatch(me(&gateway)).await.expect("Follow-up dispatch should succeed.");

	let sent = client.sent();

	assert_eq!(sent.len(), 2, "A 500 must not be retried.");
	assert!(sent[1].at - sent[0].at >= INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_spacing_budget() {
	let (gateway, client, _) = gateway(true).await;
	let (a, b, c) = tokio::join!(
		gateway.dispatch(me(&gateway)),
		gateway.dispatch(me(&gateway)),
		gateway.dispatch(me(&gateway)),
	);

	for result in [a, b, c] {
		result.expect("Concurrent dispatch should succeed.");
	}

	let mut instants: Vec<_> = client.sent().into_iter().map(|sent| sent.at).collect();

	instants.sort();

	assert_eq!(instants.len(), 3);

	for pair in instants.windows(2) {
		assert!(pair[1] - pair[0] >= INTERVAL);
	}
}

#[tokio::test(start_paused = true)]
async fn missing_credential_fails_fast_without_touching_the_timestamp() {
	let (gateway, client, _) = gateway(false).await;
	let before = Instant::now();
	let err = gateway.dispatch(me(&gateway)).await.expect_err("Dispatch needs a credential.");

	assert!(matches!(err, Error::Unauthenticated { .. }));
	assert!(err.requires_reauthorization());
	assert_eq!(Instant::now(), before);
	assert!(client.sent().is_empty());
	assert!(gateway.last_dispatch().is_none());
	assert_eq!(gateway.credential_state(), CredentialState::Absent);
}

#[tokio::test(start_paused = true)]
async fn retry_after_refresh_skips_the_second_wait() {
	let (gateway, client, store) = gateway(true).await;

	client.push_api(401, r#"{"error":{"status":401,"message":"The access token expired"}}"#);
	client.push_api(200, r#"{"id":"listener"}"#);
	client.push_refresh(200, r#"{"access_token":"access-2"}"#);

	let response = gateway.dispatch(me(&gateway)).await.expect("Retry should succeed.");

	assert_eq!(response.body(), br#"{"id":"listener"}"#);

	let api = client.sent_to("/v1/me");

	assert_eq!(api.len(), 2);
	assert_eq!(api[0].authorization.as_deref(), Some("Bearer access-1"));
	assert_eq!(api[1].authorization.as_deref(), Some("Bearer access-2"));
	assert_eq!(api[1].at, api[0].at, "The reissue must not wait for the throttle again.");
	assert_eq!(client.sent_to("/refresh_token").len(), 1);
	assert_eq!(store.peek("access_token").map(|s| s.expose().to_owned()), Some("access-2".into()));
	assert_eq!(store.peek("refresh_token").map(|s| s.expose().to_owned()), Some("refresh-1".into()));
	assert_eq!(gateway.credential_state(), CredentialState::Active);
	assert_eq!(gateway.metrics.retries(), 1);
}

#[tokio::test(start_paused = true)]
async fn second_rejection_is_reported_instead_of_looping() {
	let (gateway, client, store) = gateway(true).await;

	client.push_api(401, r#"{"error":{"status":401,"message":"Invalid access token"}}"#);
	client.push_api(401, r#"{"error":{"status":401,"message":"Invalid access token"}}"#);
	client.push_refresh(200, r#"{"access_token":"access-2","refresh_token":"refresh-2"}"#);

	let err = gateway.dispatch(me(&gateway)).await.expect_err("Second 401 should surface.");

	assert!(matches!(
		err,
		Error::RequestFailed { status: 401, ref message, .. } if message == "Invalid access token"
	));
	assert_eq!(client.sent_to("/v1/me").len(), 2);
	assert_eq!(client.sent_to("/refresh_token").len(), 1);
	assert_eq!(gateway.metrics.refresh_successes(), 1);
	assert_eq!(store.peek("access_token").map(|s| s.expose().to_owned()), Some("access-2".into()));
	assert_eq!(
		store.peek("refresh_token").map(|s| s.expose().to_owned()),
		Some("refresh-2".into()),
		"A rotated refresh credential must replace the stored one."
	);
}

#[tokio::test(start_paused = true)]
async fn malformed_refresh_body_ends_the_session() {
	let (gateway, client, store) = gateway(true).await;

	client.push_api(401, r#"{"error":{"status":401,"message":"The access token expired"}}"#);
	client.push_refresh(200, "not json");

	let err = gateway.dispatch(me(&gateway)).await.expect_err("Malformed refresh should fail.");

	assert!(matches!(err, Error::Unauthenticated { .. }));
	assert!(store.is_empty(), "Both credentials must be removed from the store.");
	assert_eq!(gateway.credential_state(), CredentialState::Absent);
	assert_eq!(client.sent_to("/v1/me").len(), 1);
	assert_eq!(client.sent_to("/refresh_token").len(), 1);
	assert_eq!(gateway.metrics.refresh_failures(), 1);
}

#[tokio::test(start_paused = true)]
async fn refreshed_credential_survives_a_failed_store_write() {
	let client = ScriptedClient::default();
	let backend = Arc::new(FlakyStore::default());
	let store: Arc<dyn CredentialStore> = backend.clone();

	store
		.set("access_token", TokenSecret::new("access-1"))
		.await
		.expect("Seeding the access token should succeed.");
	store
		.set("refresh_token", TokenSecret::new("refresh-1"))
		.await
		.expect("Seeding the refresh token should succeed.");

	let gateway = Gateway::with_http_client(
		store,
		descriptor(),
		Arc::new(client.clone()),
		Arc::new(ScriptedMapper),
	);

	gateway.restore().await.expect("Restoring credentials should succeed.");
	backend.fail_writes.store(true, Ordering::SeqCst);
	client.push_api(401, r#"{"error":{"status":401,"message":"The access token expired"}}"#);
	client.push_refresh(200, r#"{"access_token":"access-2"}"#);

	let err = gateway.dispatch(me(&gateway)).await.expect_err("Store failure should surface.");

	assert!(matches!(err, Error::Storage(StoreError::Backend { .. })));
	assert_eq!(gateway.credential_state(), CredentialState::Active);

	gateway.dispatch(me(&gateway)).await.expect("Next dispatch should use the new credential.");

	let api = client.sent_to("/v1/me");

	assert_eq!(api.len(), 2);
	assert_eq!(api[1].authorization.as_deref(), Some("Bearer access-2"));
	assert_eq!(client.sent_to("/refresh_token").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_send_still_counts_against_the_interval() {
	let (gateway, client, _) = gateway(true).await;

	client.push_api(STALL, "");

	let cancelled =
		time::timeout(StdDuration::from_millis(250), gateway.dispatch(me(&gateway))).await;

	assert!(cancelled.is_err(), "The stalled dispatch should time out.");

	let cancelled_at = Instant::now();

	assert_eq!(gateway.last_dispatch(), Some(cancelled_at));

	gateway.dispatch(me(&gateway)).await.expect("Follow-up dispatch should succeed.");

	let sent = client.sent();

	assert_eq!(sent.len(), 2);
	assert!(sent[1].at - cancelled_at >= INTERVAL);
}
