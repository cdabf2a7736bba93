//! Credential refresh against the companion backend, with a singleflight guard.
//!
//! The refresh endpoint accepts `{"refresh_token": "..."}` and answers with
//! `{"access_token": "..."}`, optionally rotating the refresh credential. Any failure ends the
//! session: both stored credentials are removed and [`Error::Unauthenticated`] is returned.

// crates.io
use oauth2::http::{HeaderValue, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	gateway::Gateway,
	http::ApiHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan, debug_event},
	request::ApiRequest,
	store::CredentialKey,
	transport::TransportErrorMapper,
};

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
	access_token: TokenSecret,
	#[serde(default)]
	refresh_token: Option<TokenSecret>,
}

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Trades the stored refresh credential for a new access credential.
	///
	/// On success the new access credential (and a rotated refresh credential, if any) is
	/// persisted and installed in memory. On failure both credentials are cleared from the
	/// store and from memory and [`Error::Unauthenticated`] is returned.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		self.refresh_rejected(None).await
	}

	/// Refreshes after `rejected` was refused by the API.
	///
	/// When another caller already replaced `rejected` while this one waited on the guard, the
	/// replacement is reused without contacting the endpoint again.
	pub(crate) async fn refresh_rejected(
		&self,
		rejected: Option<&TokenSecret>,
	) -> Result<TokenSecret> {
		const KIND: OperationKind = OperationKind::Refresh;

		let span = OperationSpan::new(KIND, "refresh");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.metrics.record_refresh_attempt();

				let _singleflight = self.refresh_guard.lock().await;

				if let Some(current) = self.replacement_for(rejected) {
					debug_event!("Reusing access credential refreshed by a concurrent caller.");
					self.metrics.record_refresh_success();

					return Ok(current);
				}

				match self.exchange_refresh_token().await {
					Ok(access) => {
						self.metrics.record_refresh_success();

						Ok(access)
					},
					Err(e) => {
						self.metrics.record_refresh_failure();

						Err(e)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	fn replacement_for(&self, rejected: Option<&TokenSecret>) -> Option<TokenSecret> {
		let rejected = rejected?;
		let credentials = self.credentials.read();
		let current = credentials.access_token()?;

		(current != rejected).then(|| current.clone())
	}

	async fn exchange_refresh_token(&self) -> Result<TokenSecret> {
		let refresh = match self.load_refresh_token().await {
			Ok(Some(refresh)) => refresh,
			Ok(None) => return Err(self.end_session("no refresh credential is stored").await),
			Err(e) => return Err(self.end_session(e.to_string()).await),
		};
		let payload = match self.call_refresh_endpoint(&refresh).await {
			Ok(payload) => payload,
			Err(e) => return Err(self.end_session(e.to_string()).await),
		};
		let access = payload.access_token;
		let rotated = payload.refresh_token.filter(|secret| !secret.expose().is_empty());

		// Memory first: a failed write below must not strand the session on the rejected token.
		self.credentials.write().renew(access.clone(), rotated.clone());

		debug_event!("Access credential refreshed.");

		self.store.set(CredentialKey::AccessToken.as_str(), access.clone()).await?;

		if let Some(rotated) = rotated {
			self.store.set(CredentialKey::RefreshToken.as_str(), rotated).await?;
		}

		Ok(access)
	}

	async fn load_refresh_token(&self) -> Result<Option<TokenSecret>> {
		let stored = self.store.get(CredentialKey::RefreshToken.as_str()).await?;
		let refresh = stored.or_else(|| self.credentials.read().refresh_token().cloned());

		Ok(refresh.filter(|secret| !secret.expose().is_empty()))
	}

	async fn call_refresh_endpoint(&self, refresh: &TokenSecret) -> Result<RefreshResponse> {
		let request = ApiRequest::post(self.descriptor.endpoints.refresh.clone())
			.with_header(ACCEPT, HeaderValue::from_static("application/json"))
			.with_json(&RefreshRequest { refresh_token: refresh.expose() })?;
		let response = self.execute(OperationKind::Refresh, request.to_anonymous_http()?).await?;

		if !response.is_success() {
			return Err(response.into_failure());
		}

		let payload: RefreshResponse = response.json()?;

		if payload.access_token.expose().is_empty() {
			return Err(Error::unauthenticated("refresh endpoint returned an empty access token"));
		}

		Ok(payload)
	}

	/// Clears both credentials everywhere and builds the error returned to the caller.
	async fn end_session(&self, reason: impl Into<String>) -> Error {
		let reason = reason.into();

		debug_event!(reason = %reason, "Refresh failed; clearing stored credentials.");

		for key in [CredentialKey::AccessToken, CredentialKey::RefreshToken] {
			if let Err(_e) = self.store.remove(key.as_str()).await {
				debug_event!(key = %key, error = %_e, "Failed to remove stored credential.");
			}
		}

		self.credentials.write().clear();

		Error::Unauthenticated { reason }
	}
}
