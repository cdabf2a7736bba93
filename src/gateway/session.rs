//! Session lifecycle: authorization redirect, callback completion, restore, and logout.

// self
use crate::{
	_prelude::*,
	auth::{self, AuthorizationSession, CallbackParams, CredentialState, TokenSecret},
	gateway::Gateway,
	http::ApiHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan, debug_event},
	store::CredentialKey,
	transport::TransportErrorMapper,
};

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorization redirect for the descriptor.
	///
	/// `show_dialog` overrides the descriptor default when set. Keep the returned session and
	/// pass it to [`Gateway::complete_authorization`] so the `state` round trip is checked.
	pub fn start_authorization(&self, show_dialog: Option<bool>) -> AuthorizationSession {
		let session =
			auth::build_session(&self.descriptor, show_dialog.unwrap_or(self.descriptor.show_dialog));

		obs::record_outcome(OperationKind::Authorize, OperationOutcome::Attempt);
		debug_event!(show_dialog = session.show_dialog, "Authorization redirect prepared.");

		session
	}

	/// Parses the redirect the platform sent the user back to, persists the issued credentials
	/// under the fixed store keys, and activates them.
	///
	/// A previous refresh credential is kept when the redirect carries none.
	pub async fn complete_authorization(
		&self,
		redirect: &Url,
		session: Option<&AuthorizationSession>,
	) -> Result<CredentialState> {
		const KIND: OperationKind = OperationKind::Authorize;

		let span = OperationSpan::new(KIND, "complete_authorization");
		let result = span
			.instrument(async move {
				let params = CallbackParams::from_redirect(redirect)?;

				if let Some(session) = session {
					session.validate_state(params.state.as_deref())?;
				}

				self.install(params.access_token, params.refresh_token).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Loads previously persisted credentials from the store.
	///
	/// Returns [`CredentialState::Active`] when an access credential was found, otherwise
	/// [`CredentialState::Absent`] with the in-memory pair left empty.
	pub async fn restore(&self) -> Result<CredentialState> {
		let access = self
			.store
			.get(CredentialKey::AccessToken.as_str())
			.await?
			.filter(|secret| !secret.expose().is_empty());
		let refresh = self
			.store
			.get(CredentialKey::RefreshToken.as_str())
			.await?
			.filter(|secret| !secret.expose().is_empty());
		let mut credentials = self.credentials.write();

		match access {
			Some(access) => credentials.activate(access, refresh),
			None => credentials.clear(),
		}

		debug_event!(state = %credentials.state(), "Credentials restored from store.");

		Ok(credentials.state())
	}

	/// Removes both credentials from the store and from memory.
	pub async fn logout(&self) -> Result<()> {
		for key in [CredentialKey::AccessToken, CredentialKey::RefreshToken] {
			self.store.remove(key.as_str()).await?;
		}

		self.credentials.write().clear();

		debug_event!("Session cleared.");

		Ok(())
	}

	async fn install(
		&self,
		access: TokenSecret,
		refresh: Option<TokenSecret>,
	) -> Result<CredentialState> {
		self.store.set(CredentialKey::AccessToken.as_str(), access.clone()).await?;

		if let Some(refresh) = &refresh {
			self.store.set(CredentialKey::RefreshToken.as_str(), refresh.clone()).await?;
		}

		let mut credentials = self.credentials.write();

		credentials.activate(access, refresh);

		Ok(credentials.state())
	}
}
