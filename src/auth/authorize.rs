//! Implicit-grant authorization redirect helpers.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{CallbackError, ScopeSet},
	service::ServiceDescriptor,
};

const STATE_LEN: usize = 32;

/// Authorization redirect metadata returned by [`build_session`].
///
/// Keep the session until the redirect callback arrives so its `state` can be checked.
#[derive(Clone, Debug)]
pub struct AuthorizationSession {
	/// Scope set requested from the user.
	pub scope: ScopeSet,
	/// Opaque state value that must round-trip via the redirect fragment.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed authorize URL the user agent should navigate to.
	pub authorize_url: Url,
	/// Whether the platform was asked to show the consent dialog again.
	pub show_dialog: bool,
}
impl AuthorizationSession {
	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: Option<&str>) -> Result<(), CallbackError> {
		match returned_state {
			Some(state) if state == self.state => Ok(()),
			_ => Err(CallbackError::StateMismatch),
		}
	}
}

/// Builds the authorize URL for the descriptor with a fresh random `state`.
pub fn build_session(descriptor: &ServiceDescriptor, show_dialog: bool) -> AuthorizationSession {
	let state = random_string(STATE_LEN);
	let authorize_url = build_authorize_url(descriptor, &state, show_dialog);

	AuthorizationSession {
		scope: descriptor.scope.clone(),
		state,
		redirect_uri: descriptor.redirect_uri.clone(),
		authorize_url,
		show_dialog,
	}
}

fn build_authorize_url(descriptor: &ServiceDescriptor, state: &str, show_dialog: bool) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_id", &descriptor.client_id);
	pairs.append_pair("response_type", "token");
	pairs.append_pair("redirect_uri", descriptor.redirect_uri.as_str());

	if !descriptor.scope.is_empty() {
		pairs.append_pair("scope", &descriptor.scope.normalized());
	}

	pairs.append_pair("state", state);

	if show_dialog {
		pairs.append_pair("show_dialog", "true");
	}

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor() -> ServiceDescriptor {
		ServiceDescriptor::builder("client-123")
			.authorization_endpoint(
				Url::parse("https://accounts.example.com/authorize")
					.expect("Authorization endpoint fixture should parse."),
			)
			.api_base(Url::parse("https://api.example.com/").expect("API base should parse."))
			.refresh_endpoint(
				Url::parse("http://localhost:5500/refresh_token")
					.expect("Refresh endpoint fixture should parse."),
			)
			.redirect_uri(
				Url::parse("http://localhost:5500/main.html")
					.expect("Redirect URI fixture should parse."),
			)
			.scope(
				ScopeSet::new(["user-top-read", "playlist-modify-public"])
					.expect("Scope fixture should be valid."),
			)
			.build()
			.expect("Descriptor fixture should build.")
	}

	#[test]
	fn authorize_url_carries_implicit_grant_parameters() {
		let session = build_session(&descriptor(), false);
		let pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

		assert_eq!(session.authorize_url.path(), "/authorize");
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("client-123"));
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("token"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("http://localhost:5500/main.html")
		);
		assert_eq!(
			pairs.get("scope").map(String::as_str),
			Some("playlist-modify-public user-top-read")
		);
		assert_eq!(pairs.get("state"), Some(&session.state));
		assert!(!pairs.contains_key("show_dialog"));
		assert_eq!(session.state.len(), STATE_LEN);
	}

	#[test]
	fn redirect_uri_and_scope_are_percent_encoded() {
		let session = build_session(&descriptor(), true);
		let raw = session.authorize_url.as_str();

		assert!(raw.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5500%2Fmain.html"));
		assert!(raw.contains("scope=playlist-modify-public+user-top-read"));
		assert!(raw.ends_with("show_dialog=true"));
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let session = build_session(&descriptor(), false);

		assert!(session.validate_state(Some(&session.state.clone())).is_ok());
		assert!(matches!(session.validate_state(Some("other")), Err(CallbackError::StateMismatch)));
		assert!(matches!(session.validate_state(None), Err(CallbackError::StateMismatch)));
	}
}
