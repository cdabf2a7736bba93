//! Redirect-callback fragment parsing.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Failures raised while turning an authorization redirect into credentials.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CallbackError {
	/// Redirect URL carried no fragment at all.
	#[error("Redirect URL carries no fragment.")]
	MissingFragment,
	/// Fragment did not contain a non-empty `access_token`.
	#[error("Redirect fragment carries no access token.")]
	MissingAccessToken,
	/// Platform reported an authorization error (for example `access_denied`).
	#[error("Authorization was denied: {reason}.")]
	Denied {
		/// Error code returned by the platform.
		reason: String,
	},
	/// Returned `state` does not match the session that started the redirect.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// `expires_in` was present but not a whole number of seconds.
	#[error("The expires_in value `{value}` is not a number of seconds.")]
	InvalidExpiresIn {
		/// Raw value found in the fragment.
		value: String,
	},
}

/// Token parameters delivered in the redirect fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackParams {
	/// Access credential issued by the platform.
	pub access_token: TokenSecret,
	/// Refresh credential, when the redirect carried one.
	pub refresh_token: Option<TokenSecret>,
	/// Returned `state` value.
	pub state: Option<String>,
	/// Token type (normally `Bearer`).
	pub token_type: Option<String>,
	/// Relative lifetime of the access credential.
	pub expires_in: Option<Duration>,
}
impl CallbackParams {
	/// Parses the credentials out of a full redirect URL.
	///
	/// Tokens are only read from the fragment. An `error` parameter in either the query or
	/// the fragment is reported as [`CallbackError::Denied`].
	pub fn from_redirect(url: &Url) -> Result<Self, CallbackError> {
		if let Some((_, reason)) = url.query_pairs().find(|(key, _)| key == "error") {
			return Err(CallbackError::Denied { reason: reason.into_owned() });
		}

		let fragment = url.fragment().ok_or(CallbackError::MissingFragment)?;

		Self::from_fragment(fragment)
	}

	/// Parses a raw fragment (with or without the leading `#`).
	pub fn from_fragment(fragment: &str) -> Result<Self, CallbackError> {
		let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

		if fragment.is_empty() {
			return Err(CallbackError::MissingFragment);
		}

		let mut access_token = None;
		let mut refresh_token = None;
		let mut state = None;
		let mut token_type = None;
		let mut expires_in = None;

		for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
			match key.as_ref() {
				"error" => return Err(CallbackError::Denied { reason: value.into_owned() }),
				"access_token" if !value.is_empty() =>
					access_token = Some(TokenSecret::new(value.into_owned())),
				"refresh_token" if !value.is_empty() =>
					refresh_token = Some(TokenSecret::new(value.into_owned())),
				"state" => state = Some(value.into_owned()),
				"token_type" => token_type = Some(value.into_owned()),
				"expires_in" => {
					let secs = value
						.parse::<i64>()
						.map_err(|_| CallbackError::InvalidExpiresIn { value: value.to_string() })?;

					expires_in = Some(Duration::seconds(secs));
				},
				_ => {},
			}
		}

		Ok(Self {
			access_token: access_token.ok_or(CallbackError::MissingAccessToken)?,
			refresh_token,
			state,
			token_type,
			expires_in,
		})
	}
}
