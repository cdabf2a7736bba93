//! In-memory credential pair and its lifecycle state machine.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifecycle status of the access credential.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialState {
	/// No access credential exists; the user has to authorize.
	#[default]
	Absent,
	/// An access credential is available for dispatches.
	Active,
	/// The API rejected the access credential and a refresh is pending.
	Expired,
}
impl CredentialState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialState::Absent => "absent",
			CredentialState::Active => "active",
			CredentialState::Expired => "expired",
		}
	}
}
impl Display for CredentialState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access + refresh credential pair tracked by the gateway.
///
/// Transitions:
///
/// - `Absent -> Active` via [`Credentials::activate`] (callback parse or restore).
/// - `Active -> Expired` via [`Credentials::expire`] once the API answers 401.
/// - `Expired -> Active` via [`Credentials::renew`] after a successful refresh.
/// - `* -> Absent` via [`Credentials::clear`] on refresh failure or logout.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
	access: Option<TokenSecret>,
	refresh: Option<TokenSecret>,
	state: CredentialState,
}
impl Credentials {
	/// Current lifecycle state.
	pub fn state(&self) -> CredentialState {
		self.state
	}

	/// Access credential, when one exists.
	pub fn access_token(&self) -> Option<&TokenSecret> {
		self.access.as_ref()
	}

	/// Refresh credential, when one exists.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh.as_ref()
	}

	/// Installs a freshly issued access credential.
	///
	/// A missing `refresh` keeps the previously known refresh credential.
	pub fn activate(&mut self, access: TokenSecret, refresh: Option<TokenSecret>) {
		self.access = Some(access);

		if refresh.is_some() {
			self.refresh = refresh;
		}

		self.state = CredentialState::Active;
	}

	/// Marks the access credential as rejected. No-op unless currently active.
	pub fn expire(&mut self) {
		if self.state == CredentialState::Active {
			self.state = CredentialState::Expired;
		}
	}

	/// Replaces the access credential after a refresh and returns to [`CredentialState::Active`].
	pub fn renew(&mut self, access: TokenSecret, rotated_refresh: Option<TokenSecret>) {
		self.activate(access, rotated_refresh);
	}

	/// Drops both credentials.
	pub fn clear(&mut self) {
		self.access = None;
		self.refresh = None;
		self.state = CredentialState::Absent;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn lifecycle_follows_documented_transitions() {
		let mut credentials = Credentials::default();

		assert_eq!(credentials.state(), CredentialState::Absent);

		credentials.expire();

		assert_eq!(credentials.state(), CredentialState::Absent, "Absent cannot expire.");

		credentials.activate(TokenSecret::new("access-1"), Some(TokenSecret::new("refresh-1")));

		assert_eq!(credentials.state(), CredentialState::Active);

		credentials.expire();

		assert_eq!(credentials.state(), CredentialState::Expired);

		credentials.renew(TokenSecret::new("access-2"), None);

		assert_eq!(credentials.state(), CredentialState::Active);
		assert_eq!(credentials.access_token().map(TokenSecret::expose), Some("access-2"));
		assert_eq!(credentials.refresh_token().map(TokenSecret::expose), Some("refresh-1"));

		credentials.clear();

		assert_eq!(credentials.state(), CredentialState::Absent);
		assert!(credentials.access_token().is_none());
		assert!(credentials.refresh_token().is_none());
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let mut credentials = Credentials::default();

		credentials.activate(TokenSecret::new("visible?"), None);

		assert!(!format!("{credentials:?}").contains("visible?"));
	}
}
