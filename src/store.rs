//! Durable key-value storage contracts and built-in implementations for credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable string key-value store that keeps credentials across restarts.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the value stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>>;

	/// Stores or replaces the value under `key`.
	fn set<'a>(&'a self, key: &'a str, value: TokenSecret) -> StoreFuture<'a, ()>;

	/// Removes the value under `key`, returning the previous value.
	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>>;
}

/// Fixed storage keys used for the credential pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKey {
	/// Key holding the access credential.
	AccessToken,
	/// Key holding the refresh credential.
	RefreshToken,
}
impl CredentialKey {
	/// Returns the storage key string.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialKey::AccessToken => "access_token",
			CredentialKey::RefreshToken => "refresh_token",
		}
	}
}
impl Display for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_gateway_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let gateway_error: Error = store_error.clone().into();

		assert!(matches!(gateway_error, Error::Storage(_)));
		assert!(gateway_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&gateway_error)
			.expect("Gateway error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn credential_keys_are_fixed_strings() {
		assert_eq!(CredentialKey::AccessToken.as_str(), "access_token");
		assert_eq!(CredentialKey::RefreshToken.to_string(), "refresh_token");
	}
}
