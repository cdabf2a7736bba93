//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<String, TokenSecret>>>;

/// Thread-safe storage backend that keeps values in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Synchronous read used by tests and diagnostics.
	pub fn peek(&self, key: &str) -> Option<TokenSecret> {
		self.0.read().get(key).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, value: TokenSecret) -> StoreFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.to_owned(), value);

			Ok(())
		})
	}

	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(key)) })
	}
}
