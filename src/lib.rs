//! Throttled, self-refreshing request gateway for music-streaming Web APIs.
//!
//! [`gateway::Gateway`] owns one serialized dispatch path: it paces calls with a fixed interval,
//! injects the bearer credential, and refreshes a rejected credential once before reissuing the
//! call. Typed API helpers, playlist drafts, and listening statistics sit on top of it.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod playlist;
pub mod request;
pub mod service;
pub mod stats;
pub mod store;
pub mod transport;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		gateway::Gateway,
		http::ReqwestHttpClient,
		service::ServiceDescriptor,
		store::{CredentialStore, MemoryStore},
		transport::ReqwestTransportErrorMapper,
	};

	/// Gateway type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGateway = Gateway<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Constructs a [`Gateway`] backed by an in-memory store and the default reqwest transport.
	pub fn build_reqwest_test_gateway(
		descriptor: ServiceDescriptor,
	) -> (ReqwestTestGateway, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let gateway = Gateway::new(store, descriptor);

		(gateway, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
