//! Typed wrappers around the platform endpoints the playlist and statistics helpers need.
//!
//! Each helper issues exactly one [`Gateway::dispatch`] and decodes the body into the lenient
//! structs from [`model`]; unknown fields are ignored and optional fields default.

pub mod model;
/// Playlist reads, creation, and track insertion.
pub mod playlists;
/// Current-user profile and playlist listing.
pub mod profile;
/// Track search.
pub mod search;
/// Top artists and tracks for the current user.
pub mod top;

pub use model::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*, error::ConfigError, gateway::Gateway, http::ApiHttpClient, request::ApiRequest,
	transport::TransportErrorMapper,
};

/// Smallest `limit` the platform accepts for paged endpoints.
pub const MIN_PAGE_LIMIT: u8 = 1;
/// Largest `limit` the platform accepts for paged endpoints.
pub const MAX_PAGE_LIMIT: u8 = 50;

/// Clamps a page size into the platform's accepted range.
pub fn clamp_limit(limit: u8) -> u8 {
	limit.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT)
}

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Dispatches `GET url` and decodes the JSON body.
	pub(crate) async fn get_json<T>(&self, url: Url) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.dispatch(ApiRequest::get(url)).await?;

		response.json()
	}

	/// Dispatches `POST url` with a JSON body and decodes the JSON answer.
	pub(crate) async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let request = ApiRequest::post(url).with_json(body)?;
		let response = self.dispatch(request).await?;

		response.json()
	}

	/// Builds an API URL from path segments (each percent-encoded) and query pairs.
	pub(crate) fn api_endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
		let mut endpoint = self.descriptor.endpoints.api.clone();

		endpoint
			.path_segments_mut()
			.map_err(|_| ConfigError::InvalidPath {
				path: segments.join("/"),
				source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
			})?
			.pop_if_empty()
			.extend(segments);

		if !query.is_empty() {
			endpoint.query_pairs_mut().extend_pairs(query);
		}

		Ok(endpoint)
	}
}
