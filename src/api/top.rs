// self
use crate::{
	_prelude::*,
	api::{self, Artist, Page, Track},
	gateway::Gateway,
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the user's top artists (`GET v1/me/top/artists?limit=`).
	pub async fn top_artists(&self, limit: u8) -> Result<Page<Artist>> {
		self.get_json(self.top_url("artists", limit)?).await
	}

	/// Fetches the user's top tracks (`GET v1/me/top/tracks?limit=`).
	pub async fn top_tracks(&self, limit: u8) -> Result<Page<Track>> {
		self.get_json(self.top_url("tracks", limit)?).await
	}

	fn top_url(&self, kind: &str, limit: u8) -> Result<Url> {
		let limit = api::clamp_limit(limit).to_string();

		self.api_endpoint(&["v1", "me", "top", kind], &[("limit", limit.as_str())])
	}
}
