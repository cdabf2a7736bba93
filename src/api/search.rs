// self
use crate::{
	_prelude::*,
	api::{self, Page, Track, TrackSearch},
	gateway::Gateway,
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Searches the catalog for tracks (`GET v1/search?q=..&type=track&limit=`).
	///
	/// A blank query returns an empty page without dispatching.
	pub async fn search_tracks(&self, query: &str, limit: u8) -> Result<Page<Track>> {
		let query = query.trim();

		if query.is_empty() {
			return Ok(Page::default());
		}

		let limit = api::clamp_limit(limit).to_string();
		let url = self.api_endpoint(
			&["v1", "search"],
			&[("q", query), ("type", "track"), ("limit", limit.as_str())],
		)?;
		let search: TrackSearch = self.get_json(url).await?;

		Ok(search.tracks)
	}
}
