// self
use crate::{
	_prelude::*,
	api::{Page, Playlist, PlaylistItem, SnapshotId},
	gateway::Gateway,
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

#[derive(Serialize)]
struct CreatePlaylistBody<'a> {
	name: &'a str,
	description: &'a str,
	public: bool,
}

#[derive(Serialize)]
struct AddTracksBody<'a> {
	uris: &'a [String],
	position: u32,
}

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the first page of a playlist's entries (`GET v1/playlists/{id}/tracks`).
	pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Page<PlaylistItem>> {
		self.get_json(self.api_endpoint(&["v1", "playlists", playlist_id, "tracks"], &[])?).await
	}

	/// Creates an empty playlist owned by `user_id` (`POST v1/users/{id}/playlists`).
	pub async fn create_playlist(
		&self,
		user_id: &str,
		name: &str,
		description: &str,
		public: bool,
	) -> Result<Playlist> {
		let url = self.api_endpoint(&["v1", "users", user_id, "playlists"], &[])?;

		self.post_json(url, &CreatePlaylistBody { name, description, public }).await
	}

	/// Inserts `uris` at the top of a playlist (`POST v1/playlists/{id}/tracks`, `position: 0`).
	///
	/// An empty `uris` slice is a no-op that returns an empty snapshot id without dispatching.
	pub async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<SnapshotId> {
		if uris.is_empty() {
			return Ok(SnapshotId::default());
		}

		let url = self.api_endpoint(&["v1", "playlists", playlist_id, "tracks"], &[])?;

		self.post_json(url, &AddTracksBody { uris, position: 0 }).await
	}
}
