// self
use crate::{
	_prelude::*,
	api::{Page, Playlist, UserProfile},
	gateway::Gateway,
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

impl<C, M> Gateway<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the authenticated user's profile (`GET v1/me`).
	pub async fn current_user(&self) -> Result<UserProfile> {
		self.get_json(self.api_endpoint(&["v1", "me"], &[])?).await
	}

	/// Fetches the first page of the authenticated user's playlists (`GET v1/me/playlists`).
	pub async fn user_playlists(&self) -> Result<Page<Playlist>> {
		self.get_json(self.api_endpoint(&["v1", "me", "playlists"], &[])?).await
	}
}
