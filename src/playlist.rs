//! Editable playlist drafts that are reviewed locally before being submitted to the platform.

// self
use crate::{
	_prelude::*,
	api::{Playlist, SnapshotId, Track},
	gateway::Gateway,
	http::ApiHttpClient,
	obs::debug_event,
	transport::TransportErrorMapper,
};

/// Whether a saved playlist is listed on the owner's public profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistVisibility {
	/// Only the owner sees the playlist.
	#[default]
	Private,
	/// The playlist appears on the owner's profile.
	Public,
}
impl PlaylistVisibility {
	/// Returns `true` for [`PlaylistVisibility::Public`].
	pub const fn is_public(self) -> bool {
		matches!(self, PlaylistVisibility::Public)
	}
}
impl From<bool> for PlaylistVisibility {
	fn from(public: bool) -> Self {
		if public { Self::Public } else { Self::Private }
	}
}

/// Result of [`PlaylistDraft::save`].
#[derive(Clone, Debug)]
pub struct SavedPlaylist {
	/// Playlist created on the platform.
	pub playlist: Playlist,
	/// Snapshot after the tracks were inserted; `None` when the draft had no tracks.
	pub snapshot: Option<SnapshotId>,
}

/// Ordered, duplicate-free track selection with playlist metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDraft {
	/// Playlist name.
	pub name: String,
	/// Playlist description.
	pub description: String,
	/// Playlist visibility.
	pub visibility: PlaylistVisibility,
	tracks: Vec<Track>,
}
impl PlaylistDraft {
	/// Description applied unless overridden.
	pub const DEFAULT_DESCRIPTION: &'static str = "Created with SpotifyPlay";
	/// Name used when the caller supplies a blank one.
	pub const DEFAULT_NAME: &'static str = "My Playlist";

	/// Creates an empty private draft.
	pub fn new(name: impl Into<String>) -> Self {
		let name = name.into();
		let name = if name.trim().is_empty() { Self::DEFAULT_NAME.to_owned() } else { name };

		Self {
			name,
			description: Self::DEFAULT_DESCRIPTION.to_owned(),
			visibility: PlaylistVisibility::default(),
			tracks: Vec::new(),
		}
	}

	/// Seeds a draft from the user's top tracks, keeping their order and dropping duplicates.
	pub fn from_top_tracks(name: impl Into<String>, tracks: impl IntoIterator<Item = Track>) -> Self {
		let mut draft = Self::new(name);

		for track in tracks {
			draft.add_track(track);
		}

		draft
	}

	/// Overrides the description.
	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();

		self
	}

	/// Overrides the visibility.
	pub fn with_visibility(mut self, visibility: PlaylistVisibility) -> Self {
		self.visibility = visibility;

		self
	}

	/// Tracks in playlist order.
	pub fn tracks(&self) -> &[Track] {
		&self.tracks
	}

	/// Number of tracks.
	pub fn len(&self) -> usize {
		self.tracks.len()
	}

	/// Returns `true` when the draft has no tracks.
	pub fn is_empty(&self) -> bool {
		self.tracks.is_empty()
	}

	/// Returns `true` if a track with `id` is already in the draft.
	pub fn contains(&self, id: &str) -> bool {
		self.tracks.iter().any(|track| track.id == id)
	}

	/// Appends `track` unless a track with the same id is already present.
	///
	/// Returns `false` when the track was rejected as a duplicate.
	pub fn add_track(&mut self, track: Track) -> bool {
		if self.contains(&track.id) {
			return false;
		}

		self.tracks.push(track);

		true
	}

	/// Removes the track with `id`, returning it when present.
	pub fn remove_track(&mut self, id: &str) -> Option<Track> {
		let index = self.tracks.iter().position(|track| track.id == id)?;

		Some(self.tracks.remove(index))
	}

	/// Track URIs in playlist order.
	pub fn uris(&self) -> Vec<String> {
		self.tracks.iter().map(|track| track.uri.clone()).collect()
	}

	/// Saves the draft for the authenticated user.
	///
	/// Resolves the user id with [`Gateway::current_user`] first, then delegates to
	/// [`PlaylistDraft::save_as`].
	pub async fn save<C, M>(&self, gateway: &Gateway<C, M>) -> Result<SavedPlaylist>
	where
		C: ?Sized + ApiHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let user = gateway.current_user().await?;

		self.save_as(gateway, &user.id).await
	}

	/// Creates the playlist under `user_id`, then inserts the tracks when there are any.
	pub async fn save_as<C, M>(&self, gateway: &Gateway<C, M>, user_id: &str) -> Result<SavedPlaylist>
	where
		C: ?Sized + ApiHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let playlist = gateway
			.create_playlist(user_id, &self.name, &self.description, self.visibility.is_public())
			.await?;
		let snapshot = if self.is_empty() {
			None
		} else {
			Some(gateway.add_tracks(&playlist.id, &self.uris()).await?)
		};

		debug_event!(tracks = self.len(), "Playlist draft saved.");

		Ok(SavedPlaylist { playlist, snapshot })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn track(id: &str) -> Track {
		Track {
			id: id.to_owned(),
			name: format!("Track {id}"),
			uri: format!("spotify:track:{id}"),
			..Default::default()
		}
	}

	#[test]
	fn new_draft_uses_defaults() {
		let draft = PlaylistDraft::new("   ");

		assert_eq!(draft.name, PlaylistDraft::DEFAULT_NAME);
		assert_eq!(draft.description, "Created with SpotifyPlay");
		assert_eq!(draft.visibility, PlaylistVisibility::Private);
		assert!(draft.is_empty());
	}

	#[test]
	fn from_top_tracks_keeps_order_and_drops_duplicates() {
		let draft = PlaylistDraft::from_top_tracks(
			"Favourites",
			[track("a"), track("b"), track("a"), track("c")],
		);

		assert_eq!(draft.uris(), vec!["spotify:track:a", "spotify:track:b", "spotify:track:c"]);
	}

	#[test]
	fn add_and_remove_tracks() {
		let mut draft = PlaylistDraft::new("Mix").with_visibility(true.into());

		assert!(draft.add_track(track("a")));
		assert!(!draft.add_track(track("a")), "Duplicate ids must be rejected.");
		assert!(draft.add_track(track("b")));
		assert!(draft.visibility.is_public());

		let removed = draft.remove_track("a").expect("Track `a` should be removable.");

		assert_eq!(removed.id, "a");
		assert!(draft.remove_track("a").is_none());
		assert_eq!(draft.uris(), vec!["spotify:track:b"]);
	}
}
