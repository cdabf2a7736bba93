//! Lenient payload structs for the platform's Web API.

// self
use crate::_prelude::*;

/// One page of a paged collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page<T> {
	/// Items on this page.
	pub items: Vec<T>,
	/// Total number of items across all pages.
	pub total: u32,
	/// Page size used by the server.
	pub limit: u32,
	/// Offset of the first item.
	pub offset: u32,
	/// URL of the next page, when there is one.
	pub next: Option<String>,
}
impl<T> Default for Page<T> {
	fn default() -> Self {
		Self { items: Vec::new(), total: 0, limit: 0, offset: 0, next: None }
	}
}

/// Image attached to a user, artist, album, or playlist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
	/// Image location.
	pub url: String,
	/// Pixel height, when known.
	pub height: Option<u32>,
	/// Pixel width, when known.
	pub width: Option<u32>,
}

/// Follower count wrapper.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Followers {
	/// Number of followers.
	pub total: u32,
}

/// The authenticated user's profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
	/// Platform user id.
	pub id: String,
	/// Display name, when set.
	pub display_name: Option<String>,
	/// Account email (needs `user-read-email`).
	pub email: Option<String>,
	/// Account country (needs `user-read-private`).
	pub country: Option<String>,
	/// Subscription level.
	pub product: Option<String>,
	/// Follower count.
	pub followers: Followers,
	/// Profile images.
	pub images: Vec<Image>,
}

/// Minimal artist reference embedded in tracks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistRef {
	/// Artist id.
	pub id: String,
	/// Artist name.
	pub name: String,
	/// Artist URI.
	pub uri: String,
}

/// Full artist object as returned by the top-artists endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
	/// Artist id.
	pub id: String,
	/// Artist name.
	pub name: String,
	/// Artist URI.
	pub uri: String,
	/// Genres associated with the artist.
	pub genres: Vec<String>,
	/// Popularity in `0..=100`.
	pub popularity: u32,
	/// Artist images.
	pub images: Vec<Image>,
}

/// Album reference embedded in tracks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
	/// Album id.
	pub id: String,
	/// Album name.
	pub name: String,
	/// Cover images.
	pub images: Vec<Image>,
}

/// Track object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
	/// Track id.
	pub id: String,
	/// Track name.
	pub name: String,
	/// Track URI used when adding it to a playlist.
	pub uri: String,
	/// Credited artists, primary artist first.
	pub artists: Vec<ArtistRef>,
	/// Album the track belongs to.
	pub album: Option<Album>,
	/// Duration in milliseconds.
	pub duration_ms: u64,
	/// Popularity in `0..=100`.
	pub popularity: u32,
}
impl Track {
	/// Name of the primary artist, if any is credited.
	pub fn primary_artist(&self) -> Option<&str> {
		self.artists.first().map(|artist| artist.name.as_str())
	}
}

/// Owner of a playlist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistOwner {
	/// Owner user id.
	pub id: String,
	/// Owner display name.
	pub display_name: Option<String>,
}

/// Track count reference carried by simplified playlists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistTracksRef {
	/// Number of tracks in the playlist.
	pub total: u32,
}

/// Playlist object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
	/// Playlist id.
	pub id: String,
	/// Playlist name.
	pub name: String,
	/// Playlist description.
	pub description: Option<String>,
	/// Whether the playlist is public; `None` when the platform does not say.
	pub public: Option<bool>,
	/// Playlist URI.
	pub uri: String,
	/// Playlist owner.
	pub owner: PlaylistOwner,
	/// Track count reference.
	pub tracks: PlaylistTracksRef,
}

/// Entry of a playlist's track listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistItem {
	/// When the entry was added, as reported by the platform.
	pub added_at: Option<String>,
	/// The track; `None` for removed or unavailable items.
	pub track: Option<Track>,
}

/// Search response restricted to tracks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSearch {
	/// Matching tracks.
	pub tracks: Page<Track>,
}

/// Answer to playlist mutations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotId {
	/// Version identifier of the playlist after the mutation.
	pub snapshot_id: String,
}
