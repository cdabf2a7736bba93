//! Listening statistics derived from top-artist and top-track pages.

// self
use crate::{
	_prelude::*,
	api::{Artist, Track},
};

/// A genre and how many artists carry it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
	/// Genre label as reported by the platform.
	pub genre: String,
	/// Number of artists tagged with the genre.
	pub count: usize,
}

/// Counts genres across `artists` and keeps the `n` most frequent.
///
/// Ties keep the order in which genres were first seen.
pub fn top_genres(artists: &[Artist], n: usize) -> Vec<GenreCount> {
	let mut counts: Vec<GenreCount> = Vec::new();
	let mut index: HashMap<&str, usize> = HashMap::new();

	for genre in artists.iter().flat_map(|artist| artist.genres.iter()) {
		match index.get(genre.as_str()) {
			Some(&slot) => counts[slot].count += 1,
			None => {
				index.insert(genre.as_str(), counts.len());
				counts.push(GenreCount { genre: genre.clone(), count: 1 });
			},
		}
	}

	// Stable sort keeps first-seen order among equal counts.
	counts.sort_by(|a, b| b.count.cmp(&a.count));
	counts.truncate(n);

	counts
}

/// Summary line shown next to the user's top tracks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListeningSummary {
	/// Number of tracks considered.
	pub total_tracks: usize,
	/// Primary artist of the top track.
	pub favorite_artist: String,
}
impl ListeningSummary {
	/// Label used when no artist can be determined.
	pub const UNKNOWN_ARTIST: &'static str = "Unknown";

	/// Builds the summary from a ranked track list.
	pub fn from_tracks(tracks: &[Track]) -> Self {
		let favorite_artist = tracks
			.first()
			.and_then(Track::primary_artist)
			.filter(|name| !name.is_empty())
			.unwrap_or(Self::UNKNOWN_ARTIST)
			.to_owned();

		Self { total_tracks: tracks.len(), favorite_artist }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::api::ArtistRef;

	fn artist(genres: &[&str]) -> Artist {
		Artist { genres: genres.iter().map(|g| (*g).to_owned()).collect(), ..Default::default() }
	}

	#[test]
	fn genres_rank_by_count_then_first_seen() {
		let artists = [
			artist(&["indie", "rock"]),
			artist(&["pop", "rock"]),
			artist(&["pop", "jazz"]),
			artist(&["indie"]),
		];
		let ranked = top_genres(&artists, 3);
		let labels: Vec<_> = ranked.iter().map(|g| (g.genre.as_str(), g.count)).collect();

		assert_eq!(labels, vec![("indie", 2), ("rock", 2), ("pop", 2)]);
		assert!(top_genres(&[], 5).is_empty());
	}

	#[test]
	fn summary_reports_first_artist_or_unknown() {
		let tracks = [
			Track {
				artists: vec![
					ArtistRef { name: "Röyksopp".into(), ..Default::default() },
					ArtistRef { name: "Robyn".into(), ..Default::default() },
				],
				..Default::default()
			},
			Track::default(),
		];
		let summary = ListeningSummary::from_tracks(&tracks);

		assert_eq!(summary.total_tracks, 2);
		assert_eq!(summary.favorite_artist, "Röyksopp");

		let summary = ListeningSummary::from_tracks(&[Track::default()]);

		assert_eq!(summary.favorite_artist, ListeningSummary::UNKNOWN_ARTIST);
		assert_eq!(ListeningSummary::from_tracks(&[]).total_tracks, 0);
	}
}
