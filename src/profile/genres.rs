use std::collections::BTreeMap;

use crate::models::{GenreCount, UniqueTrackSet};

/// Genre frequency over unique tracks, count descending, ties broken
/// by genre name ascending.
///
/// Each unique track votes exactly once, for its primary genre — not
/// once per playlist occurrence. Tracks with an empty genre field are
/// excluded here but still count in every other statistic.
pub fn top_unique_genres(tracks: &UniqueTrackSet) -> Vec<GenreCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for track in tracks.iter() {
        if let Some(genre) = track.primary_genre.as_deref() {
            *counts.entry(genre).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    // Already name-ascending out of the map; a stable sort on count
    // keeps that order within ties.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// Number of distinct primary genres, the breadth input to the rater.
pub fn distinct_genre_count(tracks: &UniqueTrackSet) -> usize {
    tracks
        .iter()
        .filter_map(|track| track.primary_genre.as_deref())
        .collect::<std::collections::BTreeSet<&str>>()
        .len()
}
