use crate::models::{RareTrack, UniqueTrackSet};

pub const DEFAULT_RARE_LIMIT: usize = 10;

/// The `limit` unique tracks with the lowest popularity, ascending,
/// ties broken by track name then artist.
///
/// Missing popularity was coerced to 0 upstream, so absent data sorts
/// first — maximally rare by definition, not an error.
pub fn rare_tracks(tracks: &UniqueTrackSet, limit: usize) -> Vec<RareTrack> {
    let mut ranked: Vec<&crate::models::Track> = tracks.iter().collect();
    ranked.sort_by(|a, b| {
        a.popularity
            .cmp(&b.popularity)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.artist.cmp(&b.artist))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|track| RareTrack {
            name: track.name.clone(),
            artist: track.artist.clone(),
            pop: track.popularity,
        })
        .collect()
}
