use crate::models::{TasteVector, UniqueTrackSet};

/// Arithmetic means of the audio-feature fields over unique tracks.
///
/// An empty set reports zero for every component; division by zero is
/// defined as zero so downstream consumers stay total.
pub fn taste_vector(tracks: &UniqueTrackSet) -> TasteVector {
    if tracks.is_empty() {
        return TasteVector {
            avg_danceability: 0.0,
            avg_energy: 0.0,
            avg_valence: 0.0,
            acoustic_bias: 0.0,
            instrumental_bias: 0.0,
        };
    }

    let mut sums = [0.0f32; 5];
    for track in tracks.iter() {
        sums[0] += track.danceability;
        sums[1] += track.energy;
        sums[2] += track.valence;
        sums[3] += track.acousticness;
        sums[4] += track.instrumentalness;
    }

    let n = tracks.len() as f32;
    TasteVector {
        avg_danceability: sums[0] / n,
        avg_energy: sums[1] / n,
        avg_valence: sums[2] / n,
        acoustic_bias: sums[3] / n,
        instrumental_bias: sums[4] / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use approx::assert_relative_eq;

    fn track(id: &str, danceability: f32, energy: f32, valence: f32) -> Track {
        Track {
            id: id.to_string(),
            name: id.to_string(),
            artist: "Artist".to_string(),
            primary_genre: None,
            popularity: 0,
            danceability,
            energy,
            valence,
            acousticness: 0.4,
            instrumentalness: 0.8,
            added_at: None,
            source_playlists: vec!["test".to_string()],
        }
    }

    #[test]
    fn averages_each_feature() {
        let mut set = UniqueTrackSet::new();
        set.insert(track("a", 0.2, 0.4, 1.0));
        set.insert(track("b", 0.6, 0.8, 0.0));

        let taste = taste_vector(&set);
        assert_relative_eq!(taste.avg_danceability, 0.4);
        assert_relative_eq!(taste.avg_energy, 0.6);
        assert_relative_eq!(taste.avg_valence, 0.5);
        assert_relative_eq!(taste.acoustic_bias, 0.4);
        assert_relative_eq!(taste.instrumental_bias, 0.8);
    }

    #[test]
    fn empty_set_reports_zero() {
        let taste = taste_vector(&UniqueTrackSet::new());
        assert_eq!(taste.avg_danceability, 0.0);
        assert_eq!(taste.instrumental_bias, 0.0);
    }
}
