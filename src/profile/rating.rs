use serde::{Deserialize, Serialize};

use crate::models::{PlaylistRating, TasteVector, UniqueTrackSet};
use crate::profile::genres;

/// Weights for the composite scores (each 0.0 to 1.0).
///
/// The exact coefficients are tunables, not contract: creativity must
/// reward both breadth of genre and obscurity of choice, and overall
/// blends all four sub-scores. Weighted sums are normalized by their
/// total weight, so any non-degenerate weighting stays in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingWeights {
    pub creativity_variety: f32,
    pub creativity_rarity: f32,
    pub overall_variety: f32,
    pub overall_cohesion: f32,
    pub overall_rarity: f32,
    pub overall_creativity: f32,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            creativity_variety: 0.5,
            creativity_rarity: 0.5,
            overall_variety: 0.25,
            overall_cohesion: 0.25,
            overall_rarity: 0.25,
            overall_creativity: 0.25,
        }
    }
}

impl RatingWeights {
    /// Load a weight set from a JSON file
    pub fn load_from_file(path: &str) -> Result<RatingWeights, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let weights: RatingWeights = serde_json::from_str(&content)?;
        Ok(weights)
    }
}

/// Derives the five composite scores from the deduplicated track set.
///
/// All scores are pure functions of the set: given the same unique
/// tracks in any ingestion order the results are bit-identical, since
/// every computation walks the set's sorted iteration order.
pub struct PlaylistRater {
    weights: RatingWeights,
}

impl PlaylistRater {
    pub fn new(weights: RatingWeights) -> Self {
        Self { weights }
    }

    pub fn rate(&self, tracks: &UniqueTrackSet, taste: &TasteVector) -> PlaylistRating {
        if tracks.is_empty() {
            return PlaylistRating {
                variety: 0.0,
                rarity_score: 0.0,
                cohesion: 0.0,
                overall: 0.0,
                creativity: 0.0,
            };
        }

        let variety = Self::calculate_variety(tracks);
        let rarity_score = Self::calculate_rarity_score(tracks);
        let cohesion = Self::calculate_cohesion(tracks, taste);
        let creativity = self.calculate_creativity(variety, rarity_score);
        let overall = self.calculate_overall(variety, cohesion, rarity_score, creativity);

        PlaylistRating {
            variety,
            rarity_score,
            cohesion,
            overall,
            creativity,
        }
    }

    /// Distinct-genre count over unique tracks, capped at 1.
    fn calculate_variety(tracks: &UniqueTrackSet) -> f32 {
        let distinct = genres::distinct_genre_count(tracks) as f32;
        (distinct / tracks.len() as f32).min(1.0)
    }

    /// One minus the mean popularity scaled to [0, 1]; higher means
    /// rarer average listening choices.
    fn calculate_rarity_score(tracks: &UniqueTrackSet) -> f32 {
        let total: f32 = tracks.iter().map(|t| t.popularity as f32).sum();
        let mean = total / tracks.len() as f32;
        1.0 - mean / 100.0
    }

    /// Inverse dispersion of the (danceability, energy, valence)
    /// vector. Dispersion is the mean of the per-dimension standard
    /// deviations, normalized by 0.5 — the maximum standard deviation
    /// attainable on [0, 1] — so tightly clustered taste lands near 1
    /// and highly dispersed taste near 0.
    fn calculate_cohesion(tracks: &UniqueTrackSet, taste: &TasteVector) -> f32 {
        let n = tracks.len() as f32;
        let means = [taste.avg_danceability, taste.avg_energy, taste.avg_valence];

        let mut variances = [0.0f32; 3];
        for track in tracks.iter() {
            let values = [track.danceability, track.energy, track.valence];
            for (variance, (value, mean)) in
                variances.iter_mut().zip(values.iter().zip(means.iter()))
            {
                let diff = value - mean;
                *variance += diff * diff;
            }
        }

        let dispersion = variances
            .iter()
            .map(|variance| (variance / n).sqrt())
            .sum::<f32>()
            / 3.0;

        (1.0 - dispersion / 0.5).clamp(0.0, 1.0)
    }

    fn calculate_creativity(&self, variety: f32, rarity_score: f32) -> f32 {
        let weights = &self.weights;
        let total_weight = weights.creativity_variety + weights.creativity_rarity;
        if total_weight <= 0.0 {
            return 0.5; // Neutral score if no weights are set
        }
        (variety * weights.creativity_variety + rarity_score * weights.creativity_rarity)
            / total_weight
    }

    fn calculate_overall(
        &self,
        variety: f32,
        cohesion: f32,
        rarity_score: f32,
        creativity: f32,
    ) -> f32 {
        let weights = &self.weights;
        let total_score = variety * weights.overall_variety
            + cohesion * weights.overall_cohesion
            + rarity_score * weights.overall_rarity
            + creativity * weights.overall_creativity;
        let total_weight = weights.overall_variety
            + weights.overall_cohesion
            + weights.overall_rarity
            + weights.overall_creativity;

        if total_weight > 0.0 {
            total_score / total_weight
        } else {
            0.5 // Neutral score if no weights are set
        }
    }
}
