use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical track record produced by normalization.
///
/// Field values are typed and clamped into their declared domains; raw
/// export rows that cannot produce one of these are dropped upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    /// First token of the raw genre field, split on `|` or `,`.
    /// `None` when the genre field is empty or missing.
    pub primary_genre: Option<String>,
    /// 0-100, defaults to 0 when absent or unparseable.
    pub popularity: u8,
    pub danceability: f32,
    pub energy: f32,
    pub valence: f32,
    pub acousticness: f32,
    pub instrumentalness: f32,
    /// Absent when the date field was missing or unparseable.
    pub added_at: Option<NaiveDateTime>,
    /// Every source file this track was sighted in. Provenance only,
    /// never used in scoring.
    pub source_playlists: Vec<String>,
}

/// Tracks deduplicated by identity key.
///
/// Backed by a `BTreeMap` so iteration order is the sorted id order,
/// independent of the order rows arrived in. All downstream aggregates
/// iterate this order, which keeps their results bit-identical across
/// ingestion orderings.
#[derive(Debug, Default)]
pub struct UniqueTrackSet {
    tracks: BTreeMap<String, Track>,
}

impl UniqueTrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a track, applying the duplicate merge policy: the
    /// first-seen field values are retained, `added_at` becomes the
    /// earliest across sightings, and provenance is unioned.
    pub fn insert(&mut self, track: Track) {
        match self.tracks.get_mut(&track.id) {
            Some(existing) => {
                existing.added_at = match (existing.added_at, track.added_at) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                for source in track.source_playlists {
                    if !existing.source_playlists.contains(&source) {
                        existing.source_playlists.push(source);
                    }
                }
            }
            None => {
                self.tracks.insert(track.id.clone(), track);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Sorted identity keys, the input to the content hash.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// One genre with its unique-track vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// One `YYYY-MM` bucket of a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RareTrack {
    pub name: String,
    pub artist: String,
    pub pop: u8,
}

/// Mean audio-feature values across the unique track set.
/// All components are zero when the set is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteVector {
    pub avg_danceability: f32,
    pub avg_energy: f32,
    pub avg_valence: f32,
    pub acoustic_bias: f32,
    pub instrumental_bias: f32,
}

/// Composite playlist scores, each normalized to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRating {
    pub variety: f32,
    pub rarity_score: f32,
    pub cohesion: f32,
    pub overall: f32,
    pub creativity: f32,
}

/// Earliest/latest resolvable added date across unique tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsMeta {
    /// md5 hex digest over the sorted, deduplicated track identities.
    pub hash: String,
    /// Every parsed row handed to normalization, before dedup and
    /// per-row filtering.
    pub rows: usize,
    pub window: Window,
}

/// The final immutable aggregate for one profile computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub top_unique_genres: Vec<GenreCount>,
    pub discovery_trend: Vec<TrendPoint>,
    pub activity_trend: Vec<TrendPoint>,
    pub rare_tracks: Vec<RareTrack>,
    pub taste: TasteVector,
    pub playlist_rater: PlaylistRating,
    pub meta: StatsMeta,
}
