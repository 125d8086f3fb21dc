use std::path::Path;
use std::time::{Duration, Instant};

use crate::analyzers::TrackEnricher;
use crate::error::StatsError;
use crate::ingest::normalize::{NormalizedBatch, normalize_batch};
use crate::ingest::sources::{SourcedRow, ingest_path};
use crate::models::{Stats, StatsMeta, Window};
use crate::profile::rarity::DEFAULT_RARE_LIMIT;
use crate::profile::rating::{PlaylistRater, RatingWeights};
use crate::profile::{genres, rarity, taste, trends};

/// Tunables for one compute invocation.
#[derive(Debug, Clone)]
pub struct ComputeOptions {
    pub rare_limit: usize,
    pub weights: RatingWeights,
    /// Overall deadline; past it the invocation fails rather than
    /// returning a partial result.
    pub timeout: Option<Duration>,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            rare_limit: DEFAULT_RARE_LIMIT,
            weights: RatingWeights::default(),
            timeout: None,
        }
    }
}

/// Compute the full taste profile for a directory of export files or
/// a single consolidated file.
///
/// The single entry point of the pipeline: ingest, normalize and
/// deduplicate, then aggregate. Side-effect-free beyond the read-only
/// file access performed by ingestion.
pub fn compute(
    path: &Path,
    options: &ComputeOptions,
    enricher: &dyn TrackEnricher,
) -> Result<Stats, StatsError> {
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let ingested = ingest_path(path, deadline)?;
    compute_from_rows(&ingested.rows, options, enricher)
}

/// Aggregate rows that have already been ingested.
pub fn compute_from_rows(
    rows: &[SourcedRow],
    options: &ComputeOptions,
    enricher: &dyn TrackEnricher,
) -> Result<Stats, StatsError> {
    let batch = normalize_batch(
        rows.iter().map(|sourced| (sourced.source.as_ref(), &sourced.row)),
        enricher,
    );
    if batch.rows_rejected > 0 {
        tracing::debug!(
            rejected = batch.rows_rejected,
            seen = batch.rows_seen,
            "dropped rows without identity"
        );
    }
    Ok(assemble(&batch, options))
}

fn assemble(batch: &NormalizedBatch, options: &ComputeOptions) -> Stats {
    let tracks = &batch.tracks;

    let taste = taste::taste_vector(tracks);
    let playlist_rater = PlaylistRater::new(options.weights.clone()).rate(tracks, &taste);

    Stats {
        top_unique_genres: genres::top_unique_genres(tracks),
        discovery_trend: trends::discovery_trend(tracks),
        activity_trend: trends::activity_trend(&batch.occurrence_dates),
        rare_tracks: rarity::rare_tracks(tracks, options.rare_limit),
        taste,
        playlist_rater,
        meta: StatsMeta {
            hash: content_hash(tracks.ids()),
            rows: batch.rows_seen,
            window: date_window(tracks),
        },
    }
}

/// Cache key: md5 hex digest over the sorted, deduplicated track
/// identities. Identical sets hash identically regardless of how the
/// rows arrived.
fn content_hash<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let joined = ids.collect::<Vec<&str>>().join("\n");
    format!("{:x}", md5::compute(joined))
}

fn date_window(tracks: &crate::models::UniqueTrackSet) -> Window {
    let mut start = None;
    let mut end = None;
    for added_at in tracks.iter().filter_map(|track| track.added_at) {
        start = Some(start.map_or(added_at, |s: chrono::NaiveDateTime| s.min(added_at)));
        end = Some(end.map_or(added_at, |e: chrono::NaiveDateTime| e.max(added_at)));
    }
    Window { start, end }
}
