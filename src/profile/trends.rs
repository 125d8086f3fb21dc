use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::models::{TrendPoint, UniqueTrackSet};

/// Monthly count of first-time appearances of distinct tracks.
///
/// Each unique track lands in the calendar month of its earliest
/// resolvable sighting, and only there. Tracks without a resolvable
/// date appear in no bucket.
pub fn discovery_trend(tracks: &UniqueTrackSet) -> Vec<TrendPoint> {
    bucket_by_month(tracks.iter().filter_map(|track| track.added_at))
}

/// Monthly count of all row occurrences, duplicate sightings included.
/// Raw listening/adding activity rather than novelty.
pub fn activity_trend(occurrence_dates: &[NaiveDateTime]) -> Vec<TrendPoint> {
    bucket_by_month(occurrence_dates.iter().copied())
}

/// Sparse chronological series: months with zero observations are
/// omitted, not zero-filled.
fn bucket_by_month(dates: impl Iterator<Item = NaiveDateTime>) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for date in dates {
        *buckets.entry(date.format("%Y-%m").to_string()).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(month, count)| TrendPoint { month, count })
        .collect()
}
