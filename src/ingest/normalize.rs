use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::analyzers::TrackEnricher;
use crate::ingest::parser::RawRow;
use crate::models::{Track, UniqueTrackSet};

/// Header aliases for each logical column, matched case-sensitively.
/// Ordered by preference; the first present, non-empty match wins.
pub const ID_COLUMNS: &[&str] = &["Track ID", "Track URI", "id"];
pub const NAME_COLUMNS: &[&str] = &["Track Name", "Name", "Title"];
pub const ARTIST_COLUMNS: &[&str] = &["Artist Name(s)", "Artist Name", "Artist"];
const GENRE_COLUMNS: &[&str] = &["Genres", "Genre", "Artist Genres"];
const POPULARITY_COLUMNS: &[&str] = &["Popularity"];
const DANCEABILITY_COLUMNS: &[&str] = &["Danceability"];
const ENERGY_COLUMNS: &[&str] = &["Energy"];
const VALENCE_COLUMNS: &[&str] = &["Valence"];
const ACOUSTICNESS_COLUMNS: &[&str] = &["Acousticness"];
const INSTRUMENTALNESS_COLUMNS: &[&str] = &["Instrumentalness"];
const ADDED_COLUMNS: &[&str] = &["Added At", "Date Added", "Release Date"];

/// Why a row produced no track. Rows rejected here are dropped from
/// aggregation; they are never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    /// Neither an identifier nor a name/artist pair was present.
    MissingIdentity,
}

/// Whether a header carries enough columns to normalize rows at all.
pub fn header_is_usable(header: &[String]) -> bool {
    let has = |aliases: &[&str]| header.iter().any(|h| aliases.contains(&h.as_str()));
    has(ID_COLUMNS) || (has(NAME_COLUMNS) && has(ARTIST_COLUMNS))
}

/// Map one raw row into a canonical track, or state why it cannot be.
pub fn normalize_row(row: &RawRow, source: &str) -> Result<Track, RowRejection> {
    let id_value = lookup(row, ID_COLUMNS);
    let name = lookup(row, NAME_COLUMNS);
    let artist = lookup(row, ARTIST_COLUMNS);

    let id = match (id_value, name, artist) {
        (Some(id), _, _) => id.to_string(),
        (None, Some(name), Some(artist)) => identity_key(name, artist),
        _ => return Err(RowRejection::MissingIdentity),
    };

    Ok(Track {
        id,
        name: name.unwrap_or("Unknown").to_string(),
        artist: artist.unwrap_or("Unknown").to_string(),
        primary_genre: lookup(row, GENRE_COLUMNS).and_then(primary_genre),
        popularity: lookup(row, POPULARITY_COLUMNS).map_or(0, parse_popularity),
        danceability: parse_feature(lookup(row, DANCEABILITY_COLUMNS)),
        energy: parse_feature(lookup(row, ENERGY_COLUMNS)),
        valence: parse_feature(lookup(row, VALENCE_COLUMNS)),
        acousticness: parse_feature(lookup(row, ACOUSTICNESS_COLUMNS)),
        instrumentalness: parse_feature(lookup(row, INSTRUMENTALNESS_COLUMNS)),
        added_at: lookup(row, ADDED_COLUMNS).and_then(parse_added_date),
        source_playlists: vec![source.to_string()],
    })
}

/// Outcome of normalizing one ingestion pass.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub tracks: UniqueTrackSet,
    /// One entry per usable row occurrence with a resolvable date,
    /// duplicates included. Feeds the activity trend.
    pub occurrence_dates: Vec<NaiveDateTime>,
    /// Every row handed in, usable or not.
    pub rows_seen: usize,
    pub rows_rejected: usize,
}

/// Normalize and deduplicate a full pass of provenance-tagged rows.
pub fn normalize_batch<'a, I>(rows: I, enricher: &dyn TrackEnricher) -> NormalizedBatch
where
    I: IntoIterator<Item = (&'a str, &'a RawRow)>,
{
    let mut batch = NormalizedBatch::default();

    for (source, row) in rows {
        batch.rows_seen += 1;
        match normalize_row(row, source) {
            Ok(track) => {
                let track = enricher.enrich(track);
                if let Some(added_at) = track.added_at {
                    batch.occurrence_dates.push(added_at);
                }
                batch.tracks.insert(track);
            }
            Err(reason) => {
                batch.rows_rejected += 1;
                debug!(?reason, source, "dropping row");
            }
        }
    }

    batch
}

fn lookup<'r>(row: &'r RawRow, aliases: &[&str]) -> Option<&'r str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(alias))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn identity_key(name: &str, artist: &str) -> String {
    format!("{}::{}", name.to_lowercase(), artist.to_lowercase())
}

/// First token of the raw genre field before any delimiter.
fn primary_genre(raw: &str) -> Option<String> {
    raw.split(['|', ','])
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

fn parse_popularity(raw: &str) -> u8 {
    raw.parse::<f32>()
        .map(|value| value.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

fn parse_feature(raw: Option<&str>) -> f32 {
    raw.and_then(|value| value.parse::<f32>().ok())
        .map(|value| value.clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// Parse an added/released date, trying the formats the exports are
/// known to use. Unparseable dates resolve to `None`, never an error.
fn parse_added_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    None
}
