// End-to-end tests for the ingestion -> normalization -> aggregation
// pipeline, run against real files in temporary directories.

use std::fs;
use std::path::Path;

use crate::analyzers::PassthroughEnricher;
use crate::error::StatsError;
use crate::models::{GenreCount, Stats};
use crate::profile::{ComputeOptions, compute};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HEADER: &str =
        "Track ID,Track Name,Artist Name(s),Genres,Popularity,Danceability,Energy,Valence,\
         Acousticness,Instrumentalness,Added At\n";

    fn write_source(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("{HEADER}{body}")).unwrap();
    }

    fn compute_dir(dir: &Path) -> Result<Stats, StatsError> {
        compute(dir, &ComputeOptions::default(), &PassthroughEnricher)
    }

    fn genre(genre: &str, count: usize) -> GenreCount {
        GenreCount {
            genre: genre.to_string(),
            count,
        }
    }

    #[test]
    fn two_file_scenario_dedups_genre_counts() {
        let dir = tempdir().unwrap();
        write_source(
            dir.path(),
            "chill.csv",
            "id-1,Slow One,Horns,Jazz,12,0.3,0.2,0.4,0.8,0.6,2023-01-10\n\
             id-2,Slower One,Horns,Jazz,8,0.2,0.1,0.3,0.9,0.7,2023-01-11\n\
             id-3,Tape Hiss,Dusty,Lo-fi,3,0.4,0.2,0.5,0.7,0.8,2023-02-01\n",
        );
        // id-1 reappears here tagged Pop; dedup keeps its first-seen
        // Jazz vote and it must not count twice.
        write_source(
            dir.path(),
            "hype.csv",
            "id-4,Loud One,Sirens,Pop,95,0.9,0.95,0.8,0.05,0.0,2023-03-05\n\
             id-1,Slow One,Horns,Pop,12,0.3,0.2,0.4,0.8,0.6,2023-03-06\n",
        );

        let stats = compute_dir(dir.path()).unwrap();

        assert_eq!(
            stats.top_unique_genres,
            vec![genre("Jazz", 2), genre("Lo-fi", 1), genre("Pop", 1)]
        );
        assert_eq!(stats.meta.rows, 5);
        // Four unique tracks, all rare enough for the default list.
        assert_eq!(stats.rare_tracks.len(), 4);
        // The duplicate appears at most once.
        let slow_ones = stats
            .rare_tracks
            .iter()
            .filter(|t| t.name == "Slow One")
            .count();
        assert_eq!(slow_ones, 1);
        // Discovery: one first-sighting per unique track; activity
        // counts the duplicate sighting too.
        let discovered: usize = stats.discovery_trend.iter().map(|p| p.count).sum();
        let activity: usize = stats.activity_trend.iter().map(|p| p.count).sum();
        assert_eq!(discovered, 4);
        assert_eq!(activity, 5);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let dir = tempdir().unwrap();
        write_source(
            dir.path(),
            "a.csv",
            "id-1,One,X,Jazz,10,0.1,0.2,0.3,0.4,0.5,2023-01-01\n\
             id-2,Two,Y,Pop,90,0.9,0.8,0.7,0.6,0.5,2023-02-01\n",
        );
        write_source(
            dir.path(),
            "b.csv",
            "id-3,Three,Z,Dub,40,0.5,0.5,0.5,0.5,0.5,2023-03-01\n\
             id-1,One,X,Jazz,10,0.1,0.2,0.3,0.4,0.5,2022-12-01\n",
        );

        let first = compute_dir(dir.path()).unwrap();
        let second = compute_dir(dir.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.meta.hash, second.meta.hash);
    }

    #[test]
    fn empty_directory_is_classified_missing_data() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            compute_dir(dir.path()),
            Err(StatsError::NoSourceData { .. })
        ));
    }

    #[test]
    fn headers_without_identity_are_classified_missing_columns() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("export.csv"),
            "Color,Shape\nred,round\nblue,square\n",
        )
        .unwrap();

        assert!(matches!(
            compute_dir(dir.path()),
            Err(StatsError::MissingColumns)
        ));
    }

    #[test]
    fn zero_usable_rows_still_produce_stats() {
        let dir = tempdir().unwrap();
        // Usable header, but every row misses its identifier and gets
        // dropped by the parser's required-key rule.
        write_source(dir.path(), "empty.csv", ",A,B,Pop,1,0,0,0,0,0,\n");

        let stats = compute_dir(dir.path()).unwrap();
        assert!(stats.top_unique_genres.is_empty());
        assert!(stats.rare_tracks.is_empty());
        assert_eq!(stats.playlist_rater.overall, 0.0);
        assert_eq!(stats.meta.rows, 0);
    }

    #[test]
    fn dateless_rows_skip_trends_but_keep_scores() {
        let dir = tempdir().unwrap();
        write_source(
            dir.path(),
            "undated.csv",
            "id-1,One,X,Jazz,10,0.5,0.5,0.5,0.5,0.5,\n\
             id-2,Two,Y,Pop,90,0.5,0.5,0.5,0.5,0.5,not a date\n",
        );

        let stats = compute_dir(dir.path()).unwrap();
        assert!(stats.discovery_trend.is_empty());
        assert!(stats.activity_trend.is_empty());
        assert_eq!(stats.meta.window.start, None);
        // Taste and rating are unaffected by the missing dates.
        assert_eq!(stats.taste.avg_energy, 0.5);
        assert!(stats.playlist_rater.overall > 0.0);
    }

    #[test]
    fn malformed_lines_do_not_abort_a_file() {
        let dir = tempdir().unwrap();
        write_source(
            dir.path(),
            "messy.csv",
            "id-1,One,X,Jazz,10,0.5,0.5,0.5,0.5,0.5,2023-01-01\n\
             \n\
             ,,,,\n\
             id-2,\"Two, The\",Y,Pop,90,0.5,0.5,0.5,0.5,0.5,2023-02-01\n",
        );

        let stats = compute_dir(dir.path()).unwrap();
        assert_eq!(stats.rare_tracks.len(), 2);
        assert_eq!(stats.rare_tracks[1].name, "Two, The");
    }

    #[test]
    fn stats_serialize_with_the_published_field_names() {
        let dir = tempdir().unwrap();
        write_source(
            dir.path(),
            "mix.csv",
            "id-1,One,X,Jazz,10,0.5,0.5,0.5,0.5,0.5,2023-01-01\n",
        );

        let stats = compute_dir(dir.path()).unwrap();
        let value = serde_json::to_value(&stats).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "topUniqueGenres",
            "discoveryTrend",
            "activityTrend",
            "rareTracks",
            "taste",
            "playlistRater",
            "meta",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert!(object["taste"].as_object().unwrap().contains_key("avgDanceability"));
        assert!(
            object["playlistRater"]
                .as_object()
                .unwrap()
                .contains_key("rarityScore")
        );
        assert!(object["meta"].as_object().unwrap().contains_key("window"));
    }
}
