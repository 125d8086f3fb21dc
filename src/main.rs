use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod analyzers;
mod cache;
mod config;
mod error;
mod ingest;
mod models;
mod profile;

#[cfg(test)]
mod pipeline_tests;

use crate::analyzers::PassthroughEnricher;
use crate::cache::StatsCache;
use crate::config::load_config;
use crate::error::StatsError;
use crate::models::Stats;
use crate::profile::{ComputeOptions, RatingWeights, compute};

#[derive(Parser)]
#[command(name = "taste-profiler")]
#[command(about = "Taste profile aggregation for exported playlist listening history")]
#[command(version)]
struct Args {
    /// Directory of per-playlist export files, or a single consolidated file
    path: PathBuf,

    /// Profile name used for the cache key (defaults to the path's base name)
    #[arg(short = 'p', long = "profile")]
    profile: Option<String>,

    /// Path to a rating weights JSON file
    #[arg(short = 'w', long = "weights")]
    weights_file: Option<String>,

    /// Write the stats JSON to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Quiet mode - print only the stats JSON
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Validate that the source path exists before proceeding
    if !args.path.exists() {
        eprintln!("Error: Source path '{}' not found.", args.path.display());
        eprintln!("Please point at a directory of playlist export files or a single export file.");
        return Err(anyhow::anyhow!(
            "Source path '{}' not found",
            args.path.display()
        ));
    }

    // Load configuration from .env
    let config = load_config()?;

    // Load rating weights from JSON file when given
    let weights = match &args.weights_file {
        Some(path) => match RatingWeights::load_from_file(path) {
            Ok(weights) => {
                if !args.quiet {
                    println!("Loaded rating weights from: {path}");
                }
                weights
            }
            Err(e) => {
                eprintln!("Failed to load rating weights: {e}");
                return Err(anyhow::anyhow!("Failed to load rating weights: {}", e));
            }
        },
        None => RatingWeights::default(),
    };

    let profile = args.profile.clone().unwrap_or_else(|| {
        args.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "default".to_string())
    });

    let options = ComputeOptions {
        rare_limit: config.rare_limit,
        weights,
        timeout: config.timeout,
    };

    if !args.quiet {
        println!(
            "Computing taste profile '{profile}' from: {}",
            args.path.display()
        );
    }

    let stats = match compute(&args.path, &options, &PassthroughEnricher) {
        Ok(stats) => stats,
        Err(e) => {
            match &e {
                StatsError::NoSourceData { .. } => {
                    eprintln!("✗ No source data: no readable playlist export files were found.");
                }
                StatsError::MissingColumns => {
                    eprintln!(
                        "✗ Missing columns: the export files carry no track identifier or \
                         name/artist columns."
                    );
                }
                StatsError::Timeout => {
                    eprintln!("✗ Timed out before all export files could be read.");
                }
                StatsError::Unexpected(_) => {
                    eprintln!("✗ Stats computation failed unexpectedly.");
                }
            }
            return Err(e.into());
        }
    };

    // Refresh the cache entry for this profile
    let cache = StatsCache::new(config.cache_dir);
    if cache.load(&profile, &stats.meta.hash).is_none() {
        cache.store(&profile, &stats.meta.hash, &stats);
    }

    if !args.quiet {
        print_summary(&profile, &stats);
    }

    let json = serde_json::to_string_pretty(&stats)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            if !args.quiet {
                println!("\n✓ Wrote stats to {}", path.display());
            }
        }
        None => {
            if args.quiet {
                println!("{json}");
            } else {
                println!("\n=== STATS JSON ===");
                println!("{json}");
            }
        }
    }

    Ok(())
}

fn print_summary(profile: &str, stats: &Stats) {
    println!("\n{profile}");
    println!("{}", "=".repeat(profile.len()));
    println!(
        "Overall Rating: {:.1}/100",
        stats.playlist_rater.overall * 100.0
    );

    println!("\n📊 Profile Details:");
    println!("   Rows: {} | Hash: {}", stats.meta.rows, stats.meta.hash);
    if let (Some(start), Some(end)) = (&stats.meta.window.start, &stats.meta.window.end) {
        println!("   Window: {start} - {end}");
    }

    let top_3: Vec<String> = stats
        .top_unique_genres
        .iter()
        .take(3)
        .map(|g| format!("{} ({})", g.genre, g.count))
        .collect();
    if !top_3.is_empty() {
        println!("   Top Genres: {}", top_3.join(", "));
    }

    println!(
        "   Taste: dance {:.2} | energy {:.2} | valence {:.2} | acoustic {:.2} | instrumental {:.2}",
        stats.taste.avg_danceability,
        stats.taste.avg_energy,
        stats.taste.avg_valence,
        stats.taste.acoustic_bias,
        stats.taste.instrumental_bias
    );
    println!(
        "   Scores: variety {:.2} | cohesion {:.2} | rarity {:.2} | creativity {:.2}",
        stats.playlist_rater.variety,
        stats.playlist_rater.cohesion,
        stats.playlist_rater.rarity_score,
        stats.playlist_rater.creativity
    );

    if !stats.rare_tracks.is_empty() {
        println!("\n   Rarest finds:");
        for (i, track) in stats.rare_tracks.iter().enumerate() {
            println!(
                "     {}. \"{}\" by {} (popularity {})",
                i + 1,
                track.name,
                track.artist,
                track.pop
            );
        }
    }

    let discoveries: usize = stats.discovery_trend.iter().map(|p| p.count).sum();
    if !stats.discovery_trend.is_empty() {
        println!(
            "\n   Discoveries: {} across {} months | Activity buckets: {}",
            discoveries,
            stats.discovery_trend.len(),
            stats.activity_trend.len()
        );
    }
}
