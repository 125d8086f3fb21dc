use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    /// Directory for cached Stats values.
    pub cache_dir: PathBuf,
    /// Size of the rare-tracks list.
    pub rare_limit: usize,
    /// Overall compute deadline; unset means no deadline.
    pub timeout: Option<Duration>,
}

const DEFAULT_CACHE_DIR: &str = ".taste-cache";
const DEFAULT_RARE_LIMIT: usize = 10;

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let cache_dir = std::env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));

    let rare_limit = match std::env::var("RARE_LIMIT") {
        Ok(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("RARE_LIMIT is not a number: {raw}"))?,
        Err(_) => DEFAULT_RARE_LIMIT,
    };

    let timeout = match std::env::var("COMPUTE_TIMEOUT_SECS") {
        Ok(raw) => {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("COMPUTE_TIMEOUT_SECS is not a number: {raw}"))?;
            Some(Duration::from_secs(secs))
        }
        Err(_) => None,
    };

    Ok(Config {
        cache_dir,
        rare_limit,
        timeout,
    })
}
