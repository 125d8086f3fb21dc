use std::path::PathBuf;

use tracing::{debug, warn};

use crate::models::Stats;

/// File-backed cache of computed Stats values, keyed by
/// `(profile, contentHash)`.
///
/// Failure semantics: a read failure falls back transparently to
/// recomputation, and a write failure is logged without failing the
/// request — the computed value is still valid and returnable.
#[derive(Debug, Clone)]
pub struct StatsCache {
    dir: PathBuf,
}

impl StatsCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn load(&self, profile: &str, hash: &str) -> Option<Stats> {
        let path = self.entry_path(profile, hash);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return None,
        };
        match serde_json::from_str(&content) {
            Ok(stats) => {
                debug!("cache hit for {profile} ({hash})");
                Some(stats)
            }
            Err(err) => {
                warn!("discarding corrupt cache entry {}: {err}", path.display());
                None
            }
        }
    }

    pub fn store(&self, profile: &str, hash: &str, stats: &Stats) {
        if let Err(err) = self.write_entry(profile, hash, stats) {
            warn!("cache write failed for {profile} ({hash}): {err}");
        }
    }

    fn write_entry(&self, profile: &str, hash: &str, stats: &Stats) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(stats)?;
        std::fs::write(self.entry_path(profile, hash), content)?;
        Ok(())
    }

    fn entry_path(&self, profile: &str, hash: &str) -> PathBuf {
        self.dir.join(format!("{}-{hash}.json", sanitize(profile)))
    }
}

/// Keep profile names filesystem-safe.
fn sanitize(profile: &str) -> String {
    profile
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
