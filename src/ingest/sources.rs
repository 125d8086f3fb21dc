use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::StatsError;
use crate::ingest::normalize;
use crate::ingest::parser::{RawRow, parse_rows};

const SOURCE_SUFFIX: &str = ".csv";

/// One parsed row tagged with the name of its originating file.
#[derive(Debug, Clone)]
pub struct SourcedRow {
    pub source: Arc<str>,
    pub row: RawRow,
}

/// All rows of one ingestion pass, concatenated in lexicographic
/// source-file order.
#[derive(Debug)]
pub struct Ingested {
    pub rows: Vec<SourcedRow>,
    /// Source files discovered by suffix match.
    pub files: usize,
    /// Files that were readable and carried a usable header.
    pub usable_files: usize,
}

enum FileOutcome {
    Abandoned,
    Unreadable,
    BadHeader,
    Rows(Vec<SourcedRow>),
}

/// Ingest a directory of export files, or a single consolidated file.
///
/// Files are discovered by suffix and processed in lexicographic name
/// order. A single unreadable or header-less file is logged and
/// excluded; only the total absence of readable data or of usable
/// columns is fatal. File reads run on the rayon pool purely as an
/// optimization; the collected row order is the sorted file order
/// either way.
pub fn ingest_path(path: &Path, deadline: Option<Instant>) -> Result<Ingested, StatsError> {
    let metadata = std::fs::metadata(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => StatsError::NoSourceData {
            path: path.display().to_string(),
        },
        _ => StatsError::Unexpected(format!("cannot stat {}: {err}", path.display())),
    })?;

    let files = if metadata.is_file() {
        vec![(source_name(path), path.to_path_buf())]
    } else {
        discover_sources(path)
    };

    if files.is_empty() {
        return Err(StatsError::NoSourceData {
            path: path.display().to_string(),
        });
    }

    let timed_out = AtomicBool::new(false);
    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|(source, file_path)| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                timed_out.store(true, Ordering::Relaxed);
                return FileOutcome::Abandoned;
            }
            read_source(source, file_path)
        })
        .collect();

    if timed_out.load(Ordering::Relaxed) {
        return Err(StatsError::Timeout);
    }

    let mut rows = Vec::new();
    let mut readable = 0usize;
    let mut usable = 0usize;
    for outcome in outcomes {
        match outcome {
            FileOutcome::Rows(mut file_rows) => {
                readable += 1;
                usable += 1;
                rows.append(&mut file_rows);
            }
            FileOutcome::BadHeader => readable += 1,
            FileOutcome::Unreadable => {}
            FileOutcome::Abandoned => unreachable!("timeout already surfaced"),
        }
    }

    if readable == 0 {
        return Err(StatsError::NoSourceData {
            path: path.display().to_string(),
        });
    }
    if usable == 0 {
        return Err(StatsError::MissingColumns);
    }

    let ingested = Ingested {
        rows,
        files: files.len(),
        usable_files: usable,
    };
    debug!(
        files = ingested.files,
        usable = ingested.usable_files,
        rows = ingested.rows.len(),
        "ingested sources"
    );
    Ok(ingested)
}

fn discover_sources(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut files: Vec<(String, PathBuf)> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable directory entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(SOURCE_SUFFIX)
        })
        .map(|entry| (source_name(entry.path()), entry.path().to_path_buf()))
        .collect();

    // Lexicographic by file name keeps the concatenation order, and
    // with it first-seen merge results, deterministic.
    files.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
    files
}

fn read_source(source: &str, path: &Path) -> FileOutcome {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!("excluding {}: {err}", path.display());
            return FileOutcome::Unreadable;
        }
    };

    let reader = parse_rows(&text, normalize::ID_COLUMNS);
    if !normalize::header_is_usable(reader.header()) {
        warn!("excluding {}: no usable identity or name columns", path.display());
        return FileOutcome::BadHeader;
    }

    let source: Arc<str> = Arc::from(source);
    FileOutcome::Rows(
        reader
            .map(|row| SourcedRow {
                source: Arc::clone(&source),
                row,
            })
            .collect(),
    )
}

/// Source name of a file: its base name without the suffix.
fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
