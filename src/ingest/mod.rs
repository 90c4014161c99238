//! Raw file ingestion
//!
//! Loads one drop's raw files from a local directory into [`RawRecord`]
//! batches, one file per entity kind named after its stem
//! (`<root>/<drop_id>/results.json`). Supports single-object JSON, JSON
//! arrays, and newline-delimited JSONL, with optional skipping of files the
//! session has already ingested (by path or content hash).

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::models::EntityKind;
use crate::normalize::RawRecord;

/// Error during file ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("malformed JSON in {path} (record {record}): {error}")]
    JsonParse {
        path: PathBuf,
        record: usize,
        error: String,
    },

    #[error("expected a JSON object in {path} (record {record})")]
    NotAnObject { path: PathBuf, record: usize },
}

/// Statistics from one ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    /// Number of files read
    pub files_processed: usize,
    /// Number of files skipped (already ingested or unrecognized)
    pub files_skipped: usize,
    /// Number of raw records produced
    pub records_ingested: usize,
    /// Total bytes read
    pub bytes_processed: u64,
    /// Number of errors encountered
    pub errors_count: usize,
    /// List of errors (limited to first 100)
    pub errors: Vec<String>,
}

impl IngestStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error (limited to 100).
    pub fn add_error(&mut self, error: String) {
        self.errors_count += 1;
        if self.errors.len() < 100 {
            self.errors.push(error);
        }
    }
}

/// How to decide a file was already ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Never skip
    None,
    /// Skip files whose path was seen before
    ByPath,
    /// Skip files whose content hash was seen before
    ByContent,
    /// Skip on either path or content hash
    Both,
}

/// A discovered raw file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Content hash (if computed)
    pub content_hash: Option<String>,
}

impl DiscoveredFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            content_hash: None,
        }
    }

    /// Compute and cache the SHA-256 content hash.
    pub fn compute_hash(&mut self) -> Result<&str, IngestError> {
        if self.content_hash.is_none() {
            let content = fs::read(&self.path)?;
            let hash = Sha256::digest(&content);
            self.content_hash = Some(format!("{hash:x}"));
        }
        Ok(self.content_hash.as_deref().unwrap_or_default())
    }
}

/// Discover a drop's raw files under `<root>/<drop_id>/`, matching `pattern`.
pub fn discover_drop_files(
    root: &Path,
    drop_id: &str,
    pattern: &str,
) -> Result<Vec<DiscoveredFile>, IngestError> {
    let full_pattern = format!("{}/{}/{}", root.display(), drop_id, pattern);
    let entries = glob::glob(&full_pattern)
        .map_err(|e| IngestError::InvalidPattern(format!("{pattern}: {e}")))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    let metadata = fs::metadata(&path)?;
                    files.push(DiscoveredFile::new(path, metadata.len()));
                }
            }
            Err(e) => {
                // Log but continue
                warn!("error accessing path: {e}");
            }
        }
    }

    // Sort by path for consistent ordering
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Parse one raw file into records, by extension and content shape:
/// `.jsonl`/`.ndjson` line-by-line, `.json` as a single object or an array
/// of objects.
pub fn read_raw_records(
    path: &Path,
    source: &str,
    drop_id: &str,
) -> Result<Vec<RawRecord>, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "jsonl" | "ndjson" => read_jsonl(path, source, drop_id),
        _ => read_json(path, source, drop_id),
    }
}

fn read_json(path: &Path, source: &str, drop_id: &str) -> Result<Vec<RawRecord>, IngestError> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| IngestError::JsonParse {
            path: path.to_path_buf(),
            record: 0,
            error: e.to_string(),
        })?;

    match value {
        serde_json::Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (record, item) in items.into_iter().enumerate() {
                let raw = RawRecord::from_value(source, drop_id, item).ok_or_else(|| {
                    IngestError::NotAnObject {
                        path: path.to_path_buf(),
                        record,
                    }
                })?;
                records.push(raw);
            }
            Ok(records)
        }
        other => {
            let raw = RawRecord::from_value(source, drop_id, other).ok_or_else(|| {
                IngestError::NotAnObject {
                    path: path.to_path_buf(),
                    record: 0,
                }
            })?;
            Ok(vec![raw])
        }
    }
}

fn read_jsonl(path: &Path, source: &str, drop_id: &str) -> Result<Vec<RawRecord>, IngestError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(trimmed).map_err(|e| IngestError::JsonParse {
                path: path.to_path_buf(),
                record: index,
                error: e.to_string(),
            })?;
        let raw = RawRecord::from_value(source, drop_id, value).ok_or_else(|| {
            IngestError::NotAnObject {
                path: path.to_path_buf(),
                record: index,
            }
        })?;
        records.push(raw);
    }
    Ok(records)
}

/// One drop's raw batches, keyed by entity kind.
#[derive(Debug, Clone, Default)]
pub struct DropBatches {
    pub drop_id: String,
    pub batches: Vec<(EntityKind, Vec<RawRecord>)>,
}

/// A stateful ingestion session.
///
/// Remembers which files it has already read so a re-delivered drop can be
/// skipped instead of re-parsed.
#[derive(Debug)]
pub struct Ingestor {
    source: String,
    dedup: DedupStrategy,
    seen_paths: HashSet<String>,
    seen_hashes: HashSet<String>,
}

impl Ingestor {
    /// Create an ingestion session for one source system.
    pub fn new(source: impl Into<String>, dedup: DedupStrategy) -> Self {
        Self {
            source: source.into(),
            dedup,
            seen_paths: HashSet::new(),
            seen_hashes: HashSet::new(),
        }
    }

    fn should_skip(&mut self, file: &mut DiscoveredFile) -> Result<bool, IngestError> {
        let path = file.path.display().to_string();
        let skip = match self.dedup {
            DedupStrategy::None => false,
            DedupStrategy::ByPath => self.seen_paths.contains(&path),
            DedupStrategy::ByContent => {
                let hash = file.compute_hash()?.to_string();
                self.seen_hashes.contains(&hash)
            }
            DedupStrategy::Both => {
                let hash = file.compute_hash()?.to_string();
                self.seen_paths.contains(&path) || self.seen_hashes.contains(&hash)
            }
        };
        Ok(skip)
    }

    fn remember(&mut self, file: &mut DiscoveredFile) -> Result<(), IngestError> {
        self.seen_paths.insert(file.path.display().to_string());
        if matches!(self.dedup, DedupStrategy::ByContent | DedupStrategy::Both) {
            let hash = file.compute_hash()?.to_string();
            self.seen_hashes.insert(hash);
        }
        Ok(())
    }

    /// Load one drop's raw files into per-entity batches.
    ///
    /// Files with unrecognized stems are skipped with a warning; a file
    /// that fails to parse is recorded in the stats and skipped, leaving
    /// the other files of the drop intact.
    pub fn load_drop(
        &mut self,
        root: &Path,
        drop_id: &str,
    ) -> Result<(DropBatches, IngestStats), IngestError> {
        let mut stats = IngestStats::new();
        let mut drop = DropBatches {
            drop_id: drop_id.to_string(),
            batches: Vec::new(),
        };

        for mut file in discover_drop_files(root, drop_id, "*.json*")? {
            let Some(kind) = file
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(EntityKind::from_file_stem)
            else {
                warn!(path = %file.path.display(), "skipping unrecognized raw file");
                stats.files_skipped += 1;
                continue;
            };

            // a hash-read failure degrades like a parse failure: record
            // it and move on to the drop's other files
            match self.should_skip(&mut file) {
                Ok(false) => {}
                Ok(true) => {
                    info!(path = %file.path.display(), "skipping already-ingested file");
                    stats.files_skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "skipping unhashable raw file");
                    stats.add_error(e.to_string());
                    stats.files_skipped += 1;
                    continue;
                }
            }

            match read_raw_records(&file.path, &self.source, drop_id) {
                Ok(records) => {
                    stats.files_processed += 1;
                    stats.bytes_processed += file.size;
                    stats.records_ingested += records.len();
                    // the hash is already cached by should_skip for the
                    // content strategies, so this only fails if the file
                    // vanished mid-run; the batch is kept either way
                    if let Err(e) = self.remember(&mut file) {
                        stats.add_error(e.to_string());
                    }
                    drop.batches.push((kind, records));
                }
                Err(e) => {
                    warn!(path = %file.path.display(), error = %e, "skipping unreadable raw file");
                    stats.add_error(e.to_string());
                }
            }
        }

        info!(
            drop_id,
            files = stats.files_processed,
            records = stats.records_ingested,
            skipped = stats.files_skipped,
            "drop ingested"
        );
        Ok((drop, stats))
    }
}
