// src/storage/mod.rs
use crate::edgar::models::FilingDescriptor;
use crate::report::{ContentFetcher, ParseResult};
use crate::utils::error::{EdgarError, StorageError};
use crate::utils::html_text::html_to_text;
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes the aggregation result to `<base_dir>/<CIK>/parse_result.json`.
    pub fn save_parse_result(&self, cik: &str, result: &ParseResult) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(cik.trim().to_uppercase());
        fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;

        let file_path = target_dir.join("parse_result.json");
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved parse result to {}", file_path.display());
        Ok(file_path)
    }
}

/// Reads a JSON array of filing descriptors.
pub fn load_filing_descriptors(path: &Path) -> Result<Vec<FilingDescriptor>, StorageError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| StorageError::SerializationError(format!("{}: {}", path.display(), e)))
}

/// Reads one profile record. An empty file or a literal `null` yields `Value::Null`.
pub fn load_profile(path: &Path) -> Result<Value, StorageError> {
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&raw).map_err(|e| StorageError::InvalidProfile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Bulk-reads every `*.json` profile in `dir`, sorted by file name and keyed by file stem.
/// Files that cannot be read or parsed are logged and skipped.
pub fn load_profiles(dir: &Path) -> Result<Vec<(String, Value)>, StorageError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut profiles = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match load_profile(&path) {
            Ok(profile) => profiles.push((name, profile)),
            Err(e) => tracing::warn!("Skipping profile {}: {}", path.display(), e),
        }
    }

    tracing::info!("Loaded {} profiles from {}", profiles.len(), dir.display());
    Ok(profiles)
}

/// Serves filing text from `<dir>/<accession>.txt` (or `.htm`/`.html`) for offline analysis.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    dir: PathBuf,
}

impl LocalContentStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn read(&self, accession_number: &str) -> Result<String, EdgarError> {
        for ext in ["txt", "htm", "html"] {
            let path = self.dir.join(format!("{}.{}", accession_number, ext));
            if let Ok(content) = fs::read_to_string(&path) {
                tracing::debug!("Read {} bytes from {}", content.len(), path.display());
                return Ok(html_to_text(&content));
            }
        }
        Err(EdgarError::FilingDocNotFound(format!(
            "{}/{}",
            self.dir.display(),
            accession_number
        )))
    }
}

#[async_trait]
impl ContentFetcher for LocalContentStore {
    async fn fetch_content(&self, _cik: &str, accession_number: &str) -> Result<String, EdgarError> {
        self.read(accession_number)
    }
}
