//! Directory-backed chunk store
//!
//! A store URL is a directory (an optional `file://` prefix is stripped).
//! Chunks for one station key and valid time live together in
//! `<url>/<data_type>/<valid_unix_seconds>.json`.

use super::{Chunk, ChunkStore, PutMode, group_by_key, merge_chunks};
use crate::constants::CHUNK_FILE_EXTENSION;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

const FILE_URL_PREFIX: &str = "file://";

/// Chunk store persisting JSON files under a directory per store URL
#[derive(Debug, Clone, Default)]
pub struct FileChunkStore {
    /// Base directory for relative URLs; the working directory when unset
    root: Option<PathBuf>,
}

impl FileChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative store URLs against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Directory holding every chunk file for a store URL
    pub fn store_dir(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix(FILE_URL_PREFIX).unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn key_dir(&self, url: &str, data_type: i32) -> PathBuf {
        self.store_dir(url).join(data_type.to_string())
    }

    fn chunk_path(&self, url: &str, data_type: i32, valid_unix: i64) -> PathBuf {
        self.key_dir(url, data_type)
            .join(format!("{}.{}", valid_unix, CHUNK_FILE_EXTENSION))
    }

    fn read_chunks(&self, url: &str, path: &Path) -> Result<Vec<Chunk>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::chunk_store(url, format!("failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::chunk_store(url, format!("corrupt chunk file {}: {}", path.display(), e)))
    }

    fn write_chunks(&self, url: &str, path: &Path, chunks: &[Chunk]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::chunk_store(url, format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(chunks)?;

        // Write then rename so readers never see a half-written file
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| Error::chunk_store(url, format!("failed to write {}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, path)
            .map_err(|e| Error::chunk_store(url, format!("failed to rename {}: {}", tmp_path.display(), e)))?;
        trace!("Wrote {} chunks to {}", chunks.len(), path.display());
        Ok(())
    }
}

impl ChunkStore for FileChunkStore {
    fn put(&self, url: &str, chunks: &[Chunk], mode: PutMode) -> Result<()> {
        for ((data_type, valid_unix), incoming) in group_by_key(chunks) {
            let path = self.chunk_path(url, data_type, valid_unix);
            let mut stored = self.read_chunks(url, &path)?;
            merge_chunks(&mut stored, incoming, mode);
            self.write_chunks(url, &path, &stored)?;
        }
        debug!("Put {} chunks to {} ({:?})", chunks.len(), url, mode);
        Ok(())
    }

    fn get_exact(
        &self,
        url: &str,
        valid_time: DateTime<Utc>,
        data_type: i32,
    ) -> Result<Vec<Chunk>> {
        let path = self.chunk_path(url, data_type, valid_time.timestamp());
        self.read_chunks(url, &path)
    }

    fn get_interval(
        &self,
        url: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        data_type: i32,
    ) -> Result<Vec<Chunk>> {
        let dir = self.key_dir(url, data_type);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let range = start.timestamp()..=end.timestamp();
        let entries = fs::read_dir(&dir)
            .map_err(|e| Error::chunk_store(url, format!("failed to list {}: {}", dir.display(), e)))?;

        let mut valid_times: Vec<i64> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != CHUNK_FILE_EXTENSION {
                    return None;
                }
                path.file_stem()?.to_str()?.parse::<i64>().ok()
            })
            .filter(|valid_unix| range.contains(valid_unix))
            .collect();
        valid_times.sort_unstable();

        let mut chunks = Vec::new();
        for valid_unix in valid_times {
            let path = self.chunk_path(url, data_type, valid_unix);
            chunks.extend(self.read_chunks(url, &path)?);
        }
        Ok(chunks)
    }
}
