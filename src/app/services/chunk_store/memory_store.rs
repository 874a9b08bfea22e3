//! In-memory chunk store

use super::{Chunk, ChunkStore, PutMode, group_by_key, merge_chunks};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

type StoreKey = (String, i32, i64);

/// Chunk store held in memory, keyed by URL, station key and valid time
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    chunks: Mutex<BTreeMap<StoreKey, Vec<Chunk>>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, url: &str) -> Result<MutexGuard<'_, BTreeMap<StoreKey, Vec<Chunk>>>> {
        self.chunks
            .lock()
            .map_err(|_| Error::chunk_store(url, "memory store lock poisoned"))
    }

    /// Total number of chunks stored under a URL
    pub fn chunk_count(&self, url: &str) -> usize {
        self.chunks
            .lock()
            .map(|map| {
                map.iter()
                    .filter(|((u, _, _), _)| u == url)
                    .map(|(_, chunks)| chunks.len())
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Every chunk stored under a URL, ordered by key and valid time
    pub fn all_chunks(&self, url: &str) -> Vec<Chunk> {
        self.chunks
            .lock()
            .map(|map| {
                map.iter()
                    .filter(|((u, _, _), _)| u == url)
                    .flat_map(|(_, chunks)| chunks.iter().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ChunkStore for MemoryChunkStore {
    fn put(&self, url: &str, chunks: &[Chunk], mode: PutMode) -> Result<()> {
        let mut map = self.lock(url)?;
        for ((data_type, valid_unix), incoming) in group_by_key(chunks) {
            let stored = map.entry((url.to_string(), data_type, valid_unix)).or_default();
            merge_chunks(stored, incoming, mode);
        }
        Ok(())
    }

    fn get_exact(
        &self,
        url: &str,
        valid_time: DateTime<Utc>,
        data_type: i32,
    ) -> Result<Vec<Chunk>> {
        let map = self.lock(url)?;
        Ok(map
            .get(&(url.to_string(), data_type, valid_time.timestamp()))
            .cloned()
            .unwrap_or_default())
    }

    fn get_interval(
        &self,
        url: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        data_type: i32,
    ) -> Result<Vec<Chunk>> {
        if end < start {
            return Ok(Vec::new());
        }
        let map = self.lock(url)?;
        let low = (url.to_string(), data_type, start.timestamp());
        let high = (url.to_string(), data_type, end.timestamp());
        Ok(map
            .range(low..=high)
            .flat_map(|(_, chunks)| chunks.iter().cloned())
            .collect())
    }
}
