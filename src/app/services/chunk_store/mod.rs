//! Time-indexed chunk store for forecast products
//!
//! Products are stored as chunks: an opaque text payload tagged with a
//! station key (`data_type`), a secondary key, and the valid/expire times
//! of the product. Chunks are grouped by `(data_type, valid_time)` and can
//! be fetched back at an exact valid time or over an interval.
//!
//! # Architecture
//!
//! - [`ChunkStore`] - the put/get contract every backend implements
//! - [`file_store`] - directory-backed store, one JSON file per key and valid time
//! - [`memory_store`] - in-memory store for dry runs and tests
//!
//! # Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use taf_processor::app::services::chunk_store::{
//!     hash_station_id, Chunk, ChunkStore, MemoryChunkStore, PutMode,
//! };
//!
//! # fn example() -> taf_processor::Result<()> {
//! let store = MemoryChunkStore::new();
//! let valid = Utc.with_ymd_and_hms(2024, 3, 26, 12, 0, 0).unwrap();
//! let expire = Utc.with_ymd_and_hms(2024, 3, 27, 12, 0, 0).unwrap();
//! let key = hash_station_id("KDEN");
//!
//! let chunk = Chunk::new(key, valid, expire, "TAF KDEN ...");
//! store.put("spdb/taf/ascii", &[chunk], PutMode::Overwrite)?;
//! assert_eq!(store.get_exact("spdb/taf/ascii", valid, key)?.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::Result;
use crate::constants::NONZERO_HASH_FALLBACK;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod file_store;
pub mod memory_store;

#[cfg(test)]
pub mod tests;

pub use file_store::FileChunkStore;
pub use memory_store::MemoryChunkStore;

/// A single stored product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Primary key, the hashed station identifier
    pub data_type: i32,

    pub valid_time: DateTime<Utc>,

    pub expire_time: DateTime<Utc>,

    /// Payload text (raw message or serialized record)
    pub data: String,
}

impl Chunk {
    pub fn new(
        data_type: i32,
        valid_time: DateTime<Utc>,
        expire_time: DateTime<Utc>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            data_type,
            valid_time,
            expire_time,
            data: data.into(),
        }
    }

    /// Grouping key: station key plus valid time in Unix seconds
    pub fn key(&self) -> (i32, i64) {
        (self.data_type, self.valid_time.timestamp())
    }
}

/// How a put combines with chunks already stored under the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutMode {
    /// Replace every chunk stored at the key and valid time
    Overwrite,
    /// Append alongside existing chunks
    Add,
    /// Append unless an identical payload is already stored
    AddUnique,
}

/// Put/get contract for a time-indexed product store
///
/// `url` names the store location; backends decide how it maps onto storage.
pub trait ChunkStore {
    /// Store chunks, combining with existing chunks according to `mode`
    fn put(&self, url: &str, chunks: &[Chunk], mode: PutMode) -> Result<()>;

    /// Fetch chunks stored for `data_type` at exactly `valid_time`, oldest first
    fn get_exact(&self, url: &str, valid_time: DateTime<Utc>, data_type: i32)
    -> Result<Vec<Chunk>>;

    /// Fetch chunks for `data_type` with valid time in `[start, end]`, ordered by valid time
    fn get_interval(
        &self,
        url: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        data_type: i32,
    ) -> Result<Vec<Chunk>>;
}

/// Hash the first four characters of a station id into a chunk key
///
/// Bytes are packed little-endian. An empty id hashes to 0; any other id is
/// guaranteed a non-zero key.
pub fn hash_station_id(station_id: &str) -> i32 {
    let bytes = station_id.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    let mut packed = [0u8; 4];
    for (slot, byte) in packed.iter_mut().zip(bytes) {
        *slot = *byte;
    }
    match i32::from_le_bytes(packed) {
        0 => NONZERO_HASH_FALLBACK,
        value => value,
    }
}

/// Recover the station id characters packed into a chunk key
pub fn dehash_station_id(key: i32) -> String {
    key.to_le_bytes()
        .iter()
        .take_while(|b| **b != 0)
        .map(|b| *b as char)
        .collect()
}

/// Group incoming chunks by key, keeping their order within each group
pub(crate) fn group_by_key(chunks: &[Chunk]) -> BTreeMap<(i32, i64), Vec<Chunk>> {
    let mut groups: BTreeMap<(i32, i64), Vec<Chunk>> = BTreeMap::new();
    for chunk in chunks {
        groups.entry(chunk.key()).or_default().push(chunk.clone());
    }
    groups
}

/// Combine one key's incoming chunks with what is already stored there
pub(crate) fn merge_chunks(existing: &mut Vec<Chunk>, incoming: Vec<Chunk>, mode: PutMode) {
    match mode {
        PutMode::Overwrite => *existing = incoming,
        PutMode::Add => existing.extend(incoming),
        PutMode::AddUnique => {
            for chunk in incoming {
                if !existing.iter().any(|c| c.data == chunk.data) {
                    existing.push(chunk);
                }
            }
        }
    }
}
