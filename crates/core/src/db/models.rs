use serde::{Deserialize, Serialize};

use crate::model::DisassemblyResponse;

/// Bookkeeping row for one cached disassembly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Contract address, lowercased.
    pub address: String,
    /// SHA-256 of the stored payload JSON, hex-encoded.
    pub digest: String,
    /// RFC 3339 timestamp of the last write.
    pub stored_at: String,
    /// Where the payload came from (e.g. an imported file), if known.
    pub source: Option<String>,
    pub block_count: i64,
    pub function_count: i64,
}

/// A cache entry together with its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDisassembly {
    pub entry: CacheEntry,
    pub response: DisassemblyResponse,
}
