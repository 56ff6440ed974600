use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::{CacheEntry, CachedDisassembly};
use crate::model::DisassemblyResponse;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for cache database operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A stored or supplied payload could not be (de)serialized.
    #[error("Payload JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for cache operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Normalized cache key for a contract address.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// SHA-256 of `bytes` as lowercase hex.
pub fn payload_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// SQLite-backed cache of disassembly results, keyed by address.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Storing and retrieving payloads with their digest and timestamp.
#[derive(Debug)]
pub struct CacheDb {
    conn: Connection,
}

impl CacheDb {
    /// Open (or create) a cache database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory cache, mostly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Store (or replace) the disassembly for `address`.
    pub fn put_disassembly(
        &self,
        address: &str,
        response: &DisassemblyResponse,
        source: Option<&str>,
    ) -> StoreResult<CacheEntry> {
        let payload = serde_json::to_string(response)?;
        let entry = CacheEntry {
            address: normalize_address(address),
            digest: payload_digest(payload.as_bytes()),
            stored_at: chrono::Utc::now().to_rfc3339(),
            source: source.map(str::to_string),
            block_count: response.blocks.len() as i64,
            function_count: response.functions.len() as i64,
        };

        self.conn.execute(
            r#"
            INSERT INTO disassemblies
                (address, payload, digest, stored_at, source, block_count, function_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(address) DO UPDATE SET
                payload = excluded.payload,
                digest = excluded.digest,
                stored_at = excluded.stored_at,
                source = excluded.source,
                block_count = excluded.block_count,
                function_count = excluded.function_count
            "#,
            params![
                entry.address,
                payload,
                entry.digest,
                entry.stored_at,
                entry.source,
                entry.block_count,
                entry.function_count
            ],
        )?;
        log::info!("cached disassembly for {} ({} blocks)", entry.address, entry.block_count);
        Ok(entry)
    }

    /// Fetch the cached disassembly for `address`, if any.
    pub fn get_disassembly(&self, address: &str) -> StoreResult<Option<CachedDisassembly>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT address, digest, stored_at, source, block_count, function_count, payload
                FROM disassemblies
                WHERE address = ?1
                "#,
                params![normalize_address(address)],
                |row| Ok((map_entry(row)?, row.get::<_, String>(6)?)),
            )
            .optional()?;

        match row {
            Some((entry, payload)) => {
                let response = serde_json::from_str(&payload)?;
                Ok(Some(CachedDisassembly { entry, response }))
            }
            None => Ok(None),
        }
    }

    /// List all cache entries (ordered by address).
    pub fn list_entries(&self) -> StoreResult<Vec<CacheEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT address, digest, stored_at, source, block_count, function_count
            FROM disassemblies
            ORDER BY address
            "#,
        )?;
        let rows = stmt.query_map([], map_entry)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Remove the entry for `address`; returns whether one existed.
    pub fn remove(&self, address: &str) -> StoreResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM disassemblies WHERE address = ?1",
            params![normalize_address(address)],
        )?;
        Ok(removed > 0)
    }
}

fn map_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
    Ok(CacheEntry {
        address: row.get(0)?,
        digest: row.get(1)?,
        stored_at: row.get(2)?,
        source: row.get(3)?,
        block_count: row.get(4)?,
        function_count: row.get(5)?,
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: disassemblies table (address, payload, digest, stored_at)
/// - 2: add source and size columns
fn apply_migrations(conn: &Connection) -> StoreResult<()> {
    let current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS disassemblies (
                address   TEXT PRIMARY KEY,
                payload   TEXT NOT NULL,
                digest    TEXT NOT NULL,
                stored_at TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            ALTER TABLE disassemblies ADD COLUMN source TEXT;
            ALTER TABLE disassemblies ADD COLUMN block_count INTEGER NOT NULL DEFAULT 0;
            ALTER TABLE disassemblies ADD COLUMN function_count INTEGER NOT NULL DEFAULT 0;

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> StoreResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
