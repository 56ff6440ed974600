//! Workspace layout, configuration and the local disassembly cache.
//!
//! - `WorkspaceLayout`: computed paths for workspace directories/files.
//! - `InspectorConfig`: serializable workspace settings.
//! - `FilterPreset`: a saved graph filter, read from YAML or JSON.
//! - `CacheDb`: a small SQLite wrapper holding disassembly results by address.
//! - `WorkspaceContext`: layout, config and an open cache bundled together.

pub mod cache_db;
pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod util;

pub use cache_db::*;
pub use config::*;
pub use context::*;
pub use layout::*;
pub use models::*;
pub use util::*;
