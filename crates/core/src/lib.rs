//! inspector-core
//!
//! Core library for inspecting disassembled smart contracts: control-flow
//! graph construction with deterministic per-function colors, node filtering,
//! and display formatting of symbolic-execution annotations.
//!
//! Everything here is pure and synchronous so it can be tested in isolation
//! and reused from multiple frontends. The only IO lives in [`db`], which
//! holds the workspace layout, config and the local disassembly cache.

pub mod db;
pub mod format;
pub mod functions;
pub mod graph;
pub mod model;
pub mod session;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
