use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

pub mod commands;

/// Resolve a `--root` argument to an absolute path.
///
/// Existing paths are canonicalized; a path that does not exist yet (before
/// `init`) is joined onto the current directory.
pub fn canonicalize_or_current(root: &str) -> Result<PathBuf> {
    let cwd = || env::current_dir().context("Failed to get current directory");
    let path = Path::new(root);
    if path == Path::new(".") {
        return cwd();
    }
    match path.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(_) => Ok(cwd()?.join(path)),
    }
}

/// Workspace name derived from the last component of `root`, or
/// `unnamed-workspace` for paths such as `/`.
pub fn infer_workspace_name(root: &Path) -> String {
    match root.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.to_string(),
        None => "unnamed-workspace".to_string(),
    }
}

/// Hex SHA-256 of a disassembly file, streamed from disk.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to hash {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Install the global logger.
///
/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting to `warn`.
pub fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None);
    // A logger may already be installed when commands run in-process.
    let _ = builder.try_init();
}
