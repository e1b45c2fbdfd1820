//! Error types for carthage-cache.
//!
//! This module defines the error type used throughout carthage-cache, using
//! `thiserror` for the definitions and `miette` for diagnostic output.
//!
//! # Error Handling Strategy
//!
//! Only a small set of conditions is fatal. Everything that happens inside a
//! sync run (a failed build, a store that could not move its output, a copy
//! that failed during restore) is logged and the run carries on, so those
//! paths never produce a [`CacheError`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use carthage_cache::error::{CacheError, Result};
//!
//! fn require_cache_root(path: &Path) -> Result<()> {
//!     std::fs::create_dir_all(path).map_err(|source| CacheError::CacheRootUnavailable {
//!         path: path.to_path_buf(),
//!         source,
//!     })
//! }
//! ```

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in carthage-cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum CacheError {
    /// The toolchain partition of the cache could not be created.
    ///
    /// This is the one precondition checked before any work starts: without
    /// a writable cache directory there is nowhere to store builds.
    #[error("Cannot create cache directory '{path}'")]
    #[diagnostic(
        code(carthage_cache::cache::root_unavailable),
        help("Check permissions on the cache location, or point --cache-dir somewhere writable.")
    )]
    CacheRootUnavailable {
        /// The partition directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The host exposes no per-user cache directory.
    #[error("Unable to determine the per-user cache directory")]
    #[diagnostic(
        code(carthage_cache::cache::no_cache_directory),
        help("Pass --cache-dir or set CARTHAGE_CACHE_DIR.")
    )]
    NoCacheDirectory,

    /// File system I/O error.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(carthage_cache::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An external program could not be started at all.
    ///
    /// A program that starts and exits non-zero is not an error; its
    /// status is reported through [`crate::process::CommandOutput`].
    #[error("Failed to launch '{program}'")]
    #[diagnostic(
        code(carthage_cache::process::spawn_error),
        help("Check that the launcher passed with -s exists and is executable.")
    )]
    CommandSpawn {
        /// The program line that was being launched
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Required configuration is missing.
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(carthage_cache::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError(
        /// Description of the configuration error
        String,
    ),
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CacheError>;
