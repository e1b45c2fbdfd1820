//! # carthage-cache
//!
//! A local cache for Carthage framework builds. Building Carthage
//! dependencies from source is slow, and the output only depends on the
//! library version and the toolchain that built it, so carthage-cache keeps
//! every build it makes and hands it back to any project that needs the same
//! version again.
//!
//! ## Overview
//!
//! A `build` run:
//!
//! 1. Refreshes `Cartfile.resolved` with `carthage bootstrap --no-build`
//! 2. Reads the required `(library, version)` pairs from it
//! 3. Lists what the cache already holds for the current Xcode, Swift, and
//!    platform
//! 4. Builds each missing library with `carthage build` and moves the output
//!    into the cache
//! 5. Replaces `Carthage/Build/<platform>` with the cached builds of every
//!    required library
//!
//! The cache lives under the per-user cache directory:
//!
//! ```text
//! carthage-cache/X<xcode>_S<swift>/<platform>/<library>/<version>/
//! ```
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Subcommand dispatch and the `build` workflow
//! - [`config`]: The resolved settings shared by every step of a run
//! - [`identity`]: Parsing Carthage manifests into library identities
//! - [`index`]: Listing what the cache holds
//! - [`reconcile`]: Deciding what has to be built
//! - [`sync`]: Building, storing, and restoring frameworks
//! - [`process`]: Running external tools
//! - [`toolchain`]: Toolchain detection and the cache layout
//! - [`error`]: Error types and handling with thiserror + miette
//!
//! ## Library Usage
//!
//! ```no_run
//! use carthage_cache::cli::{Cli, Commands};
//! use carthage_cache::commands;
//!
//! let cli = Cli::builder()
//!     .project_dir("MyApp")
//!     .platform("iOS")
//!     .verbose(1)
//!     .command(Commands::Build { dry_run: false })
//!     .build()?;
//!
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Only setup problems are errors: a cache directory that cannot be
//! created, or missing configuration. Failures while building or copying a
//! single library are logged and the run continues with the rest.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod index;
pub mod process;
pub mod reconcile;
pub mod sync;
pub mod toolchain;

// Internal modules
mod files;
mod logging;

pub use logging::Logger;
