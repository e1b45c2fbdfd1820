//! Implementation of carthage-cache subcommands.
//!
//! `mod.rs` is a thin dispatcher; the sync workflow behind `build` lives in
//! `build.rs`.
//!
//! # Example
//!
//! ```no_run
//! use carthage_cache::cli::Cli;
//! use carthage_cache::commands;
//!
//! let cli = Cli::parse_args();
//! if let Err(e) = commands::execute(&cli) {
//!     eprintln!("Error: {e:?}");
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::cli::{Cli, Commands};
use crate::config::SyncConfig;
use crate::error::{CacheError, Result};
use crate::logging::Logger;
use crate::process::{ProcessRunner, SystemRunner};
use crate::toolchain::ToolchainKey;

pub(crate) mod build;

pub use build::{BuildReport, sync_project};

#[cfg(test)]
mod tests;

/// Execute commands based on the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    let opts = cli.global_opts();
    let runner = SystemRunner::new(opts.launcher(), Logger::new(opts.verbose(), opts.quiet()));
    execute_with(cli, None, &runner)
}

/// Execute commands with an explicit working directory and process runner.
pub fn execute_with(
    cli: &Cli,
    working_dir: Option<&Path>,
    runner: &dyn ProcessRunner,
) -> Result<()> {
    match cli.command() {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Build { dry_run } => {
            let current_dir = match working_dir {
                Some(dir) => dir.to_path_buf(),
                None => std::env::current_dir().map_err(|source| CacheError::IoError {
                    path: PathBuf::from("."),
                    source,
                })?,
            };
            let config = resolve_config(cli, &current_dir, runner)?;
            sync_project(&config, runner, *dry_run).map(|_| ())
        }
    }
}

/// Turns CLI options into a [`SyncConfig`], detecting toolchain versions
/// that were not given explicitly.
pub fn resolve_config(
    cli: &Cli,
    working_dir: &Path,
    runner: &dyn ProcessRunner,
) -> Result<SyncConfig> {
    let opts = cli.global_opts();
    let log = Logger::new(opts.verbose(), opts.quiet());

    let toolchain = ToolchainKey::detect(
        runner,
        &log,
        opts.xcode_version(),
        opts.swift_version(),
        opts.platform(),
    );
    log.verbose(
        1,
        format!(
            "Toolchain: Xcode {:?}, Swift {:?}, platform {}",
            toolchain.xcode_version(),
            toolchain.swift_version(),
            toolchain.platform()
        ),
    );

    SyncConfig::builder()
        .project_dir(opts.get_project_dir(working_dir))
        .cache_root(opts.get_cache_root(working_dir)?)
        .toolchain(toolchain)
        .force(opts.force())
        .use_ssh(opts.use_ssh())
        .verbose(opts.verbose())
        .quiet(opts.quiet())
        .launcher(opts.launcher())
        .build()
}
