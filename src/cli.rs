//! Command-line interface definitions for carthage-cache.
//!
//! This module defines the CLI structure using clap, including all subcommands
//! and their arguments. The main entry point is the [`Cli`] struct.
//!
//! # Example
//!
//! ```no_run
//! use carthage_cache::cli::{Cli, Commands};
//!
//! // Parse command-line arguments
//! let cli = Cli::parse_args();
//!
//! match cli.command() {
//!     Commands::Build { dry_run } => println!("Syncing (dry run: {dry_run})"),
//!     Commands::Version => {}
//! }
//! ```

use std::path::{Component, Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::{CacheError, Result};
use crate::identity::RESOLVED_MANIFEST;
use crate::process::DEFAULT_LAUNCHER;
use crate::toolchain::{DEFAULT_PLATFORM, default_cache_root};


/// Main command-line interface for carthage-cache.
#[derive(Debug, Parser)]
#[command(
    name = "carthage-cache",
    bin_name = "carthage-cache",
    author,
    version,
    about = "Caches Carthage framework builds per Xcode, Swift, and platform",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Debug, Parser)]
pub struct GlobalOpts {
    /// Directory containing Cartfile.resolved (defaults to the current
    /// directory)
    #[arg(short = 'r', long, global = true, env = "CARTHAGE_CACHE_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Xcode version, e.g. 15.0.0 (defaults to the output of `llvm-gcc -v`)
    #[arg(short = 'x', long, global = true, env = "CARTHAGE_CACHE_XCODE_VERSION")]
    xcode_version: Option<String>,

    /// Swift version, e.g. 5.10 (defaults to the output of `xcrun swift
    /// -version`)
    #[arg(short = 'l', long, global = true, env = "CARTHAGE_CACHE_SWIFT_VERSION")]
    swift_version: Option<String>,

    /// Program used to launch external tools
    #[arg(
        short = 's',
        long = "shell",
        global = true,
        default_value = DEFAULT_LAUNCHER,
        env = "CARTHAGE_CACHE_SHELL"
    )]
    launcher: PathBuf,

    /// Rebuild every dependency and overwrite its cache entry
    #[arg(short, long, global = true)]
    force: bool,

    /// Target platform: iOS, Mac, tvOS, or watchOS
    #[arg(short, long, global = true, default_value = DEFAULT_PLATFORM)]
    platform: String,

    /// Resolve dependencies without --use-ssh
    #[arg(short = 'n', long, global = true)]
    no_ssh: bool,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Cache location (defaults to the per-user cache directory)
    #[arg(long, global = true, env = "CARTHAGE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

impl GlobalOpts {
    /// Absolute project directory, resolved against `working_dir`.
    ///
    /// A path that names `Cartfile.resolved` itself is accepted and
    /// reduced to its directory.
    pub fn get_project_dir(&self, working_dir: &Path) -> PathBuf {
        match self.project_dir() {
            Some(dir) => normalize_path(strip_resolved_manifest(dir), working_dir),
            None => normalize_path(working_dir, working_dir),
        }
    }

    /// Cache location: `--cache-dir` when given, otherwise the host's
    /// per-user cache directory.
    pub fn get_cache_root(&self, working_dir: &Path) -> Result<PathBuf> {
        match self.cache_dir() {
            Some(dir) => Ok(normalize_path(dir, working_dir)),
            None => default_cache_root(),
        }
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    pub fn xcode_version(&self) -> Option<&str> {
        self.xcode_version.as_deref()
    }

    pub fn swift_version(&self) -> Option<&str> {
        self.swift_version.as_deref()
    }

    pub fn launcher(&self) -> &Path {
        &self.launcher
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn use_ssh(&self) -> bool {
        !self.no_ssh
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}

/// Available subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Restore dependencies from the cache, building any that are missing.
    ///
    /// Runs `carthage bootstrap --no-build`, builds every library from
    /// Cartfile.resolved that has no entry for the current Xcode, Swift, and
    /// platform, stores those builds, then copies all required builds into
    /// Carthage/Build/<platform>.
    Build {
        /// Show what would be built and restored without doing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the version
    Version,
}

impl Cli {
    /// Parse arguments from the process command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    project_dir: Option<PathBuf>,
    xcode_version: Option<String>,
    swift_version: Option<String>,
    launcher: Option<PathBuf>,
    force: bool,
    platform: Option<String>,
    no_ssh: bool,
    verbose: u8,
    quiet: bool,
    cache_dir: Option<PathBuf>,
    command: Option<Commands>,
}

impl CliBuilder {
    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    pub fn xcode_version(mut self, version: impl Into<String>) -> Self {
        self.xcode_version = Some(version.into());
        self
    }

    pub fn swift_version(mut self, version: impl Into<String>) -> Self {
        self.swift_version = Some(version.into());
        self
    }

    pub fn launcher(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Disable `--use-ssh` when resolving dependencies
    pub fn no_ssh(mut self, no_ssh: bool) -> Self {
        self.no_ssh = no_ssh;
        self
    }

    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let command = self
            .command
            .ok_or_else(|| CacheError::ConfigError("Command is required".to_string()))?;

        Ok(Cli {
            global_opts: GlobalOpts {
                project_dir: self.project_dir,
                xcode_version: self.xcode_version,
                swift_version: self.swift_version,
                launcher: self
                    .launcher
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LAUNCHER)),
                force: self.force,
                platform: self
                    .platform
                    .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
                no_ssh: self.no_ssh,
                verbose: self.verbose,
                quiet: self.quiet,
                cache_dir: self.cache_dir,
            },
            command,
        })
    }
}

/// Reduces `.../Cartfile.resolved` to the directory that holds it.
pub(crate) fn strip_resolved_manifest(path: &Path) -> &Path {
    if path.file_name().is_some_and(|name| name == RESOLVED_MANIFEST) {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    } else {
        path
    }
}

/// Makes `path` absolute against `base` and folds `.` and `..` components.
pub(crate) fn normalize_path(path: impl AsRef<Path>, base: &Path) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                if !matches!(components.last(), Some(Component::RootDir)) {
                    components.push(component);
                }
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}
