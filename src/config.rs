//! Resolved settings for one sync run.

use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};
use crate::logging::Logger;
use crate::process::DEFAULT_LAUNCHER;
use crate::toolchain::{CacheLayout, ToolchainKey};

/// Directory, relative to the project, where the build tool writes output.
pub const BUILD_OUTPUT_DIR: &str = "Carthage/Build";

/// Everything a sync run needs, computed once and then shared read-only.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directory holding the Carthage manifests
    project_dir: PathBuf,
    /// Per-user cache location; `carthage-cache/` is created beneath it
    cache_root: PathBuf,
    /// Partition of the cache this run reads and writes
    toolchain: ToolchainKey,
    /// Rebuild every required library even when cached
    force: bool,
    /// Resolve dependencies over SSH
    use_ssh: bool,
    /// Verbosity level
    verbose: u8,
    /// Suppress informational logging when true
    quiet: bool,
    /// Program used to launch external tools
    launcher: PathBuf,
}

impl SyncConfig {
    /// Creates a new builder for [`SyncConfig`]
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn toolchain(&self) -> &ToolchainKey {
        &self.toolchain
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub fn use_ssh(&self) -> bool {
        self.use_ssh
    }

    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn launcher(&self) -> &Path {
        &self.launcher
    }

    pub fn logger(&self) -> Logger {
        Logger::new(self.verbose, self.quiet)
    }

    pub fn layout(&self) -> CacheLayout {
        CacheLayout::new(&self.cache_root, &self.toolchain)
    }

    /// `<project>/Carthage/Build/<platform>`, shared by every build and
    /// replaced wholesale by a restore.
    pub fn build_output_dir(&self) -> PathBuf {
        self.project_dir
            .join(BUILD_OUTPUT_DIR)
            .join(self.toolchain.platform())
    }
}

/// Builder for [`SyncConfig`]
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    project_dir: Option<PathBuf>,
    cache_root: Option<PathBuf>,
    toolchain: Option<ToolchainKey>,
    force: bool,
    use_ssh: Option<bool>,
    verbose: u8,
    quiet: bool,
    launcher: Option<PathBuf>,
}

impl SyncConfigBuilder {
    /// Set the project directory
    pub fn project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Set the per-user cache location
    pub fn cache_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(dir.into());
        self
    }

    /// Set the toolchain partition
    pub fn toolchain(mut self, key: ToolchainKey) -> Self {
        self.toolchain = Some(key);
        self
    }

    /// Enable or disable forced rebuilds
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Enable or disable SSH for dependency resolution (default: enabled)
    pub fn use_ssh(mut self, use_ssh: bool) -> Self {
        self.use_ssh = Some(use_ssh);
        self
    }

    /// Set the verbosity level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the launcher for external tools
    pub fn launcher(mut self, launcher: impl Into<PathBuf>) -> Self {
        self.launcher = Some(launcher.into());
        self
    }

    /// Build the [`SyncConfig`]
    ///
    /// The project directory, cache root, and toolchain have no sensible
    /// defaults and must be set. The toolchain's partition must be plain
    /// directory names.
    pub fn build(self) -> Result<SyncConfig> {
        let missing = |field: &str| CacheError::ConfigError(format!("{field} is required"));
        let toolchain = self.toolchain.ok_or_else(|| missing("toolchain"))?;
        toolchain.check_partition()?;

        Ok(SyncConfig {
            project_dir: self.project_dir.ok_or_else(|| missing("project_dir"))?,
            cache_root: self.cache_root.ok_or_else(|| missing("cache_root"))?,
            toolchain,
            force: self.force,
            use_ssh: self.use_ssh.unwrap_or(true),
            verbose: if self.quiet { 0 } else { self.verbose },
            quiet: self.quiet,
            launcher: self
                .launcher
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LAUNCHER)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ToolchainKey {
        ToolchainKey::new("15.0.0", "5.10", "Mac")
    }

    #[test]
    fn test_builder_defaults() {
        let config = SyncConfig::builder()
            .project_dir("/work/app")
            .cache_root("/caches")
            .toolchain(key())
            .build()
            .unwrap();

        assert!(!config.force());
        assert!(config.use_ssh());
        assert_eq!(config.verbose(), 0);
        assert!(!config.quiet());
        assert_eq!(config.launcher(), Path::new(DEFAULT_LAUNCHER));
        assert_eq!(
            config.build_output_dir(),
            Path::new("/work/app/Carthage/Build/Mac")
        );
        assert_eq!(
            config.layout().partition_dir(),
            Path::new("/caches/carthage-cache/X15.0.0_S5.10/Mac")
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = SyncConfig::builder()
            .project_dir("/p")
            .cache_root("/c")
            .toolchain(key())
            .force(true)
            .use_ssh(false)
            .verbose(2)
            .launcher("/bin/custom")
            .build()
            .unwrap();

        assert!(config.force());
        assert!(!config.use_ssh());
        assert_eq!(config.logger().level(), 2);
        assert_eq!(config.launcher(), Path::new("/bin/custom"));
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let config = SyncConfig::builder()
            .project_dir("/p")
            .cache_root("/c")
            .toolchain(key())
            .verbose(3)
            .quiet(true)
            .build()
            .unwrap();

        assert_eq!(config.verbose(), 0);
        assert!(config.logger().quiet());
    }

    #[test]
    fn test_builder_requires_paths_and_toolchain() {
        let err = SyncConfig::builder()
            .cache_root("/c")
            .toolchain(key())
            .build()
            .unwrap_err();
        assert!(matches!(err, CacheError::ConfigError(msg) if msg.contains("project_dir")));

        let err = SyncConfig::builder()
            .project_dir("/p")
            .toolchain(key())
            .build()
            .unwrap_err();
        assert!(matches!(err, CacheError::ConfigError(msg) if msg.contains("cache_root")));

        let err = SyncConfig::builder()
            .project_dir("/p")
            .cache_root("/c")
            .build()
            .unwrap_err();
        assert!(matches!(err, CacheError::ConfigError(msg) if msg.contains("toolchain")));
    }

    #[test]
    fn test_builder_rejects_platform_outside_partition() {
        for platform in ["../Mac", "iOS/extra", "..", ""] {
            let err = SyncConfig::builder()
                .project_dir("/p")
                .cache_root("/c")
                .toolchain(ToolchainKey::new("15.0.0", "5.10", platform))
                .build()
                .unwrap_err();
            assert!(
                matches!(&err, CacheError::ConfigError(msg) if msg.contains("platform")),
                "{platform:?}: {err}"
            );
        }
    }
}
