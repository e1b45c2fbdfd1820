//! Toolchain keys and the on-disk cache layout.
//!
//! Every cache entry lives under a partition named after the Xcode and Swift
//! versions plus the target platform:
//!
//! ```text
//! <cache-root>/carthage-cache/X<xcode>_S<swift>/<platform>/<displayKey>/<version>/
//! ```
//!
//! Entries from different partitions are never interchangeable.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};
use crate::files::is_single_component;
use crate::identity::LibraryIdentity;
use crate::logging::Logger;
use crate::process::{CommandOutput, ProcessRunner};

/// Directory created under the per-user cache location.
pub const CACHE_DIR_NAME: &str = "carthage-cache";

/// Platform used when none is given.
pub const DEFAULT_PLATFORM: &str = "iOS";

/// Identifies one partition of the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolchainKey {
    xcode_version: String,
    swift_version: String,
    platform: String,
}

impl ToolchainKey {
    pub fn new(
        xcode_version: impl Into<String>,
        swift_version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            xcode_version: xcode_version.into(),
            swift_version: swift_version.into(),
            platform: platform.into(),
        }
    }

    /// Builds a key, asking the installed toolchain for any version that
    /// was not supplied.
    ///
    /// Detection never fails: a tool that is missing or prints something
    /// unexpected contributes an empty version.
    pub fn detect(
        runner: &dyn ProcessRunner,
        log: &Logger,
        xcode_version: Option<&str>,
        swift_version: Option<&str>,
        platform: &str,
    ) -> Self {
        let xcode_version = match xcode_version {
            Some(version) => version.to_string(),
            None => detect_version(runner, log, "llvm-gcc", &["-v"]),
        };
        let swift_version = match swift_version {
            Some(version) => version.to_string(),
            None => detect_version(runner, log, "xcrun", &["swift", "-version"]),
        };

        Self::new(xcode_version, swift_version, platform)
    }

    pub fn xcode_version(&self) -> &str {
        &self.xcode_version
    }

    pub fn swift_version(&self) -> &str {
        &self.swift_version
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Relative partition path, `X<xcode>_S<swift>/<platform>`.
    pub fn partition(&self) -> PathBuf {
        PathBuf::from(self.toolchain_dir_name()).join(&self.platform)
    }

    /// Fails unless both levels of [`partition`](Self::partition) are plain
    /// directory names, so the partition stays inside the cache root.
    pub fn check_partition(&self) -> Result<()> {
        if !is_single_component(&self.toolchain_dir_name()) {
            return Err(CacheError::ConfigError(format!(
                "Xcode version {:?} and Swift version {:?} must not contain path separators",
                self.xcode_version, self.swift_version
            )));
        }
        if !is_single_component(&self.platform) {
            return Err(CacheError::ConfigError(format!(
                "platform {:?} is not a valid directory name",
                self.platform
            )));
        }
        Ok(())
    }

    fn toolchain_dir_name(&self) -> String {
        format!("X{}_S{}", self.xcode_version, self.swift_version)
    }
}

fn detect_version(
    runner: &dyn ProcessRunner,
    log: &Logger,
    program: &str,
    args: &[&str],
) -> String {
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    match runner.run(program, &args, None) {
        Ok(output) => {
            let version = version_from_output(&output).unwrap_or_default();
            log.verbose(2, format!("Detected {program} version: {version:?}"));
            version
        }
        Err(err) => {
            log.warn(format!("Could not run {program} to detect its version: {err}"));
            String::new()
        }
    }
}

/// Version token from the first line a version command printed, preferring
/// stdout over stderr.
///
/// Takes the token after the last bare `version` word (`Apple clang version
/// 15.0.0`, `swift-driver version: 1.90 Apple Swift version 5.10`), falling
/// back to the fourth token for older formats.
pub fn version_from_output(output: &CommandOutput) -> Option<String> {
    let line = output
        .stdout
        .first()
        .filter(|line| !line.trim().is_empty())
        .or_else(|| output.stderr.first())?;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let after_keyword = tokens
        .iter()
        .rposition(|token| *token == "version")
        .and_then(|idx| tokens.get(idx + 1));

    after_keyword
        .or_else(|| tokens.get(3))
        .map(|token| token.to_string())
}

/// Resolves the per-user cache directory for this host.
pub fn default_cache_root() -> Result<PathBuf> {
    dirs::cache_dir().ok_or(CacheError::NoCacheDirectory)
}

/// Paths inside one toolchain partition of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    partition_dir: PathBuf,
}

impl CacheLayout {
    /// Layout for `key` under the per-user cache directory `cache_root`.
    pub fn new(cache_root: &Path, key: &ToolchainKey) -> Self {
        Self {
            partition_dir: cache_root.join(CACHE_DIR_NAME).join(key.partition()),
        }
    }

    /// `<cache-root>/carthage-cache/X<xcode>_S<swift>/<platform>`
    pub fn partition_dir(&self) -> &Path {
        &self.partition_dir
    }

    pub fn library_dir(&self, display_key: &str) -> PathBuf {
        self.partition_dir.join(display_key)
    }

    /// Directory holding one stored build of `identity`.
    ///
    /// `None` when the version is not a single directory name; such a
    /// version would land outside the library's own directory.
    pub fn entry_dir(&self, identity: &LibraryIdentity) -> Option<PathBuf> {
        is_single_component(identity.version())
            .then(|| self.library_dir(&identity.display_key()).join(identity.version()))
    }

    /// Creates the partition directory. Failing here is fatal for a run.
    pub fn ensure_partition(&self) -> Result<()> {
        fs::create_dir_all(&self.partition_dir).map_err(|source| {
            CacheError::CacheRootUnavailable {
                path: self.partition_dir.clone(),
                source,
            }
        })
    }
}
