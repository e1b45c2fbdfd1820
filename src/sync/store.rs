use std::fs;

use super::{SyncExecutor, build_args};
use crate::error::CacheError;
use crate::files::{move_dir, remove_path};
use crate::identity::LibraryIdentity;

/// What happened to one library during build-and-store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Built and moved into its cache entry
    Stored,
    /// The build tool could not be started or exited non-zero
    BuildFailed,
    /// Built, but the output could not be moved into the cache
    StoreFailed,
    /// The version cannot name a cache directory, so nothing was built
    InvalidVersion,
}

impl SyncExecutor<'_> {
    /// Builds each identity in turn and stores the output in the cache.
    ///
    /// Builds run one at a time because they all write to the same
    /// `Carthage/Build/<platform>` directory. Each entry is cleared before
    /// the new output is moved in, so re-storing a version replaces it.
    pub fn build_and_store(
        &self,
        identities: &[LibraryIdentity],
    ) -> Vec<(LibraryIdentity, StoreOutcome)> {
        identities
            .iter()
            .map(|identity| (identity.clone(), self.build_and_store_one(identity)))
            .collect()
    }

    fn build_and_store_one(&self, identity: &LibraryIdentity) -> StoreOutcome {
        let config = self.config;
        let layout = config.layout();
        let Some(entry) = layout.entry_dir(identity) else {
            self.log.warn(format!("Skipping {identity}: version is not a directory name"));
            return StoreOutcome::InvalidVersion;
        };
        let output_dir = config.build_output_dir();
        let display_key = identity.display_key();

        if let Err(err) = remove_path(&output_dir) {
            self.log.warn(format!("Could not clear stale build output: {err}"));
        }

        self.log.info(format!("Building {identity}"));
        let args = build_args(
            config.toolchain().platform(),
            config.verbose() > 0,
            &display_key,
        );
        if !self.run_build_tool("build", &args) {
            self.log.error(format!("Build failed for {identity}"));
            return StoreOutcome::BuildFailed;
        }

        let library_dir = layout.library_dir(&display_key);
        let stored = fs::create_dir_all(&library_dir)
            .map_err(|source| CacheError::IoError {
                path: library_dir.clone(),
                source,
            })
            .and_then(|_| remove_path(&entry))
            .and_then(|_| move_dir(&output_dir, &entry));

        match stored {
            Ok(()) => {
                self.log.verbose(1, format!("Stored {identity} in {}", entry.display()));
                StoreOutcome::Stored
            }
            Err(err) => {
                self.log.warn(format!("Could not store {identity} in the cache: {err}"));
                // Leave an empty entry; the index treats it as absent.
                if let Err(err) = fs::create_dir_all(&entry) {
                    self.log.warn(format!("Could not create {}: {err}", entry.display()));
                }
                StoreOutcome::StoreFailed
            }
        }
    }
}
