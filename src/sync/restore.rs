use std::collections::BTreeMap;
use std::fs;

use super::SyncExecutor;
use crate::files::{contains_payload, copy_dir_contents, format_size, remove_path};
use crate::identity::LibraryIdentity;

/// Totals for one restore into the project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    /// Cache entries copied into the project
    pub libraries_restored: usize,
    /// Files written into the project's build directory
    pub files_copied: usize,
    /// Bytes written into the project's build directory
    pub bytes_copied: u64,
}

impl SyncExecutor<'_> {
    /// Replaces the project's build directory with the cached builds of
    /// `identities`.
    ///
    /// The directory is emptied first so libraries dropped from the manifest
    /// do not linger. Entries are copied in `(display key, version)` order;
    /// a missing entry or a failed copy is reported and skipped.
    pub fn restore_to_project(&self, identities: &[LibraryIdentity]) -> RestoreStats {
        let layout = self.config.layout();
        let dest = self.config.build_output_dir();
        let mut stats = RestoreStats::default();

        if let Err(err) = remove_path(&dest) {
            self.log.warn(format!("Could not clear {}: {err}", dest.display()));
        }
        if let Err(err) = fs::create_dir_all(&dest) {
            self.log.warn(format!("Could not create {}: {err}", dest.display()));
        }

        let ordered: BTreeMap<_, _> = identities
            .iter()
            .map(|identity| (identity.cache_key(), identity))
            .collect();

        for (key, identity) in ordered {
            let Some(entry) = layout.entry_dir(identity) else {
                self.log.warn(format!("Skipping {identity}: version is not a directory name"));
                continue;
            };
            if !contains_payload(&entry) {
                self.log.warn(format!("No cached build of {identity} to restore ({key})"));
                continue;
            }

            match copy_dir_contents(&entry, &dest) {
                Ok(copied) => {
                    stats.libraries_restored += 1;
                    stats.files_copied += copied.files;
                    stats.bytes_copied += copied.bytes;
                    self.log.verbose(
                        1,
                        format!(
                            "Restored {identity}: {} files, {}",
                            copied.files,
                            format_size(copied.bytes)
                        ),
                    );
                }
                Err(err) => {
                    self.log.warn(format!("Could not restore {identity}: {err}"));
                }
            }
        }

        stats
    }
}
