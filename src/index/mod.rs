//! Cache index: the library versions already stored for one toolchain.
//!
//! The partition directory is read two levels deep, library names first and
//! then versions beneath each. A version only counts when its directory
//! holds real content; an empty directory left behind by a failed store is
//! treated as absent, so the library gets rebuilt.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::files::contains_payload;
use crate::identity::LibraryIdentity;
use crate::toolchain::CacheLayout;


/// Immediate subdirectories of `dir`, sorted by name.
///
/// Missing or unreadable directories have no subdirectories.
pub fn list_subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

/// Immediate subdirectories of `dir/name`, sorted by name.
pub fn list_nested_subdirectories(dir: &Path, name: &str) -> Vec<PathBuf> {
    list_subdirectories(&dir.join(name))
}

/// Every `(library, version)` stored under `layout` that holds content.
///
/// Identities come back ordered by library name then version and carry no
/// source path.
pub fn enumerate(layout: &CacheLayout) -> Vec<LibraryIdentity> {
    let partition = layout.partition_dir();

    list_subdirectories(partition)
        .par_iter()
        .filter_map(|library_dir| dir_name(library_dir))
        .flat_map_iter(|library| {
            list_nested_subdirectories(partition, &library)
                .into_iter()
                .filter(|version_dir| contains_payload(version_dir))
                .filter_map(|version_dir| dir_name(&version_dir))
                .map(move |version| LibraryIdentity::cached(library.clone(), version))
        })
        .collect()
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
