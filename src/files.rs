//! Filesystem helpers shared by the cache index and the sync executor.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path};

use walkdir::WalkDir;

use crate::error::{CacheError, Result};

/// Files the OS drops into directories on its own.
const HOUSEKEEPING_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Totals for one recursive copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub bytes: u64,
}

pub(crate) fn is_housekeeping(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    HOUSEKEEPING_FILES.contains(&name.as_ref()) || name.starts_with("._")
}

/// True when `dir` holds at least one file, at any depth, that is not OS
/// housekeeping. Unreadable directories count as empty.
pub(crate) fn contains_payload(dir: &Path) -> bool {
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|entry| !entry.file_type().is_dir() && !is_housekeeping(entry.file_name()))
}

/// True when `name` is exactly one ordinary path component, so joining it
/// onto a directory names a direct child of that directory.
pub(crate) fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Removes a file, symlink, or directory tree. A missing path is not an
/// error.
pub(crate) fn remove_path(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) => Err(err),
    };

    match result {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(CacheError::IoError {
            path: path.to_path_buf(),
            source: err,
        }),
        _ => Ok(()),
    }
}

/// Copies everything inside `src` into `dst`, overwriting files that
/// already exist there (the `cp -rf src/. dst` behaviour). Symlinks are
/// recreated as symlinks on Unix.
pub(crate) fn copy_dir_contents(src: &Path, dst: &Path) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    fs::create_dir_all(dst).map_err(|source| CacheError::IoError {
        path: dst.to_path_buf(),
        source,
    })?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|err| CacheError::IoError {
            path: err.path().unwrap_or(src).to_path_buf(),
            source: err.into(),
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        let file_type = entry.file_type();

        let copied = if file_type.is_dir() {
            fs::create_dir_all(&target).map(|_| None)
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target).map(|_| Some(0))
        } else {
            remove_file_if_present(&target)
                .and_then(|_| fs::copy(entry.path(), &target))
                .map(Some)
        };

        match copied {
            Ok(Some(bytes)) => {
                stats.files += 1;
                stats.bytes += bytes;
            }
            Ok(None) => {}
            Err(source) => return Err(CacheError::IoError { path: target, source }),
        }
    }

    Ok(stats)
}

/// Moves a directory tree, falling back to copy-then-delete when a rename
/// is not possible (for example across volumes).
pub(crate) fn move_dir(src: &Path, dst: &Path) -> Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    copy_dir_contents(src, dst)?;
    remove_path(src)
}

fn remove_file_if_present(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if !metadata.is_dir() => fs::remove_file(path),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    remove_file_if_present(dst)?;
    std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    remove_file_if_present(dst)?;
    fs::copy(src, dst).map(|_| ())
}

/// Byte count rendered with binary units, for restore summaries.
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}
