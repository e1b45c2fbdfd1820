//! Deciding which required libraries have to be built.
//!
//! A library is satisfied by the cache only when the exact
//! `(display key, version)` entry exists; any other version stored under the
//! same key does not count.

use std::collections::{BTreeSet, HashSet};

use crate::identity::{CacheKey, LibraryIdentity};

/// Outcome of comparing the required set against the cached set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Required identities with no cache entry, in manifest order
    pub to_build: Vec<LibraryIdentity>,
    /// Required identities already present in the cache, in manifest order
    pub reused: Vec<LibraryIdentity>,
}

impl Reconciliation {
    /// Display keys of every library queued for a build.
    pub fn missing_keys(&self) -> BTreeSet<String> {
        self.to_build.iter().map(|i| i.display_key()).collect()
    }

    pub fn is_up_to_date(&self) -> bool {
        self.to_build.is_empty()
    }
}

/// Splits `required` into identities to build and identities to reuse.
///
/// Duplicate cache keys in `required` are collapsed to their first
/// occurrence. With `force`, everything required is queued for a rebuild.
pub fn reconcile(
    required: &[LibraryIdentity],
    cached: &[LibraryIdentity],
    force: bool,
) -> Reconciliation {
    let cached_keys: HashSet<CacheKey> = cached.iter().map(LibraryIdentity::cache_key).collect();
    let mut seen = HashSet::new();
    let mut result = Reconciliation::default();

    for identity in required {
        let key = identity.cache_key();
        if !seen.insert(key.clone()) {
            continue;
        }

        if force || !cached_keys.contains(&key) {
            result.to_build.push(identity.clone());
        } else {
            result.reused.push(identity.clone());
        }
    }

    result
}
