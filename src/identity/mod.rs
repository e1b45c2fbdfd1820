//! Library identities parsed from Carthage manifests.
//!
//! `Cartfile.resolved` records are `<kind> "<origin>" "<version>"`; each one
//! becomes a [`LibraryIdentity`]. Origins come in several shapes (full URLs,
//! `owner/repo` shorthands, `host:owner/repo` git remotes, local paths) and
//! are normalized so the same library always gets the same name.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::files::is_single_component;


/// File name of the machine-generated lockfile.
pub const RESOLVED_MANIFEST: &str = "Cartfile.resolved";

/// File name of the developer-authored dependency declaration.
pub const DECLARED_MANIFEST: &str = "Cartfile";

const GIT_SUFFIX: &str = ".git";
const BINARY_SPEC_SUFFIX: &str = ".json";

/// One resolved dependency at a specific version.
///
/// Equality and hashing only consider `name` and `version`; two identities
/// that differ only in where they were read from are the same library.
#[derive(Debug, Clone)]
pub struct LibraryIdentity {
    name: String,
    version: String,
    source_path: Option<String>,
}

impl LibraryIdentity {
    /// Creates an identity from already-normalized parts.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source_path: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source_path,
        }
    }

    /// Creates an identity discovered in the cache tree, which carries no
    /// origin reference.
    pub fn cached(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Raw origin from the manifest with quotes removed, if known.
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Short name used as the library's directory in the cache and as the
    /// argument handed to `carthage build`.
    ///
    /// Derived from the origin when there is one, otherwise from the name.
    /// The result is always a single directory name.
    pub fn display_key(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(short_name)
            .or_else(|| short_name(&self.name))
            .or_else(|| Some(self.name.replace(['/', '\\', ':'], "_")))
            .filter(|key| is_single_component(key))
            .unwrap_or_else(|| "_".to_string())
    }

    /// Key under which this identity is stored in the cache.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            display_key: self.display_key(),
            version: self.version.clone(),
        }
    }
}

impl PartialEq for LibraryIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for LibraryIdentity {}

impl Hash for LibraryIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for LibraryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// `(display key, version)`: the location of one entry inside a toolchain
/// partition of the cache.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub display_key: String,
    pub version: String,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.display_key, self.version)
    }
}

/// Reads `Cartfile.resolved` from a project directory.
///
/// A missing or unreadable file yields no identities.
pub fn read_resolved(project_dir: &Path) -> Vec<LibraryIdentity> {
    fs::read_to_string(project_dir.join(RESOLVED_MANIFEST))
        .map(|text| parse_resolved(&text))
        .unwrap_or_default()
}

/// Reads the repository short names declared in `Cartfile`.
///
/// A missing or unreadable file yields no names.
pub fn read_declared(project_dir: &Path) -> Vec<String> {
    fs::read_to_string(project_dir.join(DECLARED_MANIFEST))
        .map(|text| parse_declared(&text))
        .unwrap_or_default()
}

/// Parses the text of a resolved manifest, in file order.
pub fn parse_resolved(text: &str) -> Vec<LibraryIdentity> {
    text.lines().filter_map(parse_resolved_line).collect()
}

/// Parses one `<kind> <origin> <version>` record.
///
/// Returns `None` for blank lines, comments, any record that does not have
/// exactly three fields, and versions that cannot name a single cache
/// directory (`..`, `release/1.0`).
pub fn parse_resolved_line(line: &str) -> Option<LibraryIdentity> {
    let fields = record_fields(line)?;
    let [_kind, origin, version] = fields.as_slice() else {
        return None;
    };

    let version = normalize_version(version);
    if !is_single_component(&version) {
        return None;
    }

    Some(LibraryIdentity::new(
        normalize_name(origin),
        version,
        Some(strip_quotes(origin)),
    ))
}

/// Parses the text of a declared manifest into repository short names.
pub fn parse_declared(text: &str) -> Vec<String> {
    text.lines().filter_map(parse_declared_line).collect()
}

/// Parses one `<kind> <origin> [<version-spec>]` declaration into the
/// repository's short name.
pub fn parse_declared_line(line: &str) -> Option<String> {
    let fields = record_fields(line)?;
    if fields.len() < 2 {
        return None;
    }
    short_name(fields[1])
}

/// Canonical library name for a manifest origin.
///
/// - `scheme://...` URLs: the last path segment, without `.json`.
/// - Bare path-like tokens (`owner/repo`, `../Local/Lib`): all non-empty
///   segments joined with `/`.
/// - Anything else (`host:owner/repo`): the part after the single `:`.
///
/// Quotes and trailing `.git` are always removed. Applying this to its own
/// output returns the output unchanged.
pub fn normalize_name(origin: &str) -> String {
    let origin = strip_quotes(origin);

    let name = if let Some(scheme) = url_scheme_re().find(&origin) {
        let rest = &origin[scheme.end()..];
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        let segment = last_segment(rest).unwrap_or_default();
        strip_suffix_all(segment, BINARY_SPEC_SUFFIX).to_string()
    } else if bare_path_re().is_match(&origin) {
        join_segments(&origin)
    } else {
        let parts: Vec<&str> = origin.split(':').collect();
        let repo = if parts.len() == 2 { parts[1] } else { parts[0] };
        join_segments(repo)
    };

    strip_suffix_all(&name, GIT_SUFFIX).to_string()
}

/// Strips quotes and a trailing `.git` from a version field.
pub fn normalize_version(version: &str) -> String {
    strip_suffix_all(&strip_quotes(version), GIT_SUFFIX).to_string()
}

/// Last meaningful path segment of an origin or name, minus `.json` and
/// `.git`. `None` when nothing usable is left.
pub(crate) fn short_name(raw: &str) -> Option<String> {
    let raw = strip_quotes(raw);

    let path = match url_scheme_re().find(&raw) {
        Some(scheme) => {
            let rest = &raw[scheme.end()..];
            rest.split(['?', '#']).next().unwrap_or(rest)
        }
        None => raw.rsplit(':').next().unwrap_or(&raw),
    };

    let segment = last_segment(path)?;
    let segment = strip_suffix_all(segment, GIT_SUFFIX);
    let segment = strip_suffix_all(segment, BINARY_SPEC_SUFFIX);
    let segment = strip_suffix_all(segment, GIT_SUFFIX);

    match segment {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

fn record_fields(line: &str) -> Option<Vec<&str>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(line.split_whitespace().collect())
}

fn strip_quotes(value: &str) -> String {
    value.replace('"', "")
}

fn strip_suffix_all<'a>(mut value: &'a str, suffix: &str) -> &'a str {
    while let Some(stripped) = value.strip_suffix(suffix) {
        value = stripped;
    }
    value
}

fn last_segment(path: &str) -> Option<&str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).next_back()
}

fn join_segments(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn url_scheme_re() -> &'static Regex {
    static URL_SCHEME_RE: OnceLock<Regex> = OnceLock::new();
    URL_SCHEME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("scheme regex should compile")
    })
}

fn bare_path_re() -> &'static Regex {
    static BARE_PATH_RE: OnceLock<Regex> = OnceLock::new();
    BARE_PATH_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._~!$&'()*+,;=@%/\-]+$").expect("bare path regex should compile")
    })
}
