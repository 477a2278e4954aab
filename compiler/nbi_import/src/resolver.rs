//! Fuzzy mapping from import names to filesystem entries.
//!
//! Entry names and requested names go through the same normalization:
//! leading ordinal prefixes such as `"1. "` are dropped, underscores become
//! spaces and everything is lower-cased. `import data_prep` therefore finds
//! `"2. Data Prep.ipynb"` as well as a directory named `data_prep`.

use std::fs;
use std::path::{Path, PathBuf};

/// Searched when a lookup is given no directories.
pub const FILESYSTEM_ROOT: &str = "/";

/// What kind of entry a lookup accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind<'a> {
    Directory,
    /// A regular file named after the module plus `extension`.
    Notebook { extension: &'a str },
}

/// Strip an ordinal prefix of the form `"<digits>. "`.
fn strip_ordinal(name: &str) -> Option<&str> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    name[digits..].strip_prefix(". ")
}

/// Comparison key for a directory entry or requested name.
///
/// Repeated ordinal prefixes are all removed, so the result is a fixed
/// point: normalizing it again changes nothing.
pub fn normalize_entry_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut rest = spaced.as_str();
    while let Some(stripped) = strip_ordinal(rest) {
        rest = stripped;
    }
    rest.to_lowercase()
}

/// Key an entry must normalize to for `dotted_name` to match it.
///
/// Only the last dotted segment takes part; parents are resolved first.
pub fn target_token(dotted_name: &str, kind: EntryKind<'_>) -> String {
    let leaf = dotted_name.rsplit('.').next().unwrap_or(dotted_name);
    let mut token = normalize_entry_name(leaf);
    if let EntryKind::Notebook { extension } = kind {
        token.push_str(&extension.to_lowercase());
    }
    token
}

fn has_kind(path: &Path, kind: EntryKind<'_>) -> bool {
    match kind {
        EntryKind::Directory => path.is_dir(),
        EntryKind::Notebook { .. } => path.is_file(),
    }
}

/// Entries of `dir` sorted by file name, or `None` if it cannot be listed.
fn sorted_entries(dir: &Path) -> Option<Vec<(String, PathBuf)>> {
    let listing = match fs::read_dir(dir) {
        Ok(listing) => listing,
        Err(err) => {
            tracing::debug!(
                dir = %dir.display(),
                error = %err,
                "skipping unreadable search directory"
            );
            return None;
        }
    };
    let mut entries: Vec<(String, PathBuf)> = listing
        .filter_map(Result::ok)
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Some(entries)
}

/// First entry across `search_paths` whose normalized name equals the
/// target token of `requested`.
///
/// Directories are searched in order and each listing in file-name order;
/// when several entries match, the first one wins. An empty `search_paths`
/// searches [`FILESYSTEM_ROOT`].
#[tracing::instrument(level = "debug", skip(search_paths), fields(paths = search_paths.len()))]
pub fn resolve(requested: &str, search_paths: &[PathBuf], kind: EntryKind<'_>) -> Option<PathBuf> {
    let token = target_token(requested, kind);
    let fallback = [PathBuf::from(FILESYSTEM_ROOT)];
    let search_paths = if search_paths.is_empty() {
        &fallback[..]
    } else {
        search_paths
    };
    for dir in search_paths {
        let Some(entries) = sorted_entries(dir) else {
            continue;
        };
        let found = entries
            .into_iter()
            .find(|(name, path)| normalize_entry_name(name) == token && has_kind(path, kind));
        if let Some((name, path)) = found {
            tracing::debug!(%name, "resolved");
            return Some(path);
        }
    }
    None
}
