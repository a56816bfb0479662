// Key and path translation between the flat blob namespace and local paths
use std::path::{Path, PathBuf, is_separator};

/// Separator used inside blob keys on every platform.
pub const KEY_SEPARATOR: char = '/';

/// Where a single-blob download should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// Write the blob to exactly this path.
    AsFile(PathBuf),
    /// Write the blob inside this directory, under the blob's basename.
    AsDirectory(PathBuf),
}

impl DownloadTarget {
    /// Final file path for a blob named `key`.
    pub fn file_path(&self, key: &str) -> PathBuf {
        match self {
            DownloadTarget::AsFile(path) => path.clone(),
            DownloadTarget::AsDirectory(dir) => dir.join(basename(key)),
        }
    }
}

/// Decide whether `dest` names a file or a directory.
///
/// `dest` is a directory when it ends with a path separator or when its
/// last segment is `.` or `..` (so `.`, `..`, `../..` and `out/..` all
/// count). Everything else is taken literally as a file path, even if a
/// directory of that name already exists on disk.
pub fn resolve_download_target(dest: &str) -> DownloadTarget {
    let ends_with_separator = dest.chars().last().is_some_and(is_separator);
    let last_segment = dest.rsplit(is_separator).next().unwrap_or_default();

    if ends_with_separator || last_segment == "." || last_segment == ".." {
        DownloadTarget::AsDirectory(PathBuf::from(dest))
    } else {
        DownloadTarget::AsFile(PathBuf::from(dest))
    }
}

/// Normalize a directory prefix: `""` stays the container root, anything
/// else gets exactly one trailing `/` and no leading `/`.
pub fn dir_prefix(path: &str) -> String {
    let trimmed = path.trim_start_matches(KEY_SEPARATOR);
    if trimmed.is_empty() {
        return String::new();
    }
    ensure_trailing_slash(trimmed)
}

/// Path handed to the backend when listing everything under a normalized
/// `prefix`. OpenDAL addresses the container root as `"/"`.
pub fn listing_path(prefix: &str) -> &str {
    if prefix.is_empty() { "/" } else { prefix }
}

/// Return a new String that guarantees a trailing '/'.
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with(KEY_SEPARATOR) {
        path.to_string()
    } else {
        format!("{path}{KEY_SEPARATOR}")
    }
}

/// Join a key prefix and a child name with a single '/'.
pub fn build_remote_path(base: &str, name: &str) -> String {
    let base = base.trim_start_matches(KEY_SEPARATOR);
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with(KEY_SEPARATOR) {
        format!("{base}{name}")
    } else {
        format!("{base}{KEY_SEPARATOR}{name}")
    }
}

/// Last `/`-separated segment of a key, ignoring trailing slashes.
pub fn basename(key: &str) -> &str {
    let trimmed = key.trim_end_matches(KEY_SEPARATOR);
    trimmed.rsplit(KEY_SEPARATOR).next().unwrap_or_default()
}

/// Key a single uploaded file lands on. A destination that is empty or ends
/// with '/' receives the file's own name.
pub fn file_upload_key(dest: &str, file_name: &str) -> String {
    if dest.is_empty() || dest.ends_with(KEY_SEPARATOR) {
        build_remote_path(dest, file_name)
    } else {
        dest.trim_start_matches(KEY_SEPARATOR).to_string()
    }
}

/// Prefix under which the contents of a local directory named `dir_name`
/// are uploaded. The directory's own name is always kept.
pub fn dir_upload_prefix(dest: &str, dir_name: &str) -> String {
    build_remote_path(dest.trim_end_matches(KEY_SEPARATOR), dir_name)
}

/// Basename of a local path as a string, falling back to the path itself.
pub fn local_basename(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Remainder of `key` after `prefix`, if it lies strictly under it.
pub fn relative_key<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

/// Map a relative blob key onto a local path below `root`. Keys with
/// empty, `.` or `..` segments are refused.
pub fn local_path_for_key(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in relative.split(KEY_SEPARATOR) {
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

/// Derive the file listing for `prefix` from the keys under it.
///
/// Non-recursive listings keep only remainders without a further '/'.
pub fn file_entries<I, S>(keys: I, prefix: &str, recursive: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .filter_map(|key| relative_key(key.as_ref(), prefix).map(str::to_string))
        .filter(|rest| recursive || !rest.contains(KEY_SEPARATOR))
        .collect()
}

/// Derive the directory listing for `prefix` from the keys under it.
///
/// Non-recursive listings return the first segment of every nested
/// remainder; recursive ones return every directory level on the way to
/// each file. Both keep first-seen order without duplicates.
pub fn dir_entries<I, S>(keys: I, prefix: &str, recursive: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut dirs: Vec<String> = Vec::new();
    for key in keys {
        let Some(rest) = relative_key(key.as_ref(), prefix) else {
            continue;
        };
        let Some((parent, _)) = rest.rsplit_once(KEY_SEPARATOR) else {
            continue;
        };

        let levels: Vec<&str> = if recursive {
            parent
                .match_indices(KEY_SEPARATOR)
                .map(|(idx, _)| &parent[..idx])
                .chain(std::iter::once(parent))
                .collect()
        } else {
            parent.split(KEY_SEPARATOR).take(1).collect()
        };

        for level in levels {
            if !dirs.iter().any(|d| d == level) {
                dirs.push(level.to_string());
            }
        }
    }
    dirs
}
