use crate::error::Result;
use crate::storage::utils::path::{dir_entries, dir_prefix, file_entries, listing_path};
use futures::stream::TryStreamExt;
use opendal::{ErrorKind, Operator};
use serde::Serialize;

/// What a listing reports about a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Files,
    Dirs,
}

/// Result of listing a prefix, relative to that prefix.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub prefix: String,
    pub kind: ListingKind,
    pub recursive: bool,
    pub entries: Vec<String>,
}

/// Trait for listing emulated directories in a flat store.
pub trait Lister {
    /// Every blob key that lies under `prefix/` (the whole container for `""`).
    async fn keys_under(&self, prefix: &str) -> Result<Vec<String>>;

    /// List files or directories below `prefix`.
    ///
    /// # Arguments
    /// * `prefix` - Emulated directory to list; `""` is the container root
    /// * `kind` - Whether to report files or directories
    /// * `recursive` - Whether to descend below the first level
    async fn list(&self, prefix: &str, kind: ListingKind, recursive: bool) -> Result<Listing> {
        let normalized = dir_prefix(prefix);
        let keys = self.keys_under(&normalized).await?;
        let entries = match kind {
            ListingKind::Files => file_entries(&keys, &normalized, recursive),
            ListingKind::Dirs => dir_entries(&keys, &normalized, recursive),
        };
        Ok(Listing {
            prefix: prefix.to_string(),
            kind,
            recursive,
            entries,
        })
    }
}

/// Implementation of Lister for OpenDAL Operator.
pub struct OpenDalLister {
    operator: Operator,
}

impl OpenDalLister {
    /// Create a new lister with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    async fn collect_keys(&self, prefix: &str) -> opendal::Result<Vec<String>> {
        let lister = self
            .operator
            .lister_with(listing_path(prefix))
            .recursive(true)
            .await?;

        lister
            // directory markers are not blobs
            .try_filter(|entry| futures::future::ready(entry.metadata().mode().is_file()))
            .map_ok(|entry| entry.path().trim_start_matches('/').to_string())
            .try_filter(|key| futures::future::ready(key.starts_with(prefix)))
            .try_collect()
            .await
    }

    /// Whether a failed listing of `prefix` just means there is nothing
    /// under it: the prefix is missing, or (on fs) it names a file.
    async fn is_empty_prefix(&self, prefix: &str, err: &opendal::Error) -> bool {
        if err.kind() == ErrorKind::NotFound {
            return true;
        }
        let key = prefix.trim_end_matches('/');
        !key.is_empty()
            && self
                .operator
                .stat(key)
                .await
                .is_ok_and(|meta| meta.is_file())
    }
}

impl Lister for OpenDalLister {
    async fn keys_under(&self, prefix: &str) -> Result<Vec<String>> {
        let err = match self.collect_keys(prefix).await {
            Ok(keys) => return Ok(keys),
            Err(err) => err,
        };
        if self.is_empty_prefix(prefix, &err).await {
            log::debug!("nothing under '{prefix}': {err}");
            return Ok(Vec::new());
        }
        Err(err.into())
    }
}
