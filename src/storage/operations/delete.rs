// Delete operation trait and implementation
use crate::error::{DirectoryDeletionNotRecursiveSnafu, InvalidPathSnafu, Result};
use crate::storage::operations::list::{Lister, OpenDalLister};
use crate::storage::utils::path::dir_prefix;
use opendal::{ErrorKind, Operator};
use snafu::ensure;

/// Trait for deleting blobs and emulated directories.
pub trait Deleter {
    /// Delete a single key, or every key under a prefix when `recursive`.
    ///
    /// # Arguments
    /// * `path` - Blob key or emulated directory
    /// * `recursive` - Whether to delete everything under `path/`
    ///
    /// # Returns
    /// * `Result<usize>` - Number of keys deleted
    async fn delete(&self, path: &str, recursive: bool) -> Result<usize>;
}

/// Implementation of Deleter for OpenDAL Operator.
pub struct OpenDalDeleter {
    operator: Operator,
}

impl OpenDalDeleter {
    /// Create a new deleter with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    async fn keys_under(&self, path: &str) -> Result<Vec<String>> {
        OpenDalLister::new(self.operator.clone())
            .keys_under(&dir_prefix(path))
            .await
    }

    /// Whether `key` names a blob. A directory of the same name does not count.
    async fn blob_exists(&self, key: &str) -> Result<bool> {
        match self.operator.stat(key).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete keys one by one; the first failure stops the sweep.
    async fn delete_keys(&self, keys: &[String]) -> Result<usize> {
        for key in keys {
            self.operator.delete(key).await?;
            println!("Deleted: {key}");
        }
        Ok(keys.len())
    }
}

impl Deleter for OpenDalDeleter {
    async fn delete(&self, path: &str, recursive: bool) -> Result<usize> {
        if recursive {
            let keys = self.keys_under(path).await?;
            log::info!("deleting {} key(s) under '{path}'", keys.len());
            return self.delete_keys(&keys).await;
        }

        let key = path.trim_start_matches('/');
        ensure!(
            !key.is_empty() && !key.ends_with('/'),
            InvalidPathSnafu {
                path: path.to_string()
            }
        );
        if self.blob_exists(key).await? {
            return self.delete_keys(&[key.to_string()]).await;
        }
        ensure!(
            self.keys_under(key).await?.is_empty(),
            DirectoryDeletionNotRecursiveSnafu {
                path: path.to_string()
            }
        );

        log::debug!("'{key}' does not exist, nothing to delete");
        Ok(0)
    }
}
