use crate::error::{InvalidPathSnafu, Result};
use crate::storage::operations::list::{Lister, OpenDalLister};
use crate::storage::utils::path::{
    basename, dir_prefix, file_entries, local_path_for_key, resolve_download_target,
};
use opendal::Operator;
use snafu::{OptionExt, ensure};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Trait for downloading blobs and emulated directories to local disk.
pub trait Downloader {
    /// Download a single blob or every blob under a prefix.
    ///
    /// # Arguments
    /// * `remote_path` - A blob key, or a prefix matching one or more blobs
    /// * `local_path` - Destination file or directory on the local filesystem
    ///
    /// # Returns
    /// * `Result<usize>` - Number of blobs written to disk
    async fn download(&self, remote_path: &str, local_path: &str) -> Result<usize>;
}

/// Implementation of Downloader for OpenDAL Operator.
pub struct OpenDalDownloader {
    operator: Operator,
}

impl OpenDalDownloader {
    /// Create a new downloader with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    /// Read `key` and write it to `local_file`, creating parent directories.
    async fn download_blob(&self, key: &str, local_file: &Path) -> Result<()> {
        println!("Downloading {key} to {}", local_file.display());
        // read first so a missing blob leaves the local tree untouched
        let data = self.operator.read(key).await?;
        if let Some(parent) = local_file.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(local_file, data.to_vec()).await?;
        println!("Downloaded: {key} -> {}", local_file.display());
        Ok(())
    }

    /// Recreate every blob below `prefix` under `local_dir/<basename(prefix)>`.
    async fn download_prefix(&self, prefix: &str, keys: &[String], local_dir: &Path) -> Result<usize> {
        let root = match basename(prefix) {
            "" => local_dir.to_path_buf(),
            name => local_dir.join(name),
        };
        fs::create_dir_all(&root).await?;

        let relative_keys = file_entries(keys, prefix, true);
        for relative in &relative_keys {
            let local_file =
                local_path_for_key(&root, relative).context(InvalidPathSnafu {
                    path: format!("{prefix}{relative}"),
                })?;
            self.download_blob(&format!("{prefix}{relative}"), &local_file)
                .await?;
        }
        Ok(relative_keys.len())
    }
}

impl Downloader for OpenDalDownloader {
    async fn download(&self, remote_path: &str, local_path: &str) -> Result<usize> {
        let prefix = dir_prefix(remote_path);
        let lister = OpenDalLister::new(self.operator.clone());
        let keys = lister.keys_under(&prefix).await?;

        if !keys.is_empty() {
            log::info!(
                "downloading {} blob(s) under '{prefix}' into {local_path}",
                keys.len()
            );
            return self
                .download_prefix(&prefix, &keys, Path::new(local_path))
                .await;
        }

        let key = remote_path.trim_start_matches('/');
        ensure!(
            !key.is_empty() && !key.ends_with('/'),
            InvalidPathSnafu {
                path: remote_path.to_string()
            }
        );

        let local_file: PathBuf = resolve_download_target(local_path).file_path(key);
        self.download_blob(key, &local_file).await?;
        Ok(1)
    }
}
