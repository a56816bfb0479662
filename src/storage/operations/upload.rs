use crate::error::{PathNotFoundSnafu, Result};
use crate::storage::constants::{DEFAULT_BUFFER_SIZE, PROGRESS_UPDATE_INTERVAL};
use crate::storage::utils::path::{
    build_remote_path, dir_upload_prefix, file_upload_key, local_basename,
};
use crate::storage::utils::progress::ConsoleProgressReporter;
use async_recursion::async_recursion;
use opendal::Operator;
use snafu::ensure;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, BufReader};

/// Trait for uploading local files and directories into the flat store.
pub trait Uploader {
    /// Upload a single file or a whole directory.
    ///
    /// # Arguments
    /// * `local_path` - Source path on the local filesystem (file or directory)
    /// * `remote_path` - Destination key (file) or key prefix (directory)
    ///
    /// # Returns
    /// * `Result<usize>` - Number of blobs written
    async fn upload(&self, local_path: &str, remote_path: &str) -> Result<usize>;
}

/// Implementation of Uploader for OpenDAL Operator.
pub struct OpenDalUploader {
    operator: Operator,
}

impl OpenDalUploader {
    /// Create a new uploader with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    /// Stream one local file into `remote_path`, overwriting any existing blob.
    async fn upload_file_streaming(&self, local_path: &Path, remote_path: &str) -> Result<()> {
        println!("Uploading {} to {remote_path}", local_path.display());

        let file = fs::File::open(local_path).await?;
        let file_size = file.metadata().await?.len();
        let mut reader = BufReader::new(file);
        let mut buffer = vec![0u8; DEFAULT_BUFFER_SIZE];
        let mut total_bytes = 0u64;
        let mut writer = self.operator.writer(remote_path).await?;

        let mut reporter = ConsoleProgressReporter::new(
            format!("Uploading {}", local_path.display()),
            file_size,
            DEFAULT_BUFFER_SIZE as u64 * PROGRESS_UPDATE_INTERVAL,
        );

        loop {
            let bytes_read = reader.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            writer.write(buffer[..bytes_read].to_vec()).await?;
            total_bytes += bytes_read as u64;
            reporter.maybe_report(total_bytes);
        }
        writer.close().await?;

        if reporter.reported() {
            println!();
        }
        println!(
            "Upload: {} -> {remote_path} ({total_bytes} bytes)",
            local_path.display(),
        );
        Ok(())
    }

    /// Upload every file below `local_dir` under `remote_prefix`.
    /// Directories without files produce no keys.
    #[async_recursion]
    async fn upload_recursive(&self, local_dir: &Path, remote_prefix: &str) -> Result<usize> {
        let mut uploaded = 0;
        let mut entries = fs::read_dir(local_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let local_entry = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let remote_entry = build_remote_path(remote_prefix, &name);

            // symlinked directories are not followed
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                uploaded += self.upload_recursive(&local_entry, &remote_entry).await?;
            } else if file_type.is_symlink() && local_entry.is_dir() {
                log::warn!("skipping symlinked directory {}", local_entry.display());
            } else {
                self.upload_file_streaming(&local_entry, &remote_entry)
                    .await?;
                uploaded += 1;
            }
        }
        Ok(uploaded)
    }
}

impl Uploader for OpenDalUploader {
    async fn upload(&self, local_path: &str, remote_path: &str) -> Result<usize> {
        let path = Path::new(local_path);
        ensure!(
            path.exists(),
            PathNotFoundSnafu {
                path: path.to_path_buf()
            }
        );

        // `.` and `..` carry no name of their own
        let name = match path.file_name() {
            Some(_) => local_basename(path),
            None => local_basename(&fs::canonicalize(path).await?),
        };
        if path.is_dir() {
            let prefix = dir_upload_prefix(remote_path, &name);
            log::info!("uploading directory {local_path} under prefix {prefix}/");
            self.upload_recursive(path, &prefix).await
        } else {
            let key = file_upload_key(remote_path, &name);
            self.upload_file_streaming(path, &key).await?;
            Ok(1)
        }
    }
}
