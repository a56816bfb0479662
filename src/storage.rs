use crate::error::{Error, Result};
use opendal::Operator;
use std::str::FromStr;

pub mod constants;
mod operations;
mod utils;

pub use self::operations::{Listing, ListingKind};
pub use self::utils::path::{DownloadTarget, resolve_download_target};

use self::operations::delete::OpenDalDeleter;
use self::operations::download::OpenDalDownloader;
use self::operations::list::OpenDalLister;
use self::operations::upload::OpenDalUploader;
use self::operations::{Deleter, Downloader, Lister, Uploader};
use crate::wrap_err;

/// Storage provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Azblob,
    S3,
    Oss,
    Fs,
    Memory,
}

impl FromStr for StorageProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "azblob" | "azure" => Ok(Self::Azblob),
            "s3" | "minio" => Ok(Self::S3),
            "oss" => Ok(Self::Oss),
            "fs" => Ok(Self::Fs),
            "memory" => Ok(Self::Memory),
            _ => Err(Error::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

impl StorageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProvider::Azblob => "azblob",
            StorageProvider::S3 => "s3",
            StorageProvider::Oss => "oss",
            StorageProvider::Fs => "fs",
            StorageProvider::Memory => "memory",
        }
    }
}

/// Unified storage configuration for different providers
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    /// Azure container, S3/OSS bucket, or directory below the fs root
    pub container: String,
    /// Access key id; the account name for Azure
    pub access_key_id: Option<String>,
    /// Access key secret; the account key for Azure
    pub access_key_secret: Option<String>,
    pub sas_token: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub root_path: Option<String>,
}

impl StorageConfig {
    fn new(provider: StorageProvider, container: impl Into<String>) -> Self {
        Self {
            provider,
            container: container.into(),
            access_key_id: None,
            access_key_secret: None,
            sas_token: None,
            endpoint: None,
            region: None,
            root_path: None,
        }
    }

    pub fn azblob(container: impl Into<String>, account_name: String) -> Self {
        Self {
            access_key_id: Some(account_name),
            ..Self::new(StorageProvider::Azblob, container)
        }
    }

    pub fn s3(
        bucket: impl Into<String>,
        access_key_id: String,
        secret_access_key: String,
        region: Option<String>,
    ) -> Self {
        Self {
            access_key_id: Some(access_key_id),
            access_key_secret: Some(secret_access_key),
            region,
            ..Self::new(StorageProvider::S3, bucket)
        }
    }

    pub fn oss(
        bucket: impl Into<String>,
        access_key_id: String,
        access_key_secret: String,
        region: Option<String>,
    ) -> Self {
        Self {
            access_key_id: Some(access_key_id),
            access_key_secret: Some(access_key_secret),
            region,
            ..Self::new(StorageProvider::Oss, bucket)
        }
    }

    pub fn fs(container: impl Into<String>, root_path: String) -> Self {
        Self {
            root_path: Some(root_path),
            ..Self::new(StorageProvider::Fs, container)
        }
    }

    pub fn memory(container: impl Into<String>) -> Self {
        Self::new(StorageProvider::Memory, container)
    }
}

/// Handle on one container. Every directory operation goes through it;
/// dropping it releases the underlying operator.
#[derive(Clone)]
pub struct StorageClient {
    operator: Operator,
    provider: StorageProvider,
    container: String,
}

impl StorageClient {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let operator = Self::build_operator(&config)?;
        log::debug!(
            "storage client ready provider={:?} container={}",
            config.provider,
            config.container
        );
        Ok(Self {
            operator,
            provider: config.provider,
            container: config.container,
        })
    }

    pub fn provider(&self) -> StorageProvider {
        self.provider
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    fn build_operator(config: &StorageConfig) -> Result<Operator> {
        match config.provider {
            StorageProvider::Azblob => {
                let mut builder =
                    opendal::services::Azblob::default().container(&config.container);
                if let Some(account_name) = &config.access_key_id {
                    builder = builder.account_name(account_name);
                }
                if let Some(account_key) = &config.access_key_secret {
                    builder = builder.account_key(account_key);
                }
                if let Some(sas_token) = &config.sas_token {
                    builder = builder.sas_token(sas_token);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::S3 => {
                let mut builder = opendal::services::S3::default().bucket(&config.container);
                if let Some(access_key_id) = &config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(secret_access_key) = &config.access_key_secret {
                    builder = builder.secret_access_key(secret_access_key);
                }
                if let Some(region) = &config.region {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Oss => {
                let mut builder = opendal::services::Oss::default().bucket(&config.container);
                if let Some(access_key_id) = &config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(access_key_secret) = &config.access_key_secret {
                    builder = builder.access_key_secret(access_key_secret);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Fs => {
                let base = config
                    .root_path
                    .as_deref()
                    .unwrap_or(constants::DEFAULT_FS_ROOT);
                let root = std::path::Path::new(base).join(&config.container);
                let builder = opendal::services::Fs::default().root(&root.to_string_lossy());
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Memory => {
                let builder = opendal::services::Memory::default();
                Ok(Operator::new(builder)?.finish())
            }
        }
    }

    /// Upload a local file to `remote_path`, or a local directory under
    /// `remote_path/<dir name>/`. Returns the number of blobs written.
    pub async fn upload(&self, local_path: &str, remote_path: &str) -> Result<usize> {
        log::debug!(
            "upload provider={:?} local_path={} remote_path={}",
            self.provider,
            local_path,
            remote_path
        );
        let uploader = OpenDalUploader::new(self.operator.clone());
        wrap_err!(
            uploader.upload(local_path, remote_path).await,
            UploadFailed {
                local_path: local_path.to_string(),
                remote_path: remote_path.to_string()
            }
        )
    }

    /// Download a blob or an emulated directory. Returns the number of
    /// files written.
    pub async fn download(&self, remote_path: &str, local_path: &str) -> Result<usize> {
        log::debug!(
            "download provider={:?} remote_path={} local_path={}",
            self.provider,
            remote_path,
            local_path
        );
        let downloader = OpenDalDownloader::new(self.operator.clone());
        wrap_err!(
            downloader.download(remote_path, local_path).await,
            DownloadFailed {
                remote_path: remote_path.to_string(),
                local_path: local_path.to_string()
            }
        )
    }

    pub async fn list(&self, prefix: &str, kind: ListingKind, recursive: bool) -> Result<Listing> {
        log::debug!(
            "list provider={:?} prefix={} kind={:?} recursive={}",
            self.provider,
            prefix,
            kind,
            recursive
        );
        let lister = OpenDalLister::new(self.operator.clone());
        wrap_err!(
            lister.list(prefix, kind, recursive).await,
            ListDirectoryFailed {
                path: prefix.to_string()
            }
        )
    }

    /// Files below `prefix`, as paths relative to it.
    pub async fn list_files(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        Ok(self.list(prefix, ListingKind::Files, recursive).await?.entries)
    }

    /// Emulated directories below `prefix`, as paths relative to it.
    pub async fn list_dirs(&self, prefix: &str, recursive: bool) -> Result<Vec<String>> {
        Ok(self.list(prefix, ListingKind::Dirs, recursive).await?.entries)
    }

    /// Delete one key, or every key under `path/` when `recursive`.
    pub async fn remove(&self, path: &str, recursive: bool) -> Result<usize> {
        log::debug!(
            "remove provider={:?} path={} recursive={}",
            self.provider,
            path,
            recursive
        );
        let deleter = OpenDalDeleter::new(self.operator.clone());
        wrap_err!(
            deleter.delete(path, recursive).await,
            DeleteFailed {
                path: path.to_string(),
                recursive: recursive
            }
        )
    }

    /// Same as `remove(prefix, true)`.
    pub async fn remove_dir(&self, prefix: &str) -> Result<usize> {
        self.remove(prefix, true).await
    }
}
