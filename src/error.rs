use snafu::Snafu;
use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of storage backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    NotFound,
    AccessDenied,
    Transient,
    Unknown,
}

impl StorageErrorKind {
    pub fn classify(error: &opendal::Error) -> Self {
        match error.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound,
            opendal::ErrorKind::PermissionDenied => Self::AccessDenied,
            opendal::ErrorKind::RateLimited => Self::Transient,
            _ if error.is_temporary() => Self::Transient,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::AccessDenied => "access denied",
            Self::Transient => "transient",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Environment variable '{key}' is required but not found"))]
    MissingEnvVar { key: String },

    #[snafu(display("Invalid connection string: {message}"))]
    InvalidConnectionString { message: String },

    #[snafu(display(
        "Unsupported storage provider: {provider}. Allowed: 'azblob' | 's3' | 'minio' | 'oss' | 'fs' | 'memory'"
    ))]
    UnsupportedProvider { provider: String },

    #[snafu(display("Path does not exist: {}", path.display()))]
    PathNotFound { path: PathBuf },

    #[snafu(display("Invalid path: {path}"))]
    InvalidPath { path: String },

    #[snafu(display("Cannot delete directory without -R flag: {path}"))]
    DirectoryDeletionNotRecursive { path: String },

    #[snafu(display("Failed to delete '{path}' (recursive: {recursive}): {source}"))]
    DeleteFailed {
        path: String,
        recursive: bool,
        source: Box<Error>,
    },

    #[snafu(display("Failed to download '{remote_path}' to '{local_path}': {source}"))]
    DownloadFailed {
        remote_path: String,
        local_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to upload '{local_path}' to '{remote_path}': {source}"))]
    UploadFailed {
        local_path: String,
        remote_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to list directory '{path}': {source}"))]
    ListDirectoryFailed { path: String, source: Box<Error> },

    #[snafu(display("Storage error ({kind}): {source}"))]
    Storage {
        kind: StorageErrorKind,
        source: opendal::Error,
    },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("JSON serialization error: {source}"))]
    Json { source: serde_json::Error },
}

impl From<opendal::Error> for Error {
    fn from(error: opendal::Error) -> Self {
        Error::Storage {
            kind: StorageErrorKind::classify(&error),
            source: error,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { source: error }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json { source: error }
    }
}

impl Error {
    /// Storage kind of the innermost backend failure, if any.
    pub fn storage_kind(&self) -> Option<StorageErrorKind> {
        match self {
            Error::Storage { kind, .. } => Some(*kind),
            Error::DeleteFailed { source, .. }
            | Error::DownloadFailed { source, .. }
            | Error::UploadFailed { source, .. }
            | Error::ListDirectoryFailed { source, .. } => source.storage_kind(),
            _ => None,
        }
    }

    /// Errors raised while resolving configuration, before any store call.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::MissingEnvVar { .. }
                | Error::InvalidConnectionString { .. }
                | Error::UnsupportedProvider { .. }
        )
    }
}
