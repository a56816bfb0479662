use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::storage::constants::{
    AZURITE_ACCOUNT_KEY, AZURITE_ACCOUNT_NAME, AZURITE_BLOB_ENDPOINT, DEFAULT_AZURE_ENDPOINT_SUFFIX,
    DEFAULT_AZURE_PROTOCOL, DEFAULT_FS_ROOT, DEFAULT_PROVIDER,
};
use crate::storage::{StorageConfig, StorageProvider};

pub const AZURE_CONNECTION_STRING_ENV: &str = "AZURE_STORAGE_CONNECTION_STRING";

// Helper function to reduce repetitive environment variable loading logic.
fn get_env_var(primary_key: &str, secondary_key: &str) -> Result<String> {
    env::var(primary_key)
        .or_else(|_| env::var(secondary_key))
        .map_err(|_| Error::MissingEnvVar {
            key: format!("{primary_key} or {secondary_key}"),
        })
}

/// Load storage configuration for `container` from environment variables
pub fn load_storage_config(container: &str) -> Result<StorageConfig> {
    let provider_str =
        env::var("STORAGE_PROVIDER").unwrap_or_else(|_| DEFAULT_PROVIDER.to_string());
    let provider = StorageProvider::from_str(&provider_str)?;
    log::debug!("loading {} configuration for container {container}", provider.as_str());

    match provider {
        StorageProvider::Azblob => load_azblob_config(container),
        StorageProvider::S3 => load_s3_config(container, &provider_str),
        StorageProvider::Oss => load_oss_config(container),
        StorageProvider::Fs => Ok(load_fs_config(container)),
        StorageProvider::Memory => Ok(StorageConfig::memory(container)),
    }
}

/// Load Azure Blob configuration from a connection string
fn load_azblob_config(container: &str) -> Result<StorageConfig> {
    let connection_string = get_env_var(AZURE_CONNECTION_STRING_ENV, "STORAGE_CONNECTION_STRING")
        .map_err(|_| Error::MissingEnvVar {
            key: AZURE_CONNECTION_STRING_ENV.to_string(),
        })?;
    let parsed = AzureConnectionString::parse(&connection_string)?;

    let mut config = StorageConfig::azblob(container, parsed.account_name);
    config.access_key_secret = parsed.account_key;
    config.sas_token = parsed.sas_token;
    config.endpoint = Some(parsed.endpoint);
    Ok(config)
}

/// Load S3 (AWS or MinIO) configuration
fn load_s3_config(container: &str, provider_str: &str) -> Result<StorageConfig> {
    let is_minio = provider_str.eq_ignore_ascii_case("minio");

    let (key_env, secret_env) = if is_minio {
        ("MINIO_ACCESS_KEY", "MINIO_SECRET_KEY")
    } else {
        ("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY")
    };
    let access_key_id = get_env_var("STORAGE_ACCESS_KEY_ID", key_env)?;
    let secret_access_key = get_env_var("STORAGE_ACCESS_KEY_SECRET", secret_env)?;

    let region = env::var("STORAGE_REGION")
        .or_else(|_| env::var("AWS_DEFAULT_REGION"))
        .or_else(|_| env::var("MINIO_DEFAULT_REGION"))
        .ok();

    let endpoint = if is_minio {
        Some(
            env::var("STORAGE_ENDPOINT")
                .or_else(|_| env::var("MINIO_ENDPOINT"))
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
        )
    } else {
        env::var("STORAGE_ENDPOINT").ok()
    };

    let mut config = StorageConfig::s3(container, access_key_id, secret_access_key, region);
    config.endpoint = endpoint;
    Ok(config)
}

/// Load OSS (Alibaba Cloud) configuration
fn load_oss_config(container: &str) -> Result<StorageConfig> {
    let access_key_id = get_env_var("STORAGE_ACCESS_KEY_ID", "OSS_ACCESS_KEY_ID")?;
    let access_key_secret = get_env_var("STORAGE_ACCESS_KEY_SECRET", "OSS_ACCESS_KEY_SECRET")?;

    let region = env::var("STORAGE_REGION")
        .or_else(|_| env::var("OSS_REGION"))
        .ok();

    let endpoint = env::var("STORAGE_ENDPOINT")
        .or_else(|_| env::var("OSS_ENDPOINT"))
        .unwrap_or_else(|_| "https://oss-cn-hangzhou.aliyuncs.com".to_string());

    let mut config = StorageConfig::oss(container, access_key_id, access_key_secret, region);
    config.endpoint = Some(endpoint);
    Ok(config)
}

/// Load filesystem configuration; the container is a directory under the root
fn load_fs_config(container: &str) -> StorageConfig {
    let root_path = env::var("STORAGE_ROOT_PATH").unwrap_or_else(|_| DEFAULT_FS_ROOT.to_string());
    StorageConfig::fs(container, root_path)
}

/// Fields of an Azure storage connection string that the blob client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConnectionString {
    pub account_name: String,
    pub account_key: Option<String>,
    pub sas_token: Option<String>,
    pub endpoint: String,
}

impl AzureConnectionString {
    /// Parse `Key=Value;Key=Value` pairs. Values may contain '=' (base64 keys).
    pub fn parse(raw: &str) -> Result<Self> {
        let mut account_name = None;
        let mut account_key = None;
        let mut sas_token = None;
        let mut blob_endpoint = None;
        let mut protocol = DEFAULT_AZURE_PROTOCOL.to_string();
        let mut suffix = DEFAULT_AZURE_ENDPOINT_SUFFIX.to_string();

        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| Error::InvalidConnectionString {
                message: format!("segment '{pair}' is not a Key=Value pair"),
            })?;
            let value = value.trim().to_string();
            match key.trim() {
                "UseDevelopmentStorage" if value.eq_ignore_ascii_case("true") => {
                    return Ok(Self::development());
                }
                "AccountName" => account_name = Some(value),
                "AccountKey" => account_key = Some(value),
                "SharedAccessSignature" => sas_token = Some(value),
                "BlobEndpoint" => blob_endpoint = Some(value),
                "DefaultEndpointsProtocol" => protocol = value,
                "EndpointSuffix" => suffix = value,
                other => log::debug!("ignoring connection string field {other}"),
            }
        }

        let endpoint = match (&blob_endpoint, &account_name) {
            (Some(endpoint), _) => endpoint.trim_end_matches('/').to_string(),
            (None, Some(name)) => format!("{protocol}://{name}.blob.{suffix}"),
            (None, None) => {
                return Err(Error::InvalidConnectionString {
                    message: "either AccountName or BlobEndpoint is required".to_string(),
                });
            }
        };

        if account_key.is_none() && sas_token.is_none() {
            return Err(Error::InvalidConnectionString {
                message: "either AccountKey or SharedAccessSignature is required".to_string(),
            });
        }

        Ok(Self {
            account_name: account_name.unwrap_or_default(),
            account_key,
            sas_token,
            endpoint,
        })
    }

    /// The local Azurite emulator account.
    pub fn development() -> Self {
        Self {
            account_name: AZURITE_ACCOUNT_NAME.to_string(),
            account_key: Some(AZURITE_ACCOUNT_KEY.to_string()),
            sas_token: None,
            endpoint: AZURITE_BLOB_ENDPOINT.to_string(),
        }
    }
}
