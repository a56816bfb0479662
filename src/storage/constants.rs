// Buffer related constants
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

// Progress related constants
// Controls how often progress is printed (in multiples of buffer size)
pub const PROGRESS_UPDATE_INTERVAL: u64 = 100;

// Filesystem default
pub const DEFAULT_FS_ROOT: &str = "./storage";

// Provider used when STORAGE_PROVIDER is unset
pub const DEFAULT_PROVIDER: &str = "azblob";

// Azure connection string defaults
pub const DEFAULT_AZURE_PROTOCOL: &str = "https";
pub const DEFAULT_AZURE_ENDPOINT_SUFFIX: &str = "core.windows.net";

// Azurite well-known development account
pub const AZURITE_ACCOUNT_NAME: &str = "devstoreaccount1";
pub const AZURITE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
pub const AZURITE_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

// Number of paths shown in a deletion confirmation
pub const DELETION_PREVIEW_LIMIT: usize = 5;
