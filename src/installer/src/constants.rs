pub const ENV_PREFIX: &str = "DENO_INSTALLER";

pub const DEFAULT_RELEASE_HOST: &str = "https://github.com";
pub const DEFAULT_REPOSITORY: &str = "denoland/deno";
pub const DEFAULT_PRODUCT_DIR: &str = ".deno";
pub const BIN_DIR: &str = "bin";

/// Reference read size for the asset body.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Entry read from zip archives. Fixed on every platform.
pub const ZIP_MEMBER: &str = "deno.exe";

/// Prefix of the machine-readable result line on stdout.
pub const DENO_EXE_PREFIX: &str = "DENO_EXE: ";
