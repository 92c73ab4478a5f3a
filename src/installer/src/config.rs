use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PRODUCT_DIR, DEFAULT_RELEASE_HOST,
    DEFAULT_REPOSITORY, ENV_PREFIX,
};
use crate::errors::InstallError;
use crate::installer::Platform;
use anyhow::{Context, Result};
use config::{Config as RConfig, Environment};
use reqwest::Client;
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Runtime settings. Every field can be overridden with a `DENO_INSTALLER_<FIELD>` variable.
#[derive(Clone, Debug, Deserialize)]
pub struct InstallerConfig {
    pub release_host: String,
    pub repository: String,
    pub home: Option<PathBuf>,
    pub product_dir: String,
    pub platform: Option<String>,
    pub chunk_size: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<InstallerConfig> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load_from(environment: Environment) -> Result<InstallerConfig> {
        let config: InstallerConfig = RConfig::builder()
            .set_default("release_host", DEFAULT_RELEASE_HOST)?
            .set_default("repository", DEFAULT_REPOSITORY)?
            .set_default("product_dir", DEFAULT_PRODUCT_DIR)?
            .set_default("chunk_size", DEFAULT_CHUNK_SIZE as u64)?
            .set_default("connect_timeout_secs", DEFAULT_CONNECT_TIMEOUT_SECS)?
            .add_source(environment)
            .build()?
            .try_deserialize()
            .context("failed to parse installer configuration")?;

        Ok(config)
    }
}

impl InstallerConfig {
    pub fn release_host_url(&self) -> Result<Url> {
        Url::parse(&self.release_host)
            .with_context(|| format!("invalid release host {:?}", self.release_host))
    }

    /// The configured platform token, or the host platform when none is set.
    pub fn platform(&self) -> Result<Platform, InstallError> {
        match self.platform.as_deref() {
            Some(token) => token.parse(),
            None => Platform::detect(),
        }
    }

    /// Absolute home directory the install tree is rooted in.
    pub fn home_dir(&self) -> Result<PathBuf, InstallError> {
        let home = match &self.home {
            Some(home) => home.clone(),
            None => dirs::home_dir().ok_or_else(|| {
                InstallError::fs(
                    "Could not determine home directory",
                    "~",
                    io::Error::new(io::ErrorKind::NotFound, "no home directory"),
                )
            })?,
        };
        std::path::absolute(&home)
            .map_err(|e| InstallError::fs("Could not resolve home directory", home, e))
    }

    pub fn http_client(&self) -> Result<Client> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(self.connect_timeout_secs));
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("failed to build HTTP client")
    }
}
