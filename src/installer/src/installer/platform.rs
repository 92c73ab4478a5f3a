use crate::errors::{InstallError, Result};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Host operating systems a release archive is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Linux,
    Windows,
}

/// How the release asset is packed. Decided from the asset name only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    GzipStream,
}

impl Platform {
    pub fn detect() -> Result<Self> {
        std::env::consts::OS.parse()
    }

    pub fn archive_filename(&self) -> &'static str {
        match self {
            Platform::Darwin => "deno_osx_x64.gz",
            Platform::Linux => "deno_linux_x64.gz",
            Platform::Windows => "deno_win_x64.zip",
        }
    }

    pub fn executable_name(&self) -> &'static str {
        match self {
            Platform::Windows => "deno.exe",
            Platform::Darwin | Platform::Linux => "deno",
        }
    }
}

impl FromStr for Platform {
    type Err = InstallError;

    fn from_str(input: &str) -> Result<Self> {
        match input.to_lowercase().as_str() {
            "darwin" | "macos" => Ok(Self::Darwin),
            "linux" | "linux2" => Ok(Self::Linux),
            "win32" | "cygwin" | "windows" => Ok(Self::Windows),
            other => Err(InstallError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Windows => "win32",
        };
        f.write_str(name)
    }
}

impl ArchiveKind {
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".zip") {
            ArchiveKind::Zip
        } else {
            ArchiveKind::GzipStream
        }
    }
}
