use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = InstallError> = std::result::Result<T, E>;

/// Every way a single installer run can fail. None of these are retried.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Unable to find release page {url}: {reason}")]
    ReleasePageUnavailable { url: String, reason: String },

    #[error("Unable to find download url for {filename}: {matches} matching links on {page}")]
    AmbiguousOrMissingAsset {
        filename: &'static str,
        page: String,
        matches: usize,
    },

    #[error("Download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Response for {0} has no Content-Length header")]
    MissingContentLength(String),

    #[error("Archive does not contain {0}")]
    ArchiveMemberMissing(&'static str),

    #[error("Failed to decompress archive")]
    DecompressionError(#[source] io::Error),

    #[error("{action} {}", .path.display())]
    FilesystemError {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Installed binary reports {found:?}, expected version {expected}")]
    VersionMismatch { expected: String, found: String },
}

impl InstallError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FilesystemError {
            action,
            path: path.into(),
            source,
        }
    }
}
