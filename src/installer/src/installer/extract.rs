use super::platform::ArchiveKind;
use crate::constants::ZIP_MEMBER;
use crate::errors::{InstallError, Result};
use flate2::read::GzDecoder;
use std::io::{self, Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// Pulls the executable out of a downloaded archive held in memory.
pub fn extract_executable(compressed: &[u8], kind: ArchiveKind) -> Result<Vec<u8>> {
    match kind {
        ArchiveKind::Zip => extract_from_zip(compressed),
        ArchiveKind::GzipStream => decompress_gzip(compressed),
    }
}

fn extract_from_zip(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(compressed)).map_err(zip_error)?;

    let mut member = archive.by_name(ZIP_MEMBER).map_err(|e| match e {
        ZipError::FileNotFound => InstallError::ArchiveMemberMissing(ZIP_MEMBER),
        other => zip_error(other),
    })?;

    // the declared size comes from the download, so it is not used to reserve memory
    let mut executable = Vec::new();
    member
        .read_to_end(&mut executable)
        .map_err(InstallError::DecompressionError)?;
    Ok(executable)
}

fn decompress_gzip(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut executable = Vec::new();
    GzDecoder::new(compressed)
        .read_to_end(&mut executable)
        .map_err(InstallError::DecompressionError)?;
    Ok(executable)
}

fn zip_error(e: ZipError) -> InstallError {
    match e {
        ZipError::Io(e) => InstallError::DecompressionError(e),
        other => {
            InstallError::DecompressionError(io::Error::new(io::ErrorKind::InvalidData, other))
        }
    }
}
