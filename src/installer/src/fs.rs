//! Filesystem side of the install: the per-user directory tree and the executable file.
use crate::constants::BIN_DIR;
use crate::errors::{InstallError, Result};
use crate::utils::{print_message, TagColor};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// rwxr--r--
pub const EXECUTABLE_MODE: u32 = 0o744;

/// Makes sure `<home>/<product_dir>/bin` exists and returns it. Each level is created on its
/// own; levels that already exist are left untouched.
pub fn ensure_install_dir(home: &Path, product_dir: &str) -> Result<PathBuf> {
    let root = home.join(product_dir);
    ensure_dir(&root)?;

    let bin = root.join(BIN_DIR);
    ensure_dir(&bin)?;

    Ok(bin)
}

/// Creates a single directory if it doesn't exist. Returns `true` when it was created.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(false),
        Ok(_) => Err(InstallError::fs(
            "Expected a directory at",
            path,
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a directory"),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir(path)
                .map_err(|e| InstallError::fs("Failed to create directory", path, e))?;
            tracing::info!(path = %path.display(), "created directory");
            print_message("MKDIR", &path.display().to_string(), TagColor::Cyan);
            Ok(true)
        }
        Err(e) => Err(InstallError::fs("Cannot access directory", path, e)),
    }
}

/// Creates or truncates `path` and writes the executable into it.
pub fn write_executable(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| InstallError::fs("Failed to write executable", path, e))
}

#[cfg(unix)]
pub fn set_executable_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))
        .map_err(|e| InstallError::fs("Failed to set permissions on", path, e))
}

#[cfg(not(unix))]
pub fn set_executable_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
