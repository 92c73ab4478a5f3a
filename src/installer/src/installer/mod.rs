mod download;
mod extract;
mod install;
mod platform;
mod url_builder;

pub use download::{
    percent_complete, read_with_progress, Download, DownloadProgress, Downloader,
    TerminalProgress,
};
pub use extract::extract_executable;
pub use install::{check_version, InstallFailure, InstallOutcome, InstallStage, Installer};
pub use platform::{ArchiveKind, Platform};
pub use url_builder::{extract_hrefs, matching_links, ReleaseAsset, ReleaseUrlFinder};
