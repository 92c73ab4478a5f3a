use super::download::{DownloadProgress, Downloader};
use super::extract::extract_executable;
use super::platform::Platform;
use super::url_builder::{ReleaseAsset, ReleaseUrlFinder};
use crate::config::InstallerConfig;
use crate::constants::DENO_EXE_PREFIX;
use crate::errors::{InstallError, Result};
use crate::fs::{ensure_install_dir, set_executable_permissions, write_executable};
use crate::utils::{path_list_contains, print_message, print_status, print_title, TagColor};
use colored::Colorize;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Where a run currently is. A failure records the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    PreparingDirectory,
    ResolvingUrl,
    Downloading,
    Extracting,
    Writing,
    SettingPermissions,
    Done,
}

impl Display for InstallStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let stage = match self {
            InstallStage::PreparingDirectory => "preparing the install directory",
            InstallStage::ResolvingUrl => "resolving the download url",
            InstallStage::Downloading => "downloading",
            InstallStage::Extracting => "extracting",
            InstallStage::Writing => "writing the executable",
            InstallStage::SettingPermissions => "setting permissions",
            InstallStage::Done => "finishing",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
#[error("Installation failed while {stage}")]
pub struct InstallFailure {
    pub stage: InstallStage,
    #[source]
    pub source: InstallError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub executable: PathBuf,
    pub bin_dir: PathBuf,
    /// Tag of the installed release, when it could be recovered.
    pub tag: Option<String>,
}

pub struct Installer {
    pub platform: Platform,
    pub home: PathBuf,
    pub product_dir: String,
    pub finder: ReleaseUrlFinder,
    pub downloader: Downloader,
}

impl Installer {
    pub fn from_config(config: &InstallerConfig) -> anyhow::Result<Self> {
        let platform = config.platform()?;
        let home = config.home_dir()?;
        let client = config.http_client()?;

        Ok(Self {
            platform,
            home,
            product_dir: config.product_dir.clone(),
            finder: ReleaseUrlFinder::new(
                client.clone(),
                config.release_host_url()?,
                config.repository.clone(),
            ),
            downloader: Downloader::new(client, config.chunk_size),
        })
    }

    /// Executes the install:
    /// - Ensures `<home>/.deno/bin` exists
    /// - Scrapes the release page for this platform's archive
    /// - Downloads and unpacks it into memory
    /// - Writes the executable and marks it executable
    pub async fn run(
        &self,
        tag: Option<&str>,
        progress: &mut impl DownloadProgress,
    ) -> Result<InstallOutcome, InstallFailure> {
        let mut stage = InstallStage::PreparingDirectory;
        let result = self.run_stages(tag, progress, &mut stage).await;
        result.map_err(|source| InstallFailure { stage, source })
    }

    async fn run_stages(
        &self,
        tag: Option<&str>,
        progress: &mut impl DownloadProgress,
        stage: &mut InstallStage,
    ) -> Result<InstallOutcome> {
        let bin_dir = ensure_install_dir(&self.home, &self.product_dir)?;
        let executable = bin_dir.join(self.platform.executable_name());

        enter(stage, InstallStage::ResolvingUrl);
        let asset = self.finder.find_asset(self.platform, tag).await?;
        let tag = release_tag(tag, &asset);

        match &tag {
            Some(tag) => print_message("INSTALLING", &format!("deno {tag}"), TagColor::Blue),
            None => print_message("INSTALLING", "deno@latest", TagColor::Blue),
        }
        print_message("DOWNLOADING", &asset.to_string(), TagColor::Blue);

        enter(stage, InstallStage::Downloading);
        let download = self.downloader.download(&asset.url, progress).await?;

        enter(stage, InstallStage::Extracting);
        let bytes = extract_executable(&download.bytes, asset.kind)?;
        print_message(
            "EXTRACTING",
            &format!("{} bytes ({:?})", bytes.len(), asset.kind),
            TagColor::Blue,
        );

        enter(stage, InstallStage::Writing);
        write_executable(&executable, &bytes)?;

        enter(stage, InstallStage::SettingPermissions);
        set_executable_permissions(&executable)?;

        enter(stage, InstallStage::Done);
        Ok(InstallOutcome {
            executable,
            bin_dir,
            tag,
        })
    }
}

/// The requested tag as given, or the `vX.Y.Z` in the asset url when installing latest.
fn release_tag(requested: Option<&str>, asset: &ReleaseAsset) -> Option<String> {
    requested.or_else(|| asset.tag()).map(str::to_string)
}

fn enter(stage: &mut InstallStage, next: InstallStage) {
    tracing::debug!(from = ?stage, to = ?next, "install stage");
    *stage = next;
}

/// Runs `<executable> --version` and checks that one of the words it prints is `tag`
/// without its leading `v`.
pub fn check_version(executable: &Path, tag: &str) -> Result<()> {
    let output = Command::new(executable)
        .arg("--version")
        .output()
        .map_err(|e| InstallError::fs("Failed to run", executable, e))?;

    let mut reported = String::from_utf8_lossy(&output.stdout).into_owned();
    reported.push_str(&String::from_utf8_lossy(&output.stderr));
    let reported = reported.trim().to_string();
    let expected = tag.trim_start_matches('v');

    let matches = reported
        .split_whitespace()
        .any(|word| word == expected);
    if !output.status.success() || !matches {
        return Err(InstallError::VersionMismatch {
            expected: expected.to_string(),
            found: reported,
        });
    }

    print_status("VERIFIED", "Version", expected, TagColor::Green);
    Ok(())
}

impl InstallOutcome {
    /// Prints the machine-readable `DENO_EXE:` line followed by PATH guidance.
    /// `path_var` is the caller's `$PATH`, if any.
    pub fn print_next_steps(&self, path_var: Option<&str>) {
        println!("{}{}", DENO_EXE_PREFIX, self.executable.display());

        let bin_dir = self.bin_dir.display().to_string();
        if path_var.is_some_and(|path| path_list_contains(path, &bin_dir)) {
            print_message(
                "PATH",
                &format!("{bin_dir} is already on your $PATH"),
                TagColor::Green,
            );
            return;
        }

        print_title("Next Steps");
        println!("Now manually add {} to your $PATH", bin_dir.cyan());
        println!("Example:\n");
        println!(
            "  {}\n",
            format!("echo export PATH=\"{bin_dir}\":\\$PATH >> $HOME/.bash_profile").cyan()
        );
    }
}
