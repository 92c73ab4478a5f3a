use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "deno-install",
    version,
    about = "Installs the deno executable into ~/.deno/bin"
)]
pub struct InstallDenoCli {
    /// Release tag to install, e.g. "v0.1.11". Installs the latest release when omitted.
    pub tag: Option<String>,

    /// Run the installed executable with --version and require it to match the release tag.
    #[arg(long)]
    pub check_version: bool,
}
