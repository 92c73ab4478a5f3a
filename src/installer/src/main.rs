use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use deno_install::config::ConfigLoader;
use deno_install::{error_message, success_message};
use deno_install::installer::{check_version, Installer, TerminalProgress};
use deno_install::logging::setup_logging;
use deno_install::types::InstallDenoCli;

fn main() {
    let args = InstallDenoCli::parse();

    if let Err(err) = setup_logging() {
        eprintln!("Failed to set up logging: {err}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error_message!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(run(args)) {
        error_message!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(args: InstallDenoCli) -> Result<()> {
    let config = ConfigLoader::load()?;
    tracing::debug!(?config, "loaded configuration");

    let installer = Installer::from_config(&config).context("Can't set up installer")?;

    let mut progress = TerminalProgress::new();
    let outcome = installer.run(args.tag.as_deref(), &mut progress).await?;

    if args.check_version {
        match outcome.tag.as_deref() {
            Some(tag) => check_version(&outcome.executable, tag)?,
            None => tracing::warn!("no release tag known, skipping version check"),
        }
    }

    success_message!("deno installed to {}", outcome.executable.display());

    let path_var = std::env::var("PATH").ok();
    outcome.print_next_steps(path_var.as_deref());
    Ok(())
}
