use assert_cmd::assert::Assert;
use assert_cmd::Command;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::convert::Infallible;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const REPOSITORY: &str = "denoland/deno";
pub const LATEST_TAG: &str = "v0.1.12";
pub const OLDER_TAG: &str = "v0.1.11";

/// Page lists two different links to the linux archive.
pub const AMBIGUOUS_TAG: &str = "v0.0.1-ambiguous";
/// Page has no link to any archive.
pub const MISSING_TAG: &str = "v0.0.2-missing";
/// Archives are streamed without a Content-Length header.
pub const NO_LENGTH_TAG: &str = "v0.0.3-nolength";
/// The zip archive holds no `deno.exe`.
pub const EMPTY_ZIP_TAG: &str = "v0.0.4-emptyzip";
/// The packed binary reports a different version than its tag.
pub const MISLABELED_TAG: &str = "v0.0.5-mislabeled";
/// Page links archives the host answers with 404.
pub const GONE_TAG: &str = "v0.0.6-gone";

const ARCHIVES: [&str; 3] = ["deno_osx_x64.gz", "deno_linux_x64.gz", "deno_win_x64.zip"];

/// A `/bin/sh` stand-in for the real binary that answers `--version` like deno does.
pub fn fake_deno(version: &str) -> String {
    format!("#!/bin/sh\necho \"deno: {version}\"\n")
}

struct Release {
    html: String,
    assets: HashMap<&'static str, Vec<u8>>,
    chunked: bool,
}

struct Releases {
    by_tag: HashMap<&'static str, Release>,
    page_hits: AtomicUsize,
    downloads: AtomicUsize,
}

/// A fake release host serving html release pages and archives, like github.com does.
pub struct TestServer {
    home: TempDir,
    handle: JoinHandle<std::io::Result<()>>,
    addr: SocketAddr,
    releases: Arc<Releases>,
}

impl TestServer {
    pub async fn launch() -> anyhow::Result<Self> {
        let home = TempDir::new()?;
        let releases = Arc::new(Releases {
            by_tag: fixtures()?,
            page_hits: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/denoland/deno/releases/latest", get(latest))
            .route("/denoland/deno/releases/tag/{tag}", get(release_page))
            .route(
                "/denoland/deno/releases/download/{tag}/{file}",
                get(release_asset),
            )
            .with_state(releases.clone());

        // 0: port is picked by the OS
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        println!("release host listening on {}", addr);

        let handle = tokio::task::spawn(async move { axum::serve(listener, app).await });

        Ok(Self {
            home,
            handle,
            addr,
            releases,
        })
    }

    pub fn home(&self) -> PathBuf {
        self.home.path().to_path_buf()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.home.path().join(".deno").join("bin")
    }

    pub fn page_hits(&self) -> usize {
        self.releases.page_hits.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.releases.downloads.load(Ordering::SeqCst)
    }

    /// The installer binary, pointed at this host and home, installing for linux.
    pub fn installer(&self) -> Command {
        let mut cmd = Command::cargo_bin("deno-install").unwrap();
        cmd.env("DENO_INSTALLER_RELEASE_HOST", format!("http://{}", self.addr));
        cmd.env("DENO_INSTALLER_HOME", self.home.path());
        cmd.env("DENO_INSTALLER_PLATFORM", "linux");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("RUST_LOG");
        cmd.timeout(std::time::Duration::from_secs(30));
        cmd
    }

    pub async fn install(&self, args: &[&str]) -> Assert {
        let mut cmd = self.installer();
        cmd.args(args);
        run(cmd).await
    }

    pub async fn finished(self) -> anyhow::Result<()> {
        self.handle.abort();
        match self.handle.await {
            Ok(result) => result?,
            Err(e) if e.is_cancelled() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

pub async fn run(mut cmd: Command) -> Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

/// The line the installer prints for scripts to pick up the binary location.
pub fn deno_exe_line(assert: &Assert) -> Option<String> {
    String::from_utf8_lossy(&assert.get_output().stdout)
        .lines()
        .find_map(|line| line.strip_prefix("DENO_EXE: ").map(str::to_string))
}

async fn latest(State(releases): State<Arc<Releases>>) -> Redirect {
    releases.page_hits.fetch_add(1, Ordering::SeqCst);
    Redirect::to(&format!("/{REPOSITORY}/releases/tag/{LATEST_TAG}"))
}

async fn release_page(
    State(releases): State<Arc<Releases>>,
    Path(tag): Path<String>,
) -> Response {
    releases.page_hits.fetch_add(1, Ordering::SeqCst);
    match releases.by_tag.get(tag.as_str()) {
        Some(release) => Html(release.html.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn release_asset(
    State(releases): State<Arc<Releases>>,
    Path((tag, file)): Path<(String, String)>,
) -> Response {
    releases.downloads.fetch_add(1, Ordering::SeqCst);

    let Some(release) = releases.by_tag.get(tag.as_str()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(bytes) = release.assets.get(file.as_str()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if release.chunked {
        // no size hint, so the body goes out chunked without Content-Length
        let chunks = bytes
            .chunks(64)
            .map(|chunk| Ok::<_, Infallible>(Bytes::copy_from_slice(chunk)))
            .collect::<Vec<_>>();
        Body::from_stream(futures_util::stream::iter(chunks)).into_response()
    } else {
        bytes.clone().into_response()
    }
}

fn fixtures() -> anyhow::Result<HashMap<&'static str, Release>> {
    let mut by_tag = HashMap::new();

    for tag in [LATEST_TAG, OLDER_TAG, NO_LENGTH_TAG] {
        let release = Release {
            html: release_html(tag, &ARCHIVES),
            assets: assets(&fake_deno(tag.trim_start_matches('v')), true)?,
            chunked: tag == NO_LENGTH_TAG,
        };
        by_tag.insert(tag, release);
    }

    by_tag.insert(
        AMBIGUOUS_TAG,
        Release {
            html: format!(
                "{}<a href=\"/{REPOSITORY}/releases/download/{AMBIGUOUS_TAG}/debug/deno_linux_x64.gz\">debug</a>",
                release_html(AMBIGUOUS_TAG, &ARCHIVES)
            ),
            assets: assets(&fake_deno("0.0.1"), true)?,
            chunked: false,
        },
    );

    by_tag.insert(
        MISSING_TAG,
        Release {
            html: release_html(MISSING_TAG, &[]),
            assets: HashMap::new(),
            chunked: false,
        },
    );

    by_tag.insert(
        EMPTY_ZIP_TAG,
        Release {
            html: release_html(EMPTY_ZIP_TAG, &ARCHIVES),
            assets: assets(&fake_deno("0.0.4"), false)?,
            chunked: false,
        },
    );

    by_tag.insert(
        MISLABELED_TAG,
        Release {
            html: release_html(MISLABELED_TAG, &ARCHIVES),
            assets: assets(&fake_deno("9.9.9"), true)?,
            chunked: false,
        },
    );

    by_tag.insert(
        GONE_TAG,
        Release {
            html: release_html(GONE_TAG, &ARCHIVES),
            assets: HashMap::new(),
            chunked: false,
        },
    );

    Ok(by_tag)
}

/// Roughly what a github release page looks like, with each quoting style the scraper has to handle.
fn release_html(tag: &str, archives: &[&str]) -> String {
    let mut html = format!(
        "<!DOCTYPE html><html><head><link href=\"/assets/site.css\" rel=\"stylesheet\"></head>\
         <body><h1>deno {tag}</h1><a href='/{REPOSITORY}/releases'>Releases</a><ul>"
    );
    for (i, archive) in archives.iter().enumerate() {
        let href = format!("/{REPOSITORY}/releases/download/{tag}/{archive}");
        let link = match i % 3 {
            0 => format!("<li><a href=\"{href}\" rel=\"nofollow\">{archive}</a></li>"),
            1 => format!("<li><a href='{href}'>{archive}</a></li>"),
            _ => format!("<li><a href={href}>{archive}</a></li>"),
        };
        html.push_str(&link);
    }
    html.push_str("</ul></body></html>");
    html
}

fn assets(
    binary: &str,
    zip_has_member: bool,
) -> anyhow::Result<HashMap<&'static str, Vec<u8>>> {
    let gz = gzip(binary.as_bytes())?;
    let member = if zip_has_member { "deno.exe" } else { "README.md" };
    let zip = zip_with(member, binary.as_bytes())?;

    Ok(HashMap::from([
        ("deno_osx_x64.gz", gz.clone()),
        ("deno_linux_x64.gz", gz),
        ("deno_win_x64.zip", zip),
    ]))
}

fn gzip(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zip_with(name: &str, data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer.start_file(name, SimpleFileOptions::default())?;
    writer.write_all(data)?;
    Ok(writer.finish()?.into_inner())
}
