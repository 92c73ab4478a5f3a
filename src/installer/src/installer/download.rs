use crate::errors::{InstallError, Result};
use futures_util::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;
use url::Url;

/// Upper bound on the buffer reserved up front from a declared size.
const MAX_PREALLOCATION: u64 = 128 * 1024 * 1024;

/// Receives a notification after every chunk read from the body.
pub trait DownloadProgress {
    fn update(&mut self, downloaded: u64, total: u64);
    fn finish(&mut self);
}

pub fn percent_complete(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    downloaded as f64 / total as f64 * 100.0
}

/// Single overwriting progress line on stderr.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template("[{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadProgress for TerminalProgress {
    fn update(&mut self, downloaded: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(downloaded);
        self.bar.set_message(format!(
            "{:.2}% downloaded",
            percent_complete(downloaded, total)
        ));
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

/// Fully buffered asset body together with the size the server announced.
#[derive(Debug)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub total_size: u64,
}

pub struct Downloader {
    client: Client,
    chunk_size: usize,
}

impl Downloader {
    pub fn new(client: Client, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    pub async fn download(
        &self,
        url: &Url,
        progress: &mut impl DownloadProgress,
    ) -> Result<Download> {
        let failed = |reason: String| InstallError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| failed(e.to_string()))?;

        let total_size = response
            .content_length()
            .ok_or_else(|| InstallError::MissingContentLength(url.to_string()))?;

        tracing::debug!(%url, total_size, chunk_size = self.chunk_size, "streaming asset");

        let reader = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
        let bytes = read_with_progress(reader, total_size, self.chunk_size, progress)
            .await
            .map_err(|e| failed(e.to_string()))?;

        // A short body is accepted as-is; nothing downstream checks the size.
        if bytes.len() as u64 != total_size {
            tracing::warn!(
                received = bytes.len(),
                declared = total_size,
                "asset size differs from Content-Length"
            );
        }

        Ok(Download { bytes, total_size })
    }
}

/// Reads `reader` to the end in `chunk_size` pieces, reporting after each one.
pub async fn read_with_progress<R>(
    mut reader: R,
    total: u64,
    chunk_size: usize,
    progress: &mut impl DownloadProgress,
) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(total.min(MAX_PREALLOCATION) as usize);
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        progress.update(buffer.len() as u64, total);
    }

    progress.finish();
    Ok(buffer)
}
