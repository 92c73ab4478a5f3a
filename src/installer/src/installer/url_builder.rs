use super::platform::{ArchiveKind, Platform};
use crate::errors::{InstallError, Result};
use regex::Regex;
use reqwest::Client;
use std::fmt::{self, Display, Formatter};
use std::sync::LazyLock;
use url::Url;

/// Best-effort href scrape. Tolerates single, double or missing quotes.
static HREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=['"]?([^'" >]+)"#).expect("valid href pattern"));

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+\.\d+\.\d+").expect("valid tag pattern"));

/// The single downloadable archive picked from a release page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub url: Url,
    pub kind: ArchiveKind,
}

impl ReleaseAsset {
    pub fn new(url: Url) -> Self {
        let kind = ArchiveKind::from_name(url.as_str());
        Self { url, kind }
    }

    /// Release tag embedded in the download path, e.g. `v0.1.11`.
    pub fn tag(&self) -> Option<&str> {
        TAG_PATTERN.find(self.url.path()).map(|m| m.as_str())
    }
}

impl Display for ReleaseAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

pub struct ReleaseUrlFinder {
    client: Client,
    host: Url,
    repository: String,
}

impl ReleaseUrlFinder {
    pub fn new(client: Client, host: Url, repository: impl Into<String>) -> Self {
        Self {
            client,
            host,
            repository: repository.into(),
        }
    }

    /// Tag-specific page when `tag` is given, otherwise the "latest" alias.
    pub fn release_page_url(&self, tag: Option<&str>) -> Result<Url> {
        let repository = self.repository.trim_matches('/');
        let path = match tag {
            Some(tag) => format!("{repository}/releases/tag/{tag}"),
            None => format!("{repository}/releases/latest"),
        };
        self.host
            .join(&path)
            .map_err(|e| InstallError::ReleasePageUnavailable {
                url: format!("{}{}", self.host, path),
                reason: e.to_string(),
            })
    }

    pub async fn find_asset(&self, platform: Platform, tag: Option<&str>) -> Result<ReleaseAsset> {
        let filename = platform.archive_filename();
        let page = self.release_page_url(tag)?;

        tracing::debug!(%page, filename, "fetching release page");
        let html = self.fetch_page(&page).await?;

        let matching = matching_links(&html, filename);
        let [link] = matching.as_slice() else {
            return Err(InstallError::AmbiguousOrMissingAsset {
                filename,
                page: page.to_string(),
                matches: matching.len(),
            });
        };

        let url = self
            .host
            .join(link)
            .map_err(|e| InstallError::ReleasePageUnavailable {
                url: page.to_string(),
                reason: format!("invalid asset link {link:?}: {e}"),
            })?;

        tracing::info!(%url, "resolved release asset");
        Ok(ReleaseAsset::new(url))
    }

    async fn fetch_page(&self, page: &Url) -> Result<String> {
        let unavailable = |e: reqwest::Error| InstallError::ReleasePageUnavailable {
            url: page.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(page.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(unavailable)?;

        response.text().await.map_err(unavailable)
    }
}

pub fn extract_hrefs(html: &str) -> Vec<&str> {
    HREF_PATTERN
        .captures_iter(html)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .collect()
}

pub fn matching_links<'a>(html: &'a str, filename: &str) -> Vec<&'a str> {
    extract_hrefs(html)
        .into_iter()
        .filter(|href| href.contains(filename))
        .collect()
}
