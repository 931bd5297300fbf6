//! Archive downloads over HTTP.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use crate::archive::extract_zip;
use crate::config::FetchConfig;
use crate::error::DownloadError;
use crate::fetch::{ArchiveDownloader, ArchiveOptions};

/// Downloads archives with `reqwest` and unpacks them with `zip`.
#[derive(Debug, Clone)]
pub struct HttpArchiveDownloader {
    client: Client,
}

impl HttpArchiveDownloader {
    /// Build a downloader with the configured user agent.
    pub fn new(config: &FetchConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(DownloadError::Client)?;
        Ok(HttpArchiveDownloader { client })
    }

    /// Use an existing client.
    pub fn with_client(client: Client) -> Self {
        HttpArchiveDownloader { client }
    }

    async fn fetch_bytes(&self, url: &str, accept: &str) -> Result<Vec<u8>, DownloadError> {
        let request_err = |source| DownloadError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_err)?;
        debug!(%url, bytes = body.len(), "Downloaded archive");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ArchiveDownloader for HttpArchiveDownloader {
    async fn download_and_extract(
        &self,
        url: &str,
        dest: &Path,
        options: &ArchiveOptions,
    ) -> Result<(), DownloadError> {
        let data = self.fetch_bytes(url, &options.accept).await?;

        if !options.extract {
            tokio::fs::create_dir_all(dest).await?;
            tokio::fs::write(dest.join(file_name_from_url(url)), &data).await?;
            return Ok(());
        }

        let dest = dest.to_path_buf();
        let strip = options.strip;
        let mode = options.mode;
        let files = tokio::task::spawn_blocking(move || extract_zip(&data, &dest, strip, mode))
            .await
            .map_err(|e| DownloadError::Io(std::io::Error::other(e)))??;
        debug!(%url, files, "Extracted archive");
        Ok(())
    }
}

/// Last path segment of `url`, without query or fragment.
fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
}
