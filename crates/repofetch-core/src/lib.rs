//! repofetch core library
//!
//! Resolves short repository specifiers such as `github:owner/name#branch`
//! into remote URLs and materializes the repository into a local directory,
//! either by downloading and extracting a zip snapshot or by cloning with git.
//!
//! ```no_run
//! # async fn run() -> repofetch_core::Result<()> {
//! use std::path::Path;
//! use repofetch_core::{download, FetchOptions};
//!
//! download("gitlab:acme/widget#dev", Path::new("./widget"), FetchOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod fakes;
pub mod fetch;
pub mod git;
pub mod http;
pub mod remote;
pub mod specifier;
pub mod telemetry;

use std::path::Path;

pub use config::FetchConfig;
pub use error::{CloneError, DownloadError, FetchError, ParseError, Result};
pub use fetch::{
    resolve, ArchiveDownloader, ArchiveOptions, CloneOptions, Cloner, FetchOptions, Fetcher,
    METADATA_DIR,
};
pub use git::GitCli;
pub use http::HttpArchiveDownloader;
pub use remote::{derive_url, FetchMode};
pub use specifier::{Provider, ProviderRepo, RepoDescriptor, DEFAULT_CHECKOUT};
pub use telemetry::init_tracing;

/// repofetch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetcher wired to the production collaborators.
pub type DefaultFetcher = Fetcher<HttpArchiveDownloader, GitCli>;

/// Build a [`DefaultFetcher`] from `config`.
pub fn default_fetcher(config: &FetchConfig) -> Result<DefaultFetcher> {
    Ok(Fetcher::new(
        HttpArchiveDownloader::new(config)?,
        GitCli::new(config),
    ))
}

/// Fetch `specifier` into `dest` using configuration from the environment.
///
/// Parse failures are returned before any network or process activity.
pub async fn download(specifier: &str, dest: &Path, options: FetchOptions) -> Result<()> {
    let descriptor = RepoDescriptor::parse(specifier)?;
    let fetcher = default_fetcher(&FetchConfig::from_env())?;
    fetcher.fetch(&descriptor, dest, options).await
}
