//! Fetch dispatch.
//!
//! [`Fetcher`] derives the remote URL for a descriptor and hands it to one of
//! two collaborators:
//! - [`ArchiveDownloader`]: download a zip snapshot and extract it
//! - [`Cloner`]: clone with git, after which the `.git` folder is removed
//!
//! Collaborator errors are returned untouched.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CloneError, DownloadError, FetchError, Result};
use crate::remote::{derive_url, FetchMode};
use crate::specifier::{RepoDescriptor, DEFAULT_CHECKOUT};

/// Name of the version-control metadata folder stripped after a clone.
pub const METADATA_DIR: &str = ".git";

/// Accept header sent for archive downloads.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Options for a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FetchOptions {
    /// Clone with git instead of downloading an archive.
    pub clone: bool,
}

impl FetchOptions {
    pub fn clone_repo() -> Self {
        FetchOptions { clone: true }
    }

    pub fn mode(&self) -> FetchMode {
        FetchMode::from_clone_flag(self.clone)
    }
}

/// How an archive download should be unpacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveOptions {
    /// Unpack the archive rather than saving it as-is.
    pub extract: bool,
    /// Leading path components dropped from every entry.
    pub strip: usize,
    /// Permission bits applied to extracted files.
    pub mode: Option<u32>,
    /// Value of the `Accept` request header.
    pub accept: String,
}

impl ArchiveOptions {
    /// Provider archives wrap their content in a single `<name>-<checkout>`
    /// folder, hence `strip: 1`.
    pub fn provider_snapshot() -> Self {
        ArchiveOptions {
            extract: true,
            strip: 1,
            mode: Some(0o666),
            accept: ZIP_CONTENT_TYPE.to_string(),
        }
    }
}

/// How a clone should be performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneOptions {
    /// Ref checked out after cloning.
    pub checkout: String,
    /// Clone with `--depth 1`.
    pub shallow: bool,
}

impl CloneOptions {
    /// Shallow only for the default branch.
    pub fn for_checkout(checkout: &str) -> Self {
        CloneOptions {
            checkout: checkout.to_string(),
            shallow: checkout == DEFAULT_CHECKOUT,
        }
    }

    /// Options for cloning `descriptor`: its ref, shallow on the default branch.
    pub fn for_descriptor(descriptor: &RepoDescriptor) -> Self {
        CloneOptions {
            checkout: descriptor.checkout().to_string(),
            shallow: descriptor.is_default_checkout(),
        }
    }
}

/// Downloads an archive and populates `dest` from it.
#[async_trait]
pub trait ArchiveDownloader: Send + Sync {
    async fn download_and_extract(
        &self,
        url: &str,
        dest: &Path,
        options: &ArchiveOptions,
    ) -> std::result::Result<(), DownloadError>;
}

/// Clones a repository into `dest`.
#[async_trait]
pub trait Cloner: Send + Sync {
    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        options: &CloneOptions,
    ) -> std::result::Result<(), CloneError>;
}

/// Dispatches fetches to an archive downloader or a cloner.
#[derive(Debug, Clone)]
pub struct Fetcher<D, C> {
    downloader: D,
    cloner: C,
}

impl<D, C> Fetcher<D, C>
where
    D: ArchiveDownloader,
    C: Cloner,
{
    pub fn new(downloader: D, cloner: C) -> Self {
        Fetcher { downloader, cloner }
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    pub fn cloner(&self) -> &C {
        &self.cloner
    }

    /// Materialize `descriptor` into `dest`.
    pub async fn fetch(
        &self,
        descriptor: &RepoDescriptor,
        dest: &Path,
        options: FetchOptions,
    ) -> Result<()> {
        let mode = options.mode();
        let url = derive_url(descriptor, mode);
        debug!(%url, ?mode, dest = %dest.display(), "Derived remote URL");

        match mode {
            FetchMode::Clone => {
                let clone_options = CloneOptions::for_descriptor(descriptor);
                self.cloner.clone_repo(&url, dest, &clone_options).await?;
                strip_metadata(dest)?;
            }
            FetchMode::Archive => {
                self.downloader
                    .download_and_extract(&url, dest, &ArchiveOptions::provider_snapshot())
                    .await?;
            }
        }

        info!(%url, dest = %dest.display(), "Fetched repository");
        Ok(())
    }

    /// Parse `specifier` and fetch it. Parse failures return before any
    /// collaborator is called.
    pub async fn download(&self, specifier: &str, dest: &Path, options: FetchOptions) -> Result<()> {
        let descriptor = RepoDescriptor::parse(specifier)?;
        self.fetch(&descriptor, dest, options).await
    }
}

/// Parse `specifier` and derive its URL without fetching anything.
pub fn resolve(specifier: &str, mode: FetchMode) -> Result<String> {
    let descriptor = RepoDescriptor::parse(specifier)?;
    Ok(derive_url(&descriptor, mode))
}

fn strip_metadata(dest: &Path) -> Result<()> {
    let metadata = dest.join(METADATA_DIR);
    match std::fs::remove_dir_all(&metadata) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FetchError::Cleanup {
            path: metadata,
            source,
        }),
    }
}
