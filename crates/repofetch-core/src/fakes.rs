//! Recording fakes for the fetch collaborators (testing only)
//!
//! `RecordingDownloader` and `RecordingCloner` remember every call, write a
//! small file tree into the destination the way the real services would, and
//! can be told to fail.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CloneError, DownloadError};
use crate::fetch::{ArchiveDownloader, ArchiveOptions, CloneOptions, Cloner, METADATA_DIR};

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<O> {
    pub url: String,
    pub dest: PathBuf,
    pub options: O,
}

/// Fake [`ArchiveDownloader`] that writes `files` into the destination.
#[derive(Debug, Default)]
pub struct RecordingDownloader {
    calls: Mutex<Vec<Call<ArchiveOptions>>>,
    files: Vec<(String, String)>,
    fail_status: Option<u16>,
}

impl RecordingDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files (relative path, contents) written on success.
    pub fn with_files(mut self, files: &[(&str, &str)]) -> Self {
        self.files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        self
    }

    /// Fail every call with `DownloadError::Http { status }`.
    pub fn failing_with_status(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<Call<ArchiveOptions>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveDownloader for RecordingDownloader {
    async fn download_and_extract(
        &self,
        url: &str,
        dest: &Path,
        options: &ArchiveOptions,
    ) -> Result<(), DownloadError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            options: options.clone(),
        });

        if let Some(status) = self.fail_status {
            return Err(DownloadError::Http {
                url: url.to_string(),
                status,
            });
        }

        write_files(dest, &self.files)?;
        Ok(())
    }
}

/// Fake [`Cloner`] that writes `files` plus a `.git` folder.
#[derive(Debug, Default)]
pub struct RecordingCloner {
    calls: Mutex<Vec<Call<CloneOptions>>>,
    files: Vec<(String, String)>,
    fail_stderr: Option<String>,
}

impl RecordingCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files (relative path, contents) written on success.
    pub fn with_files(mut self, files: &[(&str, &str)]) -> Self {
        self.files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        self
    }

    /// Fail every call with `CloneError::Failed` carrying `stderr`.
    pub fn failing_with(mut self, stderr: &str) -> Self {
        self.fail_stderr = Some(stderr.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call<CloneOptions>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Cloner for RecordingCloner {
    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        options: &CloneOptions,
    ) -> Result<(), CloneError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            options: options.clone(),
        });

        if let Some(stderr) = &self.fail_stderr {
            return Err(CloneError::Failed {
                step: "clone".to_string(),
                code: Some(128),
                stderr: stderr.clone(),
            });
        }

        let head = (
            format!("{METADATA_DIR}/HEAD"),
            format!("ref: refs/heads/{}\n", options.checkout),
        );
        write_files(dest, std::slice::from_ref(&head))
            .and_then(|()| write_files(dest, &self.files))
            .map_err(|source| CloneError::Spawn {
                program: "fake-git".to_string(),
                source,
            })
    }
}

fn write_files(dest: &Path, files: &[(String, String)]) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    for (relative, contents) in files {
        let path = dest.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
    }
    Ok(())
}
