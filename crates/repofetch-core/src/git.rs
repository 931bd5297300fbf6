//! Clone service backed by the `git` executable.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::CloneError;
use crate::fetch::{CloneOptions, Cloner};

/// Runs `git clone [--depth 1] -- <url> <dest>` followed by
/// `git checkout <checkout> --` inside `dest`.
///
/// URLs and refs starting with `-` are refused before git is started.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl GitCli {
    pub fn new(config: &FetchConfig) -> Self {
        GitCli {
            program: config.git_program.clone(),
        }
    }

    /// Check whether the configured git executable can be run.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn run(&self, step: &str, command: &mut Command) -> Result<(), CloneError> {
        let output = command
            .output()
            .await
            .map_err(|source| CloneError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        check_status(step, &output)
    }
}

#[async_trait]
impl Cloner for GitCli {
    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        options: &CloneOptions,
    ) -> Result<(), CloneError> {
        reject_leading_dash("url", url)?;
        reject_leading_dash("ref", &options.checkout)?;

        debug!(%url, dest = %dest.display(), shallow = options.shallow, "Cloning repository");

        let mut clone = Command::new(&self.program);
        clone.arg("clone").arg("--quiet");
        if options.shallow {
            clone.args(["--depth", "1"]);
        }
        clone.arg("--").arg(url).arg(dest);
        self.run("clone", &mut clone).await?;

        debug!(checkout = %options.checkout, "Checking out ref");
        let mut checkout = Command::new(&self.program);
        checkout
            .args(["checkout", "--quiet", options.checkout.as_str(), "--"])
            .current_dir(dest);
        self.run("checkout", &mut checkout).await
    }
}

fn reject_leading_dash(what: &'static str, value: &str) -> Result<(), CloneError> {
    if value.starts_with('-') {
        return Err(CloneError::LeadingDash {
            what,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_status(step: &str, output: &Output) -> Result<(), CloneError> {
    if output.status.success() {
        return Ok(());
    }
    Err(CloneError::Failed {
        step: step.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}
