//! Runtime configuration for the production collaborators.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the git executable.
pub const GIT_PROGRAM_ENV: &str = "REPOFETCH_GIT";

/// Environment variable overriding the HTTP user agent.
pub const USER_AGENT_ENV: &str = "REPOFETCH_USER_AGENT";

/// Settings for [`crate::HttpArchiveDownloader`] and [`crate::GitCli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// git executable used for clones
    pub git_program: String,
    /// User agent sent with archive downloads
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            git_program: "git".to_string(),
            user_agent: format!("repofetch/{}", crate::VERSION),
        }
    }
}

impl FetchConfig {
    /// Defaults, overridden by `REPOFETCH_GIT` and `REPOFETCH_USER_AGENT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        FetchConfig {
            git_program: std::env::var(GIT_PROGRAM_ENV).unwrap_or(defaults.git_program),
            user_agent: std::env::var(USER_AGENT_ENV).unwrap_or(defaults.user_agent),
        }
    }

    pub fn with_git_program(mut self, program: &str) -> Self {
        self.git_program = program.to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }
}
