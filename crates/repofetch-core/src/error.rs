//! Error taxonomy for repofetch.
//!
//! Parse failures are raised before any network or process activity.
//! Transport and clone failures come from the collaborators and are carried
//! through [`FetchError`] transparently, so callers see the collaborator's
//! own message and source chain.

/// Errors produced while parsing a repository specifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("repository specifier must not be empty")]
    EmptySpecifier,

    #[error("unrecognized repository specifier: {specifier:?}")]
    Unrecognized { specifier: String },
}

/// Errors produced by an archive download service.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with a non-success status.
    #[error("download of {url} failed with HTTP {status}")]
    Http { url: String, status: u16 },

    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The body was not a readable zip archive.
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by a clone service.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// The git executable could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A git step exited unsuccessfully.
    #[error("git {step} failed{}: {stderr}", exit_suffix(.code))]
    Failed {
        step: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A URL or ref starts with `-` and would be read by git as an option.
    #[error("refusing git {what} starting with '-': {value:?}")]
    LeadingDash { what: &'static str, value: String },
}

fn exit_suffix(code: &Option<i32>) -> String {
    code.map(|c| format!(" with exit code {c}")).unwrap_or_default()
}

/// Errors surfaced by [`crate::fetch`] and [`crate::download`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Clone(#[from] CloneError),

    /// Removing the clone's metadata folder failed.
    #[error("failed to remove {}: {source}", .path.display())]
    Cleanup {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for repofetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
