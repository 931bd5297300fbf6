//! Remote URL derivation.
//!
//! Turns a [`RepoDescriptor`] into the URL the chosen fetch strategy needs:
//! a zip snapshot for archive mode, a git remote for clone mode. Direct
//! descriptors bypass all host and protocol handling.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::specifier::{Provider, ProviderRepo, RepoDescriptor};

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(f|ht)tps?://").expect("scheme pattern is valid"));

static SSH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^git@").expect("ssh pattern is valid"));

/// Strategy used to materialize a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Download a zip snapshot and extract it.
    #[default]
    Archive,
    /// Clone with git, then drop the `.git` folder.
    Clone,
}

impl FetchMode {
    pub fn from_clone_flag(clone: bool) -> Self {
        if clone {
            FetchMode::Clone
        } else {
            FetchMode::Archive
        }
    }

    pub fn is_clone(self) -> bool {
        self == FetchMode::Clone
    }
}

/// Derive the remote URL for `descriptor` under `mode`.
pub fn derive_url(descriptor: &RepoDescriptor, mode: FetchMode) -> String {
    match descriptor {
        RepoDescriptor::Direct { url, .. } => url.clone(),
        RepoDescriptor::Provider(repo) => provider_url(repo, mode),
    }
}

fn provider_url(repo: &ProviderRepo, mode: FetchMode) -> String {
    let origin = with_protocol(repo.resolved_origin(), mode);
    let joiner = if SSH_RE.is_match(&origin) { ':' } else { '/' };
    let base = format!("{origin}{joiner}{}/{}", repo.owner(), repo.name());

    match mode {
        FetchMode::Clone => format!("{base}.git"),
        FetchMode::Archive => {
            let checkout = repo.checkout();
            match repo.provider() {
                Provider::GitHub => format!("{base}/archive/{checkout}.zip"),
                Provider::GitLab => format!("{base}/repository/archive.zip?ref={checkout}"),
                Provider::Bitbucket => format!("{base}/get/{checkout}.zip"),
            }
        }
    }
}

/// Prefix `origin` with `git@` (clone) or `https://` (archive) unless it
/// already carries an http(s) or ftp(s) scheme.
fn with_protocol(origin: &str, mode: FetchMode) -> String {
    if SCHEME_RE.is_match(origin) {
        return origin.to_string();
    }
    match mode {
        FetchMode::Clone => format!("git@{origin}"),
        FetchMode::Archive => format!("https://{origin}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(spec: &str, mode: FetchMode) -> String {
        derive_url(&RepoDescriptor::parse(spec).unwrap(), mode)
    }

    #[test]
    fn test_github_archive_url() {
        assert_eq!(
            url("github:acme/widget#v1.0", FetchMode::Archive),
            "https://github.com/acme/widget/archive/v1.0.zip"
        );
    }

    #[test]
    fn test_github_clone_url() {
        assert_eq!(
            url("github:acme/widget#v1.0", FetchMode::Clone),
            "git@github.com:acme/widget.git"
        );
    }

    #[test]
    fn test_gitlab_archive_url_uses_ref_query() {
        assert_eq!(
            url("gitlab:acme/widget#dev", FetchMode::Archive),
            "https://gitlab.com/acme/widget/repository/archive.zip?ref=dev"
        );
    }

    #[test]
    fn test_bitbucket_archive_url() {
        assert_eq!(
            url("bitbucket:acme/widget#main", FetchMode::Archive),
            "https://bitbucket.com/acme/widget/get/main.zip"
        );
    }

    #[test]
    fn test_custom_origin_clone_uses_ssh() {
        assert_eq!(
            url("gitlab:myhost.com:owner/name#dev", FetchMode::Clone),
            "git@myhost.com:owner/name.git"
        );
    }

    #[test]
    fn test_origin_with_scheme_is_not_prefixed() {
        assert_eq!(
            url("gitlab:https://git.corp.example:team/tool", FetchMode::Clone),
            "https://git.corp.example/team/tool.git"
        );
        assert_eq!(
            url("gitlab:HTTP://git.corp.example:team/tool", FetchMode::Archive),
            "HTTP://git.corp.example/team/tool/repository/archive.zip?ref=master"
        );
    }

    #[test]
    fn test_direct_url_ignores_mode() {
        let spec = "direct:https://example.com/x.zip#v2";
        assert_eq!(url(spec, FetchMode::Archive), "https://example.com/x.zip");
        assert_eq!(url(spec, FetchMode::Clone), "https://example.com/x.zip");
    }

    #[test]
    fn test_with_protocol() {
        assert_eq!(with_protocol("ftp://mirror", FetchMode::Clone), "ftp://mirror");
        assert_eq!(with_protocol("host", FetchMode::Clone), "git@host");
        assert_eq!(with_protocol("host", FetchMode::Archive), "https://host");
    }

    #[test]
    fn test_fetch_mode_from_flag() {
        assert_eq!(FetchMode::from_clone_flag(true), FetchMode::Clone);
        assert_eq!(FetchMode::from_clone_flag(false), FetchMode::Archive);
        assert_eq!(FetchMode::default(), FetchMode::Archive);
    }
}
