//! Repository specifier parsing.
//!
//! Two grammars are accepted:
//!
//! - `direct:<url>[#<checkout>]` - a complete URL used verbatim.
//! - `[<provider>:][<origin>:]<owner>/<name>[#<checkout>]` - a repository on
//!   GitHub, GitLab or Bitbucket, optionally on a self-hosted `origin`.
//!
//! Parsing is purely syntactic; nothing here touches the network.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Checkout used when a specifier names no ref.
pub const DEFAULT_CHECKOUT: &str = "master";

const DIRECT_TAG: &str = "direct";

static DIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^direct:([^#]+)(?:#(.*))?$").expect("direct specifier pattern is valid")
});

static PROVIDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(github|gitlab|bitbucket):)?(?:(.+):)?([^/]+)/([^/#]+)(?:#(.*))?$")
        .expect("provider specifier pattern is valid")
});

/// Hosting provider a repository lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    GitHub,
    GitLab,
    Bitbucket,
}

impl Provider {
    /// Host serving the provider's public repositories.
    ///
    /// Bitbucket maps to `bitbucket.com`, not `bitbucket.org`.
    pub fn public_host(self) -> &'static str {
        match self {
            Provider::GitHub => "github.com",
            Provider::GitLab => "gitlab.com",
            Provider::Bitbucket => "bitbucket.com",
        }
    }

    /// Tag used for this provider in specifiers.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::GitLab => "gitlab",
            Provider::Bitbucket => "bitbucket",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(Provider::GitHub),
            "gitlab" => Ok(Provider::GitLab),
            "bitbucket" => Ok(Provider::Bitbucket),
            other => Err(ParseError::Unrecognized {
                specifier: other.to_string(),
            }),
        }
    }
}

/// A repository hosted on a known provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProviderRepo {
    provider: Provider,
    origin: Option<String>,
    owner: String,
    name: String,
    checkout: String,
}

impl ProviderRepo {
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Custom host, if the specifier named one.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Custom host, falling back to the provider's public host.
    pub fn resolved_origin(&self) -> &str {
        self.origin
            .as_deref()
            .unwrap_or_else(|| self.provider.public_host())
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checkout(&self) -> &str {
        &self.checkout
    }
}

/// Structured form of a repository specifier.
///
/// Only constructed through [`RepoDescriptor::parse`], so the invariants
/// (non-empty `owner`/`name`/`checkout`) always hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RepoDescriptor {
    /// A complete, user-supplied location.
    Direct { url: String, checkout: String },
    /// An `owner/name` pair on a hosting provider.
    Provider(ProviderRepo),
}

impl RepoDescriptor {
    /// Parse a repository specifier.
    pub fn parse(specifier: &str) -> Result<Self, ParseError> {
        if specifier.is_empty() {
            return Err(ParseError::EmptySpecifier);
        }

        if let Some(caps) = DIRECT_RE.captures(specifier) {
            return Ok(RepoDescriptor::Direct {
                url: caps[1].to_string(),
                checkout: checkout_or_default(caps.get(2).map(|m| m.as_str())),
            });
        }

        let caps = PROVIDER_RE
            .captures(specifier)
            .ok_or_else(|| ParseError::Unrecognized {
                specifier: specifier.to_string(),
            })?;

        let provider = match caps.get(1) {
            Some(m) => m.as_str().parse()?,
            None => Provider::default(),
        };

        Ok(RepoDescriptor::Provider(ProviderRepo {
            provider,
            origin: caps.get(2).map(|m| m.as_str().to_string()),
            owner: caps[3].to_string(),
            name: caps[4].to_string(),
            checkout: checkout_or_default(caps.get(5).map(|m| m.as_str())),
        }))
    }

    /// Branch, tag or commit to fetch.
    pub fn checkout(&self) -> &str {
        match self {
            RepoDescriptor::Direct { checkout, .. } => checkout,
            RepoDescriptor::Provider(repo) => repo.checkout(),
        }
    }

    /// Whether the checkout is the default branch.
    pub fn is_default_checkout(&self) -> bool {
        self.checkout() == DEFAULT_CHECKOUT
    }
}

impl FromStr for RepoDescriptor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepoDescriptor::parse(s)
    }
}

impl fmt::Display for RepoDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoDescriptor::Direct { url, checkout } => {
                write!(f, "{DIRECT_TAG}:{url}#{checkout}")
            }
            RepoDescriptor::Provider(repo) => {
                write!(f, "{}:", repo.provider)?;
                if let Some(origin) = &repo.origin {
                    write!(f, "{origin}:")?;
                }
                write!(f, "{}/{}#{}", repo.owner, repo.name, repo.checkout)
            }
        }
    }
}

fn checkout_or_default(checkout: Option<&str>) -> String {
    match checkout {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CHECKOUT.to_string(),
    }
}
