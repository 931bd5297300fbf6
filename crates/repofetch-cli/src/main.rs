//! repofetch - fetch a repository snapshot from a short specifier
//!
//! ## Commands
//!
//! - `fetch`: download (or clone) a repository into a directory
//! - `resolve`: print the remote URL a specifier resolves to

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repofetch_core::{
    default_fetcher, derive_url, FetchConfig, FetchMode, FetchOptions, RepoDescriptor,
};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "repofetch")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch a repository from a short specifier", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a repository into a directory
    ///
    /// Specifiers look like `[github|gitlab|bitbucket:][origin:]owner/name[#ref]`
    /// or `direct:<url>[#ref]`.
    Fetch {
        /// Repository specifier
        specifier: String,

        /// Destination directory
        dest: PathBuf,

        /// Clone with git instead of downloading a zip archive
        #[arg(short, long)]
        clone: bool,

        /// git executable used for clones
        #[arg(long, env = "REPOFETCH_GIT", default_value = "git")]
        git: String,

        /// User agent sent with archive downloads
        #[arg(long, env = "REPOFETCH_USER_AGENT")]
        user_agent: Option<String>,
    },

    /// Print the remote URL for a specifier without fetching
    Resolve {
        /// Repository specifier
        specifier: String,

        /// Resolve the git remote instead of the archive URL
        #[arg(short, long)]
        clone: bool,

        /// Print the parsed descriptor and URL as JSON
        #[arg(long)]
        describe: bool,
    },
}

#[derive(Serialize)]
struct Resolution<'a> {
    descriptor: &'a RepoDescriptor,
    mode: FetchMode,
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    repofetch_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Fetch {
            specifier,
            dest,
            clone,
            git,
            user_agent,
        } => {
            let mut config = FetchConfig::default().with_git_program(&git);
            if let Some(user_agent) = user_agent {
                config = config.with_user_agent(&user_agent);
            }
            cmd_fetch(&specifier, &dest, clone, &config).await
        }
        Commands::Resolve {
            specifier,
            clone,
            describe,
        } => cmd_resolve(&specifier, clone, describe),
    }
}

async fn cmd_fetch(specifier: &str, dest: &Path, clone: bool, config: &FetchConfig) -> Result<()> {
    let descriptor = RepoDescriptor::parse(specifier)
        .with_context(|| format!("Invalid repository specifier {specifier:?}"))?;
    let fetcher = default_fetcher(config).context("Failed to set up fetcher")?;

    fetcher
        .fetch(&descriptor, dest, FetchOptions { clone })
        .await
        .with_context(|| format!("Failed to fetch {descriptor} into {}", dest.display()))?;

    info!(dest = %dest.display(), "Done");
    Ok(())
}

fn cmd_resolve(specifier: &str, clone: bool, describe: bool) -> Result<()> {
    let descriptor = RepoDescriptor::parse(specifier)
        .with_context(|| format!("Invalid repository specifier {specifier:?}"))?;
    let mode = FetchMode::from_clone_flag(clone);
    let url = derive_url(&descriptor, mode);

    if describe {
        let resolution = Resolution {
            descriptor: &descriptor,
            mode,
            url,
        };
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("{url}");
    }
    Ok(())
}
