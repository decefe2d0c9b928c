//! Command-line surface.
//!
//! ```text
//! steward apply <manifest>            members, teams and repositories, applied
//! steward apply teams <manifest>      teams only, applied
//! steward check members <manifest>    members, dry-run
//! steward check repos <manifest>      repositories, dry-run
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use reconciler::{Mode, Section};

/// Reconcile a GitHub organization with its manifest.
#[derive(Parser, Debug)]
#[command(name = "steward", author, version, about, long_about = None)]
pub struct Cli {
    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// GitHub API root (GitHub Enterprise: https://<host>/api/v3)
    #[arg(
        long,
        env = "STEWARD_API_URL",
        default_value = "https://api.github.com",
        global = true
    )]
    pub api_url: String,

    /// Sustained request rate against the API
    #[arg(long, env = "STEWARD_RATE", default_value_t = 10, global = true)]
    pub requests_per_second: u32,

    /// Requests allowed back-to-back before throttling starts
    #[arg(long, default_value_t = 10, global = true)]
    pub burst: u32,

    /// Items requested per page when listing
    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u32).range(1..=100),
        global = true
    )]
    pub page_size: u32,

    /// Abort the run after this many seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,

    /// Log output format (logs go to stderr)
    #[arg(long, env = "STEWARD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply the manifest to the organization
    Apply(ApplyArgs),

    /// Report what applying the manifest would change, without changing anything
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct ApplyArgs {
    #[command(subcommand)]
    pub target: Option<ApplyTarget>,

    /// Manifest file
    #[arg(required = true)]
    pub manifest: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ApplyTarget {
    /// Apply only the teams of the manifest
    Teams {
        /// Manifest file
        manifest: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CheckTarget {
    /// Check organization membership
    Members {
        /// Manifest file
        manifest: PathBuf,
    },

    /// Check repositories, topics and branch protection
    Repos {
        /// Manifest file
        manifest: PathBuf,
    },
}

/// What a command asks the reconciler to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub mode: Mode,
    pub sections: Vec<Section>,
    pub manifest: &'a Path,
}

impl Command {
    /// Resolves the command to a mode, a set of sections and a manifest.
    /// `None` only if clap let an `apply` through without a manifest.
    pub fn invocation(&self) -> Option<Invocation<'_>> {
        let invocation = match self {
            Command::Apply(ApplyArgs {
                target: Some(ApplyTarget::Teams { manifest }),
                ..
            }) => Invocation {
                mode: Mode::Apply,
                sections: vec![Section::Teams],
                manifest,
            },
            Command::Apply(ApplyArgs {
                target: None,
                manifest,
            }) => Invocation {
                mode: Mode::Apply,
                sections: Section::ALL.to_vec(),
                manifest: manifest.as_deref()?,
            },
            Command::Check {
                target: CheckTarget::Members { manifest },
            } => Invocation {
                mode: Mode::DryRun,
                sections: vec![Section::Members],
                manifest,
            },
            Command::Check {
                target: CheckTarget::Repos { manifest },
            } => Invocation {
                mode: Mode::DryRun,
                sections: vec![Section::Repositories],
                manifest,
            },
        };
        Some(invocation)
    }
}
