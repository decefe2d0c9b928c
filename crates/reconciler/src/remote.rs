//! Live remote state and the write requests sent back to it.
//!
//! Remote values are fetched fresh on every run and carry no local identity;
//! repositories and branches are matched to manifest entries by name only.

use serde::{Deserialize, Serialize};

use crate::manifest::{Protection, Repository};
use crate::{BranchName, Login, RepoName, TeamName, TeamSlug, UserId};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// An organization or user account, with the repository counts used to
/// short-circuit empty listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAccount {
    pub id: UserId,
    pub login: String,
    pub public_repos: u64,
    /// Only reported to members of the account; zero otherwise.
    pub total_private_repos: u64,
}

impl RemoteAccount {
    /// Public plus private repositories.
    pub fn repository_count(&self) -> u64 {
        self.public_repos + self.total_private_repos
    }
}

/// A user as returned by member listing and user lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: UserId,
    pub login: Login,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// A repository as it exists remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub name: RepoName,
    pub description: Option<String>,
    pub archived: bool,
    pub private: bool,
    pub default_branch: Option<BranchName>,
    pub topics: Vec<String>,
}

impl RemoteRepository {
    /// The state a repository has right after being created from `projection`.
    ///
    /// Used as the current state for the remainder of a repository step once
    /// creation has been decided, in both dry-run and apply mode.
    pub fn projected(projection: &NewRepository) -> Self {
        Self {
            name: projection.name.clone(),
            description: projection.description.clone(),
            archived: projection.archived.unwrap_or(false),
            private: projection.private.unwrap_or(false),
            default_branch: projection.default_branch.clone(),
            topics: projection.topics.clone(),
        }
    }
}

/// Everything the manifest declares for a repository that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRepository {
    pub name: RepoName,
    pub description: Option<String>,
    pub archived: Option<bool>,
    pub private: Option<bool>,
    pub default_branch: Option<BranchName>,
    pub topics: Vec<String>,
}

impl NewRepository {
    /// Projects the manifest entry onto a creation request.
    pub fn from_manifest(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            description: repo.description.clone(),
            archived: repo.archived,
            private: repo.private,
            default_branch: repo.default_branch.clone(),
            topics: repo.labels.clone(),
        }
    }
}

/// A partial update. Fields left `None` are untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<BranchName>,
}

impl RepositoryPatch {
    /// Returns `true` if applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.archived.is_none()
            && self.private.is_none()
            && self.default_branch.is_none()
    }
}

// ---------------------------------------------------------------------------
// Branch protection
// ---------------------------------------------------------------------------

/// Existing protection of a branch. Read to detect existence; its content is
/// not compared against the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProtection {
    pub pull_request_reviews: bool,
    pub status_checks: Option<Vec<String>>,
    pub required_signatures: bool,
}

/// Marker for a pull-request-review requirement with provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReviewRequirement {}

/// A status-check requirement, optionally naming the checks that must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheckRequirement {
    pub checks: Vec<String>,
}

/// The full protection written to a branch on create and on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionRequest {
    pub pull_request_reviews: Option<PullRequestReviewRequirement>,
    pub status_checks: Option<StatusCheckRequirement>,
}

impl ProtectionRequest {
    /// Builds the request declared by a manifest protection block.
    ///
    /// A requirement is included only when its flag is `Some(true)`.
    pub fn from_manifest(protection: &Protection) -> Self {
        let pull_request_reviews = (protection.require_pr == Some(true))
            .then(PullRequestReviewRequirement::default);
        let status_checks =
            (protection.checks_must_pass == Some(true)).then(|| StatusCheckRequirement {
                checks: protection.required_checks.clone(),
            });
        Self {
            pull_request_reviews,
            status_checks,
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// A team as it exists remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTeam {
    pub name: TeamName,
    pub slug: TeamSlug,
    pub description: Option<String>,
}

/// Creation request for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: TeamName,
    pub description: Option<String>,
}

/// A partial team update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
