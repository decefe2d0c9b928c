//! Desired-state shapes for an organization.
//!
//! Every optional field uses three-valued semantics: `None` means the field is
//! not managed, `Some(v)` means `v` is authoritative and must match the remote.
//! Absence is never read as "clear this field". The manifest is read-only
//! input; reconcilers only borrow it.
//!
//! The on-disk format is owned by the caller; these types only fix the field
//! names used when deserializing.

use serde::{Deserialize, Serialize};

use crate::{BranchName, Login, OrgName, RepoName, TeamName};

/// Root of a manifest: one organization and everything it should contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization login.
    pub name: OrgName,

    /// Members, in manifest order.
    #[serde(default)]
    pub people: Vec<People>,

    /// Teams.
    #[serde(default)]
    pub teams: Vec<Team>,

    /// Managed repositories.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// A member of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct People {
    /// Display name, used only for reporting.
    pub name: String,

    /// Remote login. Matched against remote members ignoring case.
    pub username: Login,
}

/// A team of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team name; matched against remote teams ignoring case.
    pub name: TeamName,

    /// Team description; `None` leaves the remote description untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A repository and the settings the manifest manages for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Identity key.
    pub name: RepoName,

    /// Compared ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,

    /// Compared ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<BranchName>,

    /// Topics, treated as an unordered set. An empty list leaves topics
    /// unmanaged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Branches that carry protection rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protected_branches: Vec<Branch>,
}

impl Repository {
    /// Creates a repository entry that manages nothing but its existence.
    pub fn named(name: RepoName) -> Self {
        Self {
            name,
            description: None,
            archived: None,
            private: None,
            default_branch: None,
            labels: Vec::new(),
            protected_branches: Vec::new(),
        }
    }
}

/// A protected branch of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Identity key within the repository.
    pub name: BranchName,

    #[serde(default)]
    pub protection: Protection,
}

/// Protection rules declared for a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protection {
    /// Require changes to arrive through a reviewed pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_pr: Option<bool>,

    /// Require status checks to pass before merging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_must_pass: Option<bool>,

    /// Named checks that must pass; only meaningful with `checks_must_pass`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_checks: Vec<String>,

    /// Require signed commits. Reconciled against its own endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_commits: Option<bool>,
}
