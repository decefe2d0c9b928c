//! Request and response bodies of the GitHub REST API.
//!
//! Responses carry many more fields than listed; unknown fields are ignored.
//! Users and teams decode straight into the domain's `RemoteUser` and
//! `RemoteTeam`, which use the same field names.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use reconciler::{
    BranchName, NewRepository, NewTeam, ProtectionRequest, RemoteAccount, RemoteProtection,
    RemoteRepository, RepoName, UserId,
};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct AccountBody {
    id: UserId,
    login: String,
    #[serde(default)]
    public_repos: u64,
    /// Absent unless the token belongs to a member of the account.
    #[serde(default)]
    total_private_repos: u64,
}

impl From<AccountBody> for RemoteAccount {
    fn from(body: AccountBody) -> Self {
        Self {
            id: body.id,
            login: body.login,
            public_repos: body.public_repos,
            total_private_repos: body.total_private_repos,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InvitationBody {
    pub invitee_id: UserId,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryBody {
    name: RepoName,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

impl From<RepositoryBody> for RemoteRepository {
    fn from(body: RepositoryBody) -> Self {
        Self {
            name: body.name,
            description: body.description.filter(|d| !d.is_empty()),
            archived: body.archived,
            private: body.private,
            default_branch: body.default_branch.and_then(BranchName::new),
            topics: body.topics,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRepositoryBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    private: Option<bool>,
    /// Creates an initial commit so the repository has a default branch.
    auto_init: bool,
}

impl<'a> From<&'a NewRepository> for CreateRepositoryBody<'a> {
    fn from(repo: &'a NewRepository) -> Self {
        Self {
            name: repo.name.as_str(),
            description: repo.description.as_deref(),
            private: repo.private,
            auto_init: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TopicsBody {
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BranchBody {
    pub name: BranchName,
}

// ---------------------------------------------------------------------------
// Branch protection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CheckBody {
    context: String,
}

#[derive(Debug, Deserialize)]
struct StatusChecksBody {
    #[serde(default)]
    checks: Vec<CheckBody>,
    /// Older field, still populated alongside `checks`.
    #[serde(default)]
    contexts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnabledBody {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProtectionBody {
    #[serde(default)]
    required_pull_request_reviews: Option<IgnoredAny>,
    #[serde(default)]
    required_status_checks: Option<StatusChecksBody>,
    #[serde(default)]
    required_signatures: Option<EnabledBody>,
}

impl From<ProtectionBody> for RemoteProtection {
    fn from(body: ProtectionBody) -> Self {
        let status_checks = body.required_status_checks.map(|s| {
            if s.checks.is_empty() {
                s.contexts
            } else {
                s.checks.into_iter().map(|c| c.context).collect()
            }
        });
        Self {
            pull_request_reviews: body.required_pull_request_reviews.is_some(),
            status_checks,
            required_signatures: body.required_signatures.is_some_and(|s| s.enabled),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusChecksRequestBody {
    strict: bool,
    checks: Vec<CheckBody>,
}

#[derive(Debug, Serialize)]
struct PullRequestReviewsRequestBody {
    dismiss_stale_reviews: bool,
    require_code_owner_reviews: bool,
    required_approving_review_count: u8,
}

/// Full replacement of a branch's protection. Every key must be present;
/// `null` disables the corresponding rule.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateProtectionBody {
    required_status_checks: Option<StatusChecksRequestBody>,
    enforce_admins: Option<bool>,
    required_pull_request_reviews: Option<PullRequestReviewsRequestBody>,
    restrictions: Option<serde_json::Value>,
}

impl From<&ProtectionRequest> for UpdateProtectionBody {
    fn from(request: &ProtectionRequest) -> Self {
        Self {
            required_status_checks: request.status_checks.as_ref().map(|s| StatusChecksRequestBody {
                strict: false,
                checks: s
                    .checks
                    .iter()
                    .map(|c| CheckBody { context: c.clone() })
                    .collect(),
            }),
            enforce_admins: None,
            required_pull_request_reviews: request.pull_request_reviews.as_ref().map(|_| {
                PullRequestReviewsRequestBody {
                    dismiss_stale_reviews: false,
                    require_code_owner_reviews: false,
                    required_approving_review_count: 0,
                }
            }),
            restrictions: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct CreateTeamBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a NewTeam> for CreateTeamBody<'a> {
    fn from(team: &'a NewTeam) -> Self {
        Self {
            name: team.name.as_str(),
            description: team.description.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
