//! The port through which reconcilers read and write remote state.
//!
//! Implementations own pagination, rate limiting, cancellation and error
//! classification. Every method returns either its payload or a classified
//! [`GatewayError`]; reconcilers never see transport details.
//!
//! The gateway is passed explicitly into every reconciler. There is no ambient
//! client.

use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::remote::{
    NewRepository, NewTeam, ProtectionRequest, RemoteAccount, RemoteProtection,
    RemoteRepository, RemoteTeam, RemoteUser, RepositoryPatch, TeamPatch,
};
use crate::{BranchName, Login, OrgName, RepoName, TeamSlug, UserId};

/// Paginated, rate-limited, classified access to a hosting organization.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    // -- accounts and membership --------------------------------------------

    /// Fetches an organization. `NotFound` if it does not exist.
    async fn get_organization(&self, org: &OrgName) -> Result<RemoteAccount, GatewayError>;

    /// Fetches a user account. `NotFound` if it does not exist.
    async fn get_user(&self, login: &Login) -> Result<RemoteAccount, GatewayError>;

    /// Lists every member of an organization across all pages.
    async fn list_members(&self, org: &OrgName) -> Result<Vec<RemoteUser>, GatewayError>;

    /// Invites the user with `invitee` id to the organization.
    async fn create_invitation(&self, org: &OrgName, invitee: UserId)
        -> Result<(), GatewayError>;

    // -- repositories --------------------------------------------------------

    /// Lists the non-archived repositories of `account`.
    ///
    /// `account` is probed as an organization first and as a user when the
    /// organization lookup is not found. Returns
    /// [`GatewayError::NoRepositories`] without paging when the account
    /// reports zero repositories.
    async fn list_repositories(
        &self,
        account: &OrgName,
    ) -> Result<Vec<RemoteRepository>, GatewayError>;

    /// Fetches a repository. `NotFound` if it does not exist.
    async fn get_repository(
        &self,
        org: &OrgName,
        repo: &RepoName,
    ) -> Result<RemoteRepository, GatewayError>;

    /// Creates a repository carrying the full projection in one call.
    async fn create_repository(
        &self,
        org: &OrgName,
        repo: &NewRepository,
    ) -> Result<(), GatewayError>;

    /// Applies a partial update; fields unset in `patch` are untouched.
    async fn update_repository(
        &self,
        org: &OrgName,
        repo: &RepoName,
        patch: &RepositoryPatch,
    ) -> Result<(), GatewayError>;

    /// Lists the topics of a repository.
    async fn list_topics(&self, org: &OrgName, repo: &RepoName)
        -> Result<Vec<String>, GatewayError>;

    /// Replaces all topics of a repository with `topics`.
    async fn set_topics(
        &self,
        org: &OrgName,
        repo: &RepoName,
        topics: &[String],
    ) -> Result<(), GatewayError>;

    /// Lists the branch names of a repository across all pages.
    async fn list_branches(
        &self,
        org: &OrgName,
        repo: &RepoName,
    ) -> Result<Vec<BranchName>, GatewayError>;

    // -- branch protection ---------------------------------------------------

    /// Fetches the protection of a branch. `NotFound` if it is unprotected.
    async fn get_branch_protection(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<RemoteProtection, GatewayError>;

    /// Creates or replaces the protection of a branch.
    async fn update_branch_protection(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
        request: &ProtectionRequest,
    ) -> Result<(), GatewayError>;

    /// Returns whether signed commits are enforced on a branch.
    ///
    /// `NotFound` when the branch has no protection at all.
    async fn get_required_signatures(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<bool, GatewayError>;

    /// Enables or disables signed-commit enforcement on a branch.
    async fn require_signed_commits(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
        enabled: bool,
    ) -> Result<(), GatewayError>;

    // -- teams ---------------------------------------------------------------

    /// Lists every team of an organization across all pages.
    async fn list_teams(&self, org: &OrgName) -> Result<Vec<RemoteTeam>, GatewayError>;

    /// Creates a team.
    async fn create_team(&self, org: &OrgName, team: &NewTeam) -> Result<(), GatewayError>;

    /// Applies a partial team update.
    async fn update_team(
        &self,
        org: &OrgName,
        team: &TeamSlug,
        patch: &TeamPatch,
    ) -> Result<(), GatewayError>;
}
