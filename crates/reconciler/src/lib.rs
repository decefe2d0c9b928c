//! Reconciliation domain for Steward.
//!
//! Steward compares a declarative organization manifest with the live state of
//! a GitHub organization and converges the remote: members are invited, teams
//! and repositories are created or patched, topics are replaced and branch
//! protection is written. Everything a run decides is recorded in an ordered
//! report, identically in dry-run and apply mode.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! All remote access goes through [`RemoteGateway`]; the `github` crate
//! provides the REST implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`OrgName`, `RepoName`, `UserId`, `RunId`, etc.) |
//! | [`errors`] | `GatewayError` classification and run-level `ReconcileError` |
//! | [`manifest`] | Desired-state shapes with three-valued optional fields |
//! | [`remote`] | Live remote state and write requests |
//! | [`gateway`] | The `RemoteGateway` port trait |
//! | [`report`] | Dry-run/apply report entries and the `Reporter` sink |
//! | [`members`] | Membership diff and deferred invitations |
//! | [`teams`] | Team creation and description updates |
//! | [`repositories`] | Repository settings and topics |
//! | [`protection`] | Branch protection and signed commits |
//! | [`organization`] | Ordered multi-section runs |

pub mod errors;
pub mod gateway;
pub mod identifiers;
pub mod manifest;
pub mod members;
pub mod organization;
pub mod protection;
pub mod remote;
pub mod report;
pub mod repositories;
pub mod teams;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the commonly used types at the crate root.
pub use errors::{FailureKind, GatewayError, GatewayResultExt, ReconcileError};
pub use gateway::RemoteGateway;
pub use identifiers::{BranchName, Login, OrgName, RepoName, RunId, TeamName, TeamSlug, UserId};
pub use manifest::{Branch, Organization, People, Protection, Repository, Team};
pub use members::{membership_diff, InvitationQueue, MemberReconciler, MembershipDiff, PendingInvitation};
pub use organization::{OrganizationReconciler, RunSummary, Section};
pub use remote::{
    NewRepository, NewTeam, ProtectionRequest, PullRequestReviewRequirement, RemoteAccount,
    RemoteProtection, RemoteRepository, RemoteTeam, RemoteUser, RepositoryPatch,
    StatusCheckRequirement, TeamPatch,
};
pub use report::{ActionLog, Category, Mode, ReportEntry, Reporter, Verb};
pub use repositories::{plan_patch, topics_match, RepositoryReconciler};
pub use teams::{plan_team_patch, TeamReconciler};
