//! Organization membership reconciliation.
//!
//! Membership is only ever added to. Remote members missing from the manifest
//! are reported as unmanaged and left alone; manifest members missing
//! remotely are queued for invitation. Logins compare ignoring case.
//!
//! Deciding to invite and performing the invitation are separate phases: the
//! planning step fills an [`InvitationQueue`], and [`InvitationQueue::drain`]
//! issues the invitations (or, in dry-run, only reports them).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::{GatewayResultExt, ReconcileError};
use crate::gateway::RemoteGateway;
use crate::manifest::{Organization, People};
use crate::remote::RemoteUser;
use crate::report::{Mode, Reporter, Verb};
use crate::{Login, OrgName};

#[path = "members_tests.rs"]
#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Outcome of comparing manifest people with remote members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDiff<'a> {
    /// Remote members the manifest declares, in remote order.
    pub managed: Vec<&'a Login>,
    /// Remote members the manifest does not declare, in remote order.
    pub unmanaged: Vec<&'a Login>,
    /// Manifest people with no remote membership, in manifest order.
    pub missing: Vec<&'a People>,
}

/// Compares `people` with `remote` members by login, ignoring case.
pub fn membership_diff<'a>(people: &'a [People], remote: &'a [RemoteUser]) -> MembershipDiff<'a> {
    let declared = |login: &Login| people.iter().any(|p| p.username.eq_ignore_case(login.as_str()));

    let (managed, unmanaged): (Vec<&Login>, Vec<&Login>) = remote
        .iter()
        .map(|member| &member.login)
        .partition(|login| declared(*login));

    let missing = people
        .iter()
        .filter(|p| {
            !remote
                .iter()
                .any(|member| member.login.eq_ignore_case(p.username.as_str()))
        })
        .collect();

    MembershipDiff {
        managed,
        unmanaged,
        missing,
    }
}

// ---------------------------------------------------------------------------
// Deferred invitations
// ---------------------------------------------------------------------------

/// An invitation decided during planning and not yet issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInvitation {
    pub login: Login,
    pub display_name: String,
}

/// Ordered work list of invitations for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationQueue {
    org: OrgName,
    pending: Vec<PendingInvitation>,
}

impl InvitationQueue {
    pub fn new(org: OrgName) -> Self {
        Self {
            org,
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, person: &People) {
        self.pending.push(PendingInvitation {
            login: person.username.clone(),
            display_name: person.name.clone(),
        });
    }

    pub fn pending(&self) -> &[PendingInvitation] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Issues the queued invitations in order and returns how many were
    /// processed. In dry-run nothing is sent; each invitation is only reported.
    ///
    /// Stops at the first failure. A login that does not resolve to an
    /// account fails with [`ReconcileError::UserNotFound`].
    pub async fn drain(
        self,
        gateway: &dyn RemoteGateway,
        mode: Mode,
        reporter: &mut dyn Reporter,
    ) -> Result<usize, ReconcileError> {
        let count = self.pending.len();

        for invitation in self.pending {
            if !mode.is_dry_run() {
                let user = match gateway.get_user(&invitation.login).await {
                    Ok(user) => user,
                    Err(e) if e.is_not_found() => {
                        return Err(ReconcileError::UserNotFound(invitation.login))
                    }
                    Err(e) => {
                        return Err(ReconcileError::from_gateway(
                            format!("get user {}", invitation.login),
                            e,
                        ))
                    }
                };

                gateway
                    .create_invitation(&self.org, user.id)
                    .await
                    .context(format!("invite {}", invitation.login))?;
                info!(login = %invitation.login, "invitation sent");
            }

            reporter.change(Verb::Invite, mode, invitation.login.to_string());
        }

        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Reconciles organization membership.
pub struct MemberReconciler {
    gateway: Arc<dyn RemoteGateway>,
    mode: Mode,
}

impl MemberReconciler {
    pub fn new(gateway: Arc<dyn RemoteGateway>, mode: Mode) -> Self {
        Self { gateway, mode }
    }

    /// Reports the membership diff and returns the invitations to issue.
    #[instrument(skip_all, fields(org = %org.name))]
    pub async fn plan(
        &self,
        org: &Organization,
        reporter: &mut dyn Reporter,
    ) -> Result<InvitationQueue, ReconcileError> {
        reporter.header("Members");

        let remote = self
            .gateway
            .list_members(&org.name)
            .await
            .context(format!("list members of {}", org.name))?;
        let diff = membership_diff(&org.people, &remote);

        for member in &remote {
            if diff.unmanaged.contains(&&member.login) {
                reporter.warn(format!("{} exists in github but not in manifest", member.login));
            } else {
                reporter.info(format!("{} exists in github", member.login));
            }
        }

        let mut queue = InvitationQueue::new(org.name.clone());
        for person in diff.missing {
            queue.push(person);
        }
        Ok(queue)
    }

    /// Runs the `Members` section: plan, then drain the invitation queue.
    pub async fn reconcile(
        &self,
        org: &Organization,
        reporter: &mut dyn Reporter,
    ) -> Result<usize, ReconcileError> {
        let queue = self.plan(org, reporter).await?;
        queue.drain(self.gateway.as_ref(), self.mode, reporter).await
    }
}
