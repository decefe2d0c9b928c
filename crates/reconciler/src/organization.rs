//! Whole-organization runs.
//!
//! A run first verifies that the manifest's organization exists, then executes
//! the requested sections in a fixed order: members, teams, repositories. The
//! first failure ends the run; sections that already completed keep whatever
//! they applied.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use crate::errors::{GatewayError, ReconcileError};
use crate::gateway::RemoteGateway;
use crate::manifest::Organization;
use crate::members::MemberReconciler;
use crate::report::{Mode, Reporter};
use crate::repositories::RepositoryReconciler;
use crate::teams::TeamReconciler;
use crate::RunId;

#[path = "organization_tests.rs"]
#[cfg(test)]
mod tests;

/// A part of the organization that can be reconciled on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Members,
    Teams,
    Repositories,
}

impl Section {
    /// Every section, in execution order.
    pub const ALL: [Section; 3] = [Section::Members, Section::Teams, Section::Repositories];
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: RunId,
    pub mode: Mode,
    /// Invitations issued (apply) or planned (dry-run).
    pub invitations: usize,
}

/// Runs the section reconcilers for one organization.
pub struct OrganizationReconciler {
    gateway: Arc<dyn RemoteGateway>,
    mode: Mode,
}

impl OrganizationReconciler {
    pub fn new(gateway: Arc<dyn RemoteGateway>, mode: Mode) -> Self {
        Self { gateway, mode }
    }

    /// Reconciles `sections` of `org`. Sections execute in [`Section::ALL`]
    /// order regardless of the order they are passed in.
    pub async fn run(
        &self,
        org: &Organization,
        sections: &[Section],
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary, ReconcileError> {
        let run_id = RunId::new_random();
        let span = info_span!("reconcile", run_id = %run_id, org = %org.name, mode = %self.mode);
        self.run_sections(run_id, org, sections, reporter)
            .instrument(span)
            .await
    }

    async fn run_sections(
        &self,
        run_id: RunId,
        org: &Organization,
        sections: &[Section],
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary, ReconcileError> {
        self.verify_organization(org, reporter).await?;

        let mut summary = RunSummary {
            run_id,
            mode: self.mode,
            invitations: 0,
        };

        for section in Section::ALL {
            if !sections.contains(&section) {
                continue;
            }
            match section {
                Section::Members => {
                    summary.invitations = MemberReconciler::new(self.gateway.clone(), self.mode)
                        .reconcile(org, reporter)
                        .await?;
                }
                Section::Teams => {
                    TeamReconciler::new(self.gateway.clone(), self.mode)
                        .reconcile(org, reporter)
                        .await?;
                }
                Section::Repositories => {
                    RepositoryReconciler::new(self.gateway.clone(), self.mode)
                        .reconcile(org, reporter)
                        .await?;
                }
            }
        }

        info!(invitations = summary.invitations, "reconciliation finished");
        Ok(summary)
    }

    async fn verify_organization(
        &self,
        org: &Organization,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        reporter.header("Org");
        match self.gateway.get_organization(&org.name).await {
            Ok(account) => {
                reporter.info(format!("{} exists in github", account.login));
                Ok(())
            }
            Err(GatewayError::NotFound { .. }) => {
                Err(ReconcileError::OrganizationNotFound(org.name.clone()))
            }
            Err(e) => Err(ReconcileError::from_gateway(
                format!("get organization {}", org.name),
                e,
            )),
        }
    }
}
