//! Team reconciliation: the same diff/apply contract as repositories with a
//! single managed field.
//!
//! Teams match by name ignoring case. Absent teams are created; present teams
//! get their description patched only when the manifest sets one that differs.
//! Unmanaged remote teams are reported and left alone. Team membership is not
//! managed here.

use std::sync::Arc;

use tracing::instrument;

use crate::errors::{GatewayResultExt, ReconcileError};
use crate::gateway::RemoteGateway;
use crate::manifest::{Organization, Team};
use crate::remote::{NewTeam, RemoteTeam, TeamPatch};
use crate::report::{Category, Mode, ReportEntry, Reporter, Verb};
use crate::OrgName;

#[path = "teams_tests.rs"]
#[cfg(test)]
mod tests;

/// Reconciles the teams of an organization.
pub struct TeamReconciler {
    gateway: Arc<dyn RemoteGateway>,
    mode: Mode,
}

impl TeamReconciler {
    pub fn new(gateway: Arc<dyn RemoteGateway>, mode: Mode) -> Self {
        Self { gateway, mode }
    }

    /// Runs the `Teams` section.
    #[instrument(skip_all, fields(org = %org.name, mode = %self.mode))]
    pub async fn reconcile(
        &self,
        org: &Organization,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        reporter.header("Teams");

        let remote = self
            .gateway
            .list_teams(&org.name)
            .await
            .context(format!("list teams of {}", org.name))?;

        for team in &remote {
            let managed = org.teams.iter().any(|t| t.name.eq_ignore_case(team.name.as_str()));
            if !managed {
                reporter.warn(format!("team {} exists in github but not in manifest", team.name));
            }
        }

        for team in &org.teams {
            let current = remote
                .iter()
                .find(|r| team.name.eq_ignore_case(r.name.as_str()));
            match current {
                Some(current) => self.update_team(&org.name, team, current, reporter).await?,
                None => self.create_team(&org.name, team, reporter).await?,
            }
        }

        Ok(())
    }

    async fn create_team(
        &self,
        org: &OrgName,
        team: &Team,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let request = NewTeam {
            name: team.name.clone(),
            description: team.description.clone(),
        };

        if !self.mode.is_dry_run() {
            self.gateway
                .create_team(org, &request)
                .await
                .context(format!("create team {}", team.name))?;
        }

        reporter.record(ReportEntry::action(
            Category::Warning,
            Verb::Create,
            self.mode,
            format!("team {}", team.name),
        ));
        if let Some(description) = &request.description {
            reporter.change(Verb::Set, self.mode, format!("description to '{description}'"));
        }
        Ok(())
    }

    async fn update_team(
        &self,
        org: &OrgName,
        team: &Team,
        current: &RemoteTeam,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let patch = plan_team_patch(team, current);
        let Some(description) = &patch.description else {
            reporter.info(format!("team {} exists in github", team.name));
            return Ok(());
        };

        if !self.mode.is_dry_run() {
            self.gateway
                .update_team(org, &current.slug, &patch)
                .await
                .context(format!("update team {}", team.name))?;
        }
        reporter.change(
            Verb::Update,
            self.mode,
            format!("team {} description to '{description}'", team.name),
        );
        Ok(())
    }
}

/// Computes the description patch for a present team.
pub fn plan_team_patch(desired: &Team, current: &RemoteTeam) -> TeamPatch {
    let description = desired.description.as_ref().filter(|d| {
        let current = current.description.as_deref().unwrap_or_default();
        d.to_lowercase() != current.to_lowercase()
    });
    TeamPatch {
        description: description.cloned(),
    }
}
