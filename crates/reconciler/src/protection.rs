//! Branch protection and signed-commit reconciliation.
//!
//! A manifested branch is either unprotected (lookup not found), in which case
//! protection is created from the manifest, or protected, in which case the
//! same request is written again. Existing protection content is never
//! compared, so a protected branch receives an update call on every run.
//!
//! Signed-commit enforcement lives behind its own endpoint and is reconciled
//! as a separate step: fetched, compared with the manifest flag, and written
//! only on mismatch.

use tracing::instrument;

use crate::errors::{GatewayResultExt, ReconcileError};
use crate::manifest::{Branch, Repository};
use crate::remote::ProtectionRequest;
use crate::report::{Category, Mode, ReportEntry, Reporter, Verb};
use crate::repositories::RepositoryReconciler;
use crate::OrgName;

#[path = "protection_tests.rs"]
#[cfg(test)]
mod tests;

impl RepositoryReconciler {
    /// Reconciles every protected branch of `repo`, in manifest order.
    pub(crate) async fn reconcile_protected_branches(
        &self,
        org: &OrgName,
        repo: &Repository,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        for branch in &repo.protected_branches {
            self.reconcile_branch(org, repo, branch, reporter).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, org, repo, reporter, branch), fields(branch = %branch.name))]
    async fn reconcile_branch(
        &self,
        org: &OrgName,
        repo: &Repository,
        branch: &Branch,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let request = ProtectionRequest::from_manifest(&branch.protection);
        let operation = format!("get branch protection {}/{}", repo.name, branch.name);

        let verb = match self
            .gateway
            .get_branch_protection(org, &repo.name, &branch.name)
            .await
        {
            Ok(_) => {
                reporter.info(format!(
                    "protected branch '{}' for repo {}",
                    branch.name, repo.name
                ));
                self.write_protection(org, repo, branch, &request).await?;
                Verb::Update
            }
            Err(e) if e.is_not_found() => {
                self.write_protection(org, repo, branch, &request).await?;
                reporter.record(ReportEntry::action(
                    Category::Warning,
                    Verb::Create,
                    self.mode,
                    format!("protected branch {} for repo {}", branch.name, repo.name),
                ));
                Verb::Set
            }
            Err(e) => return Err(ReconcileError::from_gateway(operation, e)),
        };

        report_protection(reporter, verb, self.mode, &request);

        self.reconcile_signed_commits(org, repo, branch, reporter).await
    }

    async fn write_protection(
        &self,
        org: &OrgName,
        repo: &Repository,
        branch: &Branch,
        request: &ProtectionRequest,
    ) -> Result<(), ReconcileError> {
        if self.mode.is_dry_run() {
            return Ok(());
        }
        self.gateway
            .update_branch_protection(org, &repo.name, &branch.name, request)
            .await
            .context(format!("protect branch {}/{}", repo.name, branch.name))
    }

    async fn reconcile_signed_commits(
        &self,
        org: &OrgName,
        repo: &Repository,
        branch: &Branch,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let Some(desired) = branch.protection.signed_commits else {
            return Ok(());
        };

        // Unprotected branches enforce nothing; in dry-run this is also what a
        // just-planned protection looks like.
        let current = match self
            .gateway
            .get_required_signatures(org, &repo.name, &branch.name)
            .await
        {
            Ok(enabled) => enabled,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                return Err(ReconcileError::from_gateway(
                    format!("get signed commits {}/{}", repo.name, branch.name),
                    e,
                ))
            }
        };

        if current == desired {
            reporter.info(format!("require signed commits is '{desired}'"));
            return Ok(());
        }

        if !self.mode.is_dry_run() {
            self.gateway
                .require_signed_commits(org, &repo.name, &branch.name, desired)
                .await
                .context(format!("require signed commits {}/{}", repo.name, branch.name))?;
        }
        reporter.change(
            Verb::Update,
            self.mode,
            format!("require signed commits to '{desired}'"),
        );

        Ok(())
    }
}

fn report_protection(
    reporter: &mut dyn Reporter,
    verb: Verb,
    mode: Mode,
    request: &ProtectionRequest,
) {
    if request.pull_request_reviews.is_some() {
        reporter.change(verb, mode, "require pr to 'true'".to_owned());
    }
    if let Some(checks) = &request.status_checks {
        reporter.change(verb, mode, "require status checks to 'true'".to_owned());
        if !checks.checks.is_empty() {
            reporter.change(
                verb,
                mode,
                format!("required checks to [{}]", checks.checks.join(", ")),
            );
        }
    }
}
