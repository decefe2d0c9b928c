//! Repository and topic reconciliation.
//!
//! Each manifest repository moves through three states: absent, present but
//! unsynced, and present and synced. An absent repository is created from its
//! full projection and the projection becomes the current state, so the
//! update path that follows finds nothing left to change. A present
//! repository receives one partial update carrying only the manifest-set
//! fields that differ. Topics are compared as a set and replaced wholesale.
//!
//! Branch protection for the repository's branches is reconciled last; see
//! [`crate::protection`].

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::{GatewayError, GatewayResultExt, ReconcileError};
use crate::gateway::RemoteGateway;
use crate::manifest::{Organization, Repository};
use crate::remote::{NewRepository, RemoteRepository, RepositoryPatch};
use crate::report::{Category, Mode, ReportEntry, Reporter, Verb};
use crate::OrgName;

#[path = "repositories_tests.rs"]
#[cfg(test)]
mod tests;

/// Reconciles repositories, their topics and their branch protection.
pub struct RepositoryReconciler {
    pub(crate) gateway: Arc<dyn RemoteGateway>,
    pub(crate) mode: Mode,
}

impl RepositoryReconciler {
    pub fn new(gateway: Arc<dyn RemoteGateway>, mode: Mode) -> Self {
        Self { gateway, mode }
    }

    /// Runs the `Repos` section for every repository of `org`, in manifest
    /// order. Stops at the first failure; earlier repositories keep whatever
    /// was applied to them.
    #[instrument(skip_all, fields(org = %org.name, mode = %self.mode))]
    pub async fn reconcile(
        &self,
        org: &Organization,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        reporter.header("Repos");
        self.report_unmanaged(org, reporter).await?;

        for repo in &org.repositories {
            reporter.header(repo.name.as_str());
            self.reconcile_repository(&org.name, repo, reporter).await?;
        }

        Ok(())
    }

    /// Warns about remote repositories the manifest does not mention.
    async fn report_unmanaged(
        &self,
        org: &Organization,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let remote = match self.gateway.list_repositories(&org.name).await {
            Ok(remote) => remote,
            Err(GatewayError::NoRepositories { .. }) => Vec::new(),
            Err(e) => {
                return Err(ReconcileError::from_gateway(
                    format!("list repos for {}", org.name),
                    e,
                ))
            }
        };

        for repo in remote {
            let managed = org
                .repositories
                .iter()
                .any(|m| m.name.eq_ignore_case(repo.name.as_str()));
            if !managed {
                reporter.warn(format!("{} exists in github but not in manifest", repo.name));
            }
        }

        Ok(())
    }

    /// Brings one repository in line with its manifest entry.
    #[instrument(skip(self, reporter, repo), fields(repo = %repo.name))]
    pub async fn reconcile_repository(
        &self,
        org: &OrgName,
        repo: &Repository,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let (current, created) = match self.gateway.get_repository(org, &repo.name).await {
            Ok(current) => (current, false),
            Err(e) if e.is_not_found() => (self.create_repository(org, repo, reporter).await?, true),
            Err(e) => {
                return Err(ReconcileError::from_gateway(
                    format!("get repo {}", repo.name),
                    e,
                ))
            }
        };

        self.update_repository(org, repo, &current, reporter).await?;

        if !repo.labels.is_empty() {
            let topics = if created {
                current.topics.clone()
            } else {
                self.gateway
                    .list_topics(org, &repo.name)
                    .await
                    .context(format!("get repo topics {}", repo.name))?
            };
            self.reconcile_topics(org, repo, topics, reporter).await?;
        }

        self.reconcile_protected_branches(org, repo, reporter).await
    }

    async fn create_repository(
        &self,
        org: &OrgName,
        repo: &Repository,
        reporter: &mut dyn Reporter,
    ) -> Result<RemoteRepository, ReconcileError> {
        let projection = NewRepository::from_manifest(repo);

        if !self.mode.is_dry_run() {
            self.gateway
                .create_repository(org, &projection)
                .await
                .context(format!("create repo {}", repo.name))?;
        }

        reporter.record(ReportEntry::action(
            Category::Warning,
            Verb::Create,
            self.mode,
            format!("repo {}", repo.name),
        ));
        if let Some(description) = &projection.description {
            reporter.change(Verb::Set, self.mode, format!("description to '{description}'"));
        }
        if let Some(archived) = projection.archived {
            reporter.change(Verb::Set, self.mode, format!("archived to '{archived}'"));
        }
        if !projection.topics.is_empty() {
            reporter.change(
                Verb::Set,
                self.mode,
                format!("topics to [{}]", projection.topics.join(", ")),
            );
        }
        if let Some(private) = projection.private {
            reporter.change(Verb::Set, self.mode, format!("private to '{private}'"));
        }
        if let Some(branch) = &projection.default_branch {
            reporter.change(Verb::Set, self.mode, format!("default branch to '{branch}'"));
        }

        Ok(RemoteRepository::projected(&projection))
    }

    async fn update_repository(
        &self,
        org: &OrgName,
        repo: &Repository,
        current: &RemoteRepository,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let patch = plan_patch(repo, current);
        if patch.is_empty() {
            debug!("repository settings already match");
            return Ok(());
        }

        if !self.mode.is_dry_run() {
            self.gateway
                .update_repository(org, &repo.name, &patch)
                .await
                .context(format!("update repo {}", repo.name))?;
        }

        if let Some(description) = &patch.description {
            reporter.change(Verb::Update, self.mode, format!("description to '{description}'"));
        }
        if let Some(archived) = patch.archived {
            reporter.change(Verb::Update, self.mode, format!("archived to '{archived}'"));
        }
        if let Some(private) = patch.private {
            reporter.change(Verb::Update, self.mode, format!("private to '{private}'"));
        }
        if let Some(branch) = &patch.default_branch {
            reporter.change(Verb::Update, self.mode, format!("default branch to '{branch}'"));
        }

        Ok(())
    }

    async fn reconcile_topics(
        &self,
        org: &OrgName,
        repo: &Repository,
        current: Vec<String>,
        reporter: &mut dyn Reporter,
    ) -> Result<(), ReconcileError> {
        let mut desired = repo.labels.clone();
        desired.sort();
        let listed = desired.join(", ");

        if topics_match(&desired, &current) {
            reporter.info(format!("labels are [{listed}]"));
            return Ok(());
        }

        if !self.mode.is_dry_run() {
            self.gateway
                .set_topics(org, &repo.name, &desired)
                .await
                .context(format!("set repo topics {}", repo.name))?;
        }
        reporter.change(Verb::Update, self.mode, format!("labels to [{listed}]"));

        Ok(())
    }
}

/// Computes the minimal patch taking `current` to the manifest's settings.
///
/// Only fields the manifest sets are considered, and only those that differ
/// end up in the patch. Description and default branch compare ignoring case.
pub fn plan_patch(desired: &Repository, current: &RemoteRepository) -> RepositoryPatch {
    let mut patch = RepositoryPatch::default();

    if let Some(description) = &desired.description {
        let current_description = current.description.as_deref().unwrap_or_default();
        if !eq_fold(description, current_description) {
            patch.description = Some(description.clone());
        }
    }

    if let Some(archived) = desired.archived {
        if archived != current.archived {
            patch.archived = Some(archived);
        }
    }

    if let Some(private) = desired.private {
        if private != current.private {
            patch.private = Some(private);
        }
    }

    if let Some(branch) = &desired.default_branch {
        let current_branch = current.default_branch.as_ref().map_or("", |b| b.as_str());
        if !eq_fold(branch.as_str(), current_branch) {
            patch.default_branch = Some(branch.clone());
        }
    }

    patch
}

/// Returns `true` if both topic lists hold the same topics in any order.
pub fn topics_match(desired: &[String], current: &[String]) -> bool {
    let mut desired = desired.to_vec();
    let mut current = current.to_vec();
    desired.sort();
    current.sort();
    desired == current
}

fn eq_fold(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
