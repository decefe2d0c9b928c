//! In-memory [`RemoteGateway`] for reconciler tests.
//!
//! Writes mutate the fake's state the way the provider would, so running a
//! reconciler twice over the same manifest observes its own earlier writes.
//! Every call is recorded in order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::gateway::RemoteGateway;
use crate::remote::{
    NewRepository, NewTeam, ProtectionRequest, RemoteAccount, RemoteProtection,
    RemoteRepository, RemoteTeam, RemoteUser, RepositoryPatch, TeamPatch,
};
use crate::{BranchName, Login, OrgName, RepoName, TeamName, TeamSlug, UserId};

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    GetOrganization(String),
    GetUser(String),
    ListMembers,
    CreateInvitation(UserId),
    ListRepositories,
    GetRepository(String),
    CreateRepository(NewRepository),
    UpdateRepository(String, RepositoryPatch),
    ListTopics(String),
    SetTopics(String, Vec<String>),
    ListBranches(String),
    GetBranchProtection(String, String),
    UpdateBranchProtection(String, String, ProtectionRequest),
    GetRequiredSignatures(String, String),
    RequireSignedCommits(String, String, bool),
    ListTeams,
    CreateTeam(NewTeam),
    UpdateTeam(String, TeamPatch),
}

impl Call {
    pub(crate) fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateInvitation(_)
                | Call::CreateRepository(_)
                | Call::UpdateRepository(..)
                | Call::SetTopics(..)
                | Call::UpdateBranchProtection(..)
                | Call::RequireSignedCommits(..)
                | Call::CreateTeam(_)
                | Call::UpdateTeam(..)
        )
    }
}

#[derive(Debug, Default)]
struct State {
    organization: Option<RemoteAccount>,
    users: Vec<RemoteAccount>,
    members: Vec<RemoteUser>,
    repositories: BTreeMap<String, RemoteRepository>,
    branches: BTreeMap<String, Vec<BranchName>>,
    protections: BTreeMap<(String, String), RemoteProtection>,
    teams: Vec<RemoteTeam>,
    rate_limited: Option<&'static str>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeGateway {
    state: Mutex<State>,
    calls: Mutex<Vec<Call>>,
}

pub(crate) fn repo_name(name: &str) -> RepoName {
    RepoName::new(name).expect("repo name")
}

pub(crate) fn branch_name(name: &str) -> BranchName {
    BranchName::new(name).expect("branch name")
}

pub(crate) fn login(name: &str) -> Login {
    Login::new(name).expect("login")
}

pub(crate) fn org_name(name: &str) -> OrgName {
    OrgName::new(name).expect("org name")
}

/// A remote repository with no description, public, on `main`, no topics.
pub(crate) fn remote_repository(name: &str) -> RemoteRepository {
    RemoteRepository {
        name: repo_name(name),
        description: None,
        archived: false,
        private: false,
        default_branch: Some(branch_name("main")),
        topics: Vec::new(),
    }
}

impl FakeGateway {
    /// A gateway whose organization `acme` exists and is empty.
    pub(crate) fn new() -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().organization = Some(RemoteAccount {
            id: UserId::new(1),
            login: "acme".into(),
            public_repos: 0,
            total_private_repos: 0,
        });
        fake
    }

    pub(crate) fn without_organization(self) -> Self {
        self.state.lock().unwrap().organization = None;
        self
    }

    pub(crate) fn with_user(self, name: &str, id: u64) -> Self {
        self.state.lock().unwrap().users.push(RemoteAccount {
            id: UserId::new(id),
            login: name.into(),
            public_repos: 0,
            total_private_repos: 0,
        });
        self
    }

    pub(crate) fn with_member(self, name: &str, id: u64) -> Self {
        self.state.lock().unwrap().members.push(RemoteUser {
            id: UserId::new(id),
            login: login(name),
        });
        self
    }

    pub(crate) fn with_repository(self, repo: RemoteRepository) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let branches = repo.default_branch.clone().into_iter().collect();
            state.branches.insert(repo.name.to_string(), branches);
            state.repositories.insert(repo.name.to_string(), repo);
        }
        self
    }

    pub(crate) fn with_protection(self, repo: &str, branch: &str, protection: RemoteProtection) -> Self {
        self.state
            .lock()
            .unwrap()
            .protections
            .insert((repo.into(), branch.into()), protection);
        self
    }

    pub(crate) fn with_team(self, name: &str, description: Option<&str>) -> Self {
        self.state.lock().unwrap().teams.push(RemoteTeam {
            name: TeamName::new(name).expect("team name"),
            slug: slug_for(name),
            description: description.map(str::to_owned),
        });
        self
    }

    /// Makes the named operation fail with a provider rate-limit signal.
    pub(crate) fn rate_limited_on(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().rate_limited = Some(operation);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn writes(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_write).collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub(crate) fn repository(&self, name: &str) -> Option<RemoteRepository> {
        self.state.lock().unwrap().repositories.get(name).cloned()
    }

    pub(crate) fn protection(&self, repo: &str, branch: &str) -> Option<RemoteProtection> {
        self.state
            .lock()
            .unwrap()
            .protections
            .get(&(repo.to_owned(), branch.to_owned()))
            .cloned()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call);
        match self.state.lock().unwrap().rate_limited {
            Some(limited) if limited == operation => Err(GatewayError::rate_limited(operation)),
            _ => Ok(()),
        }
    }

    fn find_repository(&self, repo: &RepoName) -> Result<RemoteRepository, GatewayError> {
        self.repository(repo.as_str())
            .ok_or_else(|| GatewayError::not_found(format!("repository {repo}")))
    }
}

fn slug_for(name: &str) -> TeamSlug {
    TeamSlug::new(name.to_lowercase().replace(' ', "-")).expect("slug")
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn get_organization(&self, org: &OrgName) -> Result<RemoteAccount, GatewayError> {
        self.record("get_organization", Call::GetOrganization(org.to_string()))?;
        let state = self.state.lock().unwrap();
        state
            .organization
            .clone()
            .filter(|o| org.eq_ignore_case(&o.login))
            .ok_or_else(|| GatewayError::not_found(format!("organization {org}")))
    }

    async fn get_user(&self, login: &Login) -> Result<RemoteAccount, GatewayError> {
        self.record("get_user", Call::GetUser(login.to_string()))?;
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| login.eq_ignore_case(&u.login))
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("user {login}")))
    }

    async fn list_members(&self, _org: &OrgName) -> Result<Vec<RemoteUser>, GatewayError> {
        self.record("list_members", Call::ListMembers)?;
        Ok(self.state.lock().unwrap().members.clone())
    }

    async fn create_invitation(&self, _org: &OrgName, invitee: UserId) -> Result<(), GatewayError> {
        self.record("create_invitation", Call::CreateInvitation(invitee))
    }

    async fn list_repositories(&self, account: &OrgName) -> Result<Vec<RemoteRepository>, GatewayError> {
        self.record("list_repositories", Call::ListRepositories)?;
        let state = self.state.lock().unwrap();
        let repos: Vec<_> = state
            .repositories
            .values()
            .filter(|r| !r.archived)
            .cloned()
            .collect();
        if state.repositories.is_empty() {
            return Err(GatewayError::NoRepositories {
                account: account.to_string(),
            });
        }
        Ok(repos)
    }

    async fn get_repository(&self, _org: &OrgName, repo: &RepoName) -> Result<RemoteRepository, GatewayError> {
        self.record("get_repository", Call::GetRepository(repo.to_string()))?;
        self.find_repository(repo)
    }

    async fn create_repository(&self, _org: &OrgName, repo: &NewRepository) -> Result<(), GatewayError> {
        self.record("create_repository", Call::CreateRepository(repo.clone()))?;
        let created = RemoteRepository::projected(repo);
        let mut state = self.state.lock().unwrap();
        let branches = created.default_branch.clone().into_iter().collect();
        state.branches.insert(created.name.to_string(), branches);
        state.repositories.insert(created.name.to_string(), created);
        Ok(())
    }

    async fn update_repository(
        &self,
        _org: &OrgName,
        repo: &RepoName,
        patch: &RepositoryPatch,
    ) -> Result<(), GatewayError> {
        self.record(
            "update_repository",
            Call::UpdateRepository(repo.to_string(), patch.clone()),
        )?;
        let mut state = self.state.lock().unwrap();
        let current = state
            .repositories
            .get_mut(repo.as_str())
            .ok_or_else(|| GatewayError::not_found(format!("repository {repo}")))?;
        if let Some(description) = &patch.description {
            current.description = Some(description.clone());
        }
        if let Some(archived) = patch.archived {
            current.archived = archived;
        }
        if let Some(private) = patch.private {
            current.private = private;
        }
        if let Some(branch) = &patch.default_branch {
            current.default_branch = Some(branch.clone());
        }
        Ok(())
    }

    async fn list_topics(&self, _org: &OrgName, repo: &RepoName) -> Result<Vec<String>, GatewayError> {
        self.record("list_topics", Call::ListTopics(repo.to_string()))?;
        self.find_repository(repo).map(|r| r.topics)
    }

    async fn set_topics(&self, _org: &OrgName, repo: &RepoName, topics: &[String]) -> Result<(), GatewayError> {
        self.record("set_topics", Call::SetTopics(repo.to_string(), topics.to_vec()))?;
        let mut state = self.state.lock().unwrap();
        let current = state
            .repositories
            .get_mut(repo.as_str())
            .ok_or_else(|| GatewayError::not_found(format!("repository {repo}")))?;
        current.topics = topics.to_vec();
        Ok(())
    }

    async fn list_branches(&self, _org: &OrgName, repo: &RepoName) -> Result<Vec<BranchName>, GatewayError> {
        self.record("list_branches", Call::ListBranches(repo.to_string()))?;
        self.state
            .lock()
            .unwrap()
            .branches
            .get(repo.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::not_found(format!("repository {repo}")))
    }

    async fn get_branch_protection(
        &self,
        _org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<RemoteProtection, GatewayError> {
        self.record(
            "get_branch_protection",
            Call::GetBranchProtection(repo.to_string(), branch.to_string()),
        )?;
        self.protection(repo.as_str(), branch.as_str())
            .ok_or_else(|| GatewayError::not_found(format!("branch protection {repo}/{branch}")))
    }

    async fn update_branch_protection(
        &self,
        _org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
        request: &ProtectionRequest,
    ) -> Result<(), GatewayError> {
        self.record(
            "update_branch_protection",
            Call::UpdateBranchProtection(repo.to_string(), branch.to_string(), request.clone()),
        )?;
        let mut state = self.state.lock().unwrap();
        let key = (repo.to_string(), branch.to_string());
        let required_signatures = state
            .protections
            .get(&key)
            .map(|p| p.required_signatures)
            .unwrap_or(false);
        state.protections.insert(
            key,
            RemoteProtection {
                pull_request_reviews: request.pull_request_reviews.is_some(),
                status_checks: request.status_checks.as_ref().map(|s| s.checks.clone()),
                required_signatures,
            },
        );
        Ok(())
    }

    async fn get_required_signatures(
        &self,
        _org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<bool, GatewayError> {
        self.record(
            "get_required_signatures",
            Call::GetRequiredSignatures(repo.to_string(), branch.to_string()),
        )?;
        self.protection(repo.as_str(), branch.as_str())
            .map(|p| p.required_signatures)
            .ok_or_else(|| GatewayError::not_found(format!("branch protection {repo}/{branch}")))
    }

    async fn require_signed_commits(
        &self,
        _org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
        enabled: bool,
    ) -> Result<(), GatewayError> {
        self.record(
            "require_signed_commits",
            Call::RequireSignedCommits(repo.to_string(), branch.to_string(), enabled),
        )?;
        let mut state = self.state.lock().unwrap();
        let protection = state
            .protections
            .get_mut(&(repo.to_string(), branch.to_string()))
            .ok_or_else(|| GatewayError::not_found(format!("branch protection {repo}/{branch}")))?;
        protection.required_signatures = enabled;
        Ok(())
    }

    async fn list_teams(&self, _org: &OrgName) -> Result<Vec<RemoteTeam>, GatewayError> {
        self.record("list_teams", Call::ListTeams)?;
        Ok(self.state.lock().unwrap().teams.clone())
    }

    async fn create_team(&self, _org: &OrgName, team: &NewTeam) -> Result<(), GatewayError> {
        self.record("create_team", Call::CreateTeam(team.clone()))?;
        self.state.lock().unwrap().teams.push(RemoteTeam {
            name: team.name.clone(),
            slug: slug_for(team.name.as_str()),
            description: team.description.clone(),
        });
        Ok(())
    }

    async fn update_team(&self, _org: &OrgName, team: &TeamSlug, patch: &TeamPatch) -> Result<(), GatewayError> {
        self.record("update_team", Call::UpdateTeam(team.to_string(), patch.clone()))?;
        let mut state = self.state.lock().unwrap();
        let current = state
            .teams
            .iter_mut()
            .find(|t| &t.slug == team)
            .ok_or_else(|| GatewayError::not_found(format!("team {team}")))?;
        if let Some(description) = &patch.description {
            current.description = Some(description.clone());
        }
        Ok(())
    }
}
