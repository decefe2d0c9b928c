//! [`RemoteGateway`] over the GitHub REST API.
//!
//! Every request goes through one `send` path, which takes a token
//! from the shared [`RateLimiter`], races the request against the gateway's
//! cancellation token and classifies the response:
//!
//! | Response | Classification |
//! |----------|----------------|
//! | 2xx | success |
//! | 404 | `GatewayError::NotFound` |
//! | 429, or 403 with `x-ratelimit-remaining: 0` or a rate-limit message | `GatewayError::RateLimited` |
//! | anything else | `GatewayError::Api` |
//!
//! Listings follow the `Link` header until no next page is advertised.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use reconciler::{
    BranchName, GatewayError, Login, NewRepository, NewTeam, OrgName, ProtectionRequest,
    RemoteAccount, RemoteGateway, RemoteProtection, RemoteRepository, RemoteTeam, RemoteUser,
    RepoName, RepositoryPatch, TeamPatch, TeamSlug, UserId,
};

use crate::config::{GatewayConfig, MAX_PAGE_SIZE};
use crate::pagination;
use crate::rate_limit::RateLimiter;
use crate::wire::{
    AccountBody, BranchBody, CreateRepositoryBody, CreateTeamBody, EnabledBody, ErrorBody,
    InvitationBody, ProtectionBody, RepositoryBody, TopicsBody, UpdateProtectionBody,
};

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub REST implementation of [`RemoteGateway`].
#[derive(Debug)]
pub struct GithubGateway {
    http: Client,
    base_url: Url,
    page_size: u32,
    limiter: RateLimiter,
    cancel: CancellationToken,
}

/// Which listing endpoint family an account's repositories live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountKind {
    Organization,
    User,
}

impl GithubGateway {
    /// Builds a gateway drawing from `limiter`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Configuration`] for an unusable base URL, page size or
    /// token, or if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig, limiter: RateLimiter) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| configuration(format!(
            "invalid base URL '{}': {e}",
            config.base_url
        )))?;
        if base_url.cannot_be_a_base() {
            return Err(configuration(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }
        if config.page_size == 0 || config.page_size > MAX_PAGE_SIZE {
            return Err(configuration(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                config.page_size
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| configuration("token contains characters not allowed in a header"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            page_size: config.page_size,
            limiter,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that aborts every waiting and in-flight call when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| configuration(format!("base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &'static str,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        self.limiter.acquire(&self.cancel).await?;
        debug!(operation, resource, "github request");

        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(GatewayError::Cancelled),
            response = request.send() => response.map_err(|e| transport(operation, &e))?,
        };

        classify(operation, resource, response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        resource: &str,
        url: Url,
    ) -> Result<T, GatewayError> {
        let response = self.send(operation, resource, self.http.get(url)).await?;
        decode(operation, response).await
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        resource: &str,
        request: RequestBuilder,
        body: &B,
    ) -> Result<Response, GatewayError> {
        self.send(operation, resource, request.json(body)).await
    }

    /// Fetches every page of a listing.
    async fn get_all<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        resource: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, GatewayError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let mut url = self.url(segments)?;
            url.query_pairs_mut()
                .extend_pairs(query)
                .append_pair("per_page", &self.page_size.to_string())
                .append_pair("page", &page.to_string());

            let response = self.send(operation, resource, self.http.get(url)).await?;
            let next = pagination::next_page(response.headers());
            let batch: Vec<T> = decode(operation, response).await?;
            debug!(operation, page, count = batch.len(), "fetched page");
            items.extend(batch);

            match next {
                Some(next) if next > page => page = next,
                _ => return Ok(items),
            }
        }
    }

    /// Resolves `account` as an organization, falling back to a user.
    async fn get_account(&self, account: &OrgName) -> Result<(AccountKind, RemoteAccount), GatewayError> {
        match self.get_organization(account).await {
            Ok(org) => Ok((AccountKind::Organization, org)),
            Err(e) if e.is_not_found() => {
                debug!(account = %account, "not an organization, trying user account");
                let url = self.url(&["users", account.as_str()])?;
                let body: AccountBody = self
                    .get_json("get user", &format!("account {account}"), url)
                    .await?;
                Ok((AccountKind::User, body.into()))
            }
            Err(e) => Err(e),
        }
    }

    fn repository_segments<'a>(org: &'a OrgName, repo: &'a RepoName) -> [&'a str; 3] {
        ["repos", org.as_str(), repo.as_str()]
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

fn configuration(message: impl Into<String>) -> GatewayError {
    GatewayError::Configuration {
        message: message.into(),
    }
}

fn transport(operation: &str, error: &reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        operation: operation.to_owned(),
        message: error.to_string(),
    }
}

async fn classify(operation: &str, resource: &str, response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::not_found(resource));
    }

    let quota_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .is_some_and(|v| v.as_bytes() == b"0");
    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (quota_exhausted || message.to_lowercase().contains("rate limit")));
    if rate_limited {
        warn!(operation, %status, "github rate limit hit");
        return Err(GatewayError::rate_limited(operation));
    }

    Err(GatewayError::Api {
        operation: operation.to_owned(),
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, GatewayError> {
    let body = response.bytes().await.map_err(|e| transport(operation, &e))?;
    serde_json::from_slice(&body).map_err(|e| GatewayError::Decode {
        operation: operation.to_owned(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// RemoteGateway
// ---------------------------------------------------------------------------

#[async_trait]
impl RemoteGateway for GithubGateway {
    async fn get_organization(&self, org: &OrgName) -> Result<RemoteAccount, GatewayError> {
        let url = self.url(&["orgs", org.as_str()])?;
        let body: AccountBody = self
            .get_json("get org", &format!("organization {org}"), url)
            .await?;
        Ok(body.into())
    }

    async fn get_user(&self, login: &Login) -> Result<RemoteAccount, GatewayError> {
        let url = self.url(&["users", login.as_str()])?;
        let body: AccountBody = self.get_json("get user", &format!("user {login}"), url).await?;
        Ok(body.into())
    }

    #[instrument(skip_all, fields(org = %org))]
    async fn list_members(&self, org: &OrgName) -> Result<Vec<RemoteUser>, GatewayError> {
        self.get_all(
            "list members",
            &format!("organization {org}"),
            &["orgs", org.as_str(), "members"],
            &[],
        )
        .await
    }

    async fn create_invitation(&self, org: &OrgName, invitee: UserId) -> Result<(), GatewayError> {
        let url = self.url(&["orgs", org.as_str(), "invitations"])?;
        self.write(
            "create invitation",
            &format!("organization {org}"),
            self.http.post(url),
            &InvitationBody { invitee_id: invitee },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(account = %account))]
    async fn list_repositories(&self, account: &OrgName) -> Result<Vec<RemoteRepository>, GatewayError> {
        let (kind, details) = self.get_account(account).await?;
        if details.repository_count() == 0 {
            return Err(GatewayError::NoRepositories {
                account: account.to_string(),
            });
        }

        let root = match kind {
            AccountKind::Organization => "orgs",
            AccountKind::User => "users",
        };
        let repos: Vec<RepositoryBody> = self
            .get_all(
                "list repos",
                &format!("account {account}"),
                &[root, account.as_str(), "repos"],
                &[("type", "all")],
            )
            .await?;

        let repos: Vec<RemoteRepository> = repos
            .into_iter()
            .map(RemoteRepository::from)
            .filter(|r| !r.archived)
            .collect();
        info!(count = repos.len(), "listed repositories");
        Ok(repos)
    }

    async fn get_repository(&self, org: &OrgName, repo: &RepoName) -> Result<RemoteRepository, GatewayError> {
        let url = self.url(&Self::repository_segments(org, repo))?;
        let body: RepositoryBody = self
            .get_json("get repo", &format!("repository {org}/{repo}"), url)
            .await?;
        Ok(body.into())
    }

    #[instrument(skip_all, fields(org = %org, repo = %repo.name))]
    async fn create_repository(&self, org: &OrgName, repo: &NewRepository) -> Result<(), GatewayError> {
        let url = self.url(&["orgs", org.as_str(), "repos"])?;
        let response = self
            .write(
                "create repo",
                &format!("organization {org}"),
                self.http.post(url),
                &CreateRepositoryBody::from(repo),
            )
            .await?;
        let created: RemoteRepository = decode::<RepositoryBody>("create repo", response).await?.into();

        if !repo.topics.is_empty() {
            self.set_topics(org, &repo.name, &repo.topics).await?;
        }

        // Settings the create endpoint does not take.
        let patch = RepositoryPatch {
            default_branch: repo.default_branch.clone().filter(|wanted| {
                created
                    .default_branch
                    .as_ref()
                    .map_or(true, |actual| !actual.eq_ignore_case(wanted.as_str()))
            }),
            archived: repo.archived.filter(|archived| *archived),
            ..RepositoryPatch::default()
        };
        if !patch.is_empty() {
            self.update_repository(org, &repo.name, &patch).await?;
        }
        Ok(())
    }

    async fn update_repository(
        &self,
        org: &OrgName,
        repo: &RepoName,
        patch: &RepositoryPatch,
    ) -> Result<(), GatewayError> {
        let url = self.url(&Self::repository_segments(org, repo))?;
        self.write(
            "update repo",
            &format!("repository {org}/{repo}"),
            self.http.patch(url),
            patch,
        )
        .await?;
        Ok(())
    }

    async fn list_topics(&self, org: &OrgName, repo: &RepoName) -> Result<Vec<String>, GatewayError> {
        let url = self.url(&["repos", org.as_str(), repo.as_str(), "topics"])?;
        let body: TopicsBody = self
            .get_json("get repo topics", &format!("repository {org}/{repo}"), url)
            .await?;
        Ok(body.names)
    }

    async fn set_topics(&self, org: &OrgName, repo: &RepoName, topics: &[String]) -> Result<(), GatewayError> {
        let url = self.url(&["repos", org.as_str(), repo.as_str(), "topics"])?;
        self.write(
            "set repo topics",
            &format!("repository {org}/{repo}"),
            self.http.put(url),
            &TopicsBody {
                names: topics.to_vec(),
            },
        )
        .await?;
        Ok(())
    }

    async fn list_branches(&self, org: &OrgName, repo: &RepoName) -> Result<Vec<BranchName>, GatewayError> {
        let branches: Vec<BranchBody> = self
            .get_all(
                "get branches",
                &format!("repository {org}/{repo}"),
                &["repos", org.as_str(), repo.as_str(), "branches"],
                &[],
            )
            .await?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    async fn get_branch_protection(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<RemoteProtection, GatewayError> {
        let url = self.url(&[
            "repos",
            org.as_str(),
            repo.as_str(),
            "branches",
            branch.as_str(),
            "protection",
        ])?;
        let body: ProtectionBody = self
            .get_json(
                "get branch protection",
                &format!("branch protection {org}/{repo}@{branch}"),
                url,
            )
            .await?;
        Ok(body.into())
    }

    async fn update_branch_protection(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
        request: &ProtectionRequest,
    ) -> Result<(), GatewayError> {
        let url = self.url(&[
            "repos",
            org.as_str(),
            repo.as_str(),
            "branches",
            branch.as_str(),
            "protection",
        ])?;
        self.write(
            "update branch protection",
            &format!("branch {org}/{repo}@{branch}"),
            self.http.put(url),
            &UpdateProtectionBody::from(request),
        )
        .await?;
        Ok(())
    }

    async fn get_required_signatures(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
    ) -> Result<bool, GatewayError> {
        let url = self.url(&[
            "repos",
            org.as_str(),
            repo.as_str(),
            "branches",
            branch.as_str(),
            "protection",
            "required_signatures",
        ])?;
        let body: EnabledBody = self
            .get_json(
                "get signed commits",
                &format!("branch protection {org}/{repo}@{branch}"),
                url,
            )
            .await?;
        Ok(body.enabled)
    }

    async fn require_signed_commits(
        &self,
        org: &OrgName,
        repo: &RepoName,
        branch: &BranchName,
        enabled: bool,
    ) -> Result<(), GatewayError> {
        let url = self.url(&[
            "repos",
            org.as_str(),
            repo.as_str(),
            "branches",
            branch.as_str(),
            "protection",
            "required_signatures",
        ])?;
        let request = if enabled {
            self.http.post(url)
        } else {
            self.http.delete(url)
        };
        self.send(
            "require signed commits",
            &format!("branch protection {org}/{repo}@{branch}"),
            request,
        )
        .await?;
        Ok(())
    }

    async fn list_teams(&self, org: &OrgName) -> Result<Vec<RemoteTeam>, GatewayError> {
        self.get_all(
            "list teams",
            &format!("organization {org}"),
            &["orgs", org.as_str(), "teams"],
            &[],
        )
        .await
    }

    async fn create_team(&self, org: &OrgName, team: &NewTeam) -> Result<(), GatewayError> {
        let url = self.url(&["orgs", org.as_str(), "teams"])?;
        self.write(
            "create team",
            &format!("organization {org}"),
            self.http.post(url),
            &CreateTeamBody::from(team),
        )
        .await?;
        Ok(())
    }

    async fn update_team(&self, org: &OrgName, team: &TeamSlug, patch: &TeamPatch) -> Result<(), GatewayError> {
        let url = self.url(&["orgs", org.as_str(), "teams", team.as_str()])?;
        self.write(
            "update team",
            &format!("team {org}/{team}"),
            self.http.patch(url),
            patch,
        )
        .await?;
        Ok(())
    }
}
