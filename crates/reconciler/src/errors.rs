//! Error taxonomy for remote access and reconciliation runs.
//!
//! [`GatewayError`] is the closed classification of every remote call. Callers
//! branch on its variant (or on [`GatewayError::kind`]) instead of inspecting
//! error text: not-found drives create-vs-update decisions, rate-limited ends
//! the run, and everything else is wrapped with the operation that failed.
//!
//! [`ReconcileError`] covers conditions that terminate a reconciliation run.
//! There is no retry anywhere; a failed run is re-run from scratch and the
//! remote converges because every step is idempotent.

use thiserror::Error;

use crate::{Login, OrgName};

// ---------------------------------------------------------------------------
// Gateway classification
// ---------------------------------------------------------------------------

/// The three buckets every remote failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The addressed resource does not exist. Expected, not exceptional.
    NotFound,
    /// The provider refused the call because of its own rate limit.
    RateLimited,
    /// Transport, server, decoding or any other failure.
    Other,
}

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The addressed organization, user, repository, branch protection or
    /// team does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable description of the missing resource.
        resource: String,
    },

    /// The account exists but reports zero public and private repositories.
    ///
    /// Produced by repository listing before any page is requested.
    #[error("no repositories found for {account}")]
    NoRepositories {
        /// The organization or user whose repositories were listed.
        account: String,
    },

    /// The provider signalled its rate limit. Never retried.
    #[error("github: hit rate limit during {operation}")]
    RateLimited {
        /// The operation that was refused.
        operation: String,
    },

    /// The run was cancelled while the call was waiting or in flight.
    #[error("operation cancelled")]
    Cancelled,

    /// The provider answered with a non-success status.
    #[error("{operation}: HTTP {status}: {message}")]
    Api {
        /// The operation that failed (e.g. `"get repo"`).
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The request never produced a response.
    #[error("{operation}: transport error: {message}")]
    Transport {
        /// The operation that failed.
        operation: String,
        /// Description of the network failure.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("{operation}: unexpected response: {message}")]
    Decode {
        /// The operation whose response could not be decoded.
        operation: String,
        /// Description of the decoding failure.
        message: String,
    },

    /// The gateway itself is misconfigured (bad base URL, client build failure).
    #[error("gateway configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl GatewayError {
    /// Creates a [`GatewayError::NotFound`] for `resource`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a [`GatewayError::RateLimited`] for `operation`.
    pub fn rate_limited(operation: impl Into<String>) -> Self {
        Self::RateLimited {
            operation: operation.into(),
        }
    }

    /// Returns the bucket this failure belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } | Self::NoRepositories { .. } => FailureKind::NotFound,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Cancelled
            | Self::Api { .. }
            | Self::Transport { .. }
            | Self::Decode { .. }
            | Self::Configuration { .. } => FailureKind::Other,
        }
    }

    /// Returns `true` if the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind() == FailureKind::NotFound
    }
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that terminate a reconciliation run.
///
/// Changes applied before the failure stay applied; there is no cross-entity
/// transaction.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The provider signalled its rate limit. The run is aborted; an operator
    /// or scheduler re-runs it later.
    #[error("github: hit rate limit during {operation}")]
    RateLimited {
        /// The operation that was refused.
        operation: String,
    },

    /// The organization named in the manifest does not exist.
    #[error("organization {0} not found")]
    OrganizationNotFound(OrgName),

    /// A manifest member could not be resolved to a remote account while
    /// issuing invitations.
    #[error("user {0} not found")]
    UserNotFound(Login),

    /// The run was cancelled by an interrupt or deadline.
    #[error("run cancelled")]
    Cancelled,

    /// Any other remote failure, annotated with what was being done.
    #[error("{operation}: {source}")]
    Gateway {
        /// What was being fetched or updated (e.g. `"get repo api"`).
        operation: String,
        /// The underlying classified failure.
        #[source]
        source: GatewayError,
    },
}

impl ReconcileError {
    /// Wraps a gateway failure with its operation context.
    ///
    /// Rate-limit and cancellation signals are lifted to their own variants
    /// so the caller sees them regardless of where they occurred.
    pub fn from_gateway(operation: impl Into<String>, source: GatewayError) -> Self {
        let operation = operation.into();
        match source {
            GatewayError::RateLimited { .. } => Self::RateLimited { operation },
            GatewayError::Cancelled => Self::Cancelled,
            source => Self::Gateway { operation, source },
        }
    }
}

/// Converts gateway results into reconcile results with operation context.
pub trait GatewayResultExt<T> {
    /// Attaches `operation` to a failure, see [`ReconcileError::from_gateway`].
    fn context(self, operation: impl Into<String>) -> Result<T, ReconcileError>;
}

impl<T> GatewayResultExt<T> for Result<T, GatewayError> {
    fn context(self, operation: impl Into<String>) -> Result<T, ReconcileError> {
        self.map_err(|e| ReconcileError::from_gateway(operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_the_three_buckets() {
        assert_eq!(GatewayError::not_found("repo x").kind(), FailureKind::NotFound);
        assert_eq!(
            GatewayError::NoRepositories {
                account: "acme".into()
            }
            .kind(),
            FailureKind::NotFound
        );
        assert_eq!(
            GatewayError::rate_limited("get repo").kind(),
            FailureKind::RateLimited
        );
        assert_eq!(GatewayError::Cancelled.kind(), FailureKind::Other);
        assert_eq!(
            GatewayError::Api {
                operation: "get repo".into(),
                status: 500,
                message: "boom".into()
            }
            .kind(),
            FailureKind::Other
        );
    }

    #[test]
    fn rate_limit_is_lifted_to_run_level() {
        let err: Result<(), _> = Err(GatewayError::rate_limited("list topics"));
        let err = err.context("list topics for api").expect_err("error");
        assert!(matches!(err, ReconcileError::RateLimited { .. }));
    }

    #[test]
    fn other_errors_keep_operation_context() {
        let err: Result<(), _> = Err(GatewayError::Transport {
            operation: "get repo".into(),
            message: "connection reset".into(),
        });
        let err = err.context("get repo api").expect_err("error");
        assert_eq!(
            err.to_string(),
            "get repo api: get repo: transport error: connection reset"
        );
    }
}
