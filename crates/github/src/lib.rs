//! Steward GitHub infrastructure adapter.
//!
//! Implements the [`reconciler::RemoteGateway`] port over the GitHub REST API
//! using [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (rate limiting, pagination, authentication, status
//! classification) are handled here; the [`reconciler`] crate never sees them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | `GatewayConfig`: base URL, token, user agent, page size, timeout |
//! | [`rate_limit`] | Process-wide token-bucket `RateLimiter` |
//! | [`pagination`] | `Link` header parsing |
//! | `wire` | Request and response bodies of the REST API |
//! | [`client`] | `GithubGateway`, the `RemoteGateway` implementation |

pub mod client;
pub mod config;
pub mod pagination;
pub mod rate_limit;
mod wire;

pub use client::GithubGateway;
pub use config::GatewayConfig;
pub use rate_limit::RateLimiter;
