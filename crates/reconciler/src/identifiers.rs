//! Newtype domain identifiers.
//!
//! Every name that identifies something on the remote side is a distinct
//! newtype wrapping a primitive. This prevents accidentally passing, for
//! example, a [`RepoName`] where a [`BranchName`] is expected even though both
//! are strings under the hood.
//!
//! String identifiers reject the empty string both at construction and during
//! deserialization, so a manifest entry with a blank name fails to load rather
//! than being matched against the remote.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display,
// TryFrom<String> (used by serde), and From<Self> for String.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Compares two identifiers ignoring ASCII case, the way the
            /// remote matches names.
            pub fn eq_ignore_case(&self, other: &str) -> bool {
                self.0.eq_ignore_ascii_case(other)
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| {
                    format!("{} must not be empty", stringify!($name))
                })
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: remote-assigned integers
// ---------------------------------------------------------------------------

/// The numeric account identifier GitHub assigns to a user.
///
/// Invitations are addressed by this id, not by login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(u64);

impl UserId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single invocation of the tool.
///
/// Generated fresh for every CLI invocation and recorded on the root span so
/// all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (manifest / remote names)
// ---------------------------------------------------------------------------

string_id! {
    /// The login of an organization, or of a user account when listing a
    /// personal account's repositories.
    OrgName
}

string_id! {
    /// A user login (e.g. `"octocat"`). Matched against the remote ignoring case.
    Login
}

string_id! {
    /// A repository name within an organization. Identity key for repositories.
    RepoName
}

string_id! {
    /// A Git branch name (e.g. `"main"`). Identity key for branches within a
    /// repository.
    BranchName
}

string_id! {
    /// A team name as displayed in the organization.
    TeamName
}

string_id! {
    /// The URL slug GitHub derives from a team name (e.g. `"core-team"`).
    TeamSlug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        assert!(RepoName::new("").is_none());
        assert!(RepoName::try_from(String::new()).is_err());
        assert_eq!(RepoName::new("api").map(String::from), Some("api".to_owned()));
    }

    #[test]
    fn case_insensitive_comparison() {
        let login = Login::new("Alice").expect("login");
        assert!(login.eq_ignore_case("alice"));
        assert!(!login.eq_ignore_case("alicia"));
    }

    #[test]
    fn blank_manifest_name_fails_to_deserialize() {
        let result: Result<BranchName, _> = serde_yaml::from_str("''");
        assert!(result.is_err());

        let branch: BranchName = serde_yaml::from_str("main").expect("branch");
        assert_eq!(branch.as_str(), "main");
    }
}
