//! Scope type definitions
//!
//! A scope is the partition key carried by roles and memberships.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Record;

/// Sentinel meaning "ignore scope filtering entirely"
pub const ALL_SCOPES: &str = "*";

/// Canonical `(type, id)` scope pair; both `None` is the global partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// Scope type (e.g. "org"), `None` for the global partition
    #[serde(rename = "scope", default)]
    pub scope_type: Option<String>,

    /// Scope instance id (e.g. "acme")
    #[serde(rename = "scopeId", default)]
    pub scope_id: Option<String>,
}

impl Scope {
    /// Create a scope from a type and an optional id
    pub fn new(scope_type: impl Into<String>, scope_id: Option<&str>) -> Self {
        Self {
            scope_type: Some(scope_type.into()),
            scope_id: scope_id.map(str::to_string),
        }
    }

    /// The global (unscoped) partition
    pub fn global() -> Self {
        Self::default()
    }

    /// Whether this is the global partition
    pub fn is_global(&self) -> bool {
        self.scope_type.is_none() && self.scope_id.is_none()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.scope_type, &self.scope_id) {
            (Some(ty), Some(id)) => write!(f, "{}:{}", ty, id),
            (Some(ty), None) => write!(f, "{}", ty),
            (None, Some(id)) => write!(f, ":{}", id),
            (None, None) => write!(f, "<global>"),
        }
    }
}

/// Scope constraint applied to lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScopeFilter {
    /// No scope filtering (`"*"`)
    #[default]
    All,
    /// Only records stamped with exactly this scope
    Exact(Scope),
}

impl ScopeFilter {
    /// Check whether a record's scope passes this filter
    pub fn matches(&self, scope: &Scope) -> bool {
        match self {
            Self::All => true,
            Self::Exact(expected) => expected == scope,
        }
    }

    /// Whether this filter is the all-scopes wildcard
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The exact scope, if any
    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Self::All => None,
            Self::Exact(scope) => Some(scope),
        }
    }
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{}", ALL_SCOPES),
            Self::Exact(scope) => write!(f, "{}", scope),
        }
    }
}

/// Unresolved scope argument
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeArg {
    /// `"*"`: every scope
    All,
    /// `null` / omitted: the global partition
    Global,
    /// `"type:id"` or `"type"`
    Str(String),
    /// An identifiable object contributing `(model, id)`
    Record {
        /// Model name, may be empty
        model: String,
        /// Record id, may be empty
        id: String,
    },
    /// Several identifiers joined with `:`
    Parts(Vec<String>),
}

impl From<&str> for ScopeArg {
    fn from(s: &str) -> Self {
        match s {
            ALL_SCOPES => Self::All,
            "" => Self::Global,
            other => Self::Str(other.to_string()),
        }
    }
}

impl From<String> for ScopeArg {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Option<&str>> for ScopeArg {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Global, Self::from)
    }
}

impl From<&Record> for ScopeArg {
    fn from(record: &Record) -> Self {
        Self::Record {
            model: record.model.clone(),
            id: record.id.clone(),
        }
    }
}

impl From<Scope> for ScopeArg {
    fn from(scope: Scope) -> Self {
        match (scope.scope_type, scope.scope_id) {
            (None, None) => Self::Global,
            (ty, id) => Self::Record {
                model: ty.unwrap_or_default(),
                id: id.unwrap_or_default(),
            },
        }
    }
}
