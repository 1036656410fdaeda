//! Role type definitions

use crate::scope::Scope;
use crate::types::{RoleId, Selection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named role inside a scope, inheriting from zero or more parent roles
///
/// `parent_ids` never contains the role's own id. The inheritance graph may
/// still contain longer cycles; resolution is cycle-safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Opaque unique key
    pub id: RoleId,

    /// Name, unique within the scope
    pub name: String,

    /// Partition the role lives in
    #[serde(flatten)]
    pub scope: Scope,

    /// Direct parent roles
    #[serde(default)]
    pub parent_ids: Vec<RoleId>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Last modification timestamp
    pub modified: DateTime<Utc>,
}

impl Role {
    /// Create a new role with a fresh id and no parents
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            scope,
            parent_ids: Vec::new(),
            created: now,
            modified: now,
        }
    }

    /// Replace the parent set, dropping self references and duplicates
    pub(crate) fn set_parent_ids(&mut self, parent_ids: Vec<RoleId>) {
        let mut out: Vec<RoleId> = Vec::with_capacity(parent_ids.len());
        for id in parent_ids {
            if id != self.id && !out.contains(&id) {
                out.push(id);
            }
        }
        self.parent_ids = out;
        self.modified = Utc::now();
    }
}

/// A role argument: an already loaded role or an id/name to look up
#[derive(Debug, Clone, PartialEq)]
pub enum RoleRef {
    /// A loaded role record
    Resolved(Role),
    /// An id or a name, resolved inside the active scope
    Reference(String),
}

impl From<&str> for RoleRef {
    fn from(key: &str) -> Self {
        Self::Reference(key.to_string())
    }
}

impl From<String> for RoleRef {
    fn from(key: String) -> Self {
        Self::Reference(key)
    }
}

impl From<&String> for RoleRef {
    fn from(key: &String) -> Self {
        Self::Reference(key.clone())
    }
}

impl From<Role> for RoleRef {
    fn from(role: Role) -> Self {
        Self::Resolved(role)
    }
}

impl From<&Role> for RoleRef {
    fn from(role: &Role) -> Self {
        Self::Resolved(role.clone())
    }
}

impl From<&str> for Selection<RoleRef> {
    fn from(key: &str) -> Self {
        if key == "*" {
            Self::Any
        } else {
            Self::Only(vec![key.into()])
        }
    }
}

impl From<String> for Selection<RoleRef> {
    fn from(key: String) -> Self {
        Self::from(key.as_str())
    }
}

impl From<&Role> for Selection<RoleRef> {
    fn from(role: &Role) -> Self {
        Self::Only(vec![role.into()])
    }
}

impl From<Role> for Selection<RoleRef> {
    fn from(role: Role) -> Self {
        Self::Only(vec![role.into()])
    }
}

impl<const N: usize> From<[&Role; N]> for Selection<RoleRef> {
    fn from(roles: [&Role; N]) -> Self {
        Self::Only(roles.iter().map(|r| RoleRef::from(*r)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Selection<RoleRef> {
    fn from(keys: [&str; N]) -> Self {
        Self::Only(keys.iter().map(|k| RoleRef::from(*k)).collect())
    }
}

impl From<Vec<Role>> for Selection<RoleRef> {
    fn from(roles: Vec<Role>) -> Self {
        Self::Only(roles.into_iter().map(RoleRef::from).collect())
    }
}

impl From<Vec<RoleRef>> for Selection<RoleRef> {
    fn from(roles: Vec<RoleRef>) -> Self {
        Self::Only(roles)
    }
}

impl From<Vec<String>> for Selection<RoleRef> {
    fn from(keys: Vec<String>) -> Self {
        Self::Only(keys.into_iter().map(RoleRef::from).collect())
    }
}

/// Data for the idempotent find-or-create of a role
#[derive(Debug, Clone, PartialEq)]
pub struct RoleData {
    /// Role name
    pub name: String,

    /// Explicit scope; falls back to the engine scope when `None`
    pub scope: Option<Scope>,
}

impl RoleData {
    /// Role data with an explicit scope
    pub fn scoped(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope: Some(scope),
        }
    }
}

impl From<&str> for RoleData {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scope: None,
        }
    }
}

impl From<String> for RoleData {
    fn from(name: String) -> Self {
        Self { name, scope: None }
    }
}

/// Caller-facing role query, intersected with the engine scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleQuery {
    /// Exact name
    pub name: Option<String>,

    /// Restrict to these ids
    pub ids: Option<Vec<RoleId>>,

    /// Explicit scope, overriding the engine scope
    pub scope: Option<Scope>,
}

impl RoleQuery {
    /// Empty query (every role in the engine scope)
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match ids
    pub fn ids(mut self, ids: Vec<RoleId>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Use an explicit scope
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Roles to remove: a query, or a bare id-or-name inside the engine scope
#[derive(Debug, Clone, PartialEq)]
pub enum RoleSelector {
    /// Structured query
    Query(RoleQuery),
    /// Id or name
    Key(String),
}

impl From<RoleQuery> for RoleSelector {
    fn from(query: RoleQuery) -> Self {
        Self::Query(query)
    }
}

impl From<&str> for RoleSelector {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization_shape() {
        let role = Role::new("member", Scope::new("org", Some("1")));
        let json = serde_json::to_value(&role).unwrap();

        assert_eq!(json["name"], "member");
        assert_eq!(json["scope"], "org");
        assert_eq!(json["scopeId"], "1");
        assert!(json["parentIds"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_set_parent_ids_drops_self_and_duplicates() {
        let mut role = Role::new("admin", Scope::global());
        let own = role.id.clone();
        role.set_parent_ids(vec!["a".to_string(), own, "a".to_string(), "b".to_string()]);
        assert_eq!(role.parent_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_role_selection_wildcard() {
        assert!(Selection::<RoleRef>::from("*").is_any());
        assert_eq!(
            Selection::<RoleRef>::from("member"),
            Selection::Only(vec![RoleRef::Reference("member".to_string())])
        );
    }
}
