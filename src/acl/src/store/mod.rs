//! Store collaborator contract
//!
//! The engine owns no durable state. Roles, memberships, separately stored
//! grant lists and host records all live behind these traits. Every call is
//! a single-record or filter-scoped operation; the engine makes no
//! transactional assumptions across calls.

use crate::error::Result;
use crate::grants::{EntityKey, SecuredEntity};
use crate::membership::{Membership, MembershipPatch, MembershipState};
use crate::roles::Role;
use crate::scope::ScopeFilter;
use crate::secure::Predicate;
use crate::types::{Record, RoleId, UserId};
use async_trait::async_trait;
use serde_json::Value;

pub mod memory;

pub use memory::MemoryStore;

/// Role lookup filter; `None` leaves a dimension unconstrained
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleFilter {
    /// Scope constraint
    pub scope: ScopeFilter,

    /// Exact name
    pub name: Option<String>,

    /// Role ids
    pub ids: Option<Vec<RoleId>>,

    /// Keys matched against the id OR the name
    pub keys: Option<Vec<String>>,
}

impl RoleFilter {
    /// Filter on a scope only
    pub fn scoped(scope: ScopeFilter) -> Self {
        Self {
            scope,
            ..Default::default()
        }
    }

    /// Check whether a role passes this filter
    pub fn matches(&self, role: &Role) -> bool {
        self.scope.matches(&role.scope)
            && self.name.as_ref().map_or(true, |name| &role.name == name)
            && self.ids.as_ref().map_or(true, |ids| ids.contains(&role.id))
            && self
                .keys
                .as_ref()
                .map_or(true, |keys| keys.iter().any(|k| k == &role.id || k == &role.name))
    }
}

/// Membership lookup filter; `None` leaves a dimension unconstrained
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipFilter {
    /// Scope constraint
    pub scope: ScopeFilter,

    /// User ids
    pub user_ids: Option<Vec<UserId>>,

    /// Role ids
    pub role_ids: Option<Vec<RoleId>>,

    /// Lifecycle state
    pub state: Option<MembershipState>,
}

impl MembershipFilter {
    /// Filter on a scope only
    pub fn scoped(scope: ScopeFilter) -> Self {
        Self {
            scope,
            ..Default::default()
        }
    }

    /// Check whether a membership passes this filter
    pub fn matches(&self, membership: &Membership) -> bool {
        self.scope.matches(&membership.scope)
            && self
                .user_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&membership.user_id))
            && self
                .role_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&membership.role_id))
            && self.state.map_or(true, |state| membership.state == Some(state))
    }
}

/// Role persistence
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Return the role with the same `(scope, name)`, or persist `role`
    async fn find_or_create_role(&self, role: Role) -> Result<Role>;

    /// Find roles passing the filter
    async fn find_roles(&self, filter: &RoleFilter) -> Result<Vec<Role>>;

    /// Count roles passing the filter
    async fn count_roles(&self, filter: &RoleFilter) -> Result<usize>;

    /// Persist changes to an existing role
    async fn save_role(&self, role: Role) -> Result<Role>;

    /// Delete roles passing the filter, returning how many were deleted
    async fn destroy_roles(&self, filter: &RoleFilter) -> Result<usize>;
}

/// Membership persistence
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert, or overwrite the membership with the same `(user_id, role_id)`
    ///
    /// An overwritten membership keeps its id.
    async fn upsert_membership(&self, membership: Membership) -> Result<Membership>;

    /// Find memberships passing the filter
    async fn find_memberships(&self, filter: &MembershipFilter) -> Result<Vec<Membership>>;

    /// Count memberships passing the filter
    async fn count_memberships(&self, filter: &MembershipFilter) -> Result<usize>;

    /// Apply a patch to one membership
    async fn update_membership(&self, id: &str, patch: &MembershipPatch) -> Result<Membership>;

    /// Delete memberships passing the filter
    async fn destroy_memberships(&self, filter: &MembershipFilter) -> Result<usize>;
}

/// Separately stored grant lists
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Find the grant holder for a key
    async fn find_entity(&self, key: &EntityKey) -> Result<Option<SecuredEntity>>;

    /// Find the grant holder for a key, creating an unrestricted one
    async fn find_or_create_entity(&self, key: &EntityKey) -> Result<SecuredEntity>;

    /// Every holder of an entity type, type-wide holders included
    async fn find_entities(&self, entity_type: &str) -> Result<Vec<SecuredEntity>>;

    /// Persist a holder
    async fn save_entity(&self, entity: SecuredEntity) -> Result<SecuredEntity>;

    /// Delete the holders of a key
    async fn destroy_entities(&self, key: &EntityKey) -> Result<usize>;
}

/// Host application records of secured models
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Adapter name checked against the recognized connectors
    fn connector(&self) -> &str;

    /// Load a record by id
    async fn find_record(&self, model: &str, id: &str) -> Result<Option<Record>>;

    /// Load the records of a model passing an optional filter
    async fn find_records(&self, model: &str, filter: Option<&Predicate>) -> Result<Vec<Record>>;

    /// Set one attribute on a record and persist it
    async fn update_attribute(&self, record: &Record, property: &str, value: Value) -> Result<Record>;
}

/// A collaborator covering every store concern
pub trait AclStore: RoleStore + MembershipStore + EntityStore + RecordStore {}

impl<T> AclStore for T where T: RoleStore + MembershipStore + EntityStore + RecordStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn test_role_filter_keys_match_id_or_name() {
        let role = Role::new("member", Scope::global());
        let by_name = RoleFilter {
            keys: Some(vec!["member".to_string()]),
            ..Default::default()
        };
        let by_id = RoleFilter {
            keys: Some(vec![role.id.clone()]),
            ..Default::default()
        };
        let miss = RoleFilter {
            keys: Some(vec!["admin".to_string()]),
            ..Default::default()
        };

        assert!(by_name.matches(&role));
        assert!(by_id.matches(&role));
        assert!(!miss.matches(&role));
    }

    #[test]
    fn test_role_filter_scope() {
        let role = Role::new("member", Scope::new("org", Some("1")));
        assert!(RoleFilter::scoped(ScopeFilter::All).matches(&role));
        assert!(!RoleFilter::scoped(ScopeFilter::Exact(Scope::global())).matches(&role));
    }

    #[test]
    fn test_membership_filter_state() {
        let m = Membership::new("tom", "r1", Scope::global(), Some(MembershipState::Pending));
        let active = MembershipFilter {
            state: Some(MembershipState::Active),
            ..Default::default()
        };
        assert!(!active.matches(&m));
        assert!(MembershipFilter::default().matches(&m));
    }
}
