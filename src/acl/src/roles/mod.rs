//! Role graph
//!
//! Roles live inside a scope and inherit from parent roles by id. The
//! inheritance graph may contain cycles in storage; every traversal keeps a
//! visited set so resolution always terminates and reports each ancestor once.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use cretoai_acl::roles::RoleGraph;
//! use cretoai_acl::scope::{Scope, ScopeFilter};
//! use cretoai_acl::store::MemoryStore;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let graph = RoleGraph::new(store.clone(), store, ScopeFilter::Exact(Scope::global()));
//!
//! let member = graph.add_role("member").await.unwrap();
//! let admin = graph.add_role("admin").await.unwrap();
//! graph.inherit(&admin, [&member]).await.unwrap();
//!
//! let ancestors = graph.recurse_parent_role_ids([&admin]).await.unwrap();
//! assert_eq!(ancestors, vec![member.id]);
//! # });
//! ```

mod types;


pub use types::{Role, RoleData, RoleQuery, RoleRef, RoleSelector};

use crate::error::{AclError, Result};
use crate::scope::ScopeFilter;
use crate::store::{MembershipFilter, MembershipStore, RoleFilter, RoleStore};
use crate::types::RoleId;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Scoped view over the role store
#[derive(Clone)]
pub struct RoleGraph {
    roles: Arc<dyn RoleStore>,
    memberships: Arc<dyn MembershipStore>,
    scope: ScopeFilter,
}

impl RoleGraph {
    /// Create a graph view bound to a scope filter
    pub fn new(roles: Arc<dyn RoleStore>, memberships: Arc<dyn MembershipStore>, scope: ScopeFilter) -> Self {
        Self {
            roles,
            memberships,
            scope,
        }
    }

    /// The same stores under another scope filter
    pub fn with_scope(&self, scope: ScopeFilter) -> Self {
        Self {
            roles: self.roles.clone(),
            memberships: self.memberships.clone(),
            scope,
        }
    }

    /// Scope filter applied to lookups
    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// Find or create a role by `(scope, name)`
    ///
    /// Without an explicit scope the role lands in the view's scope. The
    /// all-scopes view has no partition to stamp, so it requires one.
    pub async fn add_role(&self, data: impl Into<RoleData>) -> Result<Role> {
        let data = data.into();
        let name = data.name.trim();
        if name.is_empty() {
            return Err(AclError::InvalidRoleData("role name is required".to_string()));
        }

        let scope = match (data.scope, self.scope.scope()) {
            (Some(scope), _) => scope,
            (None, Some(scope)) => scope.clone(),
            (None, None) => {
                return Err(AclError::InvalidRoleData(format!(
                    "role '{}' needs an explicit scope in the all-scopes view",
                    name
                )))
            }
        };

        let role = self.roles.find_or_create_role(Role::new(name, scope)).await?;
        info!(role_id = %role.id, name = %role.name, scope = %role.scope, "Added role");
        Ok(role)
    }

    fn query_filter(&self, query: RoleQuery) -> RoleFilter {
        RoleFilter {
            scope: query.scope.map_or_else(|| self.scope.clone(), ScopeFilter::Exact),
            name: query.name,
            ids: query.ids,
            keys: None,
        }
    }

    /// Find roles matching a query inside the view's scope
    pub async fn find_roles(&self, query: RoleQuery) -> Result<Vec<Role>> {
        self.roles.find_roles(&self.query_filter(query)).await
    }

    /// Count roles matching a query inside the view's scope
    pub async fn count_roles(&self, query: RoleQuery) -> Result<usize> {
        self.roles.count_roles(&self.query_filter(query)).await
    }

    /// Remove roles, deleting their memberships first
    ///
    /// Returns the number of removed roles. When the membership cascade
    /// fails no role is deleted.
    pub async fn remove_roles(&self, selector: impl Into<RoleSelector>) -> Result<usize> {
        let filter = match selector.into() {
            RoleSelector::Query(query) => self.query_filter(query),
            RoleSelector::Key(key) => RoleFilter {
                scope: self.scope.clone(),
                keys: Some(vec![key]),
                ..Default::default()
            },
        };

        let ids: Vec<RoleId> = self
            .roles
            .find_roles(&filter)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let unassigned = self
            .memberships
            .destroy_memberships(&MembershipFilter {
                role_ids: Some(ids.clone()),
                ..Default::default()
            })
            .await?;

        let removed = self
            .roles
            .destroy_roles(&RoleFilter {
                ids: Some(ids.clone()),
                ..Default::default()
            })
            .await?;

        let detached = self.detach_parents(&ids).await?;

        info!(removed, unassigned, detached, scope = %self.scope, "Removed roles");
        Ok(removed)
    }

    /// Drop removed role ids from the parent lists of every remaining role
    async fn detach_parents(&self, removed: &[RoleId]) -> Result<usize> {
        let children: Vec<Role> = self
            .roles
            .find_roles(&RoleFilter::default())
            .await?
            .into_iter()
            .filter(|r| r.parent_ids.iter().any(|id| removed.contains(id)))
            .collect();

        let detached = children.len();
        for mut child in children {
            let kept: Vec<RoleId> = child
                .parent_ids
                .iter()
                .filter(|id| !removed.contains(id))
                .cloned()
                .collect();
            child.set_parent_ids(kept);
            self.roles.save_role(child).await?;
        }
        Ok(detached)
    }

    /// Resolve role objects and id-or-name references to roles in scope
    ///
    /// Unknown references resolve to nothing. The result is deduplicated by id.
    pub async fn resolve<I, R>(&self, roles: I) -> Result<Vec<Role>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.resolve_in(&self.scope, roles.into_iter().map(Into::into).collect())
            .await
    }

    async fn resolve_in(&self, scope: &ScopeFilter, roles: Vec<RoleRef>) -> Result<Vec<Role>> {
        let mut resolved: Vec<Role> = Vec::new();
        let mut keys: Vec<String> = Vec::new();

        for role in roles {
            match role {
                RoleRef::Resolved(role) if scope.matches(&role.scope) => resolved.push(role),
                RoleRef::Resolved(_) => {}
                RoleRef::Reference(key) if !key.is_empty() => keys.push(key),
                RoleRef::Reference(_) => {}
            }
        }

        if !keys.is_empty() {
            let found = self
                .roles
                .find_roles(&RoleFilter {
                    scope: scope.clone(),
                    keys: Some(keys),
                    ..Default::default()
                })
                .await?;
            resolved.extend(found);
        }

        let mut seen: HashSet<RoleId> = HashSet::new();
        resolved.retain(|r| seen.insert(r.id.clone()));
        Ok(resolved)
    }

    /// Ids of [`get_parent_roles`](Self::get_parent_roles)
    pub async fn get_parent_role_ids<I, R>(&self, roles: I) -> Result<Vec<RoleId>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        let roles = self.resolve(roles).await?;
        Ok(self.parents_of(&roles).await?.into_iter().map(|r| r.id).collect())
    }

    /// Direct parents of the given roles, resolved in scope
    pub async fn get_parent_roles<I, R>(&self, roles: I) -> Result<Vec<Role>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        let roles = self.resolve(roles).await?;
        self.parents_of(&roles).await
    }

    async fn parents_of(&self, roles: &[Role]) -> Result<Vec<Role>> {
        let ids = parent_ids_of(roles);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.roles
            .find_roles(&RoleFilter {
                scope: self.scope.clone(),
                ids: Some(ids),
                ..Default::default()
            })
            .await
    }

    /// Every ancestor of the given roles, each exactly once
    ///
    /// Walks the graph one frontier at a time; a frontier holds only roles
    /// not seen before, so cycles end the walk. A start role that sits on a
    /// cycle is reported as its own ancestor.
    pub async fn recurse_parent_roles<I, R>(&self, roles: I) -> Result<Vec<Role>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        let mut frontier = self.resolve(roles).await?;
        let mut visited: HashSet<RoleId> = HashSet::new();
        let mut ancestors: Vec<Role> = Vec::new();

        loop {
            let fresh: Vec<Role> = self
                .parents_of(&frontier)
                .await?
                .into_iter()
                .filter(|p| visited.insert(p.id.clone()))
                .collect();
            if fresh.is_empty() {
                break;
            }
            ancestors.extend(fresh.iter().cloned());
            frontier = fresh;
        }

        debug!(ancestors = ancestors.len(), "Resolved parent roles");
        Ok(ancestors)
    }

    /// Ids of [`recurse_parent_roles`](Self::recurse_parent_roles)
    pub async fn recurse_parent_role_ids<I, R>(&self, roles: I) -> Result<Vec<RoleId>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        Ok(self
            .recurse_parent_roles(roles)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }

    /// Add parents to a role
    pub async fn inherit<I, R>(&self, role: impl Into<RoleRef>, parents: I) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.edit_parents(role.into(), parents, |current, parents| {
            let mut next = current.to_vec();
            next.extend(parents);
            next
        })
        .await
    }

    /// Remove parents from a role
    pub async fn uninherit<I, R>(&self, role: impl Into<RoleRef>, parents: I) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.edit_parents(role.into(), parents, |current, parents| {
            current
                .iter()
                .filter(|id| !parents.contains(*id))
                .cloned()
                .collect()
        })
        .await
    }

    /// Replace a role's parents
    pub async fn set_inherits<I, R>(&self, role: impl Into<RoleRef>, parents: I) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.edit_parents(role.into(), parents, |_, parents| parents).await
    }

    async fn edit_parents<I, R, F>(&self, role: RoleRef, parents: I, edit: F) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
        F: FnOnce(&[RoleId], Vec<RoleId>) -> Vec<RoleId>,
    {
        let mut role = self.load(role).await?;

        let scope = ScopeFilter::Exact(role.scope.clone());
        let parent_ids: Vec<RoleId> = self
            .resolve_in(&scope, parents.into_iter().map(Into::into).collect())
            .await?
            .into_iter()
            .map(|r| r.id)
            .filter(|id| id != &role.id)
            .collect();

        let next = edit(&role.parent_ids, parent_ids);
        role.set_parent_ids(next);

        let role = self.roles.save_role(role).await?;
        debug!(role_id = %role.id, parents = ?role.parent_ids, "Updated role parents");
        Ok(role)
    }

    /// Load the stored copy of a role addressed by object or id
    async fn load(&self, role: RoleRef) -> Result<Role> {
        let id = match role {
            RoleRef::Resolved(role) => role.id,
            RoleRef::Reference(id) => id,
        };
        self.roles
            .find_roles(&RoleFilter {
                ids: Some(vec![id.clone()]),
                ..Default::default()
            })
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AclError::NotFound(format!("role {}", id)))
    }
}

fn parent_ids_of(roles: &[Role]) -> Vec<RoleId> {
    let mut seen: HashSet<&RoleId> = HashSet::new();
    roles
        .iter()
        .flat_map(|r| r.parent_ids.iter().filter(move |id| *id != &r.id))
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}
