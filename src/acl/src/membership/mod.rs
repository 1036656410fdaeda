//! Membership lifecycle
//!
//! Assigns users to roles. A membership is unique per `(user_id, role_id)`
//! and carries the role's scope. New memberships start `pending`; only
//! `active` memberships count when resolving a user's roles.

mod types;


pub use types::{Membership, MembershipPatch, MembershipState, MembershipUpdate};

use crate::error::{AclError, Result};
use crate::roles::{Role, RoleGraph, RoleRef};
use crate::store::{MembershipFilter, MembershipStore};
use crate::types::{normalize_users, BulkResult, RoleId, Selection, UserId};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Scoped view over the membership store
#[derive(Clone)]
pub struct Memberships {
    graph: RoleGraph,
    store: Arc<dyn MembershipStore>,
}

impl Memberships {
    /// Create a membership manager over a role graph view
    pub fn new(graph: RoleGraph, store: Arc<dyn MembershipStore>) -> Self {
        Self { graph, store }
    }

    /// Role graph this manager resolves roles with
    pub fn graph(&self) -> &RoleGraph {
        &self.graph
    }

    /// Resolve a user selection to a filter dimension
    fn user_dimension(users: Selection<UserId>) -> Option<Vec<UserId>> {
        match normalize_users(users) {
            Selection::Any => None,
            Selection::Only(users) => Some(users),
        }
    }

    /// Resolve a role selection to a filter dimension of role ids
    async fn role_dimension(&self, roles: Selection<RoleRef>) -> Result<Option<Vec<RoleId>>> {
        match roles {
            Selection::Any => Ok(None),
            Selection::Only(roles) => Ok(Some(
                self.graph.resolve(roles).await?.into_iter().map(|r| r.id).collect(),
            )),
        }
    }

    async fn filter(
        &self,
        users: Selection<UserId>,
        roles: Selection<RoleRef>,
        state: Option<MembershipState>,
    ) -> Result<MembershipFilter> {
        Ok(MembershipFilter {
            scope: self.graph.scope().clone(),
            user_ids: Self::user_dimension(users),
            role_ids: self.role_dimension(roles).await?,
            state,
        })
    }

    /// Assign every resolved role to every user
    ///
    /// Existing memberships keep their state unless `state` is given; new
    /// ones default to `pending`. Each `(user, role)` pair is written
    /// independently and failures are reported per pair.
    pub async fn assign_memberships(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
        state: Option<MembershipState>,
    ) -> Result<BulkResult<Membership>> {
        let users = match normalize_users(users.into()) {
            Selection::Any => {
                return Err(AclError::InvalidArgument("cannot assign roles to '*' users".to_string()))
            }
            Selection::Only(users) => users,
        };
        let roles = match roles.into() {
            Selection::Any => {
                return Err(AclError::InvalidArgument("cannot assign '*' roles".to_string()))
            }
            Selection::Only(roles) => self.graph.resolve(roles).await?,
        };

        self.upsert_all(users, roles, state).await
    }

    /// Assign the first resolved role to a user
    pub async fn assign_membership(
        &self,
        user: impl Into<UserId>,
        role: impl Into<RoleRef>,
        state: Option<MembershipState>,
    ) -> Result<Option<Membership>> {
        let user = user.into();
        if user.is_empty() {
            return Ok(None);
        }
        let Some(role) = self.graph.resolve([role.into()]).await?.into_iter().next() else {
            return Ok(None);
        };

        let mut outcome = self.upsert_all(vec![user], vec![role], state).await?;
        if let Some(failure) = outcome.failures.pop() {
            return Err(failure.error);
        }
        Ok(outcome.items.pop())
    }

    async fn upsert_all(
        &self,
        users: Vec<UserId>,
        roles: Vec<Role>,
        state: Option<MembershipState>,
    ) -> Result<BulkResult<Membership>> {
        let mut outcome = BulkResult::default();
        if users.is_empty() || roles.is_empty() {
            return Ok(outcome);
        }

        let existing: HashMap<(UserId, RoleId), Option<MembershipState>> = self
            .store
            .find_memberships(&MembershipFilter {
                user_ids: Some(users.clone()),
                role_ids: Some(roles.iter().map(|r| r.id.clone()).collect()),
                ..Default::default()
            })
            .await?
            .into_iter()
            .map(|m| ((m.user_id, m.role_id), m.state))
            .collect();

        let items: Vec<Membership> = roles
            .iter()
            .flat_map(|role| {
                users.iter().map(|user| {
                    let current = existing.get(&(user.clone(), role.id.clone())).copied();
                    let state = match (state, current) {
                        (Some(state), _) => Some(state),
                        (None, Some(current)) => current,
                        (None, None) => Some(MembershipState::Pending),
                    };
                    Membership::new(user.clone(), role.id.clone(), role.scope.clone(), state)
                })
            })
            .collect();

        let writes = items.into_iter().map(|membership| {
            let store = self.store.clone();
            async move {
                let key = membership.key();
                (key, store.upsert_membership(membership).await)
            }
        });

        for (key, result) in join_all(writes).await {
            outcome.push(key, result);
        }

        info!(
            assigned = outcome.items.len(),
            failed = outcome.failures.len(),
            scope = %self.graph.scope(),
            "Assigned memberships"
        );
        Ok(outcome)
    }

    /// Delete memberships of the given users and roles; `"*"` matches any
    pub async fn unassign_memberships(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
    ) -> Result<usize> {
        let filter = self.filter(users.into(), roles.into(), None).await?;
        if filter.user_ids.as_ref().map_or(false, Vec::is_empty)
            || filter.role_ids.as_ref().map_or(false, Vec::is_empty)
        {
            return Ok(0);
        }

        let removed = self.store.destroy_memberships(&filter).await?;
        info!(removed, scope = %self.graph.scope(), "Unassigned memberships");
        Ok(removed)
    }

    /// Move matching memberships to another role and/or change their state
    ///
    /// A state name other than `pending` or `active` clears the state.
    pub async fn update_memberships(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
        update: MembershipUpdate,
    ) -> Result<BulkResult<Membership>> {
        let mut patch = MembershipPatch {
            state: update.state.as_deref().map(MembershipState::parse),
            ..Default::default()
        };
        if let Some(role) = update.role {
            let role = self
                .graph
                .resolve([role])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| AclError::NotFound("target role of membership update".to_string()))?;
            patch.role_id = Some(role.id);
            patch.scope = Some(role.scope);
        }

        let memberships = self.find_memberships(users, roles, None).await?;
        let mut outcome = BulkResult::default();
        if patch.is_empty() {
            outcome.items = memberships;
            return Ok(outcome);
        }

        if let Some(target) = patch.role_id.clone() {
            // Sequential: several sources may collapse onto one target row
            for membership in memberships {
                let key = membership.key();
                let result = self.move_membership(membership, &target, &patch).await;
                outcome.push(key, result);
            }
        } else {
            let writes = memberships.into_iter().map(|membership| {
                let store = self.store.clone();
                let patch = &patch;
                async move {
                    let key = membership.key();
                    (key, store.update_membership(&membership.id, patch).await)
                }
            });

            for (key, result) in join_all(writes).await {
                outcome.push(key, result);
            }
        }

        debug!(updated = outcome.items.len(), failed = outcome.failures.len(), "Updated memberships");
        Ok(outcome)
    }

    /// Move one membership onto `target`, merging into the user's existing
    /// membership for that role so `(user_id, role_id)` stays unique
    async fn move_membership(
        &self,
        membership: Membership,
        target: &RoleId,
        patch: &MembershipPatch,
    ) -> Result<Membership> {
        if &membership.role_id == target {
            return self.store.update_membership(&membership.id, patch).await;
        }

        let existing = self
            .store
            .find_memberships(&MembershipFilter {
                user_ids: Some(vec![membership.user_id.clone()]),
                role_ids: Some(vec![target.clone()]),
                ..Default::default()
            })
            .await?
            .into_iter()
            .next();

        let Some(existing) = existing else {
            return self.store.update_membership(&membership.id, patch).await;
        };

        let merge = MembershipPatch {
            state: Some(patch.state.unwrap_or(if existing.is_active() {
                existing.state
            } else {
                membership.state
            })),
            ..Default::default()
        };
        let merged = self.store.update_membership(&existing.id, &merge).await?;
        self.store
            .destroy_memberships(&MembershipFilter {
                user_ids: Some(vec![membership.user_id]),
                role_ids: Some(vec![membership.role_id]),
                ..Default::default()
            })
            .await?;
        Ok(merged)
    }

    /// Update the first matching membership
    pub async fn update_membership(
        &self,
        user: impl Into<Selection<UserId>>,
        role: impl Into<Selection<RoleRef>>,
        update: MembershipUpdate,
    ) -> Result<Option<Membership>> {
        let mut outcome = self.update_memberships(user, role, update).await?;
        if let Some(failure) = outcome.failures.pop() {
            return Err(failure.error);
        }
        Ok(outcome.items.into_iter().next())
    }

    /// Activate the memberships of a user in the given roles
    pub async fn approve_membership(
        &self,
        user: impl Into<Selection<UserId>>,
        role: impl Into<Selection<RoleRef>>,
    ) -> Result<BulkResult<Membership>> {
        self.update_memberships(user, role, MembershipUpdate::state(MembershipState::Active.as_str()))
            .await
    }

    /// Find memberships; `state` of `None` matches every state
    pub async fn find_memberships(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
        state: Option<MembershipState>,
    ) -> Result<Vec<Membership>> {
        let filter = self.filter(users.into(), roles.into(), state).await?;
        self.store.find_memberships(&filter).await
    }

    /// First matching membership
    pub async fn find_membership(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
        state: Option<MembershipState>,
    ) -> Result<Option<Membership>> {
        Ok(self.find_memberships(users, roles, state).await?.into_iter().next())
    }

    /// Every membership of a user in scope, whatever its state
    pub async fn find_user_role_mappings(&self, user: impl Into<Selection<UserId>>) -> Result<Vec<Membership>> {
        self.find_memberships(user, Selection::<RoleRef>::Any, None).await
    }

    /// Roles held through active memberships, with their ancestors when
    /// `recursive` is set
    pub async fn find_user_roles(&self, user: impl Into<Selection<UserId>>, recursive: bool) -> Result<Vec<Role>> {
        let role_ids: Vec<RoleId> = self
            .find_memberships(user, Selection::<RoleRef>::Any, Some(MembershipState::Active))
            .await?
            .into_iter()
            .map(|m| m.role_id)
            .collect();
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut roles = self.graph.resolve(role_ids).await?;
        if recursive {
            let ancestors = self.graph.recurse_parent_roles(roles.iter()).await?;
            roles.extend(ancestors);
            let mut seen: HashSet<RoleId> = HashSet::new();
            roles.retain(|r| seen.insert(r.id.clone()));
        }
        Ok(roles)
    }

    /// Ids of [`find_user_roles`](Self::find_user_roles)
    pub async fn find_user_role_ids(&self, user: impl Into<Selection<UserId>>, recursive: bool) -> Result<Vec<RoleId>> {
        Ok(self
            .find_user_roles(user, recursive)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }

    /// Users holding any of the roles
    ///
    /// `"*"`, `"all"` or an empty selection means every role in scope.
    pub async fn find_role_users(&self, roles: impl Into<Selection<RoleRef>>) -> Result<Vec<UserId>> {
        let roles = match roles.into() {
            Selection::Only(roles) if roles.is_empty() => Selection::Any,
            Selection::Only(roles)
                if roles.len() == 1
                    && matches!(&roles[0], RoleRef::Reference(key) if key.eq_ignore_ascii_case("all")) =>
            {
                Selection::Any
            }
            other => other,
        };

        let memberships = self.find_memberships(Selection::<UserId>::Any, roles, None).await?;
        let mut seen: HashSet<UserId> = HashSet::new();
        Ok(memberships
            .into_iter()
            .map(|m| m.user_id)
            .filter(|u| seen.insert(u.clone()))
            .collect())
    }

    /// Whether the user holds every one of the roles through active memberships
    pub async fn has_roles(&self, user: impl Into<UserId>, roles: impl Into<Selection<RoleRef>>) -> Result<bool> {
        let user = user.into();
        let role_ids = match roles.into() {
            Selection::Any => return Ok(false),
            Selection::Only(roles) => self
                .graph
                .resolve(roles)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect::<Vec<_>>(),
        };
        if user.is_empty() || role_ids.is_empty() {
            return Ok(false);
        }

        let expected = role_ids.len();
        let held = self
            .store
            .count_memberships(&MembershipFilter {
                scope: self.graph.scope().clone(),
                user_ids: Some(vec![user]),
                role_ids: Some(role_ids),
                state: Some(MembershipState::Active),
            })
            .await?;
        Ok(held == expected)
    }
}
