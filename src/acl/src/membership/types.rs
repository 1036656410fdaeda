//! Membership type definitions

use crate::roles::RoleRef;
use crate::scope::Scope;
use crate::types::{RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipState {
    /// Assigned but not yet approved; ignored by role resolution
    Pending,
    /// Approved; counts towards the user's roles
    Active,
}

impl MembershipState {
    /// Parse a state name; anything unrecognized yields `None` ("unset")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            _ => None,
        }
    }

    /// Lowercase state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for MembershipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment of a user to a role
///
/// Unique per `(user_id, role_id)`. The scope is copied from the role at
/// assignment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Opaque unique key
    pub id: String,

    /// Assigned user
    pub user_id: UserId,

    /// Assigned role
    pub role_id: RoleId,

    /// Scope of the role at assignment time
    #[serde(flatten)]
    pub scope: Scope,

    /// Lifecycle state; `None` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<MembershipState>,
}

impl Membership {
    /// Create a membership with a fresh id
    pub fn new(
        user_id: impl Into<UserId>,
        role_id: impl Into<RoleId>,
        scope: Scope,
        state: Option<MembershipState>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            role_id: role_id.into(),
            scope,
            state,
        }
    }

    /// Whether this membership counts towards role resolution
    pub fn is_active(&self) -> bool {
        self.state == Some(MembershipState::Active)
    }

    /// Key used in bulk failure reports
    pub(crate) fn key(&self) -> String {
        format!("{} -> {}", self.user_id, self.role_id)
    }
}

/// Caller-facing membership update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipUpdate {
    /// Move the membership to this role (first match if it resolves to many)
    pub role: Option<RoleRef>,

    /// New state name; unrecognized names clear the state
    pub state: Option<String>,
}

impl MembershipUpdate {
    /// Update that only changes the state
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            role: None,
            state: Some(state.into()),
        }
    }

    /// Update that only changes the role
    pub fn role(role: impl Into<RoleRef>) -> Self {
        Self {
            role: Some(role.into()),
            state: None,
        }
    }
}

/// Attribute patch handed to the membership store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipPatch {
    /// New role id
    pub role_id: Option<RoleId>,

    /// New scope, travels with `role_id`
    pub scope: Option<Scope>,

    /// Outer `None` leaves the state untouched, `Some(None)` clears it
    pub state: Option<Option<MembershipState>>,
}

impl MembershipPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.role_id.is_none() && self.scope.is_none() && self.state.is_none()
    }

    /// Apply this patch to a membership in place
    pub fn apply(&self, membership: &mut Membership) {
        if let Some(role_id) = &self.role_id {
            membership.role_id = role_id.clone();
        }
        if let Some(scope) = &self.scope {
            membership.scope = scope.clone();
        }
        if let Some(state) = self.state {
            membership.state = state;
        }
    }
}
