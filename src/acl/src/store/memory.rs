//! In-memory store collaborator

use super::{EntityStore, MembershipFilter, MembershipStore, RecordStore, RoleFilter, RoleStore};
use crate::error::{AclError, Result};
use crate::grants::{EntityKey, SecuredEntity};
use crate::membership::{Membership, MembershipPatch};
use crate::roles::Role;
use crate::secure::Predicate;
use crate::types::{Record, RoleId};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Connector name reported by [`MemoryStore`]
pub const MEMORY_CONNECTOR: &str = "memory";

/// In-memory implementation of every store trait
///
/// Host records are keyed by `(model, id)`. Writing an attribute on a record
/// the store has not seen yet inserts it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    roles: Arc<RwLock<HashMap<RoleId, Role>>>,
    memberships: Arc<RwLock<HashMap<String, Membership>>>,
    entities: Arc<RwLock<HashMap<String, SecuredEntity>>>,
    records: Arc<RwLock<HashMap<String, HashMap<String, Record>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a host record
    pub async fn insert_record(&self, record: Record) -> Record {
        let mut records = self.records.write().await;
        records
            .entry(record.model.clone())
            .or_default()
            .insert(record.id.clone(), record.clone());
        record
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_or_create_role(&self, role: Role) -> Result<Role> {
        let mut roles = self.roles.write().await;
        if let Some(existing) = roles
            .values()
            .find(|r| r.scope == role.scope && r.name == role.name)
        {
            return Ok(existing.clone());
        }
        roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn find_roles(&self, filter: &RoleFilter) -> Result<Vec<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.values().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn count_roles(&self, filter: &RoleFilter) -> Result<usize> {
        let roles = self.roles.read().await;
        Ok(roles.values().filter(|r| filter.matches(r)).count())
    }

    async fn save_role(&self, role: Role) -> Result<Role> {
        let mut roles = self.roles.write().await;
        match roles.get_mut(&role.id) {
            Some(slot) => {
                *slot = role.clone();
                Ok(role)
            }
            None => Err(AclError::NotFound(format!("role {}", role.id))),
        }
    }

    async fn destroy_roles(&self, filter: &RoleFilter) -> Result<usize> {
        let mut roles = self.roles.write().await;
        let before = roles.len();
        roles.retain(|_, r| !filter.matches(r));
        Ok(before - roles.len())
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn upsert_membership(&self, mut membership: Membership) -> Result<Membership> {
        let mut memberships = self.memberships.write().await;
        if let Some(existing) = memberships
            .values()
            .find(|m| m.user_id == membership.user_id && m.role_id == membership.role_id)
        {
            membership.id = existing.id.clone();
        }
        memberships.insert(membership.id.clone(), membership.clone());
        Ok(membership)
    }

    async fn find_memberships(&self, filter: &MembershipFilter) -> Result<Vec<Membership>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn count_memberships(&self, filter: &MembershipFilter) -> Result<usize> {
        let memberships = self.memberships.read().await;
        Ok(memberships.values().filter(|m| filter.matches(m)).count())
    }

    async fn update_membership(&self, id: &str, patch: &MembershipPatch) -> Result<Membership> {
        let mut memberships = self.memberships.write().await;
        let membership = memberships
            .get_mut(id)
            .ok_or_else(|| AclError::NotFound(format!("membership {}", id)))?;
        patch.apply(membership);
        Ok(membership.clone())
    }

    async fn destroy_memberships(&self, filter: &MembershipFilter) -> Result<usize> {
        let mut memberships = self.memberships.write().await;
        let before = memberships.len();
        memberships.retain(|_, m| !filter.matches(m));
        Ok(before - memberships.len())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_entity(&self, key: &EntityKey) -> Result<Option<SecuredEntity>> {
        let entities = self.entities.read().await;
        Ok(entities.values().find(|e| &e.key() == key).cloned())
    }

    async fn find_or_create_entity(&self, key: &EntityKey) -> Result<SecuredEntity> {
        let mut entities = self.entities.write().await;
        if let Some(existing) = entities.values().find(|e| &e.key() == key) {
            return Ok(existing.clone());
        }
        let entity = SecuredEntity::new(key);
        entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    async fn find_entities(&self, entity_type: &str) -> Result<Vec<SecuredEntity>> {
        let entities = self.entities.read().await;
        Ok(entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .cloned()
            .collect())
    }

    async fn save_entity(&self, entity: SecuredEntity) -> Result<SecuredEntity> {
        let mut entities = self.entities.write().await;
        entities.insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    async fn destroy_entities(&self, key: &EntityKey) -> Result<usize> {
        let mut entities = self.entities.write().await;
        let before = entities.len();
        entities.retain(|_, e| &e.key() != key);
        Ok(before - entities.len())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn connector(&self) -> &str {
        MEMORY_CONNECTOR
    }

    async fn find_record(&self, model: &str, id: &str) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.get(model).and_then(|rows| rows.get(id)).cloned())
    }

    async fn find_records(&self, model: &str, filter: Option<&Predicate>) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        let Some(rows) = records.get(model) else {
            return Ok(Vec::new());
        };

        let mut out: Vec<Record> = rows
            .values()
            .filter(|r| filter.map_or(true, |p| p.matches(r)))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn update_attribute(&self, record: &Record, property: &str, value: Value) -> Result<Record> {
        let mut records = self.records.write().await;
        let row = records
            .entry(record.model.clone())
            .or_default()
            .entry(record.id.clone())
            .or_insert_with(|| record.clone());
        row.attributes.insert(property.to_string(), value);
        Ok(row.clone())
    }
}
