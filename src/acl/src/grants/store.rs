//! Grant list storage strategies
//!
//! Normalized storage keeps every list in a separate [`SecuredEntity`] keyed
//! by `(entity_type, entity_id)`. Inline storage keeps a record's list in one
//! of its own attributes and falls back to normalized storage for bare
//! identifiers, which have no host record to write to.

use super::types::{EntityRef, GrantHolder, Permission, RemovedGrants};
use crate::error::Result;
use crate::store::{EntityStore, RecordStore};
use crate::types::Record;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Where an entity's grant list lives
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Storage mode name, for logs
    fn mode(&self) -> &'static str;

    /// Locate the holder of an entity's list, creating it when `create` is set
    async fn holder(&self, entity: &EntityRef, create: bool) -> Result<Option<GrantHolder>>;

    /// Read the list off a holder; `None` is unrestricted
    fn permissions(&self, holder: &GrantHolder) -> Result<Option<Vec<Permission>>>;

    /// Replace the list on a holder and persist it
    async fn write(&self, holder: GrantHolder, permissions: Option<Vec<Permission>>) -> Result<GrantHolder>;

    /// Drop an entity's list entirely
    async fn clear(&self, entity: &EntityRef) -> Result<RemovedGrants>;

    /// Every holder carrying a list for an entity type
    async fn holders_of_type(&self, entity_type: &str) -> Result<Vec<GrantHolder>>;
}

/// Grant lists stored as separate keyed records
pub struct NormalizedGrantStore {
    entities: Arc<dyn EntityStore>,
}

impl NormalizedGrantStore {
    /// Create a normalized store over an entity collaborator
    pub fn new(entities: Arc<dyn EntityStore>) -> Self {
        Self { entities }
    }
}

#[async_trait]
impl GrantStore for NormalizedGrantStore {
    fn mode(&self) -> &'static str {
        "normalized"
    }

    async fn holder(&self, entity: &EntityRef, create: bool) -> Result<Option<GrantHolder>> {
        let key = entity.key();
        let found = if create {
            Some(self.entities.find_or_create_entity(&key).await?)
        } else {
            self.entities.find_entity(&key).await?
        };
        Ok(found.map(GrantHolder::Entity))
    }

    fn permissions(&self, holder: &GrantHolder) -> Result<Option<Vec<Permission>>> {
        match holder {
            GrantHolder::Entity(entity) => Ok(entity.permissions.clone()),
            GrantHolder::Record(_) => Ok(None),
        }
    }

    async fn write(&self, holder: GrantHolder, permissions: Option<Vec<Permission>>) -> Result<GrantHolder> {
        match holder {
            GrantHolder::Entity(mut entity) => {
                entity.permissions = permissions;
                let saved = self.entities.save_entity(entity).await?;
                debug!(entity = %saved.key(), "Saved grant list");
                Ok(GrantHolder::Entity(saved))
            }
            GrantHolder::Record(record) => {
                let mut entity = self
                    .entities
                    .find_or_create_entity(&EntityRef::from(&record).key())
                    .await?;
                entity.permissions = permissions;
                Ok(GrantHolder::Entity(self.entities.save_entity(entity).await?))
            }
        }
    }

    async fn clear(&self, entity: &EntityRef) -> Result<RemovedGrants> {
        let removed = self.entities.destroy_entities(&entity.key()).await?;
        debug!(entity = %entity.key(), removed, "Removed grant lists");
        Ok(RemovedGrants::Entities(removed))
    }

    async fn holders_of_type(&self, entity_type: &str) -> Result<Vec<GrantHolder>> {
        Ok(self
            .entities
            .find_entities(entity_type)
            .await?
            .into_iter()
            .filter(|e| e.permissions.is_some())
            .map(GrantHolder::Entity)
            .collect())
    }
}

/// Grant lists stored inline on host records ("dirty" mode)
pub struct InlineGrantStore {
    records: Arc<dyn RecordStore>,
    property: String,
    normalized: NormalizedGrantStore,
}

impl InlineGrantStore {
    /// Create an inline store writing to `property`
    pub fn new(
        records: Arc<dyn RecordStore>,
        entities: Arc<dyn EntityStore>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            records,
            property: property.into(),
            normalized: NormalizedGrantStore::new(entities),
        }
    }

    /// Inline grant property name
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Reload a record so the write starts from the stored list
    async fn reload(&self, record: &Record) -> Result<Record> {
        Ok(self
            .records
            .find_record(&record.model, &record.id)
            .await?
            .unwrap_or_else(|| record.clone()))
    }
}

#[async_trait]
impl GrantStore for InlineGrantStore {
    fn mode(&self) -> &'static str {
        "inline"
    }

    async fn holder(&self, entity: &EntityRef, create: bool) -> Result<Option<GrantHolder>> {
        match entity {
            EntityRef::Record(record) => Ok(Some(GrantHolder::Record(self.reload(record).await?))),
            EntityRef::Identifier { .. } => self.normalized.holder(entity, create).await,
        }
    }

    fn permissions(&self, holder: &GrantHolder) -> Result<Option<Vec<Permission>>> {
        match holder {
            GrantHolder::Record(record) => match record.attributes.get(&self.property) {
                None | Some(Value::Null) => Ok(None),
                Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            },
            GrantHolder::Entity(_) => self.normalized.permissions(holder),
        }
    }

    async fn write(&self, holder: GrantHolder, permissions: Option<Vec<Permission>>) -> Result<GrantHolder> {
        match holder {
            GrantHolder::Record(record) => {
                let value = match permissions {
                    Some(list) => serde_json::to_value(list)?,
                    None => Value::Null,
                };
                let saved = self
                    .records
                    .update_attribute(&record, &self.property, value)
                    .await?;
                debug!(model = %saved.model, id = %saved.id, "Saved inline grant list");
                Ok(GrantHolder::Record(saved))
            }
            GrantHolder::Entity(_) => self.normalized.write(holder, permissions).await,
        }
    }

    async fn clear(&self, entity: &EntityRef) -> Result<RemovedGrants> {
        match entity {
            EntityRef::Record(record) => {
                let record = self.reload(record).await?;
                let saved = self
                    .records
                    .update_attribute(&record, &self.property, Value::Null)
                    .await?;
                debug!(model = %saved.model, id = %saved.id, "Cleared inline grant list");
                Ok(RemovedGrants::Record(saved))
            }
            EntityRef::Identifier { .. } => self.normalized.clear(entity).await,
        }
    }

    async fn holders_of_type(&self, entity_type: &str) -> Result<Vec<GrantHolder>> {
        let mut holders: Vec<GrantHolder> = self
            .records
            .find_records(entity_type, None)
            .await?
            .into_iter()
            .filter(|r| r.attributes.get(&self.property).map_or(false, |v| !v.is_null()))
            .map(GrantHolder::Record)
            .collect();
        holders.extend(self.normalized.holders_of_type(entity_type).await?);
        Ok(holders)
    }
}
