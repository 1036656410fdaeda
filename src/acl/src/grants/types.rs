//! Grant type definitions

use crate::error::{AclError, Result};
use crate::types::{is_wildcard_action, type_id, Actions, Record, SubjectId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `(subject, actions)` grant recorded against a secured entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Subject identifier
    pub subject: SubjectId,

    /// Uppercase action tokens; may contain the wildcard
    #[serde(default)]
    pub actions: Vec<String>,
}

impl Permission {
    /// Create a grant
    pub fn new(subject: impl Into<SubjectId>, actions: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            actions,
        }
    }

    /// Whether this grant contains a wildcard action
    pub fn is_wildcard(&self) -> bool {
        self.actions.iter().any(|a| is_wildcard_action(a))
    }
}

/// Key of a separately stored grant list: `(entity_type, entity_id)`
///
/// A `None` entity id is a type-wide grant list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityKey {
    /// Entity type (model name)
    pub entity_type: String,

    /// Entity id, `None` for the whole type
    pub entity_id: Option<String>,
}

impl EntityKey {
    /// Create a key
    pub fn new(entity_type: impl Into<String>, entity_id: Option<&str>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.map(str::to_string),
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entity_id {
            Some(id) => write!(f, "{}:{}", self.entity_type, id),
            None => write!(f, "{}", self.entity_type),
        }
    }
}

/// Separately stored grant list ("normalized" mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuredEntity {
    /// Opaque unique key
    pub id: String,

    /// Entity type
    pub entity_type: String,

    /// Entity id, `None` for a type-wide list
    pub entity_id: Option<String>,

    /// Grants; `None` means unrestricted
    #[serde(default)]
    pub permissions: Option<Vec<Permission>>,
}

impl SecuredEntity {
    /// Create an unrestricted holder for `key`
    pub fn new(key: &EntityKey) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_type: key.entity_type.clone(),
            entity_id: key.entity_id.clone(),
            permissions: None,
        }
    }

    /// The `(type, id)` key of this holder
    pub fn key(&self) -> EntityKey {
        EntityKey {
            entity_type: self.entity_type.clone(),
            entity_id: self.entity_id.clone(),
        }
    }
}

/// An entity argument
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRef {
    /// A loaded host record
    Record(Record),
    /// A `(type, id)` identifier; no id addresses the whole type
    Identifier {
        /// Entity type
        entity_type: String,
        /// Entity id
        entity_id: Option<String>,
    },
}

impl EntityRef {
    /// Key of the separately stored grant list for this entity
    pub fn key(&self) -> EntityKey {
        match self {
            Self::Record(record) => EntityKey::new(record.model.clone(), Some(record.id.as_str())),
            Self::Identifier { entity_type, entity_id } => EntityKey {
                entity_type: entity_type.clone(),
                entity_id: entity_id.clone(),
            },
        }
    }

    /// Reject entities that cannot be addressed
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Record(record) if record.model.is_empty() || record.id.is_empty() => {
                Err(AclError::InvalidArgument(format!(
                    "entity record needs a model and an id, got '{}:{}'",
                    record.model, record.id
                )))
            }
            Self::Identifier { entity_type, .. } if entity_type.is_empty() => Err(
                AclError::InvalidArgument("entity identifier needs a type".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl From<&str> for EntityRef {
    fn from(s: &str) -> Self {
        let (entity_type, entity_id) = type_id(s);
        Self::Identifier {
            entity_type: entity_type.unwrap_or_default(),
            entity_id,
        }
    }
}

impl From<Record> for EntityRef {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<&Record> for EntityRef {
    fn from(record: &Record) -> Self {
        Self::Record(record.clone())
    }
}

impl From<EntityKey> for EntityRef {
    fn from(key: EntityKey) -> Self {
        Self::Identifier {
            entity_type: key.entity_type,
            entity_id: key.entity_id,
        }
    }
}

/// One or many entities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities(pub Vec<EntityRef>);

impl Entities {
    /// Validate every entity and drop duplicates
    pub fn normalize(self) -> Result<Vec<EntityRef>> {
        let mut out: Vec<EntityRef> = Vec::with_capacity(self.0.len());
        for entity in self.0 {
            entity.validate()?;
            if !out.iter().any(|e| e.key() == entity.key()) {
                out.push(entity);
            }
        }
        Ok(out)
    }
}

impl From<&str> for Entities {
    fn from(s: &str) -> Self {
        Self(vec![s.into()])
    }
}

impl From<&Record> for Entities {
    fn from(record: &Record) -> Self {
        Self(vec![record.into()])
    }
}

impl From<Record> for Entities {
    fn from(record: Record) -> Self {
        Self(vec![record.into()])
    }
}

impl From<EntityRef> for Entities {
    fn from(entity: EntityRef) -> Self {
        Self(vec![entity])
    }
}

impl<const N: usize> From<[&Record; N]> for Entities {
    fn from(records: [&Record; N]) -> Self {
        Self(records.iter().map(|r| EntityRef::from(*r)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Entities {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.iter().map(|s| EntityRef::from(*s)).collect())
    }
}

impl From<Vec<EntityRef>> for Entities {
    fn from(entities: Vec<EntityRef>) -> Self {
        Self(entities)
    }
}

impl From<Vec<Record>> for Entities {
    fn from(records: Vec<Record>) -> Self {
        Self(records.into_iter().map(EntityRef::from).collect())
    }
}

/// Actions to revoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revocation {
    /// Revoke every action of the subject
    All,
    /// Revoke only these actions
    Actions(Actions),
}

impl Revocation {
    /// Uppercase the revoked actions; `None` means "all"
    ///
    /// A list containing `"*"` or `"ALL"` revokes every action.
    pub fn normalize(&self) -> Result<Option<Vec<String>>> {
        match self {
            Self::All => Ok(None),
            Self::Actions(actions) => {
                let actions = actions.normalize()?;
                if actions.iter().any(|a| is_wildcard_action(a)) {
                    Ok(None)
                } else {
                    Ok(Some(actions))
                }
            }
        }
    }
}

impl From<&str> for Revocation {
    fn from(action: &str) -> Self {
        if is_wildcard_action(action.trim()) {
            Self::All
        } else {
            Self::Actions(action.into())
        }
    }
}

impl From<Option<&str>> for Revocation {
    fn from(action: Option<&str>) -> Self {
        action.map_or(Self::All, Self::from)
    }
}

impl<const N: usize> From<[&str; N]> for Revocation {
    fn from(actions: [&str; N]) -> Self {
        Self::Actions(actions.into())
    }
}

impl From<Vec<&str>> for Revocation {
    fn from(actions: Vec<&str>) -> Self {
        Self::Actions(actions.into())
    }
}

impl From<Vec<String>> for Revocation {
    fn from(actions: Vec<String>) -> Self {
        Self::Actions(actions.into())
    }
}

/// Whatever holds an entity's grant list after a write
#[derive(Debug, Clone, PartialEq)]
pub enum GrantHolder {
    /// Separately stored list
    Entity(SecuredEntity),
    /// Host record carrying the list inline
    Record(Record),
}

/// Outcome of clearing an entity's grants
#[derive(Debug, Clone, PartialEq)]
pub enum RemovedGrants {
    /// Number of separately stored lists deleted
    Entities(usize),
    /// Host record with its inline list cleared
    Record(Record),
}
