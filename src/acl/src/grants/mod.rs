//! Per-entity grant lists
//!
//! A grant list is an unordered set of `(subject, actions)` pairs recorded
//! against one entity. An entity without a list is unrestricted.

mod types;
pub mod algebra;
mod store;

pub use types::{
    Entities, EntityKey, EntityRef, GrantHolder, Permission, RemovedGrants, Revocation, SecuredEntity,
};
pub use store::{GrantStore, InlineGrantStore, NormalizedGrantStore};
