//! # CretoAI ACL
//!
//! Embeddable authorization layer combining role-based access control with
//! per-entity access control lists.
//!
//! ## Features
//!
//! - **Scoped roles** partitioned by a `(type, id)` tenant scope
//! - **Role inheritance** with cycle-safe ancestor resolution
//! - **Memberships** with a pending → active approval lifecycle
//! - **Per-entity grants** stored inline on records or in a separate store
//! - **Row-level filtering** of bulk reads on secured models
//! - **Async-first design** over pluggable storage traits
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cretoai_acl::{Acl, MembershipState, MemoryStore, Record};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let acl = Acl::builder().with_store(store.clone()).build()?;
//!
//!     let editor = acl.add_role("editor").await?;
//!     acl.assign_membership("alice", &editor, Some(MembershipState::Active)).await?;
//!
//!     let doc = store.insert_record(Record::new("Document", "1")).await;
//!     acl.allow(editor.id.as_str(), &doc, ["read", "write"]).await?;
//!
//!     assert!(acl.can("alice", &doc, "write").await?);
//!     assert!(!acl.can("bob", &doc, "read").await?);
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod error;
pub mod scope;
pub mod roles;
pub mod membership;
pub mod grants;
pub mod secure;
pub mod store;
pub mod engine;

// Re-export commonly used types
pub use types::{
    identify, type_id, Actions, BulkResult, Record, RecordFailure, RoleId, Selection, SubjectId, SubjectRef,
    Subjects, UserId,
};
pub use error::{AclError, Result};
pub use scope::{resolve_scope, Scope, ScopeArg, ScopeFilter};
pub use roles::{Role, RoleData, RoleGraph, RoleQuery, RoleRef, RoleSelector};
pub use membership::{Membership, MembershipState, MembershipUpdate, Memberships};
pub use grants::{EntityKey, EntityRef, Entities, GrantHolder, Permission, RemovedGrants, Revocation, SecuredEntity};
pub use secure::{FilterOutcome, ModelHandle, Predicate, QueryContext, QueryOperation, QueryOptions, SecuredModel};
pub use store::{AclStore, EntityStore, MembershipStore, MemoryStore, RecordStore, RoleStore};
pub use engine::{
    Acl, AclBuilder, AclConfig, AclMetrics, CurrentSubjects, CurrentUser, MembershipCorrelator, MetricsCollector,
    SubjectCorrelator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
