//! Multi-tenant scope resolution
//!
//! Every role and membership is stamped with a canonical `(type, id)` scope
//! and every lookup is filtered by one. `"*"` disables the filter entirely,
//! which is distinct from the global (null) partition.
//!
//! # Examples
//!
//! ```
//! use cretoai_acl::scope::{resolve_scope, Scope, ScopeArg, ScopeFilter};
//!
//! let filter = resolve_scope(&ScopeArg::from("org:acme")).unwrap();
//! assert_eq!(filter, ScopeFilter::Exact(Scope::new("org", Some("acme"))));
//!
//! assert_eq!(resolve_scope(&ScopeArg::from("*")).unwrap(), ScopeFilter::All);
//! assert_eq!(resolve_scope(&ScopeArg::Global).unwrap(), ScopeFilter::Exact(Scope::global()));
//! ```

mod types;
mod resolver;

#[cfg(test)]
mod tests;

pub use types::{Scope, ScopeArg, ScopeFilter, ALL_SCOPES};
pub use resolver::resolve_scope;
