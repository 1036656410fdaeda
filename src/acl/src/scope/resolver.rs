//! Scope argument resolution
//!
//! Normalizes strings, records and multi-part identifiers into a
//! [`ScopeFilter`].

use super::types::{Scope, ScopeArg, ScopeFilter, ALL_SCOPES};
use crate::error::{AclError, Result};
use crate::types::type_id;

/// Resolve a scope argument into the filter applied to lookups
///
/// - `"*"` → [`ScopeFilter::All`]
/// - `None` / `""` → the global partition
/// - `"org:acme"` → `("org", "acme")`, split on the first `:`
/// - a record → `(model, id)`
///
/// # Errors
///
/// Returns `InvalidScope` for a string with an empty type (`":1"`) or a record
/// with neither model nor id.
pub fn resolve_scope(arg: &ScopeArg) -> Result<ScopeFilter> {
    match arg {
        ScopeArg::All => Ok(ScopeFilter::All),
        ScopeArg::Global => Ok(ScopeFilter::Exact(Scope::global())),
        ScopeArg::Str(s) => resolve_str(s),
        ScopeArg::Record { model, id } => {
            let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
            match (non_empty(model), non_empty(id)) {
                (None, None) => Err(AclError::InvalidScope(
                    "object has neither a type nor an id".to_string(),
                )),
                (scope_type, scope_id) => Ok(ScopeFilter::Exact(Scope { scope_type, scope_id })),
            }
        }
        ScopeArg::Parts(parts) => {
            let joined = parts
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(":");
            if joined.is_empty() {
                Ok(ScopeFilter::Exact(Scope::global()))
            } else {
                resolve_str(&joined)
            }
        }
    }
}

fn resolve_str(s: &str) -> Result<ScopeFilter> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(ScopeFilter::Exact(Scope::global()));
    }
    if s == ALL_SCOPES {
        return Ok(ScopeFilter::All);
    }
    if s.starts_with(':') {
        return Err(AclError::InvalidScope(format!("missing scope type in '{}'", s)));
    }

    let (scope_type, scope_id) = type_id(s);
    Ok(ScopeFilter::Exact(Scope { scope_type, scope_id }))
}
