//! Scope resolution tests
//!
//! Tests cover:
//! - String, record and multi-part arguments
//! - The `"*"` sentinel versus the global partition
//! - Filter matching

use super::*;
use crate::error::AclError;
use crate::types::Record;

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_resolve_type_and_id() {
    let filter = resolve_scope(&ScopeArg::from("org:1")).unwrap();
    assert_eq!(filter, ScopeFilter::Exact(Scope::new("org", Some("1"))));
}

#[test]
fn test_resolve_type_only() {
    let filter = resolve_scope(&ScopeArg::from("123")).unwrap();
    assert_eq!(filter, ScopeFilter::Exact(Scope::new("123", None)));
}

#[test]
fn test_resolve_splits_on_first_colon() {
    let filter = resolve_scope(&ScopeArg::from("org:acme:dept")).unwrap();
    assert_eq!(filter, ScopeFilter::Exact(Scope::new("org", Some("acme:dept"))));
}

#[test]
fn test_all_is_not_global() {
    let all = resolve_scope(&ScopeArg::from("*")).unwrap();
    let global = resolve_scope(&ScopeArg::from(None)).unwrap();

    assert!(all.is_all());
    assert_eq!(global, ScopeFilter::Exact(Scope::global()));
    assert_ne!(all, global);
}

#[test]
fn test_resolve_record() {
    let store = Record::new("Store", "7");
    let filter = resolve_scope(&ScopeArg::from(&store)).unwrap();
    assert_eq!(filter, ScopeFilter::Exact(Scope::new("Store", Some("7"))));

    let anonymous = Record::new("", "123");
    let filter = resolve_scope(&ScopeArg::from(&anonymous)).unwrap();
    assert_eq!(
        filter,
        ScopeFilter::Exact(Scope {
            scope_type: None,
            scope_id: Some("123".to_string()),
        })
    );
}

#[test]
fn test_resolve_parts() {
    let parts = ScopeArg::Parts(vec!["1".to_string(), "2".to_string(), "3".to_string()]);
    let filter = resolve_scope(&parts).unwrap();
    assert_eq!(filter, ScopeFilter::Exact(Scope::new("1", Some("2:3"))));

    let empty = ScopeArg::Parts(vec![]);
    assert_eq!(resolve_scope(&empty).unwrap(), ScopeFilter::Exact(Scope::global()));
}

#[test]
fn test_invalid_scopes() {
    let blank = Record::new("", "");
    assert!(matches!(
        resolve_scope(&ScopeArg::from(&blank)),
        Err(AclError::InvalidScope(_))
    ));

    assert!(matches!(
        resolve_scope(&ScopeArg::from(":1")),
        Err(AclError::InvalidScope(_))
    ));
}

// ============================================================================
// Filter matching
// ============================================================================

#[test]
fn test_filter_matching() {
    let org = Scope::new("org", Some("1"));
    let team = Scope::new("team", Some("1"));

    assert!(ScopeFilter::All.matches(&org));
    assert!(ScopeFilter::All.matches(&Scope::global()));

    let exact = ScopeFilter::Exact(org.clone());
    assert!(exact.matches(&org));
    assert!(!exact.matches(&team));
    assert!(!exact.matches(&Scope::global()));

    let global = ScopeFilter::Exact(Scope::global());
    assert!(global.matches(&Scope::global()));
    assert!(!global.matches(&org));
}

#[test]
fn test_scope_display() {
    assert_eq!(Scope::new("org", Some("1")).to_string(), "org:1");
    assert_eq!(Scope::new("123", None).to_string(), "123");
    assert_eq!(Scope::global().to_string(), "<global>");
    assert_eq!(ScopeFilter::All.to_string(), "*");
}
