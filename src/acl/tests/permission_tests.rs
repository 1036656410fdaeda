//! Integration tests for grant algebra and permission checks
//!
//! Runs the same scenarios against inline (record property) and normalized
//! (separate keyed list) grant storage.

mod common;

use common::{engine, engine_with, seed};
use cretoai_acl::{Acl, AclConfig, GrantHolder, MembershipState, MemoryStore, Permission, Record, RemovedGrants};
use proptest::prelude::*;
use std::sync::Arc;

fn inline() -> (Acl, Arc<MemoryStore>) {
    engine()
}

fn normalized() -> (Acl, Arc<MemoryStore>) {
    engine_with(AclConfig::default().with_dirty(false))
}

fn actions(list: &[&str]) -> Vec<String> {
    list.iter().map(|a| a.to_string()).collect()
}

// ============================================================================
// Allow / disallow scenarios
// ============================================================================

async fn read_destroy_then_revoke_destroy(acl: &Acl, entity: &Record) {
    acl.allow(["a", "b"], entity, ["read", "destroy"]).await.unwrap();
    acl.disallow(["a", "b"], entity, ["destroy"]).await.unwrap();

    let grants = acl.grants(entity).await.unwrap().unwrap();
    assert_eq!(
        grants,
        vec![
            Permission::new("a", actions(&["READ"])),
            Permission::new("b", actions(&["READ"])),
        ]
    );
}

#[tokio::test]
async fn test_partial_revoke_inline() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;
    read_destroy_then_revoke_destroy(&acl, &product).await;
}

#[tokio::test]
async fn test_partial_revoke_normalized() {
    let (acl, store) = normalized();
    let product = store.insert_record(Record::new("Product", "1")).await;
    read_destroy_then_revoke_destroy(&acl, &product).await;
}

#[tokio::test]
async fn test_inline_writes_record_property() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;

    let written = acl.allow("tom", &product, "read").await.unwrap();
    match &written[0] {
        GrantHolder::Record(record) => assert!(record.attributes.contains_key("_permissions")),
        other => panic!("expected a record holder, got {:?}", other),
    }
}

#[tokio::test]
async fn test_normalized_writes_entity() {
    let (acl, store) = normalized();
    let product = store.insert_record(Record::new("Product", "1")).await;

    let written = acl.allow("tom", &product, "read").await.unwrap();
    match &written[0] {
        GrantHolder::Entity(entity) => {
            assert_eq!(entity.entity_type, "Product");
            assert_eq!(entity.entity_id.as_deref(), Some("1"));
        }
        other => panic!("expected an entity holder, got {:?}", other),
    }
}

#[tokio::test]
async fn test_union_idempotence() {
    for (acl, store) in [inline(), normalized()] {
        let split = store.insert_record(Record::new("Product", "1")).await;
        let joined = store.insert_record(Record::new("Product", "2")).await;

        acl.allow("tom", &split, "read").await.unwrap();
        acl.allow("tom", &split, ["write", "read"]).await.unwrap();
        acl.allow("tom", &joined, ["read", "write"]).await.unwrap();

        assert_eq!(
            acl.grants(&split).await.unwrap(),
            acl.grants(&joined).await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_disallow_restores_default_allow() {
    for (acl, store) in [inline(), normalized()] {
        let product = store.insert_record(Record::new("Product", "1")).await;

        acl.allow("tom", &product, "read").await.unwrap();
        assert!(!acl.can("jerry", &product, "read").await.unwrap());

        acl.disallow("tom", &product, "read").await.unwrap();
        assert_eq!(acl.grants(&product).await.unwrap(), None);
        assert!(acl.can("jerry", &product, ["read", "destroy"]).await.unwrap());
    }
}

#[tokio::test]
async fn test_disallow_all_actions() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;

    acl.allow(["tom", "jerry"], &product, ["read", "write"]).await.unwrap();
    acl.disallow("tom", &product, "*").await.unwrap();

    let grants = acl.grants(&product).await.unwrap().unwrap();
    assert_eq!(grants, vec![Permission::new("jerry", actions(&["READ", "WRITE"]))]);
}

#[tokio::test]
async fn test_never_granted_allows_everyone() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;

    assert!(acl.can("anyone", &product, ["read", "destroy"]).await.unwrap());
    assert!(acl.can("anyone", "Product", "read").await.unwrap());
}

#[tokio::test]
async fn test_wildcard_grant() {
    for (acl, store) in [inline(), normalized()] {
        let product = store.insert_record(Record::new("Product", "1")).await;

        acl.allow("tom", &product, "*").await.unwrap();
        assert!(acl.can("tom", &product, ["read", "destroy"]).await.unwrap());
        assert!(!acl.can("jerry", &product, "read").await.unwrap());
    }
}

#[tokio::test]
async fn test_superset_required_per_subject() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;

    acl.allow("tom", &product, "read").await.unwrap();
    acl.allow("jerry", &product, "write").await.unwrap();

    assert!(!acl.can(["tom", "jerry"], &product, ["read", "write"]).await.unwrap());
    assert!(acl.can(["tom", "jerry"], &product, "write").await.unwrap());
}

#[tokio::test]
async fn test_record_subjects_are_identified() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;
    let user = Record::new("User", "42");

    acl.allow(&user, &product, "read").await.unwrap();
    assert!(acl.can("User:42", &product, "read").await.unwrap());
    assert!(acl.can(&user, &product, "read").await.unwrap());
}

#[tokio::test]
async fn test_type_wide_grants() {
    let (acl, _) = inline();

    acl.allow("tom", "Product", "create").await.unwrap();
    assert!(acl.can("tom", "Product", "create").await.unwrap());
    assert!(!acl.can("jerry", "Product", "create").await.unwrap());
    assert!(acl.can("jerry", "Product:7", "create").await.unwrap());
}

#[tokio::test]
async fn test_role_grants_through_membership() {
    let (acl, store) = inline();
    let product = store.insert_record(Record::new("Product", "1")).await;
    let viewer = acl.add_role("viewer").await.unwrap();
    let editor = acl.add_role("editor").await.unwrap();
    acl.inherit_role_from(&editor, [&viewer]).await.unwrap();

    acl.allow(viewer.id.as_str(), &product, "read").await.unwrap();
    acl.assign_membership("tom", &editor, None).await.unwrap();
    assert!(!acl.can("tom", &product, "read").await.unwrap());

    acl.approve_membership("tom", &editor).await.unwrap();
    assert!(acl.can("tom", &product, "read").await.unwrap());
}

#[tokio::test]
async fn test_disallow_wildcard_in_list_revokes_everything() {
    for (acl, store) in [inline(), normalized()] {
        let product = store.insert_record(Record::new("Product", "1")).await;
        acl.allow(["tom", "jerry"], &product, ["read", "write"]).await.unwrap();

        acl.disallow("tom", &product, ["*"]).await.unwrap();
        acl.disallow("jerry", &product, ["read", "ALL"]).await.unwrap();
        assert_eq!(acl.grants(&product).await.unwrap(), None);
    }
}

#[tokio::test]
async fn test_star_subject_gets_no_role_grants() {
    let (acl, store) = inline();
    let doc = store.insert_record(Record::new("Doc", "1")).await;
    let staff = acl.add_role("staff").await.unwrap();
    acl.assign_membership("alice", &staff, Some(MembershipState::Active))
        .await
        .unwrap();
    acl.allow(staff.id.as_str(), &doc, "read").await.unwrap();

    assert!(acl.can("alice", &doc, "read").await.unwrap());
    assert!(!acl.can("*", &doc, "read").await.unwrap());
}

// ============================================================================
// Bulk removal
// ============================================================================

#[tokio::test]
async fn test_remove_entities_permissions() {
    let (acl, store) = inline();
    let products = seed(&store, "Product", 2).await;

    acl.allow("tom", [&products[0], &products[1]], "read").await.unwrap();
    let removed = acl
        .remove_entities_permissions([&products[0], &products[1]])
        .await
        .unwrap();
    assert_eq!(removed.len(), 2);
    assert!(matches!(removed[0], RemovedGrants::Record(_)));
    assert_eq!(acl.grants(&products[0]).await.unwrap(), None);

    let (normalized, nstore) = normalized();
    let product = nstore.insert_record(Record::new("Product", "1")).await;
    normalized.allow("tom", &product, "read").await.unwrap();
    let removed = normalized.remove_entities_permissions(&product).await.unwrap();
    assert_eq!(removed, vec![RemovedGrants::Entities(1)]);
}

#[tokio::test]
async fn test_remove_subjects_permissions() {
    let (acl, store) = inline();
    let products = seed(&store, "Product", 3).await;

    acl.allow(["tom", "jerry"], [&products[0], &products[1]], "read")
        .await
        .unwrap();
    acl.allow("tom", &products[2], "read").await.unwrap();

    let outcome = acl
        .remove_subjects_permissions("tom", Some(vec!["Product".to_string()]))
        .await
        .unwrap();
    assert!(outcome.is_complete());
    assert_eq!(outcome.items.len(), 3);

    assert_eq!(
        acl.grants(&products[0]).await.unwrap(),
        Some(vec![Permission::new("jerry", actions(&["READ"]))])
    );
    assert_eq!(acl.grants(&products[2]).await.unwrap(), None);
}

#[tokio::test]
async fn test_remove_subjects_permissions_defaults_to_secured_models() {
    let (acl, store) = inline();
    acl.secure(cretoai_acl::ModelHandle::new("Product")).unwrap();
    let product = store.insert_record(Record::new("Product", "1")).await;
    let note = store.insert_record(Record::new("Note", "1")).await;

    acl.allow("tom", &product, "read").await.unwrap();
    acl.allow("tom", &note, "read").await.unwrap();

    let outcome = acl.remove_subjects_permissions("tom", None).await.unwrap();
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(acl.grants(&product).await.unwrap(), None);
    assert!(acl.grants(&note).await.unwrap().is_some());
}

#[tokio::test]
async fn test_allow_and_check_by_role_with_active_state() {
    let (acl, store) = normalized();
    let product = store.insert_record(Record::new("Product", "1")).await;
    let staff = acl.add_role("staff").await.unwrap();
    acl.assign_membership("tom", &staff, Some(MembershipState::Active))
        .await
        .unwrap();

    acl.allow(staff.id.as_str(), &product, "read").await.unwrap();
    assert!(acl.can("tom", &product, "read").await.unwrap());
    assert!(acl.cannot("tom", &product, "write").await.unwrap());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_split_allow_equals_joined_allow(
        first in prop::collection::vec("[a-d]", 1..4),
        second in prop::collection::vec("[a-d]", 1..4),
    ) {
        tokio_test::block_on(async {
            let (acl, store) = inline();
            let split = store.insert_record(Record::new("Product", "1")).await;
            let joined = store.insert_record(Record::new("Product", "2")).await;

            acl.allow("tom", &split, first.clone()).await.unwrap();
            acl.allow("tom", &split, second.clone()).await.unwrap();

            let mut union = first.clone();
            union.extend(second.clone());
            acl.allow("tom", &joined, union).await.unwrap();

            let mut left = acl.grants(&split).await.unwrap().unwrap();
            let mut right = acl.grants(&joined).await.unwrap().unwrap();
            left[0].actions.sort();
            right[0].actions.sort();
            prop_assert_eq!(left, right);
            Ok(())
        })?;
    }
}
