//! Integration tests for the membership lifecycle through the engine

mod common;

use common::engine;
use cretoai_acl::{AclError, MembershipState, MembershipUpdate, RoleRef, Selection, UserId};

#[tokio::test]
async fn test_pending_until_approved() {
    let (acl, _) = engine();
    let member = acl.add_role("member").await.unwrap();

    let pending = acl.assign_membership("tom", &member, None).await.unwrap().unwrap();
    assert_eq!(pending.state, Some(MembershipState::Pending));
    assert!(acl.find_user_roles("tom", false).await.unwrap().is_empty());
    assert!(!acl.has_roles("tom", "member").await.unwrap());

    let approved = acl.approve_membership("tom", "member").await.unwrap();
    assert!(approved.is_complete());
    assert_eq!(approved.items[0].state, Some(MembershipState::Active));

    let roles = acl.find_user_roles("tom", false).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].id, member.id);
    assert!(acl.has_roles("tom", "member").await.unwrap());
}

#[tokio::test]
async fn test_membership_unique_per_user_and_role() {
    let (acl, _) = engine();
    acl.add_role("member").await.unwrap();

    let first = acl.assign_membership("tom", "member", None).await.unwrap().unwrap();
    let second = acl
        .assign_membership("tom", "member", Some(MembershipState::Active))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.id, second.id);

    let mappings = acl.memberships().find_user_role_mappings("tom").await.unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].state, Some(MembershipState::Active));
}

#[tokio::test]
async fn test_bulk_assign_and_role_users() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    acl.add_role("writer").await.unwrap();

    let assigned = acl
        .assign_memberships(["tom", "jerry", "tom"], ["reader", "writer"], None)
        .await
        .unwrap();
    assert!(assigned.is_complete());
    assert_eq!(assigned.items.len(), 4);

    let mut users = acl.find_role_users("reader").await.unwrap();
    users.sort();
    assert_eq!(users, vec!["jerry", "tom"]);

    assert_eq!(acl.find_role_users("*").await.unwrap().len(), 2);
    assert_eq!(acl.find_role_users("all").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_has_roles_requires_every_role() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    acl.add_role("writer").await.unwrap();
    acl.assign_membership("tom", "reader", Some(MembershipState::Active))
        .await
        .unwrap();

    assert!(acl.has_roles("tom", "reader").await.unwrap());
    assert!(!acl.has_roles("tom", ["reader", "writer"]).await.unwrap());
    assert!(!acl.has_roles("tom", "unknown").await.unwrap());
}

#[tokio::test]
async fn test_recursive_user_roles() {
    let (acl, _) = engine();
    let viewer = acl.add_role("viewer").await.unwrap();
    let editor = acl.add_role("editor").await.unwrap();
    acl.inherit_role_from(&editor, [&viewer]).await.unwrap();
    acl.assign_membership("tom", &editor, Some(MembershipState::Active))
        .await
        .unwrap();

    assert_eq!(acl.find_user_roles("tom", false).await.unwrap().len(), 1);

    let ids: Vec<String> = acl
        .find_user_roles("tom", true)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert!(ids.contains(&editor.id));
    assert!(ids.contains(&viewer.id));
}

#[tokio::test]
async fn test_unassign() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    acl.add_role("writer").await.unwrap();
    acl.assign_memberships(["tom", "jerry"], ["reader", "writer"], Some(MembershipState::Active))
        .await
        .unwrap();

    assert_eq!(acl.unassign_memberships("tom", "reader").await.unwrap(), 1);
    assert_eq!(acl.unassign_memberships("jerry", "*").await.unwrap(), 2);
    assert_eq!(acl.unassign_memberships(Vec::<String>::new(), "*").await.unwrap(), 0);

    let remaining = acl.memberships().find_user_role_mappings("*").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, "tom");
}

#[tokio::test]
async fn test_move_membership_to_another_role() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    let writer = acl.add_role("writer").await.unwrap();
    acl.assign_membership("tom", "reader", Some(MembershipState::Active))
        .await
        .unwrap();

    let moved = acl
        .memberships()
        .update_membership("tom", "reader", MembershipUpdate::role(&writer))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.role_id, writer.id);
    assert!(acl.has_roles("tom", "writer").await.unwrap());

    let missing = acl
        .memberships()
        .update_memberships("tom", "writer", MembershipUpdate::role("no-such-role"))
        .await;
    assert!(matches!(missing, Err(AclError::NotFound(_))));
}

#[tokio::test]
async fn test_wildcard_assignment_rejected() {
    let (acl, _) = engine();
    acl.add_role("member").await.unwrap();

    assert!(matches!(
        acl.assign_memberships("*", "member", None).await,
        Err(AclError::InvalidArgument(_))
    ));
    assert!(matches!(
        acl.assign_memberships("tom", Selection::<RoleRef>::Any, None).await,
        Err(AclError::InvalidArgument(_))
    ));
    assert!(acl
        .assign_memberships(Selection::<UserId>::Only(vec![]), "member", None)
        .await
        .unwrap()
        .items
        .is_empty());
}

#[tokio::test]
async fn test_move_onto_held_role_merges() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    let writer = acl.add_role("writer").await.unwrap();
    acl.assign_memberships("tom", ["reader", "writer"], Some(MembershipState::Active))
        .await
        .unwrap();

    let moved = acl
        .memberships()
        .update_memberships("tom", "reader", MembershipUpdate::role(&writer))
        .await
        .unwrap();
    assert!(moved.is_complete());

    let mappings = acl.memberships().find_user_role_mappings("tom").await.unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].role_id, writer.id);
    assert!(acl.has_roles("tom", "writer").await.unwrap());
    assert!(!acl.has_roles("tom", "reader").await.unwrap());
}

#[tokio::test]
async fn test_move_onto_pending_role_keeps_source_state() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    acl.add_role("writer").await.unwrap();
    acl.assign_membership("jerry", "reader", Some(MembershipState::Active))
        .await
        .unwrap();
    acl.assign_membership("jerry", "writer", None).await.unwrap();

    acl.memberships()
        .update_memberships("jerry", "reader", MembershipUpdate::role("writer"))
        .await
        .unwrap();

    let mappings = acl.memberships().find_user_role_mappings("jerry").await.unwrap();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].state, Some(MembershipState::Active));
}

#[tokio::test]
async fn test_find_role_users_empty_selection_means_every_role() {
    let (acl, _) = engine();
    acl.add_role("reader").await.unwrap();
    acl.add_role("writer").await.unwrap();
    acl.assign_membership("tom", "reader", None).await.unwrap();
    acl.assign_membership("jerry", "writer", None).await.unwrap();

    let mut users = acl
        .find_role_users(Selection::<RoleRef>::Only(vec![]))
        .await
        .unwrap();
    users.sort();
    assert_eq!(users, vec!["jerry", "tom"]);

    assert!(acl.find_role_users("no-such-role").await.unwrap().is_empty());
}
