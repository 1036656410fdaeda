//! Grant list set algebra
//!
//! Pure functions over an entity's grant list. `None` is the unrestricted
//! state: everyone may act on the entity. A list never becomes `Some(vec![])`
//! through a revoke; the last revoke normalizes back to `None`.

use super::types::Permission;
use crate::types::{is_wildcard_action, SubjectId};

/// Union `actions` into each subject's grant, creating missing grants
///
/// Idempotent: granting an already granted action leaves the list unchanged.
pub fn grant(
    current: Option<Vec<Permission>>,
    subjects: &[SubjectId],
    actions: &[String],
) -> Vec<Permission> {
    let mut permissions = current.unwrap_or_default();

    for subject in subjects {
        let idx = match permissions.iter().position(|p| &p.subject == subject) {
            Some(idx) => idx,
            None => {
                permissions.push(Permission::new(subject.clone(), Vec::new()));
                permissions.len() - 1
            }
        };

        let granted = &mut permissions[idx].actions;
        for action in actions {
            if !granted.contains(action) {
                granted.push(action.clone());
            }
        }
    }

    permissions
}

/// Remove `revoked` actions (or every action when `None`) from each subject
///
/// A grant left without actions is dropped; a list left without grants
/// becomes `None`.
pub fn revoke(
    current: Option<Vec<Permission>>,
    subjects: &[SubjectId],
    revoked: Option<&[String]>,
) -> Option<Vec<Permission>> {
    let mut permissions = current?;

    for subject in subjects {
        let Some(idx) = permissions.iter().position(|p| &p.subject == subject) else {
            continue;
        };

        match revoked {
            None => permissions[idx].actions.clear(),
            Some(revoked) => permissions[idx].actions.retain(|a| !revoked.contains(a)),
        }

        if permissions[idx].actions.is_empty() {
            permissions.remove(idx);
        }
    }

    (!permissions.is_empty()).then_some(permissions)
}

/// Decide whether any subject holds every requested action
///
/// An absent or empty list is unrestricted. A grant with a wildcard action
/// covers every request; otherwise the grant must be a superset of
/// `actions`.
pub fn permits(current: Option<&[Permission]>, subjects: &[SubjectId], actions: &[String]) -> bool {
    let permissions = match current {
        None => return true,
        Some(p) if p.is_empty() => return true,
        Some(p) => p,
    };

    subjects.iter().any(|subject| {
        permissions
            .iter()
            .find(|p| &p.subject == subject)
            .map_or(false, |permission| {
                permission.actions.iter().any(|a| is_wildcard_action(a))
                    || actions.iter().all(|a| permission.actions.contains(a))
            })
    })
}

/// Remove every grant held by `subjects`, regardless of actions
pub fn forget(current: Option<Vec<Permission>>, subjects: &[SubjectId]) -> Option<Vec<Permission>> {
    revoke(current, subjects, None)
}
