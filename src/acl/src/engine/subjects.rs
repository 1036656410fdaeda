//! Subject correlation and current-subject resolution

use crate::error::Result;
use crate::membership::Memberships;
use crate::secure::QueryOptions;
use crate::types::{Selection, SubjectId};
use async_trait::async_trait;
use std::sync::Arc;

/// Expands a subject into the subjects related to it
#[async_trait]
pub trait SubjectCorrelator: Send + Sync {
    /// Related subjects of `subject`, not including `subject` itself
    async fn correlate(&self, subject: &str) -> Result<Vec<SubjectId>>;
}

/// Correlates a user with the ids of its active roles, ancestors included
#[derive(Clone)]
pub struct MembershipCorrelator {
    memberships: Memberships,
}

impl MembershipCorrelator {
    /// Correlate through a membership manager
    pub fn new(memberships: Memberships) -> Self {
        Self { memberships }
    }
}

#[async_trait]
impl SubjectCorrelator for MembershipCorrelator {
    async fn correlate(&self, subject: &str) -> Result<Vec<SubjectId>> {
        // "*" is a literal subject here, never a wildcard over every user
        self.memberships
            .find_user_role_ids(Selection::Only(vec![subject.to_string()]), true)
            .await
    }
}

/// Resolves who is acting on an intercepted query
#[async_trait]
pub trait CurrentSubjects: Send + Sync {
    /// The acting subjects, correlated subjects included
    async fn current_subjects(&self, options: &QueryOptions) -> Result<Vec<SubjectId>>;
}

/// Reads the acting user from [`QueryOptions::user_id`]
pub struct CurrentUser {
    correlator: Arc<dyn SubjectCorrelator>,
}

impl CurrentUser {
    /// Expand the acting user through a correlator
    pub fn new(correlator: Arc<dyn SubjectCorrelator>) -> Self {
        Self { correlator }
    }
}

#[async_trait]
impl CurrentSubjects for CurrentUser {
    async fn current_subjects(&self, options: &QueryOptions) -> Result<Vec<SubjectId>> {
        let Some(user) = options.user_id.as_deref().filter(|u| !u.is_empty()) else {
            return Ok(Vec::new());
        };

        let mut subjects = vec![user.to_string()];
        for related in self.correlator.correlate(user).await? {
            if !subjects.contains(&related) {
                subjects.push(related);
            }
        }
        Ok(subjects)
    }
}
