//! Storage-neutral filter predicates
//!
//! Adapters translate a [`Predicate`] into their query language; the
//! in-memory store evaluates it directly with [`Predicate::matches`].

use crate::types::{Record, SubjectId, ALL_ACTION, WILDCARD_ACTION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter predicate tree over record fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "camelCase")]
pub enum Predicate {
    /// Every child matches
    And(Vec<Predicate>),

    /// At least one child matches
    Or(Vec<Predicate>),

    /// Field equals a value
    Eq {
        /// Field name
        field: String,
        /// Expected value
        value: Value,
    },

    /// Field equals one of the values
    In {
        /// Field name
        field: String,
        /// Accepted values
        values: Vec<Value>,
    },

    /// Field is absent or null
    IsNull {
        /// Field name
        field: String,
    },

    /// Field is an empty array
    IsEmpty {
        /// Field name
        field: String,
    },

    /// Field is a grant list holding an entry for one of `subjects` whose
    /// actions intersect `actions`
    GrantMatch {
        /// Inline grant field
        field: String,
        /// Subjects to look for
        subjects: Vec<SubjectId>,
        /// Any of these actions qualifies
        actions: Vec<String>,
    },
}

impl Predicate {
    /// Equality on a field
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// AND `other` onto this predicate, never replacing it
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            this => Self::And(vec![this, other]),
        }
    }

    /// Whether this predicate is a lookup of exactly one record by id
    pub fn targets_single_id(&self) -> bool {
        match self {
            Self::Eq { field, value } => field == "id" && !value.is_null(),
            Self::And(children) => children.iter().any(Self::targets_single_id),
            _ => false,
        }
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::And(children) => children.iter().all(|c| c.matches(record)),
            Self::Or(children) => children.iter().any(|c| c.matches(record)),
            Self::Eq { field, value } => record.field(field).as_ref() == Some(value),
            Self::In { field, values } => record
                .field(field)
                .map_or(false, |v| values.contains(&v)),
            Self::IsNull { field } => record.field(field).map_or(true, |v| v.is_null()),
            Self::IsEmpty { field } => matches!(
                record.field(field),
                Some(Value::Array(items)) if items.is_empty()
            ),
            Self::GrantMatch {
                field,
                subjects,
                actions,
            } => match record.field(field) {
                Some(Value::Array(grants)) => grants
                    .iter()
                    .any(|grant| grant_matches(grant, subjects, actions)),
                _ => false,
            },
        }
    }
}

fn grant_matches(grant: &Value, subjects: &[SubjectId], actions: &[String]) -> bool {
    let subject = grant.get("subject").and_then(Value::as_str);
    if !subject.map_or(false, |s| subjects.iter().any(|x| x == s)) {
        return false;
    }

    grant
        .get("actions")
        .and_then(Value::as_array)
        .map_or(false, |granted| {
            granted
                .iter()
                .filter_map(Value::as_str)
                .any(|a| actions.iter().any(|x| x == a))
        })
}

/// Build the row-level read predicate for an inline grant property
///
/// Matches rows with no grant list, an empty grant list, or a grant for one
/// of `subjects` covering any read action. The wildcard tokens are added to
/// the read set so wildcard grants pass.
pub fn build_row_predicate(property: &str, subjects: &[SubjectId], read_actions: &[String]) -> Predicate {
    let mut actions: Vec<String> = read_actions.iter().map(|a| a.to_uppercase()).collect();
    for wildcard in [WILDCARD_ACTION, ALL_ACTION] {
        if !actions.iter().any(|a| a == wildcard) {
            actions.push(wildcard.to_string());
        }
    }

    Predicate::Or(vec![
        Predicate::IsNull {
            field: property.to_string(),
        },
        Predicate::IsEmpty {
            field: property.to_string(),
        },
        Predicate::GrantMatch {
            field: property.to_string(),
            subjects: subjects.to_vec(),
            actions,
        },
    ])
}
