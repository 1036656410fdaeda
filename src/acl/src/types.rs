//! Core ACL types shared across the role graph, grant store and row filter

use crate::error::{AclError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique role identifier
pub type RoleId = String;

/// User identifier as supplied by the caller
pub type UserId = String;

/// Canonical subject identifier (`"User:42"`, a role id, or an opaque token)
pub type SubjectId = String;

/// A host application record (a row of a secured model)
///
/// Inline ("dirty") grant storage keeps the grant list inside `attributes`
/// under the configured property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Model name (e.g. "Product")
    pub model: String,

    /// Record identifier
    pub id: String,

    /// Record fields
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Create an empty record of `model` with `id`
    pub fn new(model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Set a field on the record
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up a field; `id` resolves to the record identifier
    pub fn field(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(Value::String(self.id.clone()));
        }
        self.attributes.get(name).cloned()
    }

    /// Canonical `Model:id` identity of this record
    pub fn identify(&self) -> Result<String> {
        identify_parts(Some(self.model.as_str()), Some(self.id.as_str()))
    }
}

/// Split a `"type:id"` identifier on its first `:`
///
/// `"Product"` yields a type-only pair, `"Product:1"` a type and an id.
pub fn type_id(target: &str) -> (Option<String>, Option<String>) {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    match target.split_once(':') {
        Some((ty, id)) => (non_empty(ty), non_empty(id)),
        None => (non_empty(target), None),
    }
}

/// Join a type and id into the canonical identifier
pub fn identify_parts(ty: Option<&str>, id: Option<&str>) -> Result<String> {
    let ty = ty.filter(|s| !s.is_empty());
    let id = id.filter(|s| !s.is_empty());
    match (ty, id) {
        (Some(ty), Some(id)) => Ok(format!("{}:{}", ty, id)),
        (Some(one), None) | (None, Some(one)) => Ok(one.to_string()),
        (None, None) => Err(AclError::InvalidArgument(
            "Unsupported target to identify: neither type nor id".to_string(),
        )),
    }
}

/// Canonical subject identifier of a string or a record
pub fn identify(target: impl Into<SubjectRef>) -> Result<SubjectId> {
    target.into().identify()
}

/// A subject argument: a bare identifier or a record to identify
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectRef {
    /// Already an identifier string
    Id(String),
    /// A record, identified as `Model:id`
    Record(Record),
}

impl SubjectRef {
    /// Canonical identifier for this subject
    pub fn identify(&self) -> Result<SubjectId> {
        match self {
            Self::Id(id) => Ok(id.clone()),
            Self::Record(record) => record.identify(),
        }
    }
}

impl From<&str> for SubjectRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for SubjectRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<&Record> for SubjectRef {
    fn from(record: &Record) -> Self {
        Self::Record(record.clone())
    }
}

/// One or many subjects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subjects(pub Vec<SubjectRef>);

impl Subjects {
    /// Identify every subject, dropping blanks and duplicates
    pub fn normalize(&self) -> Result<Vec<SubjectId>> {
        let mut out: Vec<SubjectId> = Vec::with_capacity(self.0.len());
        for subject in &self.0 {
            let id = subject.identify()?;
            if !id.is_empty() && !out.contains(&id) {
                out.push(id);
            }
        }
        Ok(out)
    }
}

impl From<&str> for Subjects {
    fn from(id: &str) -> Self {
        Self(vec![id.into()])
    }
}

impl From<String> for Subjects {
    fn from(id: String) -> Self {
        Self(vec![id.into()])
    }
}

impl From<&String> for Subjects {
    fn from(id: &String) -> Self {
        Self(vec![id.clone().into()])
    }
}

impl From<&Record> for Subjects {
    fn from(record: &Record) -> Self {
        Self(vec![record.into()])
    }
}

impl<const N: usize> From<[&str; N]> for Subjects {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.iter().map(|id| SubjectRef::from(*id)).collect())
    }
}

impl From<Vec<&str>> for Subjects {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(SubjectRef::from).collect())
    }
}

impl From<Vec<String>> for Subjects {
    fn from(ids: Vec<String>) -> Self {
        Self(ids.into_iter().map(SubjectRef::from).collect())
    }
}

impl From<Vec<SubjectRef>> for Subjects {
    fn from(subjects: Vec<SubjectRef>) -> Self {
        Self(subjects)
    }
}

/// Canonical wildcard action token
pub const WILDCARD_ACTION: &str = "*";

/// Alias of the wildcard action token
pub const ALL_ACTION: &str = "ALL";

/// Check whether an action token means "every action"
pub fn is_wildcard_action(action: &str) -> bool {
    action == WILDCARD_ACTION || action.eq_ignore_ascii_case(ALL_ACTION)
}

/// One or many action tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions(pub Vec<String>);

impl Actions {
    /// Uppercase and deduplicate, rejecting blank tokens
    pub fn normalize(&self) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::with_capacity(self.0.len());
        for action in &self.0 {
            let action = action.trim();
            if action.is_empty() {
                return Err(AclError::InvalidArgument("action must not be empty".to_string()));
            }
            let action = action.to_uppercase();
            if !out.contains(&action) {
                out.push(action);
            }
        }
        Ok(out)
    }
}

impl From<&str> for Actions {
    fn from(action: &str) -> Self {
        Self(vec![action.to_string()])
    }
}

impl From<String> for Actions {
    fn from(action: String) -> Self {
        Self(vec![action])
    }
}

impl<const N: usize> From<[&str; N]> for Actions {
    fn from(actions: [&str; N]) -> Self {
        Self(actions.iter().map(|a| a.to_string()).collect())
    }
}

impl From<&[&str]> for Actions {
    fn from(actions: &[&str]) -> Self {
        Self(actions.iter().map(|a| a.to_string()).collect())
    }
}

impl From<Vec<&str>> for Actions {
    fn from(actions: Vec<&str>) -> Self {
        Self(actions.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Actions {
    fn from(actions: Vec<String>) -> Self {
        Self(actions)
    }
}

/// A dimension selector where `"*"` means "any value"
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    /// Do not constrain this dimension
    Any,
    /// Only these values
    Only(Vec<T>),
}

impl<T> Selection<T> {
    /// Whether this selection leaves the dimension unconstrained
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::Only(Vec::new())
    }
}

impl From<&str> for Selection<UserId> {
    fn from(user: &str) -> Self {
        if user == "*" {
            Self::Any
        } else {
            Self::Only(vec![user.to_string()])
        }
    }
}

impl From<String> for Selection<UserId> {
    fn from(user: String) -> Self {
        Self::from(user.as_str())
    }
}

impl From<&Record> for Selection<UserId> {
    fn from(user: &Record) -> Self {
        Self::Only(vec![user.id.clone()])
    }
}

impl<const N: usize> From<[&str; N]> for Selection<UserId> {
    fn from(users: [&str; N]) -> Self {
        Self::Only(users.iter().map(|u| u.to_string()).collect())
    }
}

impl From<Vec<&str>> for Selection<UserId> {
    fn from(users: Vec<&str>) -> Self {
        Self::Only(users.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Selection<UserId> {
    fn from(users: Vec<String>) -> Self {
        Self::Only(users)
    }
}

/// Normalize a user selection: trim blanks, drop duplicates
pub(crate) fn normalize_users(users: Selection<UserId>) -> Selection<UserId> {
    match users {
        Selection::Any => Selection::Any,
        Selection::Only(users) => {
            let mut out: Vec<UserId> = Vec::with_capacity(users.len());
            for user in users {
                if !user.is_empty() && !out.contains(&user) {
                    out.push(user);
                }
            }
            Selection::Only(out)
        }
    }
}

/// A record that failed inside a best-effort bulk operation
#[derive(Debug)]
pub struct RecordFailure {
    /// Key of the failed record (e.g. `"tom -> role-id"`)
    pub key: String,

    /// What went wrong
    pub error: AclError,
}

/// Outcome of a best-effort bulk operation
///
/// Records already committed stay committed when a later record fails.
#[derive(Debug)]
pub struct BulkResult<T> {
    /// Records written successfully
    pub items: Vec<T>,

    /// Records the store rejected
    pub failures: Vec<RecordFailure>,
}

impl<T> BulkResult<T> {
    /// Whether every record succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn push(&mut self, key: impl Into<String>, outcome: Result<T>) {
        match outcome {
            Ok(item) => self.items.push(item),
            Err(error) => self.failures.push(RecordFailure {
                key: key.into(),
                error,
            }),
        }
    }
}

impl<T> Default for BulkResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_split() {
        assert_eq!(type_id("Product"), (Some("Product".to_string()), None));
        assert_eq!(
            type_id("Product:12"),
            (Some("Product".to_string()), Some("12".to_string()))
        );
        assert_eq!(
            type_id("org:acme:1"),
            (Some("org".to_string()), Some("acme:1".to_string()))
        );
        assert_eq!(type_id(""), (None, None));
    }

    #[test]
    fn test_identify_record() {
        let user = Record::new("User", "42");
        assert_eq!(user.identify().unwrap(), "User:42");

        let anonymous = Record::new("", "42");
        assert_eq!(anonymous.identify().unwrap(), "42");

        let blank = Record::new("", "");
        assert!(matches!(blank.identify(), Err(AclError::InvalidArgument(_))));

        assert_eq!(identify("role-1").unwrap(), "role-1");
        assert_eq!(identify(&user).unwrap(), "User:42");
    }

    #[test]
    fn test_subjects_normalize_dedup() {
        let subjects = Subjects::from(vec!["a", "b", "a", ""]);
        assert_eq!(subjects.normalize().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_actions_normalize() {
        let actions = Actions::from(["read", "Read", "destroy"]);
        assert_eq!(actions.normalize().unwrap(), vec!["READ", "DESTROY"]);

        let blank = Actions::from(["read", " "]);
        assert!(matches!(blank.normalize(), Err(AclError::InvalidArgument(_))));
    }

    #[test]
    fn test_wildcard_actions() {
        assert!(is_wildcard_action("*"));
        assert!(is_wildcard_action("ALL"));
        assert!(is_wildcard_action("all"));
        assert!(!is_wildcard_action("READ"));
    }

    #[test]
    fn test_user_selection() {
        assert!(Selection::<UserId>::from("*").is_any());
        assert_eq!(
            normalize_users(Selection::from(vec!["tom", "", "tom", "jerry"])),
            Selection::Only(vec!["tom".to_string(), "jerry".to_string()])
        );
    }
}
