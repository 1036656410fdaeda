//! Row-level filtering of bulk reads
//!
//! A secured model gets a predicate ANDed onto every read so that only rows
//! the current subjects may read come back. The caller's own filter is kept.
//!
//! Skipping the filter for a lookup by a single id is a usability default,
//! not a security boundary: anyone who knows an id can read that row unless
//! the call passes `secure: Some(true)`.

mod predicate;

pub use predicate::{build_row_predicate, Predicate};

use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage operation being intercepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryOperation {
    /// List query
    Find,
    /// Single result query
    FindOne,
    /// Count query
    Count,
    /// Find then modify
    FindAndModify,
    /// Bulk update
    Update,
    /// Bulk delete
    Delete,
}

impl QueryOperation {
    /// Whether row filtering applies to this operation
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Find | Self::FindOne | Self::Count | Self::FindAndModify)
    }
}

/// Per-call flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// `Some(false)` disables filtering, `Some(true)` forces it even for
    /// single-id lookups
    #[serde(default)]
    pub secure: Option<bool>,

    /// Alias of `secure: Some(false)`
    #[serde(default)]
    pub skip_secure: bool,

    /// Acting user, read by the default current-subject provider
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl QueryOptions {
    /// Options acting as a user
    pub fn user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    /// Force filtering on or off
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Skip filtering
    pub fn skip_secure(mut self) -> Self {
        self.skip_secure = true;
        self
    }
}

/// An intercepted storage query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    /// Model being queried
    pub model: String,

    /// Operation
    pub operation: QueryOperation,

    /// Outgoing filter, augmented in place
    pub filter: Option<Predicate>,

    /// Per-call flags
    pub options: QueryOptions,
}

impl QueryContext {
    /// A query without a filter
    pub fn new(model: impl Into<String>, operation: QueryOperation, options: QueryOptions) -> Self {
        Self {
            model: model.into(),
            operation,
            filter: None,
            options,
        }
    }

    /// Attach the caller's filter
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// What the row filter did with a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The read predicate was ANDed onto the filter
    Applied,
    /// Model is not secured
    NotSecured,
    /// Operation is not a read
    UnfilteredOperation,
    /// Disabled by `secure: false` or `skip_secure`
    Disabled,
    /// Lookup of a single record by id
    SingleRecordLookup,
    /// Current subjects include the admin subject
    Admin,
}

impl FilterOutcome {
    /// Whether the filter was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl fmt::Display for FilterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Applied => "applied",
            Self::NotSecured => "model not secured",
            Self::UnfilteredOperation => "not a read operation",
            Self::Disabled => "disabled by caller",
            Self::SingleRecordLookup => "single record lookup",
            Self::Admin => "admin subject",
        };
        f.write_str(reason)
    }
}

/// A host model handed to `secure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    /// Model name
    pub name: String,

    /// Connector of the model's datasource; the record store's when `None`
    pub connector: Option<String>,

    /// Declared field names
    pub properties: Vec<String>,
}

impl ModelHandle {
    /// A model with no declared fields on the default connector
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connector: None,
            properties: Vec::new(),
        }
    }

    /// Use another connector
    pub fn with_connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = Some(connector.into());
        self
    }

    /// Declare fields
    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }
}

/// Registry entry of a secured model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecuredModel {
    /// Model name
    pub name: String,

    /// Connector the row predicate is built for
    pub connector: String,

    /// Inline grant property
    pub property: String,
}
