//! Engine configuration

use crate::error::Result;
use crate::store::memory::MEMORY_CONNECTOR;
use serde::{Deserialize, Serialize};

/// Default inline grant property
pub const DEFAULT_PROPERTY: &str = "_permissions";

/// Default admin subject; its presence bypasses row filtering
pub const DEFAULT_ADMIN: &str = "$admin";

/// ACL engine configuration
///
/// Loadable from TOML:
///
/// ```
/// use cretoai_acl::AclConfig;
///
/// let config = AclConfig::from_toml_str(r#"
///     scope = "org:acme"
///     property = "_acl"
///     read_actions = ["read", "list"]
/// "#).unwrap();
///
/// assert_eq!(config.scope.as_deref(), Some("org:acme"));
/// assert!(config.dirty);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Engine scope: `None` is the global partition, `"*"` all scopes
    pub scope: Option<String>,

    /// Store grant lists inline on host records
    pub dirty: bool,

    /// Inline grant property name
    pub property: String,

    /// Admin subject identifier
    pub admin: String,

    /// Actions the row predicate treats as "read"
    pub read_actions: Vec<String>,

    /// Model-level default of the per-call `secure` flag
    pub secure: Option<bool>,

    /// Recognized store adapters
    pub connectors: Vec<String>,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            scope: None,
            dirty: true,
            property: DEFAULT_PROPERTY.to_string(),
            admin: DEFAULT_ADMIN.to_string(),
            read_actions: vec!["READ".to_string()],
            secure: None,
            connectors: vec![MEMORY_CONNECTOR.to_string(), "mongodb".to_string()],
        }
    }
}

impl AclConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Set the engine scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Choose inline (`true`) or normalized (`false`) grant storage
    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Set the inline grant property
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Set the admin subject
    pub fn with_admin(mut self, admin: impl Into<String>) -> Self {
        self.admin = admin.into();
        self
    }

    /// Set the read actions
    pub fn with_read_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_actions = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the model-level default of the `secure` flag
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Read actions, uppercased
    pub(crate) fn normalized_read_actions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.read_actions.len());
        for action in &self.read_actions {
            let action = action.trim().to_uppercase();
            if !action.is_empty() && !out.contains(&action) {
                out.push(action);
            }
        }
        out
    }
}
