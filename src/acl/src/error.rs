//! Error types for the ACL engine

use thiserror::Error;

/// ACL engine errors
#[derive(Debug, Error)]
pub enum AclError {
    /// Malformed subjects, entities, actions or filter shapes
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Scope argument could not be resolved to a `(type, id)` pair
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Role data is missing a name or a scope
    #[error("Invalid role data: {0}")]
    InvalidRoleData(String),

    /// The store collaborator is not a recognized adapter
    #[error("Unsupported store: {0}")]
    UnsupportedStore(String),

    /// The inline grant property collides with an existing model field
    #[error("Property \"{property}\" already exists in model \"{model}\", specify another property for permissions")]
    DuplicatePropertyDefinition {
        /// Inline grant property name
        property: String,
        /// Model being secured
        model: String,
    },

    /// A record addressed for mutation does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store collaborator failure
    #[error("Store error: {0}")]
    Store(String),

    /// Grant list (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration parse failure
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for ACL operations
pub type Result<T> = std::result::Result<T, AclError>;
