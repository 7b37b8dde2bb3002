//! Shared error type for repository ports.

use thiserror::Error;

use questwright_domain::DomainError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying persistence failure (connection, SQL, transaction)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored row failed to parse back through its entity schema
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The referenced row does not exist
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A stored-data invariant would be broken by this write
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => {
                DomainError::not_found(entity_type, id)
            }
            RepositoryError::Constraint(msg) => DomainError::invariant(msg),
            other => DomainError::conflict(other.to_string()),
        }
    }
}
