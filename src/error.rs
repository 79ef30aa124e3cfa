//! Error types surfaced by the ECS core

use thiserror::Error;

use crate::ecs::Entity;

/// Broad category of an [`EcsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Use of an unregistered component kind, or of the wrong payload type.
    Configuration,
    /// Re-registration of a component kind or system name.
    DuplicateName,
    /// Unknown or destroyed entity, or unknown system.
    NotFound,
    /// A system hook returned an error.
    System,
}

#[derive(Debug, Error)]
pub enum EcsError {
    #[error("component kind `{0}` is not registered")]
    UnregisteredKind(String),

    #[error("component kind `{kind}` stores `{expected}`, got `{found}`")]
    KindTypeMismatch {
        kind: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("system `{system}` requires unregistered component kind `{kind}`")]
    MissingDependency { system: String, kind: String },

    #[error("system `{name}` is not a `{expected}`")]
    SystemTypeMismatch {
        name: String,
        expected: &'static str,
    },

    #[error("component kind `{0}` is already registered")]
    DuplicateKind(String),

    #[error("system `{0}` is already registered")]
    DuplicateSystem(String),

    #[error("entity {0} does not exist")]
    EntityNotFound(Entity),

    #[error("system `{0}` is not registered")]
    SystemNotFound(String),

    #[error("system `{name}` failed: {source}")]
    System {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl EcsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EcsError::UnregisteredKind(_)
            | EcsError::KindTypeMismatch { .. }
            | EcsError::MissingDependency { .. }
            | EcsError::SystemTypeMismatch { .. } => ErrorKind::Configuration,
            EcsError::DuplicateKind(_) | EcsError::DuplicateSystem(_) => ErrorKind::DuplicateName,
            EcsError::EntityNotFound(_) | EcsError::SystemNotFound(_) => ErrorKind::NotFound,
            EcsError::System { .. } => ErrorKind::System,
        }
    }
}

pub type Result<T, E = EcsError> = std::result::Result<T, E>;
