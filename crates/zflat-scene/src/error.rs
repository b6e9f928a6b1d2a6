//! Error types for scene storage and host primitives.

use thiserror::Error;

/// Errors raised by the scene host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// An id does not refer to a live entity.
    #[error("{kind} not found")]
    NotFound {
        /// Entity kind ("vertex", "edge", ...).
        kind: &'static str,
    },

    /// An entity was used with a container that does not own it.
    #[error("{kind} does not belong to definition '{container}'")]
    WrongContainer {
        /// Entity kind.
        kind: &'static str,
        /// Name of the container the entity was addressed through.
        container: String,
    },

    /// Placing the instance would make a definition contain itself.
    #[error("instancing '{definition}' inside '{parent}' would create a cycle")]
    Cycle {
        /// Definition being placed.
        definition: String,
        /// Container it was placed into.
        parent: String,
    },

    /// Geometry that the scene cannot represent.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// `start_operation` while another operation is open.
    #[error("operation '{0}' is already open")]
    OperationOpen(String),

    /// `commit_operation` or `abort_operation` with nothing open.
    #[error("no operation is open")]
    NoOperation,

    /// `undo` with an empty history.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The host refused a request.
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
