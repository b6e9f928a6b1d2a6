//! Error types for the flatten operation.

use thiserror::Error;
use zflat_scene::SceneError;

/// Errors that end a flatten operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    /// Nothing flattenable was selected. No operation was opened.
    #[error("nothing selected to flatten")]
    EmptySelection,

    /// The target height is unusable. No operation was opened.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// An instance could not be given its own definition.
    #[error("could not make '{definition}' unique: {source}")]
    UnshareFailed {
        /// Name of the definition the instance placed.
        definition: String,
        /// Host failure.
        #[source]
        source: SceneError,
    },

    /// A host primitive failed; the operation was rolled back.
    #[error("host mutation failed: {0}")]
    HostMutationFailed(#[from] SceneError),
}

/// Result type for flatten operations.
pub type Result<T> = std::result::Result<T, FlattenError>;
