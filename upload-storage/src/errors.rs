use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Errors raised by storage operations.
///
/// Routine states (no pending upload, nothing stored, file already gone) are never errors; the
/// storage skips them and logs at debug level.
#[derive(ThisError, Debug)]
pub enum Error {
    /// A mapping was requested by name and the factory does not know it
    #[error("Mapping {name} not found")]
    MappingNotFound { name: String },

    /// A mapping with the same name is already registered
    #[error("Mapping {name} is already registered")]
    DuplicateMapping { name: String },

    /// The uploaded file could not be relocated into its target directory
    #[error("Failed to move {name} into {}", directory.display())]
    Move {
        directory: PathBuf,
        name: String,
        #[source]
        source: io::Error,
    },

    /// A previously stored file exists but could not be deleted
    #[error("Failed to remove {}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration is structurally valid but inconsistent
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type alias for storage operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_move_error_keeps_io_source() {
        let err = Error::Move {
            directory: PathBuf::from("/srv/uploads"),
            name: "avatar.png".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only filesystem"),
        };

        assert_eq!(err.to_string(), "Failed to move avatar.png into /srv/uploads");
        let source = err.source().expect("move error should expose its io source");
        assert_eq!(source.to_string(), "read-only filesystem");
    }

    #[test]
    fn test_other_is_transparent() {
        let err = Error::from(anyhow::anyhow!("disk exploded"));
        assert_eq!(err.to_string(), "disk exploded");
    }
}
