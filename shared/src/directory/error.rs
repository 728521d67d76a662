use thiserror::Error;

/// Errors that can occur during ObjectDirectory operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The requested id already maps to a live object
    #[error("Object id '{object_id}' is already registered to a live object")]
    DuplicateId { object_id: String },

    /// The object itself is already registered, under another or the same id
    #[error("Object is already registered with id '{object_id}'")]
    ObjectAlreadyRegistered { object_id: String },

    /// No mapping exists for the id
    #[error("No object registered with id '{object_id}'")]
    NotFound { object_id: String },

    /// The mapping existed but the object has since been destroyed
    #[error("Object '{object_id}' no longer exists, its mapping was removed")]
    Expired { object_id: String },
}
