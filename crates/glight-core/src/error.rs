use glight_log::LogError;
use glight_types::ObjectId;

/// Errors produced by the persistence engine.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// An object with this id is already registered in the context.
    #[error("object with id {0} is already registered")]
    DuplicateIdentity(ObjectId),

    /// The object is tracked under a different id and cannot become the root.
    #[error("object {0} is already tracked and cannot be re-rooted")]
    AlreadyTracked(ObjectId),

    /// A reference marker points at an id absent from the object table.
    #[error("unresolved reference {parent}.{attribute} -> {target}")]
    UnresolvedReference {
        parent: ObjectId,
        attribute: String,
        target: ObjectId,
    },

    /// A field record names a parent that was never declared.
    #[error("field {parent}.{attribute} refers to an unknown object")]
    MissingObject { parent: ObjectId, attribute: String },

    /// No constructor is registered for a type tag found in the log.
    #[error("unknown type tag: {0}")]
    UnknownType(String),

    /// A composite rejected an attribute write.
    #[error("invalid attribute {type_tag}.{attribute}: {reason}")]
    InvalidAttribute {
        type_tag: String,
        attribute: String,
        reason: String,
    },

    /// The log holds no root object, or no root has been set.
    #[error("no root object")]
    MissingRoot,

    /// A tracked handle outlived the context it belongs to.
    #[error("persistence context has been dropped")]
    ContextClosed,

    #[error("log error: {0}")]
    Log(#[from] LogError),
}

impl PersistError {
    pub fn invalid_attribute(
        type_tag: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PersistError::InvalidAttribute {
            type_tag: type_tag.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistError>;
