use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Reserved identifier of the root object.
pub const ROOT_ID: &str = "root";

/// Stable identity of a composite object.
///
/// An `ObjectId` is an opaque string assigned once, the first time an object
/// is observed, and kept for the lifetime of the object. The root of every
/// persisted graph carries the reserved identifier [`ROOT_ID`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Create an identifier, rejecting empty strings and whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::EmptyIdentifier);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidIdentifier(id));
        }
        Ok(Self(id))
    }

    /// The reserved root identifier.
    pub fn root() -> Self {
        Self(ROOT_ID.to_owned())
    }

    /// Returns `true` if this is the root identifier.
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generators produce valid identifiers by construction.
    pub(crate) fn from_generated(id: String) -> Self {
        debug_assert!(!id.is_empty());
        Self(id)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ObjectId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
