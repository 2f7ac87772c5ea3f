//! Foundation types for glight.
//!
//! This crate provides the identifiers, atomic values and log records shared
//! by every other glight crate. It knows nothing about live objects or
//! streams; it only defines what a persisted object graph looks like once it
//! has been flattened into records.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Stable string identity of a composite object
//! - [`Value`]: Atomic value stored as a whole (no sub-field tracking)
//! - [`Record`]: One entry of the change log: a [`CompositeRecord`] or a [`FieldRecord`]
//! - [`ReferenceMarker`]: Lazy pointer from a field to another composite
//! - [`IdentityProvider`]: Source of fresh object identifiers

pub mod error;
pub mod identity;
pub mod object;
pub mod record;
pub mod value;

pub use error::TypeError;
pub use identity::{IdentityProvider, RandomIds, SequentialIds, UuidIds};
pub use object::{ObjectId, ROOT_ID};
pub use record::{CompositeRecord, FieldRecord, FieldValue, Record, ReferenceMarker};
pub use value::Value;
