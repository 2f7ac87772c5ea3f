//! Transparent persistence for object graphs.
//!
//! Objects expose their attributes through the [`Composite`] trait. A
//! [`Context`] hands out [`Tracked`] handles: every write through a handle
//! updates the object and queues a change record, composite values are
//! registered and tracked as they are attached, and [`Context::flush`]
//! appends the queued records to a caller-owned log. [`Context::load`]
//! replays such a log and rebuilds the graph under the well-known root id.
//!
//! # Key Types
//!
//! - [`Context`]: object table, pending change set and root
//! - [`Tracked`]: recording handle around one live object
//! - [`Composite`] / [`Slot`]: the attribute interface objects implement
//! - [`Entity`]: ready-made dynamic composite
//! - [`TypeRegistry`]: default constructors used by replay
//!
//! Everything here is single-threaded. Handles are `!Send`, and a load must
//! not overlap with writes through handles of the same context.

pub mod config;
pub mod context;
pub mod error;
pub mod object;
pub mod registry;
mod replay;
pub mod serializer;
mod session;
pub mod tracked;

pub use config::{ContextConfig, UnknownTypePolicy};
pub use context::{Context, FlushReport};
pub use error::{PersistError, Result};
pub use object::{identity_of, same_object, share, Composite, Entity, ObjectRef, Slot};
pub use registry::{TypeRegistry, ROOT_TYPE};
pub use serializer::serialize;
pub use session::Mode;
pub use tracked::{Tracked, NOT_SERIALIZABLE};

pub use glight_log::{inspect, inspect_with, TailPolicy};
pub use glight_types::{
    FieldValue, IdentityProvider, ObjectId, RandomIds, Record, SequentialIds, UuidIds, Value,
};
