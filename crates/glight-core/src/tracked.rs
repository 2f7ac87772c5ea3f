use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glight_types::{FieldValue, ObjectId, Value};
use serde::{Serialize, Serializer};

use crate::error::{PersistError, Result};
use crate::object::{Composite, ObjectRef, Slot};
use crate::session::{self, Session, SharedSession};

/// Message of the serde error raised when a [`Tracked`] is serialized.
pub const NOT_SERIALIZABLE: &str = "tracked handle is not serializable";

/// Runtime view of a persistent object that records every write.
///
/// Reads go straight to the underlying object and never produce changes.
/// Writes update the underlying object and queue a field record in the
/// owning context; writing a composite value registers and wraps it too.
///
/// Handles are cheap to clone and all clones are the same handle. A handle
/// is only a view: it cannot be serialized, and user data only ever holds
/// the plain [`ObjectRef`].
#[derive(Clone)]
pub struct Tracked {
    inner: Rc<Inner>,
}

struct Inner {
    id: ObjectId,
    object: ObjectRef,
    session: Weak<RefCell<Session>>,
}

impl Tracked {
    pub(crate) fn new(id: ObjectId, object: ObjectRef, session: Weak<RefCell<Session>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id,
                object,
                session,
            }),
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.inner.id
    }

    /// The underlying object.
    pub fn object(&self) -> &ObjectRef {
        &self.inner.object
    }

    pub fn type_tag(&self) -> String {
        self.inner.object.borrow().type_tag().to_owned()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.inner.object.borrow().attribute_names()
    }

    /// Current value of an attribute.
    pub fn get(&self, name: &str) -> Option<Slot> {
        self.inner.object.borrow().get(name)
    }

    /// Current value of an atomic attribute.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(Slot::into_value)
    }

    /// Tracked handle of a composite-valued attribute.
    pub fn child(&self, name: &str) -> Result<Option<Tracked>> {
        match self.get(name) {
            Some(Slot::Object(child)) => {
                let session = self.session()?;
                session::wrap(&session, &child).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Write an attribute and record the change.
    pub fn set(&self, name: &str, value: impl Into<Slot>) -> Result<()> {
        let session = self.session()?;
        self.intercept(&session, name, value.into())
    }

    /// Index-style write; the index's string form is the attribute name.
    pub fn set_item(&self, index: impl fmt::Display, value: impl Into<Slot>) -> Result<()> {
        self.set(&index.to_string(), value)
    }

    /// Borrow the underlying object as its concrete type.
    pub fn read<C: Composite, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let object = self.inner.object.borrow();
        object.as_any().downcast_ref::<C>().map(f)
    }

    /// Returns `true` if both are the same handle.
    pub fn ptr_eq(a: &Tracked, b: &Tracked) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    fn session(&self) -> Result<SharedSession> {
        self.inner.session.upgrade().ok_or(PersistError::ContextClosed)
    }

    pub(crate) fn intercept(&self, session: &SharedSession, name: &str, value: Slot) -> Result<()> {
        let field = match value {
            Slot::Atomic(value) => {
                self.inner
                    .object
                    .borrow_mut()
                    .set(name, Slot::Atomic(value.clone()))?;
                FieldValue::Literal(value)
            }
            Slot::Object(child) => {
                let mark = session::mark(session);
                let stored = session::wrap(session, &child).and_then(|wrapped| {
                    self.inner
                        .object
                        .borrow_mut()
                        .set(name, Slot::Object(child))?;
                    Ok(wrapped)
                });
                match stored {
                    Ok(wrapped) => FieldValue::reference(wrapped.id().clone()),
                    Err(e) => {
                        session::rollback(session, mark);
                        return Err(e);
                    }
                }
            }
        };
        session::record_update(session, &self.inner.id, name, field);
        Ok(())
    }
}

impl Serialize for Tracked {
    fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom(NOT_SERIALIZABLE))
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("id", &self.inner.id)
            .field("object", &Slot::Object(Rc::clone(&self.inner.object)))
            .finish()
    }
}
