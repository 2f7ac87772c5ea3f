//! State shared between a [`Context`](crate::Context) and its tracked handles.
//!
//! Functions here take the shared session by reference and keep every
//! `RefCell` borrow short: wrapping recurses through the object graph and
//! re-enters the session at each level.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glight_types::{FieldValue, IdentityProvider, ObjectId, Record};
use tracing::{debug, trace};

use crate::config::ContextConfig;
use crate::error::{PersistError, Result};
use crate::object::{same_object, ObjectRef};
use crate::registry::TypeRegistry;
use crate::tracked::Tracked;

/// Operating mode of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Writes through tracked handles are recorded as pending changes.
    Active,
    /// A log replay is in progress; nothing is recorded.
    Loading,
}

pub(crate) struct Session {
    pub(crate) mode: Mode,
    pub(crate) objects: HashMap<ObjectId, ObjectRef>,
    pub(crate) pending: Vec<Record>,
    pub(crate) wrappers: HashMap<ObjectId, Tracked>,
    pub(crate) root: Option<Tracked>,
    pub(crate) ids: Box<dyn IdentityProvider>,
    pub(crate) registry: TypeRegistry,
    pub(crate) config: ContextConfig,
}

pub(crate) type SharedSession = Rc<RefCell<Session>>;

impl Session {
    pub(crate) fn new(
        registry: TypeRegistry,
        ids: Box<dyn IdentityProvider>,
        config: ContextConfig,
    ) -> Self {
        Self {
            mode: Mode::Active,
            objects: HashMap::new(),
            pending: Vec::new(),
            wrappers: HashMap::new(),
            root: None,
            ids,
            registry,
            config,
        }
    }
}

/// Switches the session to [`Mode::Loading`] and back to [`Mode::Active`]
/// when dropped, whichever way the load exits.
pub(crate) struct LoadingGuard<'a> {
    session: &'a SharedSession,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn enter(session: &'a SharedSession) -> Self {
        session.borrow_mut().mode = Mode::Loading;
        Self { session }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.session.borrow_mut().mode = Mode::Active;
    }
}

/// Identity of `object`, drawn from the session's provider on first use.
pub(crate) fn identity_of(session: &SharedSession, object: &ObjectRef) -> ObjectId {
    let mut s = session.borrow_mut();
    crate::object::identity_of(object, s.ids.as_mut())
}

/// Register `object` in the object table.
///
/// Outside of a load this fails on an id that is already present and
/// queues a composite record. While loading the table is rebuilt from the
/// log, so registration is unconditional and unrecorded.
pub(crate) fn add(session: &SharedSession, object: &ObjectRef) -> Result<ObjectId> {
    let id = identity_of(session, object);
    let type_tag = object.borrow().type_tag().to_owned();

    let mut s = session.borrow_mut();
    if s.mode == Mode::Active {
        if s.objects.contains_key(&id) {
            return Err(PersistError::DuplicateIdentity(id));
        }
        trace!(id = %id, type_tag = %type_tag, "recording composite");
        s.pending.push(Record::composite(id.clone(), type_tag));
    }
    s.objects.insert(id.clone(), Rc::clone(object));
    debug!(id = %id, mode = ?s.mode, "registered object");
    Ok(id)
}

/// Queue a field change. No-op while loading.
pub(crate) fn record_update(
    session: &SharedSession,
    parent: &ObjectId,
    attribute: &str,
    value: FieldValue,
) {
    let mut s = session.borrow_mut();
    if s.mode == Mode::Loading {
        return;
    }
    trace!(parent = %parent, attribute, value = %value, "recording field");
    s.pending.push(Record::field(parent.clone(), attribute, value));
}

/// Length of the pending change set, to hand back to [`rollback`].
pub(crate) fn mark(session: &SharedSession) -> usize {
    session.borrow().pending.len()
}

/// Undo everything recorded since `mark`: pending records are dropped and
/// objects they declared leave the table and the wrapper cache.
pub(crate) fn rollback(session: &SharedSession, mark: usize) {
    let mut s = session.borrow_mut();
    if mark >= s.pending.len() {
        return;
    }
    let undone = s.pending.split_off(mark);
    for composite in undone.iter().filter_map(Record::as_composite) {
        s.objects.remove(&composite.id);
        s.wrappers.remove(&composite.id);
    }
    debug!(records = undone.len(), "rolled back rejected write");
}

/// The tracked handle for `object`, creating and caching one if needed.
///
/// There is at most one handle per id in a session. A new handle is cached
/// before the object's existing attributes are replayed through it, so
/// cycles in the graph find the handle instead of wrapping again.
pub(crate) fn wrap(session: &SharedSession, object: &ObjectRef) -> Result<Tracked> {
    let id = identity_of(session, object);

    let cached = session.borrow().wrappers.get(&id).cloned();
    if let Some(tracked) = cached {
        if same_object(tracked.object(), object) {
            return Ok(tracked);
        }
    }

    let registered = session
        .borrow()
        .objects
        .get(&id)
        .is_some_and(|existing| same_object(existing, object));
    if !registered {
        add(session, object)?;
    }

    let tracked = Tracked::new(id.clone(), Rc::clone(object), Rc::downgrade(session));
    session.borrow_mut().wrappers.insert(id, tracked.clone());

    let names = object.borrow().attribute_names();
    for name in names {
        let value = object.borrow().get(&name);
        if let Some(value) = value {
            tracked.intercept(session, &name, value)?;
        }
    }
    Ok(tracked)
}
