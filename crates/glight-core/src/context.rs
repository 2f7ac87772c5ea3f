use std::cell::RefCell;
use std::fmt;
use std::io::{Read, Write};
use std::rc::Rc;

use glight_log::{LogReader, LogWriter};
use glight_types::{IdentityProvider, ObjectId, RandomIds, Record};
use tracing::{debug, info};

use crate::config::{ContextConfig, UnknownTypePolicy};
use crate::error::{PersistError, Result};
use crate::object::{same_object, ObjectRef};
use crate::registry::{TypeRegistry, ROOT_TYPE};
use crate::replay;
use crate::serializer;
use crate::session::{self, LoadingGuard, Mode, Session, SharedSession};
use crate::tracked::Tracked;

/// Outcome of a [`Context::flush`] or [`Context::snapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub records: usize,
    pub bytes: u64,
}

/// A persistence context: the live object table, the pending change set
/// and the root of the tracked graph.
///
/// Writes through [`Tracked`] handles obtained from a context are queued as
/// pending records; [`flush`](Self::flush) appends them to a log and
/// [`load`](Self::load) rebuilds the graph from one.
///
/// # Example
///
/// ```
/// use glight_core::{Context, TypeRegistry};
///
/// let ctx = Context::new(TypeRegistry::new());
/// let root = ctx.reset_root()?;
/// root.set("name", "y")?;
///
/// let mut log = Vec::new();
/// ctx.flush(&mut log)?;
///
/// let fresh = Context::new(TypeRegistry::new());
/// let root = fresh.load(log.as_slice())?;
/// assert_eq!(root.value("name"), Some("y".into()));
/// # Ok::<(), glight_core::PersistError>(())
/// ```
pub struct Context {
    session: SharedSession,
}

impl Context {
    /// A context drawing identifiers from [`RandomIds`].
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_config(registry, ContextConfig::default())
    }

    pub fn with_config(registry: TypeRegistry, config: ContextConfig) -> Self {
        Self::with_parts(registry, RandomIds::new(), config)
    }

    pub fn with_parts(
        registry: TypeRegistry,
        ids: impl IdentityProvider + 'static,
        config: ContextConfig,
    ) -> Self {
        let session = Session::new(registry, Box::new(ids), config);
        Self {
            session: Rc::new(RefCell::new(session)),
        }
    }

    pub fn config(&self) -> ContextConfig {
        self.session.borrow().config.clone()
    }

    pub fn mode(&self) -> Mode {
        self.session.borrow().mode
    }

    /// Create a fresh root object and install it as the root.
    ///
    /// Fails with [`PersistError::DuplicateIdentity`] if the context already
    /// has a root.
    pub fn reset_root(&self) -> Result<Tracked> {
        let root = self
            .session
            .borrow()
            .registry
            .instantiate(ROOT_TYPE, UnknownTypePolicy::Reject)?;
        self.set_root(&root)
    }

    /// Give `object` the root identity, track it and install it as the root.
    pub fn set_root(&self, object: &ObjectRef) -> Result<Tracked> {
        let root_id = ObjectId::root();
        {
            let s = self.session.borrow();
            let current = object.borrow().identity().cloned();
            if let Some(id) = current.filter(|id| !id.is_root()) {
                if s.objects.get(&id).is_some_and(|o| same_object(o, object)) {
                    return Err(PersistError::AlreadyTracked(id));
                }
            }
            if s.mode == Mode::Active {
                if let Some(existing) = s.objects.get(&root_id) {
                    if !same_object(existing, object) {
                        return Err(PersistError::DuplicateIdentity(root_id));
                    }
                }
            }
        }

        object.borrow_mut().set_identity(root_id);
        let tracked = session::wrap(&self.session, object)?;
        self.session.borrow_mut().root = Some(tracked.clone());
        debug!(type_tag = %tracked.type_tag(), "root installed");
        Ok(tracked)
    }

    /// The current root handle.
    pub fn root(&self) -> Result<Tracked> {
        let root = self.session.borrow().root.clone();
        root.ok_or(PersistError::MissingRoot)
    }

    /// Register `object` in the object table without tracking its
    /// attributes. Use [`track`](Self::track) to get a recording handle.
    pub fn add(&self, object: &ObjectRef) -> Result<ObjectId> {
        session::add(&self.session, object)
    }

    /// The tracked handle for `object`, registering it first if needed.
    pub fn track(&self, object: &ObjectRef) -> Result<Tracked> {
        session::wrap(&self.session, object)
    }

    pub fn identity_of(&self, object: &ObjectRef) -> ObjectId {
        session::identity_of(&self.session, object)
    }

    /// Append every pending record to `sink`, then clear the change set.
    ///
    /// The records are written as one batch. If encoding or writing fails
    /// the change set is kept whole, so the next flush retries all of it.
    /// A record larger than the configured `max_record_size` fails the
    /// flush before anything is written.
    ///
    /// A write that fails partway may leave a torn frame in `sink`. Truncate
    /// the sink back to its length before the failed flush and only then
    /// retry; a retry appended after the torn frame buries it mid-log, where
    /// no [`TailPolicy`](glight_log::TailPolicy) can skip it.
    pub fn flush<W: Write>(&self, sink: W) -> Result<FlushReport> {
        let mut writer = self.writer(sink);
        let s = self.session.borrow();
        let bytes = writer.append_batch(&s.pending)?;
        let records = s.pending.len();
        drop(s);

        self.session.borrow_mut().pending.clear();
        debug!(records, bytes, "flushed pending changes");
        Ok(FlushReport { records, bytes })
    }

    /// Replay a log from the current position of `source` to end-of-stream
    /// and install the logged root.
    ///
    /// The whole stream is decoded before anything is replayed. Nothing is
    /// recorded while loading, and the context is back in [`Mode::Active`]
    /// when this returns, whether or not it succeeded. A context whose load
    /// failed may hold part of the logged graph and should be discarded.
    pub fn load<R: Read>(&self, source: R) -> Result<Tracked> {
        let options = self.session.borrow().config.reader_options();
        let _guard = LoadingGuard::enter(&self.session);

        let records = LogReader::with_options(source, options)
            .collect::<glight_log::Result<Vec<Record>>>()?;
        let stats = replay::replay(&self.session, &records)?;

        let root = self.session.borrow().objects.get(&ObjectId::root()).cloned();
        let root = root.ok_or(PersistError::MissingRoot)?;
        let tracked = self.set_root(&root)?;

        let objects = self.len();
        info!(
            records = records.len(),
            materialized = stats.materialized,
            objects,
            "log loaded"
        );
        Ok(tracked)
    }

    /// Append the full serialization of the root graph to `sink`.
    ///
    /// The output replays to the same graph and can replace a long change
    /// log. Pending changes are left alone.
    pub fn snapshot<W: Write>(&self, sink: W) -> Result<FlushReport> {
        let root = self.root()?;
        let records = self.serialize(root.object());

        let mut writer = self.writer(sink);
        let bytes = writer.append_batch(&records)?;
        debug!(records = records.len(), bytes, "wrote snapshot");
        Ok(FlushReport {
            records: records.len(),
            bytes,
        })
    }

    fn writer<W: Write>(&self, sink: W) -> LogWriter<W> {
        let limit = self.session.borrow().config.max_record_size;
        LogWriter::with_max_record_size(sink, limit)
    }

    /// Records describing `object` and everything reachable from it.
    pub fn serialize(&self, object: &ObjectRef) -> Vec<Record> {
        let mut s = self.session.borrow_mut();
        serializer::serialize(object, s.ids.as_mut())
    }

    /// Copy of the pending change set, oldest first.
    pub fn pending(&self) -> Vec<Record> {
        self.session.borrow().pending.clone()
    }

    pub fn pending_len(&self) -> usize {
        self.session.borrow().pending.len()
    }

    /// Drop pending changes without writing them.
    pub fn clear_pending(&self) {
        self.session.borrow_mut().pending.clear();
    }

    /// Number of objects in the table.
    pub fn len(&self) -> usize {
        self.session.borrow().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session.borrow().objects.is_empty()
    }

    /// Ids in the object table, sorted.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.session.borrow().objects.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn object(&self, id: &ObjectId) -> Option<ObjectRef> {
        self.session.borrow().objects.get(id).cloned()
    }

    /// The cached handle for `id`, if the object has been tracked.
    pub fn tracked(&self, id: &ObjectId) -> Option<Tracked> {
        self.session.borrow().wrappers.get(id).cloned()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.session.borrow();
        f.debug_struct("Context")
            .field("mode", &s.mode)
            .field("objects", &s.objects.len())
            .field("pending", &s.pending.len())
            .field("config", &s.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs::{File, OpenOptions};
    use std::io;

    use glight_log::{LogError, TailPolicy};
    use glight_types::{SequentialIds, Value};
    use proptest::prelude::*;

    use super::*;
    use crate::object::{Entity, Slot};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register_entity("A").register_entity("B");
        registry
    }

    fn context() -> Context {
        Context::with_parts(registry(), SequentialIds::new(), ContextConfig::default())
    }

    fn flushed(ctx: &Context) -> Vec<u8> {
        let mut log = Vec::new();
        ctx.flush(&mut log).unwrap();
        log
    }

    #[test]
    fn renamed_root_survives_reload() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("name", "x").unwrap();
        root.set("name", "y").unwrap();
        let log = flushed(&ctx);

        let fresh = context();
        let root = fresh.load(log.as_slice()).unwrap();
        assert_eq!(root.id(), &ObjectId::root());
        assert_eq!(root.value("name"), Some(Value::from("y")));
    }

    #[test]
    fn reference_reloads_as_live_object() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        let a = Entity::new("A").with("name", "x").into_ref();
        let b = Entity::new("B").with("bodd", 34).with("other", &a).into_ref();
        root.set("b", &b).unwrap();
        let log = flushed(&ctx);

        let fresh = context();
        let root = fresh.load(log.as_slice()).unwrap();
        let b = root.child("b").unwrap().unwrap();
        assert_eq!(b.type_tag(), "B");
        assert_eq!(b.value("bodd"), Some(Value::Int(34)));

        match b.get("other") {
            Some(Slot::Object(a)) => {
                let a = a.borrow();
                assert_eq!(a.type_tag(), "A");
                assert_eq!(a.get("name"), Some(Slot::from("x")));
            }
            other => panic!("expected a live object, got {other:?}"),
        }
    }

    #[test]
    fn reloaded_children_are_tracked() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("other", Entity::new("A").with("name", "x").into_ref())
            .unwrap();
        let log = flushed(&ctx);

        let fresh = context();
        let root = fresh.load(log.as_slice()).unwrap();
        let other = root.child("other").unwrap().unwrap();
        other.set("name", "z").unwrap();

        let pending = fresh.pending();
        assert_eq!(pending.len(), 1);
        let field = pending[0].as_field().unwrap();
        assert_eq!(&field.parent, other.id());
        assert_eq!(field.value.as_literal(), Some(&Value::from("z")));
    }

    #[test]
    fn cyclic_graph_reloads() {
        let ctx = context();
        let a = Entity::new("A").with("name", "a").into_ref();
        let b = Entity::new("A").with("name", "b").with("other", &a).into_ref();
        a.borrow_mut().set("other", Slot::from(&b)).unwrap();
        let root = ctx.reset_root().unwrap();
        root.set("a", &a).unwrap();
        let log = flushed(&ctx);

        let fresh = context();
        let root = fresh.load(log.as_slice()).unwrap();
        let a = root.child("a").unwrap().unwrap();
        let b = a.child("other").unwrap().unwrap();
        let back = b.child("other").unwrap().unwrap();
        assert_eq!(b.value("name"), Some(Value::from("b")));
        assert!(Tracked::ptr_eq(&a, &back));
        assert_eq!(fresh.len(), 3);
    }

    #[test]
    fn loading_records_nothing() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("n", 1).unwrap();
        root.set("child", Entity::new("A").with("m", 2).into_ref())
            .unwrap();
        let log = flushed(&ctx);

        let fresh = context();
        fresh.load(log.as_slice()).unwrap();
        assert_eq!(fresh.pending_len(), 0);
        assert_eq!(fresh.mode(), Mode::Active);
    }

    #[test]
    fn failed_load_restores_active_mode() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("x", Entity::new("Unregistered").into_ref()).unwrap();
        let log = flushed(&ctx);

        let fresh = context();
        let err = fresh.load(log.as_slice()).unwrap_err();
        assert!(matches!(err, PersistError::UnknownType(ref tag) if tag == "Unregistered"));
        assert_eq!(fresh.mode(), Mode::Active);
    }

    #[test]
    fn unknown_types_materialize_as_entities_when_dynamic() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("x", Entity::new("Unregistered").with("k", 5).into_ref())
            .unwrap();
        let log = flushed(&ctx);

        let fresh = Context::with_parts(
            TypeRegistry::new(),
            SequentialIds::new(),
            ContextConfig::permissive(),
        );
        let root = fresh.load(log.as_slice()).unwrap();
        let x = root.child("x").unwrap().unwrap();
        assert_eq!(x.type_tag(), "Unregistered");
        assert_eq!(x.value("k"), Some(Value::Int(5)));
        assert!(x.read(|e: &Entity| e.len()).is_some());
    }

    #[test]
    fn empty_log_has_no_root() {
        let ctx = context();
        assert!(matches!(ctx.load(io::empty()), Err(PersistError::MissingRoot)));
        assert!(matches!(ctx.root(), Err(PersistError::MissingRoot)));
    }

    #[test]
    fn dangling_reference_fails_load() {
        let records = vec![
            Record::composite(ObjectId::root(), ROOT_TYPE),
            Record::field(
                ObjectId::root(),
                "other",
                glight_types::FieldValue::reference(ObjectId::new("ghost").unwrap()),
            ),
        ];
        let mut log = Vec::new();
        LogWriter::new(&mut log).append_batch(&records).unwrap();

        let ctx = context();
        let err = ctx.load(log.as_slice()).unwrap_err();
        assert!(matches!(err, PersistError::UnresolvedReference { ref target, .. } if target.as_str() == "ghost"));
    }

    #[test]
    fn field_before_any_composite_fails_load() {
        let record = Record::field(
            ObjectId::new("nobody").unwrap(),
            "n",
            glight_types::FieldValue::Literal(Value::Int(1)),
        );
        let mut log = Vec::new();
        LogWriter::new(&mut log).append(&record).unwrap();

        let ctx = context();
        assert!(matches!(
            ctx.load(log.as_slice()),
            Err(PersistError::MissingObject { .. })
        ));
    }

    #[test]
    fn flush_clears_pending_and_second_flush_is_empty() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("n", 1).unwrap();

        let mut log = Vec::new();
        let first = ctx.flush(&mut log).unwrap();
        assert_eq!(first.records, 2);
        assert_eq!(first.bytes, log.len() as u64);
        assert_eq!(ctx.pending_len(), 0);

        let second = ctx.flush(&mut log).unwrap();
        assert_eq!(second, FlushReport::default());
        assert_eq!(second.bytes, 0);
        assert_eq!(first.bytes, log.len() as u64);
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_flush_keeps_pending_for_retry() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("n", 1).unwrap();
        let before = ctx.pending();

        let err = ctx.flush(FailingSink).unwrap_err();
        assert!(matches!(err, PersistError::Log(LogError::Io(_))));
        assert_eq!(ctx.pending(), before);

        let mut log = Vec::new();
        assert_eq!(ctx.flush(&mut log).unwrap().records, before.len());
    }

    #[test]
    fn flush_refuses_oversized_record_and_keeps_pending() {
        let config = ContextConfig {
            max_record_size: 64,
            ..Default::default()
        };
        let ctx = Context::with_parts(registry(), SequentialIds::new(), config);
        let root = ctx.reset_root().unwrap();
        root.set("blob", "x".repeat(200)).unwrap();
        let before = ctx.pending();

        let mut log = Vec::new();
        let err = ctx.flush(&mut log).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Log(LogError::RecordTooLarge { limit: 64, .. })
        ));
        assert!(log.is_empty());
        assert_eq!(ctx.pending(), before);

        ctx.clear_pending();
        root.set("n", 1).unwrap();
        assert_eq!(ctx.flush(&mut log).unwrap().records, 1);
    }

    /// Takes `room` bytes, then fails every write.
    struct ShortSink<'a> {
        buf: &'a mut Vec<u8>,
        room: usize,
    }

    impl Write for ShortSink<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.room);
            self.buf.extend_from_slice(&buf[..n]);
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn truncating_a_torn_flush_before_retry_keeps_the_log_readable() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("name", "first").unwrap();
        let mut log = flushed(&ctx);
        let committed = log.len();

        root.set("name", "second").unwrap();
        let sink = ShortSink {
            buf: &mut log,
            room: 5,
        };
        assert!(matches!(
            ctx.flush(sink),
            Err(PersistError::Log(LogError::Io(_)))
        ));
        assert_eq!(log.len(), committed + 5);

        log.truncate(committed);
        ctx.flush(&mut log).unwrap();

        let fresh = context();
        let root = fresh.load(log.as_slice()).unwrap();
        assert_eq!(root.value("name"), Some(Value::from("second")));
    }

    #[test]
    fn torn_tail_is_rejected_or_ignored_per_config() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("a", 1).unwrap();
        root.set("b", 2).unwrap();
        let mut log = flushed(&ctx);
        log.truncate(log.len() - 3);

        let strict = context();
        assert!(matches!(
            strict.load(log.as_slice()),
            Err(PersistError::Log(LogError::TruncatedEntry { .. }))
        ));

        let config = ContextConfig {
            tail_policy: TailPolicy::Ignore,
            ..Default::default()
        };
        let lenient = Context::with_parts(registry(), SequentialIds::new(), config);
        let root = lenient.load(log.as_slice()).unwrap();
        assert_eq!(root.value("a"), Some(Value::Int(1)));
        assert_eq!(root.value("b"), None);
    }

    #[test]
    fn set_root_rejects_second_root_and_tracked_objects() {
        let ctx = context();
        ctx.reset_root().unwrap();
        assert!(matches!(
            ctx.reset_root(),
            Err(PersistError::DuplicateIdentity(ref id)) if id.is_root()
        ));

        let child = Entity::new("A").into_ref();
        let tracked = ctx.track(&child).unwrap();
        assert!(matches!(
            ctx.set_root(&child),
            Err(PersistError::AlreadyTracked(_))
        ));
        // identity untouched by the rejected call
        assert_eq!(child.borrow().identity(), Some(tracked.id()));
    }

    #[test]
    fn set_root_accepts_a_user_object() {
        let ctx = context();
        let object = Entity::new("A").with("name", "x").into_ref();
        let root = ctx.set_root(&object).unwrap();

        assert!(root.id().is_root());
        assert!(Tracked::ptr_eq(&root, &ctx.root().unwrap()));
        // composite + the existing attribute
        assert_eq!(ctx.pending_len(), 2);
    }

    #[test]
    fn snapshot_replays_to_the_same_graph() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        let a = Entity::new("A").with("name", "first").into_ref();
        root.set("a", &a).unwrap();
        for i in 0..5 {
            root.child("a")
                .unwrap()
                .unwrap()
                .set("name", format!("rename {i}"))
                .unwrap();
        }
        let changes = flushed(&ctx);

        let mut compact = Vec::new();
        let report = ctx.snapshot(&mut compact).unwrap();
        assert_eq!(report.records, 4);
        assert!(compact.len() < changes.len());
        assert_eq!(ctx.pending_len(), 0);

        let fresh = context();
        let root = fresh.load(compact.as_slice()).unwrap();
        let a = root.child("a").unwrap().unwrap();
        assert_eq!(a.value("name"), Some(Value::from("rename 4")));
    }

    #[test]
    fn log_appends_across_sessions_in_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.log");
        let append = || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .unwrap()
        };

        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("name", "first").unwrap();
        ctx.flush(append()).unwrap();

        let second = context();
        let root = second.load(File::open(&path).unwrap()).unwrap();
        root.set("name", "second").unwrap();
        ctx.flush(append()).unwrap();
        second.flush(append()).unwrap();

        let third = context();
        let root = third.load(File::open(&path).unwrap()).unwrap();
        assert_eq!(root.value("name"), Some(Value::from("second")));
        assert_eq!(third.object_ids(), vec![ObjectId::root()]);
    }

    #[test]
    fn sequential_ids_continue_after_reload() {
        let ctx = context();
        let root = ctx.reset_root().unwrap();
        root.set("a", Entity::new("A").into_ref()).unwrap();
        let first = root.child("a").unwrap().unwrap().id().clone();
        let log = flushed(&ctx);

        let fresh = context();
        let root = fresh.load(log.as_slice()).unwrap();
        root.set("b", Entity::new("B").into_ref()).unwrap();
        let second = root.child("b").unwrap().unwrap().id().clone();
        assert_ne!(first, second);
        assert_eq!(fresh.len(), 3);
    }

    #[test]
    fn introspection_reflects_the_table() {
        let ctx = context();
        assert!(ctx.is_empty());
        let root = ctx.reset_root().unwrap();
        let child = Entity::new("A").into_ref();
        root.set("c", &child).unwrap();

        let child_id = ctx.identity_of(&child);
        assert_eq!(ctx.object_ids(), vec![child_id.clone(), ObjectId::root()]);
        assert!(ctx.tracked(&child_id).is_some());
        assert!(ctx.object(&ObjectId::new("missing").unwrap()).is_none());
        assert!(format!("{ctx:?}").contains("objects: 2"));
    }

    fn atomic() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
            prop::collection::vec(any::<i64>().prop_map(Value::Int), 0..4).prop_map(Value::List),
        ]
    }

    proptest! {
        #[test]
        fn atomic_writes_survive_reload(writes in prop::collection::vec(("[a-z]{1,8}", atomic()), 1..12)) {
            let ctx = context();
            let root = ctx.reset_root().unwrap();
            for (name, value) in &writes {
                root.set(name, value.clone()).unwrap();
            }
            let log = flushed(&ctx);

            let fresh = context();
            let reloaded = fresh.load(log.as_slice()).unwrap();
            let expected: BTreeMap<String, Value> = writes.into_iter().collect();
            for (name, value) in expected {
                prop_assert_eq!(reloaded.value(&name), Some(value));
            }
        }
    }
}
