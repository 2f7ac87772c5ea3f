use glight_types::{CompositeRecord, FieldRecord, FieldValue, Record};
use tracing::{debug, trace};

use crate::error::{PersistError, Result};
use crate::object::Slot;
use crate::session::{self, SharedSession};

/// Counts from one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReplayStats {
    /// Composite records that created a new object.
    pub(crate) materialized: usize,
    /// Composite records naming an object already in the table.
    pub(crate) reused: usize,
    pub(crate) fields: usize,
}

/// Rebuild the object table from `records`.
///
/// Two passes: every composite record is materialized first, creating empty
/// default instances, then field records are applied in log order. A
/// reference can therefore name an object declared anywhere in the log,
/// which is what cycles and depth-first dumps need. Must run in loading
/// mode so nothing is recorded.
pub(crate) fn replay(session: &SharedSession, records: &[Record]) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for composite in records.iter().filter_map(Record::as_composite) {
        if materialize(session, composite)? {
            stats.materialized += 1;
        } else {
            stats.reused += 1;
        }
    }

    for field in records.iter().filter_map(Record::as_field) {
        apply_field(session, field)?;
        stats.fields += 1;
    }

    debug!(
        materialized = stats.materialized,
        reused = stats.reused,
        fields = stats.fields,
        "replay complete"
    );
    Ok(stats)
}

/// Allocate a default instance for `record`. Returns `false` if the id was
/// already present and the existing object was kept.
fn materialize(session: &SharedSession, record: &CompositeRecord) -> Result<bool> {
    if session.borrow().objects.contains_key(&record.id) {
        trace!(id = %record.id, "composite already materialized");
        return Ok(false);
    }

    let object = {
        let s = session.borrow();
        s.registry
            .instantiate(&record.type_tag, s.config.unknown_types)?
    };
    object.borrow_mut().set_identity(record.id.clone());
    session.borrow_mut().ids.observe(&record.id);
    session::wrap(session, &object)?;
    trace!(id = %record.id, type_tag = %record.type_tag, "materialized composite");
    Ok(true)
}

/// `objects[parent].attribute = value`, written to the object directly.
fn apply_field(session: &SharedSession, record: &FieldRecord) -> Result<()> {
    let parent = session.borrow().objects.get(&record.parent).cloned();
    let parent = parent.ok_or_else(|| PersistError::MissingObject {
        parent: record.parent.clone(),
        attribute: record.attribute.clone(),
    })?;

    let value = match &record.value {
        FieldValue::Literal(value) => Slot::Atomic(value.clone()),
        FieldValue::Reference(marker) => {
            let target = session.borrow().objects.get(&marker.target).cloned();
            let target = target.ok_or_else(|| PersistError::UnresolvedReference {
                parent: record.parent.clone(),
                attribute: record.attribute.clone(),
                target: marker.target.clone(),
            })?;
            session::wrap(session, &target)?;
            Slot::Object(target)
        }
    };

    let applied = parent.borrow_mut().set(&record.attribute, value);
    applied
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glight_types::{ObjectId, SequentialIds, Value};

    use super::*;
    use crate::config::ContextConfig;
    use crate::registry::{TypeRegistry, ROOT_TYPE};
    use crate::session::{LoadingGuard, Session};

    fn session() -> SharedSession {
        let mut registry = TypeRegistry::new();
        registry.register_entity("A");
        Rc::new(RefCell::new(Session::new(
            registry,
            Box::new(SequentialIds::new()),
            ContextConfig::default(),
        )))
    }

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    #[test]
    fn reference_before_its_composite_resolves() {
        let s = session();
        let records = vec![
            Record::composite(ObjectId::root(), ROOT_TYPE),
            Record::field(ObjectId::root(), "child", FieldValue::reference(id("c1"))),
            Record::composite(id("c1"), "A"),
            Record::field(id("c1"), "n", FieldValue::Literal(Value::Int(7))),
        ];

        let _guard = LoadingGuard::enter(&s);
        let stats = replay(&s, &records).unwrap();
        assert_eq!(stats.materialized, 2);
        assert_eq!(stats.fields, 2);

        let root = s.borrow().objects.get(&ObjectId::root()).cloned().unwrap();
        let child = s.borrow().objects.get(&id("c1")).cloned().unwrap();
        let stored = root.borrow().get("child").unwrap();
        assert_eq!(stored, Slot::Object(child));
        assert!(s.borrow().pending.is_empty());
    }

    #[test]
    fn repeated_composite_reuses_the_object() {
        let s = session();
        let records = vec![
            Record::composite(id("a1"), "A"),
            Record::field(id("a1"), "n", FieldValue::Literal(Value::Int(1))),
            Record::composite(id("a1"), "A"),
            Record::field(id("a1"), "n", FieldValue::Literal(Value::Int(2))),
        ];

        let _guard = LoadingGuard::enter(&s);
        let stats = replay(&s, &records).unwrap();
        assert_eq!(stats.materialized, 1);
        assert_eq!(stats.reused, 1);

        let a = s.borrow().objects.get(&id("a1")).cloned().unwrap();
        assert_eq!(a.borrow().get("n"), Some(Slot::from(2)));
    }

    #[test]
    fn materialized_objects_are_wrapped() {
        let s = session();
        let records = vec![Record::composite(id("a1"), "A")];

        let _guard = LoadingGuard::enter(&s);
        replay(&s, &records).unwrap();
        assert!(s.borrow().wrappers.contains_key(&id("a1")));
    }
}
