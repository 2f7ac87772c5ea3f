use std::collections::HashSet;

use glight_types::{FieldValue, IdentityProvider, ObjectId, Record};

use crate::object::{identity_of, ObjectRef, Slot};

/// Dump `object` and everything it references as log records.
///
/// Depth-first: an object's composite record comes first, then one field
/// record per attribute; a composite-valued attribute is followed by the
/// full dump of its target before the next sibling attribute. Objects are
/// emitted once, so cycles terminate. A reference may therefore precede
/// its target's composite record; replay resolves references only after
/// every composite in the log has been materialized.
///
/// Nothing is mutated except that objects seen for the first time receive
/// an identity from `ids`.
pub fn serialize(object: &ObjectRef, ids: &mut dyn IdentityProvider) -> Vec<Record> {
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    emit(object, ids, &mut visited, &mut records);
    records
}

fn emit(
    object: &ObjectRef,
    ids: &mut dyn IdentityProvider,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<Record>,
) {
    let id = identity_of(object, ids);
    if !visited.insert(id.clone()) {
        return;
    }

    let (type_tag, attributes) = {
        let obj = object.borrow();
        let attributes: Vec<(String, Slot)> = obj
            .attribute_names()
            .into_iter()
            .filter_map(|name| obj.get(&name).map(|value| (name, value)))
            .collect();
        (obj.type_tag().to_owned(), attributes)
    };
    out.push(Record::composite(id.clone(), type_tag));

    for (name, value) in attributes {
        match value {
            Slot::Atomic(value) => {
                out.push(Record::field(id.clone(), name, FieldValue::Literal(value)));
            }
            Slot::Object(child) => {
                let child_id = identity_of(&child, ids);
                out.push(Record::field(id.clone(), name, FieldValue::reference(child_id)));
                emit(&child, ids, visited, out);
            }
        }
    }
}
