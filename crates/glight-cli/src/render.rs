//! Text and JSON views of a live object graph.

use std::collections::HashSet;

use glight_core::{ObjectId, ObjectRef, Slot, Value};
use serde_json::{json, Map};

/// Indented outline of the graph below `object`. An object reached a
/// second time is printed as a back reference.
pub fn outline(object: &ObjectRef) -> Vec<String> {
    let mut lines = Vec::new();
    let mut seen = HashSet::new();
    let header = describe(object);
    seen.insert(id_of(object));
    lines.push(header);
    outline_attributes(object, 1, &mut seen, &mut lines);
    lines
}

fn outline_attributes(
    object: &ObjectRef,
    depth: usize,
    seen: &mut HashSet<Option<ObjectId>>,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    for (name, slot) in attributes(object) {
        match slot {
            Slot::Atomic(value) => lines.push(format!("{indent}{name} = {value}")),
            Slot::Object(child) => {
                if !seen.insert(id_of(&child)) {
                    lines.push(format!("{indent}{name} -> {} (seen)", describe(&child)));
                    continue;
                }
                lines.push(format!("{indent}{name} -> {}", describe(&child)));
                outline_attributes(&child, depth + 1, seen, lines);
            }
        }
    }
}

/// JSON tree of the graph below `object`. Objects appear in full once and
/// as `{"$ref": id}` afterwards.
pub fn to_json(object: &ObjectRef) -> serde_json::Value {
    let mut seen = HashSet::new();
    object_json(object, &mut seen)
}

fn object_json(object: &ObjectRef, seen: &mut HashSet<Option<ObjectId>>) -> serde_json::Value {
    let id = id_of(object);
    let id_json = id.as_ref().map(ObjectId::as_str);
    if !seen.insert(id.clone()) {
        return json!({ "$ref": id_json });
    }

    let mut fields = Map::new();
    for (name, slot) in attributes(object) {
        let value = match slot {
            Slot::Atomic(value) => value_json(&value),
            Slot::Object(child) => object_json(&child, seen),
        };
        fields.insert(name, value);
    }
    let type_tag = object.borrow().type_tag().to_owned();
    json!({ "id": id_json, "type": type_tag, "attributes": fields })
}

/// Plain JSON for an atomic value. Pairs become two-element arrays.
pub fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Text(s) => json!(s),
        Value::List(items) => items.iter().map(value_json).collect(),
        Value::Map(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_json(v)))
            .collect::<Map<_, _>>()
            .into(),
        Value::Pair(a, b) => json!([value_json(a), value_json(b)]),
    }
}

fn attributes(object: &ObjectRef) -> Vec<(String, Slot)> {
    let obj = object.borrow();
    let slots: Vec<(String, Slot)> = obj
        .attribute_names()
        .into_iter()
        .filter_map(|name| obj.get(&name).map(|slot| (name, slot)))
        .collect();
    slots
}

fn id_of(object: &ObjectRef) -> Option<ObjectId> {
    object.borrow().identity().cloned()
}

fn describe(object: &ObjectRef) -> String {
    let obj = object.borrow();
    match obj.identity() {
        Some(id) => format!("{id} : {}", obj.type_tag()),
        None => format!("? : {}", obj.type_tag()),
    }
}
