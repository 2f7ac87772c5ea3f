use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;
use crate::value::Value;

/// Lazy pointer to another composite object.
///
/// Resolution happens against the live object table at the moment the
/// containing field is applied, which is what lets a log describe cycles.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceMarker {
    pub target: ObjectId,
}

impl ReferenceMarker {
    pub fn new(target: ObjectId) -> Self {
        Self { target }
    }
}

impl fmt::Display for ReferenceMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref({})", self.target)
    }
}

/// Value carried by a [`FieldRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Atomic value stored directly.
    Literal(Value),
    /// Reference to another composite object.
    Reference(ReferenceMarker),
}

impl FieldValue {
    pub fn reference(target: ObjectId) -> Self {
        FieldValue::Reference(ReferenceMarker::new(target))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            FieldValue::Literal(v) => Some(v),
            FieldValue::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceMarker> {
        match self {
            FieldValue::Reference(r) => Some(r),
            FieldValue::Literal(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Literal(v) => write!(f, "{v}"),
            FieldValue::Reference(r) => write!(f, "{r}"),
        }
    }
}

/// Declares that an object of the given type exists under `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRecord {
    pub id: ObjectId,
    pub type_tag: String,
}

/// Declares `objects[parent].attribute = value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub parent: ObjectId,
    pub attribute: String,
    pub value: FieldValue,
}

/// One entry of the change log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Composite(CompositeRecord),
    Field(FieldRecord),
}

impl Record {
    pub fn composite(id: ObjectId, type_tag: impl Into<String>) -> Self {
        Record::Composite(CompositeRecord {
            id,
            type_tag: type_tag.into(),
        })
    }

    pub fn field(parent: ObjectId, attribute: impl Into<String>, value: FieldValue) -> Self {
        Record::Field(FieldRecord {
            parent,
            attribute: attribute.into(),
            value,
        })
    }

    /// Identifier of the object this record declares or modifies.
    pub fn object_id(&self) -> &ObjectId {
        match self {
            Record::Composite(c) => &c.id,
            Record::Field(f) => &f.parent,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeRecord> {
        match self {
            Record::Composite(c) => Some(c),
            Record::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldRecord> {
        match self {
            Record::Field(f) => Some(f),
            Record::Composite(_) => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Composite(c) => write!(f, "composite {} : {}", c.id, c.type_tag),
            Record::Field(r) => write!(f, "field {}.{} = {}", r.parent, r.attribute, r.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ObjectId {
        ObjectId::new(s).unwrap()
    }

    #[test]
    fn display_mirrors_log_listing() {
        let c = Record::composite(id("a1"), "Person");
        let f = Record::field(id("a1"), "name", FieldValue::Literal("x".into()));
        let r = Record::field(id("root"), "other", FieldValue::reference(id("a1")));
        assert_eq!(c.to_string(), "composite a1 : Person");
        assert_eq!(f.to_string(), "field a1.name = \"x\"");
        assert_eq!(r.to_string(), "field root.other = ref(a1)");
    }

    #[test]
    fn object_id_points_at_declared_or_parent() {
        let c = Record::composite(id("a1"), "Person");
        let f = Record::field(id("b2"), "n", FieldValue::Literal(Value::Null));
        assert_eq!(c.object_id(), &id("a1"));
        assert_eq!(f.object_id(), &id("b2"));
        assert!(c.as_field().is_none());
        assert!(f.as_composite().is_none());
    }

    #[test]
    fn field_value_accessors() {
        let lit = FieldValue::Literal(Value::Int(4));
        let reference = FieldValue::reference(id("t"));
        assert_eq!(lit.as_literal(), Some(&Value::Int(4)));
        assert!(lit.as_reference().is_none());
        assert_eq!(reference.as_reference().unwrap().target, id("t"));
    }

    #[test]
    fn records_survive_bincode() {
        let record = Record::field(id("p"), "other", FieldValue::reference(id("q")));
        let bytes = bincode::serialize(&record).unwrap();
        let decoded: Record = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, record);
    }
}
