use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use glight_types::{IdentityProvider, ObjectId, Value};

use crate::error::Result;

/// Shared handle to a live composite object.
///
/// Graphs may be cyclic, so objects are reference counted and mutated through
/// `RefCell`. User data stores these handles directly, never [`Tracked`]
/// wrappers.
///
/// [`Tracked`]: crate::Tracked
pub type ObjectRef = Rc<RefCell<dyn Composite>>;

/// Move a composite into a shared handle.
pub fn share<C: Composite + 'static>(object: C) -> ObjectRef {
    Rc::new(RefCell::new(object))
}

/// Returns `true` if both handles point at the same object.
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

/// Identity of `object`, asking `ids` for a fresh one on first use.
///
/// Once assigned the identifier lives on the object, so later calls return
/// the same id for the same object.
pub fn identity_of(object: &ObjectRef, ids: &mut dyn IdentityProvider) -> ObjectId {
    let existing = object.borrow().identity().cloned();
    if let Some(id) = existing {
        return id;
    }
    let id = ids.next_id();
    object.borrow_mut().set_identity(id.clone());
    id
}

/// Capability every persistable object exposes to the engine.
///
/// The engine never touches fields directly: it enumerates attributes,
/// reads them and writes them back through this narrow interface. The
/// identity slot is managed by the engine; implementations only store it.
pub trait Composite: Any {
    /// Tag used to find a default constructor when the log is replayed.
    fn type_tag(&self) -> &str;

    fn identity(&self) -> Option<&ObjectId>;

    fn set_identity(&mut self, id: ObjectId);

    /// Names of the attributes currently set, in a stable order.
    fn attribute_names(&self) -> Vec<String>;

    fn get(&self, name: &str) -> Option<Slot>;

    fn set(&mut self, name: &str, value: Slot) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Value of an attribute: atomic, or a composite tracked by identity.
#[derive(Clone)]
pub enum Slot {
    Atomic(Value),
    Object(ObjectRef),
}

impl Slot {
    /// Atomic slots are stored whole and never wrapped; composites get an
    /// identity, a composite record and a tracking wrapper. Both the
    /// serializer and the tracking layer branch on this variant split.
    pub fn is_atomic(&self) -> bool {
        matches!(self, Slot::Atomic(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Slot::Atomic(v) => Some(v),
            Slot::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Slot::Object(o) => Some(o),
            Slot::Atomic(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Slot::Atomic(v) => Some(v),
            Slot::Object(_) => None,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Atomic(v) => f.debug_tuple("Atomic").field(v).finish(),
            // Graphs can be cyclic: print the object's identity, not its contents.
            Slot::Object(o) => match o.try_borrow() {
                Ok(obj) => match obj.identity() {
                    Some(id) => write!(f, "Object({}#{})", obj.type_tag(), id),
                    None => write!(f, "Object({})", obj.type_tag()),
                },
                Err(_) => f.write_str("Object(<borrowed>)"),
            },
        }
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Slot::Atomic(a), Slot::Atomic(b)) => a == b,
            (Slot::Object(a), Slot::Object(b)) => same_object(a, b),
            _ => false,
        }
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Slot::Atomic(value)
    }
}

impl From<ObjectRef> for Slot {
    fn from(object: ObjectRef) -> Self {
        Slot::Object(object)
    }
}

impl From<&ObjectRef> for Slot {
    fn from(object: &ObjectRef) -> Self {
        Slot::Object(Rc::clone(object))
    }
}

macro_rules! atomic_slot_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Slot {
                fn from(value: $ty) -> Self {
                    Slot::Atomic(Value::from(value))
                }
            }
        )*
    };
}

atomic_slot_from!(bool, i32, i64, u32, f64, &str, String);

/// Dynamic composite: a type tag plus an ordered attribute map.
///
/// Lets applications persist objects without writing a [`Composite`] impl,
/// and is what the engine materializes for tags nobody registered when the
/// context allows dynamic types.
#[derive(Clone, Default)]
pub struct Entity {
    type_tag: String,
    id: Option<ObjectId>,
    attributes: BTreeMap<String, Slot>,
}

impl Entity {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            id: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Slot>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Move into a shared handle.
    pub fn into_ref(self) -> ObjectRef {
        share(self)
    }
}

impl Composite for Entity {
    fn type_tag(&self) -> &str {
        &self.type_tag
    }

    fn identity(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }

    fn set_identity(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<Slot> {
        self.attributes.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: Slot) -> Result<()> {
        self.attributes.insert(name.to_owned(), value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type_tag", &self.type_tag)
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .finish()
    }
}
