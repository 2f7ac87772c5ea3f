use std::collections::BTreeMap;

use tracing::debug;

use crate::config::UnknownTypePolicy;
use crate::error::{PersistError, Result};
use crate::object::{share, Composite, Entity, ObjectRef};

/// Type tag of the object created by [`Context::reset_root`](crate::Context::reset_root).
pub const ROOT_TYPE: &str = "glight.Root";

type Constructor = Box<dyn Fn() -> ObjectRef>;

/// Maps type tags to default constructors.
///
/// Replaying a composite record allocates a fresh default instance of the
/// recorded type through this registry.
pub struct TypeRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl TypeRegistry {
    /// A registry that knows only the root type.
    pub fn new() -> Self {
        let mut registry = Self {
            constructors: BTreeMap::new(),
        };
        registry.register_entity(ROOT_TYPE);
        registry
    }

    /// Register a typed composite; its tag is read from a default instance.
    pub fn register<C: Composite + Default + 'static>(&mut self) -> &mut Self {
        let tag = C::default().type_tag().to_owned();
        self.register_with(tag, || share(C::default()))
    }

    /// Register a dynamic [`Entity`] type.
    pub fn register_entity(&mut self, type_tag: impl Into<String>) -> &mut Self {
        let tag = type_tag.into();
        let entity_tag = tag.clone();
        self.register_with(tag, move || share(Entity::new(entity_tag.clone())))
    }

    pub fn register_with(
        &mut self,
        type_tag: impl Into<String>,
        constructor: impl Fn() -> ObjectRef + 'static,
    ) -> &mut Self {
        let tag = type_tag.into();
        debug!(type_tag = %tag, "registered composite type");
        self.constructors.insert(tag, Box::new(constructor));
        self
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }

    /// Registered tags in sorted order.
    pub fn type_tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Allocate a default instance of `type_tag`.
    pub fn instantiate(&self, type_tag: &str, unknown: UnknownTypePolicy) -> Result<ObjectRef> {
        match (self.constructors.get(type_tag), unknown) {
            (Some(constructor), _) => Ok(constructor()),
            (None, UnknownTypePolicy::Dynamic) => {
                debug!(type_tag, "materializing unregistered type as entity");
                Ok(share(Entity::new(type_tag)))
            }
            (None, UnknownTypePolicy::Reject) => {
                Err(PersistError::UnknownType(type_tag.to_owned()))
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
