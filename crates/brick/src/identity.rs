//! Component identity
//!
//! Instance ids and the registry that maps them to live instances. The id is
//! mirrored onto the bound element as `data-component-id`, which is the only
//! link between markup and instance.

use std::collections::HashMap;
use std::fmt;

use crate::component::Instance;

/// Attribute naming the component type of an element
pub const NAME_ATTRIBUTE: &str = "data-component-name";

/// Attribute carrying the id of the instance bound to an element
pub const ID_ATTRIBUTE: &str = "data-component-id";

/// Unique id of a component instance; never reused by one [`Components`](crate::Components)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Raw numeric value, as written to the id attribute
    pub fn get(self) -> u64 {
        self.0
    }

    /// Read an id back from its attribute form.
    ///
    /// Only the exact text `Display` produces is accepted, so `"007"` or
    /// `"+7"` do not alias instance 7.
    pub fn parse(value: &str) -> Option<Self> {
        let raw: u64 = value.parse().ok()?;
        (raw > 0 && raw.to_string() == value).then_some(Self(raw))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Live instances by id
pub(crate) struct Registry {
    instances: HashMap<ComponentId, Instance>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            instances: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate the next id; ids are handed out even if construction later fails
    pub(crate) fn allocate(&mut self) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids allocated so far
    pub(crate) fn allocated(&self) -> u64 {
        self.next_id - 1
    }

    pub(crate) fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.id, instance);
    }

    pub(crate) fn get(&self, id: ComponentId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ComponentId) -> Option<Instance> {
        self.instances.remove(&id)
    }

    pub(crate) fn contains(&self, id: ComponentId) -> bool {
        self.instances.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    /// Live ids in ascending (construction) order
    pub(crate) fn ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<_> = self.instances.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
