//! Schema registry: which component kinds each entity kind carries.
//!
//! Registration happens once at startup; the registry is then shared
//! immutably by the store and its baseline snapshots. Declaring an unknown
//! pairing is caught here, at registration time, so per-call component
//! lookups can only fail for kinds that genuinely never declared them.

use std::collections::HashMap;
use std::sync::Arc;

use drawbench_foundation::{ComponentKind, EntityKind, Error, Result};

/// A registered component kind: its name and fixed column element size.
#[derive(Clone, Debug)]
struct ComponentDef {
    name: Arc<str>,
    size: usize,
}

/// A registered entity kind: its name and declared components in column order.
#[derive(Clone, Debug, Default)]
struct KindDef {
    name: Arc<str>,
    /// Declared components, in declaration (= column) order.
    components: Vec<ComponentKind>,
    /// Column position per component kind.
    positions: HashMap<ComponentKind, usize>,
}

/// Per-type metadata: component kinds, their sizes, and column positions.
///
/// Lets create/remove/iterate stay fully generic over entity shape.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    components: Vec<ComponentDef>,
    component_names: HashMap<Arc<str>, ComponentKind>,
    kinds: Vec<KindDef>,
    kind_names: HashMap<Arc<str>, EntityKind>,
}

impl SchemaRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component kind with a fixed element size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered or the component
    /// index space is exhausted.
    pub fn register_component(&mut self, name: &str, size: usize) -> Result<ComponentKind> {
        if self.component_names.contains_key(name) {
            return Err(Error::duplicate_registration(name));
        }
        let index = u16::try_from(self.components.len())
            .map_err(|_| Error::capacity_exhausted("component kinds"))?;

        let arc: Arc<str> = name.into();
        self.components.push(ComponentDef {
            name: arc.clone(),
            size,
        });
        let kind = ComponentKind::new(index);
        self.component_names.insert(arc, kind);
        Ok(kind)
    }

    /// Registers an entity kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered or the kind
    /// index space is exhausted.
    pub fn register_kind(&mut self, name: &str) -> Result<EntityKind> {
        if self.kind_names.contains_key(name) {
            return Err(Error::duplicate_registration(name));
        }
        let index = u16::try_from(self.kinds.len())
            .map_err(|_| Error::capacity_exhausted("entity kinds"))?;

        let arc: Arc<str> = name.into();
        self.kinds.push(KindDef {
            name: arc.clone(),
            ..KindDef::default()
        });
        let kind = EntityKind::new(index);
        self.kind_names.insert(arc, kind);
        Ok(kind)
    }

    /// Declares that entities of `kind` carry `component`.
    ///
    /// Declaration order fixes column order.
    ///
    /// # Errors
    ///
    /// Returns an error if either id is unknown or the pairing is already
    /// declared.
    pub fn declare(&mut self, kind: EntityKind, component: ComponentKind) -> Result<()> {
        if component.index() as usize >= self.components.len() {
            return Err(Error::undeclared_component(kind, component)
                .with_context("component kind was never registered"));
        }
        let def = self
            .kinds
            .get_mut(kind.index() as usize)
            .ok_or_else(|| Error::unknown_kind(kind))?;
        if def.positions.contains_key(&component) {
            return Err(Error::duplicate_registration(format!(
                "{component:?} on {kind:?}"
            )));
        }
        def.positions.insert(component, def.components.len());
        def.components.push(component);
        Ok(())
    }

    /// Consumes the registry into the shared form the store expects.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns the number of registered entity kinds.
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns the number of registered component kinds.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Returns the element size of a component kind.
    #[must_use]
    pub fn component_size(&self, component: ComponentKind) -> Option<usize> {
        self.components
            .get(component.index() as usize)
            .map(|d| d.size)
    }

    /// Returns the name of a component kind.
    #[must_use]
    pub fn component_name(&self, component: ComponentKind) -> Option<&str> {
        self.components
            .get(component.index() as usize)
            .map(|d| &*d.name)
    }

    /// Looks a component kind up by name.
    #[must_use]
    pub fn component_by_name(&self, name: &str) -> Option<ComponentKind> {
        self.component_names.get(name).copied()
    }

    /// Returns the name of an entity kind.
    #[must_use]
    pub fn kind_name(&self, kind: EntityKind) -> Option<&str> {
        self.kinds.get(kind.index() as usize).map(|d| &*d.name)
    }

    /// Looks an entity kind up by name.
    #[must_use]
    pub fn kind_by_name(&self, name: &str) -> Option<EntityKind> {
        self.kind_names.get(name).copied()
    }

    /// Returns the declared components of a kind, in column order.
    #[must_use]
    pub fn components_of(&self, kind: EntityKind) -> &[ComponentKind] {
        self.kinds
            .get(kind.index() as usize)
            .map_or(&[], |d| &d.components)
    }

    /// Returns the column position of `component` within `kind`'s table.
    #[must_use]
    pub fn position(&self, kind: EntityKind, component: ComponentKind) -> Option<usize> {
        self.kinds
            .get(kind.index() as usize)
            .and_then(|d| d.positions.get(&component).copied())
    }

    /// Returns the column element sizes for a kind, in column order.
    #[must_use]
    pub fn column_sizes(&self, kind: EntityKind) -> Vec<usize> {
        self.components_of(kind)
            .iter()
            .map(|c| self.components[c.index() as usize].size)
            .collect()
    }

    /// Iterates all registered entity kinds.
    pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
        // Kind count is capped at u16 range by register_kind.
        let count = u16::try_from(self.kinds.len()).unwrap_or(u16::MAX);
        (0..count).map(EntityKind::new)
    }
}
