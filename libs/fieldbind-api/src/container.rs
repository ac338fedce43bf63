use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::element::Element;

// ════════════════════════════════════════════════════════════════
//  Unique sets and mappings
// ════════════════════════════════════════════════════════════════

/// Unique-element set. Duplicates (per `Element` equality) collapse on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementSet {
    /// Iterates in first-insertion order.
    Ordered(IndexSet<Element>),
    /// Iterates in `Element` order.
    Sorted(BTreeSet<Element>),
}

impl ElementSet {
    /// Returns `false` if an equal element was already present.
    pub fn insert(&mut self, element: Element) -> bool {
        match self {
            ElementSet::Ordered(s) => s.insert(element),
            ElementSet::Sorted(s) => s.insert(element),
        }
    }

    pub fn contains(&self, element: &Element) -> bool {
        match self {
            ElementSet::Ordered(s) => s.contains(element),
            ElementSet::Sorted(s) => s.contains(element),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ElementSet::Ordered(s) => s.len(),
            ElementSet::Sorted(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &Element> + '_> {
        match self {
            ElementSet::Ordered(s) => Box::new(s.iter()),
            ElementSet::Sorted(s) => Box::new(s.iter()),
        }
    }

    /// Consume the set, yielding elements in its natural iteration order.
    pub fn into_elements(self) -> Vec<Element> {
        match self {
            ElementSet::Ordered(s) => s.into_iter().collect(),
            ElementSet::Sorted(s) => s.into_iter().collect(),
        }
    }
}

impl FromIterator<Element> for ElementSet {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        ElementSet::Ordered(iter.into_iter().collect())
    }
}

/// Key-value mapping. Re-inserting an existing key overwrites its value;
/// an ordered map keeps the key at its first-seen position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementMap {
    Ordered(IndexMap<Element, Element>),
    Sorted(BTreeMap<Element, Element>),
}

impl ElementMap {
    /// Returns the previous value stored under `key`, if any.
    pub fn insert(&mut self, key: Element, value: Element) -> Option<Element> {
        match self {
            ElementMap::Ordered(m) => m.insert(key, value),
            ElementMap::Sorted(m) => m.insert(key, value),
        }
    }

    pub fn get(&self, key: &Element) -> Option<&Element> {
        match self {
            ElementMap::Ordered(m) => m.get(key),
            ElementMap::Sorted(m) => m.get(key),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ElementMap::Ordered(m) => m.len(),
            ElementMap::Sorted(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = (&Element, &Element)> + '_> {
        match self {
            ElementMap::Ordered(m) => Box::new(m.iter()),
            ElementMap::Sorted(m) => Box::new(m.iter()),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Element> + '_ {
        self.iter().map(|(k, _)| k)
    }
}

impl FromIterator<(Element, Element)> for ElementMap {
    fn from_iter<I: IntoIterator<Item = (Element, Element)>>(iter: I) -> Self {
        ElementMap::Ordered(iter.into_iter().collect())
    }
}

// ════════════════════════════════════════════════════════════════
//  Growable containers
// ════════════════════════════════════════════════════════════════

/// A freshly constructed growable container, before it is assigned to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    List(Vec<Element>),
    Set(ElementSet),
    Map(ElementMap),
}

impl Container {
    pub fn kind(&self) -> CtorKind {
        match self {
            Container::List(_) => CtorKind::List,
            Container::Set(_) => CtorKind::Set,
            Container::Map(_) => CtorKind::Map,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Container::List(v) => v.len(),
            Container::Set(s) => s.len(),
            Container::Map(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a container constructor produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CtorKind {
    List,
    Set,
    Map,
}

impl fmt::Display for CtorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CtorKind::List => f.write_str("list"),
            CtorKind::Set => f.write_str("set"),
            CtorKind::Map => f.write_str("map"),
        }
    }
}

/// Named no-argument constructor for a concrete container.
///
/// Resolved once when a field descriptor is built; binders call
/// [`ContainerCtor::instantiate`] on every bind to get a fresh instance.
/// Two constructors are equal when their names and kinds match.
#[derive(Clone)]
pub struct ContainerCtor {
    name: Arc<str>,
    kind: CtorKind,
    make: fn() -> Container,
}

impl ContainerCtor {
    pub fn new(name: impl Into<Arc<str>>, kind: CtorKind, make: fn() -> Container) -> Self {
        Self { name: name.into(), kind, make }
    }

    /// Insertion-ordered list. Default for list-like declarations.
    pub fn vec() -> Self {
        Self::new("vec", CtorKind::List, || Container::List(Vec::new()))
    }

    /// Insertion-ordered unique set. Default for set-like declarations.
    pub fn index_set() -> Self {
        Self::new("index_set", CtorKind::Set, || {
            Container::Set(ElementSet::Ordered(IndexSet::new()))
        })
    }

    pub fn btree_set() -> Self {
        Self::new("btree_set", CtorKind::Set, || {
            Container::Set(ElementSet::Sorted(BTreeSet::new()))
        })
    }

    /// Insertion-ordered mapping. Default for map-like declarations.
    pub fn index_map() -> Self {
        Self::new("index_map", CtorKind::Map, || {
            Container::Map(ElementMap::Ordered(IndexMap::new()))
        })
    }

    pub fn btree_map() -> Self {
        Self::new("btree_map", CtorKind::Map, || {
            Container::Map(ElementMap::Sorted(BTreeMap::new()))
        })
    }

    /// Default constructor for an abstract declaration of the given kind.
    pub fn default_for(kind: CtorKind) -> Self {
        match kind {
            CtorKind::List => Self::vec(),
            CtorKind::Set => Self::index_set(),
            CtorKind::Map => Self::index_map(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CtorKind {
        self.kind
    }

    pub fn instantiate(&self) -> Container {
        (self.make)()
    }
}

impl fmt::Debug for ContainerCtor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerCtor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl PartialEq for ContainerCtor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for ContainerCtor {}

impl std::hash::Hash for ContainerCtor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
    }
}

/// Catalog of container constructors addressable by name from a shape schema.
///
/// Pre-populated with `vec`, `index_set`, `btree_set`, `index_map` and `btree_map`.
#[derive(Debug, Clone)]
pub struct ContainerCatalog {
    ctors: HashMap<String, ContainerCtor>,
}

impl Default for ContainerCatalog {
    fn default() -> Self {
        let mut catalog = Self { ctors: HashMap::new() };
        for ctor in [
            ContainerCtor::vec(),
            ContainerCtor::index_set(),
            ContainerCtor::btree_set(),
            ContainerCtor::index_map(),
            ContainerCtor::btree_map(),
        ] {
            catalog.register(ctor);
        }
        catalog
    }
}

impl ContainerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a constructor under its own name.
    pub fn register(&mut self, ctor: ContainerCtor) {
        self.ctors.insert(ctor.name().to_owned(), ctor);
    }

    /// Resolve `name` to a constructor producing containers of `expected` kind.
    ///
    /// The constructor is invoked once: a constructor whose output does not
    /// match its declared kind is rejected here rather than on first bind.
    pub fn resolve(&self, name: &str, expected: CtorKind) -> Result<ContainerCtor, String> {
        let ctor = self
            .ctors
            .get(name)
            .ok_or_else(|| format!("no container constructor named '{name}'"))?;
        if ctor.kind() != expected {
            return Err(format!(
                "constructor '{name}' builds a {}, field needs a {expected}",
                ctor.kind()
            ));
        }
        let sample = ctor.instantiate();
        if sample.kind() != expected || !sample.is_empty() {
            return Err(format!(
                "constructor '{name}' did not produce an empty {expected}"
            ));
        }
        Ok(ctor.clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ctors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_map_keeps_first_position_on_overwrite() {
        let mut map = ElementMap::Ordered(IndexMap::new());
        map.insert("a".into(), 1i32.into());
        map.insert("b".into(), 2i32.into());
        map.insert("a".into(), 3i32.into());
        let entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![("a".into(), 3i32.into()), ("b".into(), 2i32.into())]
        );
    }

    #[test]
    fn catalog_resolves_builtins() {
        let catalog = ContainerCatalog::new();
        let ctor = catalog.resolve("btree_set", CtorKind::Set).expect("builtin");
        assert!(matches!(ctor.instantiate(), Container::Set(ElementSet::Sorted(_))));
    }

    #[test]
    fn catalog_rejects_unknown_and_mismatched() {
        let catalog = ContainerCatalog::new();
        assert!(catalog.resolve("linked_list", CtorKind::List).is_err());
        let err = catalog.resolve("index_map", CtorKind::Set).unwrap_err();
        assert!(err.contains("needs a set"));
    }

    #[test]
    fn catalog_checks_custom_constructors() {
        let mut catalog = ContainerCatalog::new();
        // Declares a list but builds a map.
        catalog.register(ContainerCtor::new("broken", CtorKind::List, || {
            Container::Map(ElementMap::Ordered(IndexMap::new()))
        }));
        assert!(catalog.resolve("broken", CtorKind::List).is_err());

        catalog.register(ContainerCtor::new("prefilled", CtorKind::List, || {
            Container::List(vec![Element::Int(0)])
        }));
        assert!(catalog.resolve("prefilled", CtorKind::List).is_err());
    }
}
