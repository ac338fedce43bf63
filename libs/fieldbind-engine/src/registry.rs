use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use fieldbind_api::error::BindError;
use fieldbind_api::schema::RecordShape;

use crate::binder::{Binder, build_binder};
use crate::config::BinderConfig;

/// Binders of one record shape, keyed by field name in slot order.
#[derive(Debug)]
pub struct ShapeBinders {
    shape: RecordShape,
    binders: IndexMap<Arc<str>, Arc<dyn Binder>>,
}

impl ShapeBinders {
    /// Build a binder for every field of `shape`.
    pub fn build(shape: &RecordShape, config: &BinderConfig) -> Result<Self, BindError> {
        let ctx = format!("shape '{}'", shape.name());
        let mut binders = IndexMap::with_capacity(shape.len());
        for descriptor in shape.fields() {
            let binder = build_binder(descriptor, config).map_err(|e| e.with_context(&ctx))?;
            binders.insert(Arc::from(descriptor.name()), binder);
        }
        Ok(Self {
            shape: shape.clone(),
            binders,
        })
    }

    /// The shape these binders were built from.
    pub fn shape(&self) -> &RecordShape {
        &self.shape
    }

    pub fn name(&self) -> &str {
        self.shape.name()
    }

    pub fn get(&self, field: &str) -> Option<&Arc<dyn Binder>> {
        self.binders.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Binder>)> + '_ {
        self.binders.iter().map(|(name, binder)| (&**name, binder))
    }

    pub fn len(&self) -> usize {
        self.binders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binders.is_empty()
    }
}

/// Process-wide cache of resolved binders, one entry per record shape name.
///
/// Empty at creation and filled lazily. Published entries are never
/// mutated. Two threads resolving the same shape concurrently both build it
/// outside the lock; the later publish replaces an equivalent entry.
///
/// A cached entry is only reused for a shape equal to the one it was built
/// from. A different shape under the same name gets fresh binders, which
/// replace the cached entry.
#[derive(Debug)]
pub struct BinderRegistry {
    config: BinderConfig,
    shapes: RwLock<HashMap<Arc<str>, Arc<ShapeBinders>>>,
}

impl Default for BinderRegistry {
    fn default() -> Self {
        Self::new(BinderConfig::default())
    }
}

impl BinderRegistry {
    pub fn new(config: BinderConfig) -> Self {
        Self {
            config,
            shapes: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Cached binders for `shape`, building and publishing them on first use.
    pub fn resolve(&self, shape: &RecordShape) -> Result<Arc<ShapeBinders>, BindError> {
        let stale = match self.get(shape.name()) {
            Some(cached) if cached.shape() == shape => return Ok(cached),
            Some(_) => true,
            None => false,
        };

        let built = Arc::new(ShapeBinders::build(shape, &self.config)?);
        self.write().insert(Arc::from(shape.name()), Arc::clone(&built));
        if stale {
            tracing::warn!(shape = shape.name(), "shape redefined, replaced cached binders");
        } else {
            tracing::debug!(shape = shape.name(), fields = built.len(), "published shape binders");
        }
        Ok(built)
    }

    pub fn get(&self, shape: &str) -> Option<Arc<ShapeBinders>> {
        self.read().get(shape).cloned()
    }

    pub fn contains(&self, shape: &str) -> bool {
        self.read().contains_key(shape)
    }

    pub fn shape_names(&self) -> Vec<String> {
        self.read().keys().map(|k| k.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Arc<str>, Arc<ShapeBinders>>> {
        match self.shapes.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("binder registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Arc<str>, Arc<ShapeBinders>>> {
        match self.shapes.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("binder registry write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
