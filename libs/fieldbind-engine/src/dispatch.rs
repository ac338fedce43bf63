use std::sync::Arc;

use indexmap::IndexMap;

use fieldbind_api::error::BindError;
use fieldbind_api::record::Record;
use fieldbind_api::schema::RecordShape;
use fieldbind_api::value::Value;

use crate::config::{BinderConfig, FailurePolicy};
use crate::error::EngineError;
use crate::registry::{BinderRegistry, ShapeBinders};

/// Outcome of binding a whole document.
#[derive(Debug, Default)]
pub struct BindReport {
    /// Fields written successfully.
    pub bound: usize,
    /// Per-field failures that were skipped under [`FailurePolicy::Skip`].
    pub skipped: Vec<BindError>,
}

impl BindReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Bind entry point: routes a raw value to the cached binder of its field.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<BinderRegistry>,
    shapes: IndexMap<String, Arc<RecordShape>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<BinderRegistry>) -> Self {
        Self {
            registry,
            shapes: IndexMap::new(),
        }
    }

    /// Resolve every shape declared in `config` and warm the registry with it.
    pub fn from_config(config: BinderConfig) -> Result<Self, EngineError> {
        let schemas = config.shapes.clone();
        let mut dispatcher = Self::new(Arc::new(BinderRegistry::new(config)));
        for schema in &schemas {
            if dispatcher.shapes.contains_key(&schema.name) {
                return Err(EngineError::Config(format!("duplicate shape '{}'", schema.name)));
            }
            let shape = RecordShape::resolve(schema)?;
            dispatcher.registry.resolve(&shape)?;
            dispatcher.shapes.insert(schema.name.clone(), Arc::new(shape));
        }
        tracing::info!(shapes = dispatcher.shapes.len(), "dispatcher ready");
        Ok(dispatcher)
    }

    pub fn registry(&self) -> &Arc<BinderRegistry> {
        &self.registry
    }

    /// A shape declared in the configuration.
    pub fn shape(&self, name: &str) -> Result<Arc<RecordShape>, EngineError> {
        self.shapes
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::ShapeNotFound(name.to_owned()))
    }

    pub fn shape_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.shapes.keys().map(String::as_str)
    }

    /// Bind `value` into `field` of `record`.
    ///
    /// Shapes not seen before are resolved inline and cached.
    pub fn dispatch(
        &self,
        shape: &RecordShape,
        field: &str,
        value: Value,
        record: &mut dyn Record,
    ) -> Result<(), BindError> {
        let binders = self.registry.resolve(shape)?;
        bind_one(&binders, field, value, record)
    }

    /// Bind every `(field, value)` entry of one document, in order.
    ///
    /// Under [`FailurePolicy::Abort`] the first failure is returned and the
    /// remaining entries are not bound; fields bound before it keep their new
    /// values. Under [`FailurePolicy::Skip`] failures are collected in the
    /// report. A shape that cannot be resolved always fails the call.
    pub fn bind_document<I, K>(
        &self,
        shape: &RecordShape,
        entries: I,
        record: &mut dyn Record,
    ) -> Result<BindReport, BindError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let binders = self.registry.resolve(shape)?;
        let policy = self.registry.config().failure_policy;
        let mut report = BindReport::default();

        for (field, value) in entries {
            let field = field.as_ref();
            match bind_one(&binders, field, value, record) {
                Ok(()) => report.bound += 1,
                Err(e) => match policy {
                    FailurePolicy::Abort => {
                        tracing::warn!(shape = shape.name(), field, kind = %e.kind(), error = %e, "document rejected");
                        return Err(e);
                    }
                    FailurePolicy::Skip => {
                        tracing::warn!(shape = shape.name(), field, kind = %e.kind(), error = %e, "field skipped");
                        report.skipped.push(e);
                    }
                },
            }
        }

        tracing::trace!(
            shape = shape.name(),
            bound = report.bound,
            skipped = report.skipped.len(),
            "document bound"
        );
        Ok(report)
    }
}

fn bind_one(
    binders: &ShapeBinders,
    field: &str,
    value: Value,
    record: &mut dyn Record,
) -> Result<(), BindError> {
    let binder = binders.get(field).ok_or_else(|| {
        BindError::schema(format!("shape '{}' has no field '{field}'", binders.name()))
    })?;
    binder.bind(value, record)
}
