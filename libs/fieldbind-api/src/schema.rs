use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::container::{ContainerCatalog, ContainerCtor, CtorKind};
use crate::element::ElementType;
use crate::error::BindError;

// ════════════════════════════════════════════════════════════════
//  Field shape
// ════════════════════════════════════════════════════════════════

/// Flavor of a growable container field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    OrderedList,
    UniqueSet,
}

impl ContainerKind {
    pub fn ctor_kind(self) -> CtorKind {
        match self {
            ContainerKind::OrderedList => CtorKind::List,
            ContainerKind::UniqueSet => CtorKind::Set,
        }
    }
}

/// Shape of a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Scalar,
    FixedSequence,
    GrowableContainer(ContainerKind),
    KeyValueMapping,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Scalar => f.write_str("scalar"),
            TargetKind::FixedSequence => f.write_str("fixed sequence"),
            TargetKind::GrowableContainer(ContainerKind::OrderedList) => f.write_str("list"),
            TargetKind::GrowableContainer(ContainerKind::UniqueSet) => f.write_str("set"),
            TargetKind::KeyValueMapping => f.write_str("mapping"),
        }
    }
}

/// Field storage. Primitive storage cannot represent absence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    #[default]
    Boxed,
    Primitive,
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Boxed => f.write_str("boxed"),
            Storage::Primitive => f.write_str("primitive"),
        }
    }
}

/// Declared field kind as written in a shape schema.
///
/// `list`, `set` and `map` are abstract declarations: the concrete container
/// comes from the field's `container` name or the kind's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    #[serde(alias = "sequence")]
    Array,
    List,
    Set,
    #[serde(alias = "mapping")]
    Map,
}

impl FieldKind {
    fn target_kind(self) -> TargetKind {
        match self {
            FieldKind::Scalar => TargetKind::Scalar,
            FieldKind::Array => TargetKind::FixedSequence,
            FieldKind::List => TargetKind::GrowableContainer(ContainerKind::OrderedList),
            FieldKind::Set => TargetKind::GrowableContainer(ContainerKind::UniqueSet),
            FieldKind::Map => TargetKind::KeyValueMapping,
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Schema (serde)
// ════════════════════════════════════════════════════════════════

/// Declaration of a single field, as supplied by the schema layer.
///
/// ```toml
/// [[shapes.fields]]
/// name = "tags"
/// kind = "set"
/// element = "text"
/// container = "btree_set"
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub element: ElementType,
    #[serde(default)]
    pub storage: Storage,
    /// Key element type for `map` fields. Defaults to text.
    #[serde(default)]
    pub key: Option<ElementType>,
    /// Concrete container name in the [`ContainerCatalog`].
    #[serde(default)]
    pub container: Option<String>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind, element: ElementType) -> Self {
        Self {
            name: name.into(),
            kind,
            element,
            storage: Storage::Boxed,
            key: None,
            container: None,
        }
    }

    pub fn scalar(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::Scalar, element)
    }

    pub fn array(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::Array, element)
    }

    pub fn list(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::List, element)
    }

    pub fn set(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldKind::Set, element)
    }

    pub fn map(name: impl Into<String>, key: ElementType, value: ElementType) -> Self {
        Self {
            key: Some(key),
            ..Self::new(name, FieldKind::Map, value)
        }
    }

    pub fn primitive(mut self) -> Self {
        self.storage = Storage::Primitive;
        self
    }

    pub fn container(mut self, name: impl Into<String>) -> Self {
        self.container = Some(name.into());
        self
    }
}

/// Declaration of a host record shape: a name plus its ordered fields.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapeSchema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ShapeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }
}

// ════════════════════════════════════════════════════════════════
//  Resolved descriptors
// ════════════════════════════════════════════════════════════════

/// Handle addressing one field of a record instance: slot position plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    slot: usize,
    name: Arc<str>,
}

impl FieldHandle {
    pub fn new(slot: usize, name: impl Into<Arc<str>>) -> Self {
        Self { slot, name: name.into() }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Immutable description of one target field, resolved once per shape.
///
/// Invariants established by [`FieldDescriptor::resolve`]:
/// - growable containers and mappings always carry a constructor of the matching kind
/// - primitive storage only on scalar and fixed-sequence fields of primitive element types
/// - `key_type` is set exactly for mappings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    handle: FieldHandle,
    target_kind: TargetKind,
    element_type: ElementType,
    key_type: Option<ElementType>,
    storage: Storage,
    container: Option<ContainerCtor>,
}

impl FieldDescriptor {
    /// Resolve a declared field into a descriptor bound to `slot`.
    pub fn resolve(
        spec: &FieldSpec,
        slot: usize,
        catalog: &ContainerCatalog,
    ) -> Result<Self, BindError> {
        let target_kind = spec.kind.target_kind();

        if spec.storage == Storage::Primitive {
            let kind_ok = matches!(target_kind, TargetKind::Scalar | TargetKind::FixedSequence);
            if !kind_ok || !spec.element.has_primitive_storage() {
                return Err(BindError::UnsupportedStorage {
                    field: spec.name.clone(),
                    storage: spec.storage,
                    element: spec.element,
                    kind: target_kind,
                });
            }
        }

        let ctor_kind = match target_kind {
            TargetKind::GrowableContainer(kind) => Some(kind.ctor_kind()),
            TargetKind::KeyValueMapping => Some(CtorKind::Map),
            TargetKind::Scalar | TargetKind::FixedSequence => None,
        };

        let container = match (ctor_kind, spec.container.as_deref()) {
            (Some(kind), Some(name)) => Some(catalog.resolve(name, kind).map_err(|reason| {
                BindError::NotInstantiableContainer {
                    field: spec.name.clone(),
                    container: name.to_owned(),
                    reason,
                }
            })?),
            (Some(kind), None) => Some(ContainerCtor::default_for(kind)),
            (None, Some(name)) => {
                return Err(BindError::schema(format!(
                    "field '{}': container '{name}' declared on a {target_kind} field",
                    spec.name
                )));
            }
            (None, None) => None,
        };

        let key_type = match (target_kind, spec.key) {
            (TargetKind::KeyValueMapping, key) => Some(key.unwrap_or(ElementType::Text)),
            (_, Some(_)) => {
                return Err(BindError::schema(format!(
                    "field '{}': key type declared on a {target_kind} field",
                    spec.name
                )));
            }
            (_, None) => None,
        };

        Ok(Self {
            handle: FieldHandle::new(slot, spec.name.as_str()),
            target_kind,
            element_type: spec.element,
            key_type,
            storage: spec.storage,
            container,
        })
    }

    pub fn handle(&self) -> &FieldHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn target_kind(&self) -> TargetKind {
        self.target_kind
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn key_type(&self) -> Option<ElementType> {
        self.key_type
    }

    pub fn storage(&self) -> Storage {
        self.storage
    }

    pub fn container(&self) -> Option<&ContainerCtor> {
        self.container.as_ref()
    }
}

/// Resolved host record shape: name plus descriptors in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    name: Arc<str>,
    fields: Vec<FieldDescriptor>,
}

impl RecordShape {
    /// Resolve every field of `schema`. Any failure is reported with the
    /// shape name as context; field names must be unique.
    pub fn from_schema(schema: &ShapeSchema, catalog: &ContainerCatalog) -> Result<Self, BindError> {
        let ctx = format!("shape '{}'", schema.name);
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(schema.fields.len());
        for (slot, spec) in schema.fields.iter().enumerate() {
            if !seen.insert(spec.name.as_str()) {
                return Err(BindError::schema(format!("duplicate field '{}'", spec.name))
                    .with_context(&ctx));
            }
            let descriptor =
                FieldDescriptor::resolve(spec, slot, catalog).map_err(|e| e.with_context(&ctx))?;
            fields.push(descriptor);
        }
        Ok(Self {
            name: schema.name.as_str().into(),
            fields,
        })
    }

    /// Resolve with the built-in container catalog.
    pub fn resolve(schema: &ShapeSchema) -> Result<Self, BindError> {
        Self::from_schema(schema, &ContainerCatalog::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn abstract_declarations_get_default_containers() {
        let schema = ShapeSchema::new("doc")
            .field(FieldSpec::list("ids", ElementType::Int64))
            .field(FieldSpec::set("tags", ElementType::Text))
            .field(FieldSpec::map("attrs", ElementType::Text, ElementType::Text));
        let shape = RecordShape::resolve(&schema).expect("valid shape");

        let names: Vec<_> = shape
            .fields()
            .iter()
            .map(|f| f.container().map(|c| c.name().to_owned()))
            .collect();
        assert_eq!(
            names,
            vec![
                Some("vec".to_owned()),
                Some("index_set".to_owned()),
                Some("index_map".to_owned())
            ]
        );
        assert_eq!(shape.field("attrs").and_then(|f| f.key_type()), Some(ElementType::Text));
        assert_eq!(shape.field("ids").map(|f| f.handle().slot()), Some(0));
    }

    #[test]
    fn unknown_container_fails_at_construction() {
        let schema = ShapeSchema::new("doc")
            .field(FieldSpec::set("tags", ElementType::Text).container("hash_bag"));
        let err = RecordShape::resolve(&schema).unwrap_err();
        assert!(matches!(err, BindError::NotInstantiableContainer { .. }));
        assert_eq!(err.field(), Some("shape 'doc'.tags"));
        assert!(err.is_schema_level());
    }

    #[test]
    fn primitive_storage_rejected_for_text_and_containers() {
        let text = FieldSpec::scalar("name", ElementType::Text).primitive();
        let err = FieldDescriptor::resolve(&text, 0, &ContainerCatalog::default()).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedStorage { .. }));

        let list = FieldSpec::list("ids", ElementType::Int32).primitive();
        let err = FieldDescriptor::resolve(&list, 0, &ContainerCatalog::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);

        let ok = FieldSpec::array("ids", ElementType::Int32).primitive();
        assert!(FieldDescriptor::resolve(&ok, 0, &ContainerCatalog::default()).is_ok());
    }

    #[test]
    fn duplicate_field_names_rejected() {
        let schema = ShapeSchema::new("doc")
            .field(FieldSpec::scalar("id", ElementType::Int64))
            .field(FieldSpec::scalar("id", ElementType::Text));
        let err = RecordShape::resolve(&schema).unwrap_err();
        assert!(err.to_string().contains("duplicate field 'id'"));
    }

    #[test]
    fn schema_deserializes_from_json() {
        let schema: ShapeSchema = serde_json::from_value(serde_json::json!({
            "name": "quote",
            "fields": [
                { "name": "bid", "kind": "scalar", "element": "double", "storage": "primitive" },
                { "name": "legs", "kind": "sequence", "element": "int" }
            ]
        }))
        .expect("valid schema");
        let shape = RecordShape::resolve(&schema).expect("valid shape");
        assert_eq!(shape.len(), 2);
        assert_eq!(shape.fields()[0].storage(), Storage::Primitive);
        assert_eq!(shape.fields()[1].target_kind(), TargetKind::FixedSequence);
    }
}
