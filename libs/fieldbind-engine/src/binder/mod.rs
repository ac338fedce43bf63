//! Binder strategies, one per target field shape.
//!
//! A binder owns the field handle and the conversion rules of its element
//! type and nothing else. It computes the complete new field value first and
//! writes it with a single `Record::set`, so a failed bind never leaves a
//! field half-written.

mod container;
mod keyvalue;
mod scalar;
mod sequence;

use std::fmt;
use std::sync::Arc;

use fieldbind_api::container::{ContainerCtor, CtorKind, ElementMap};
use fieldbind_api::element::Element;
use fieldbind_api::error::BindError;
use fieldbind_api::field::FieldValue;
use fieldbind_api::record::Record;
use fieldbind_api::schema::{FieldDescriptor, FieldHandle, TargetKind};
use fieldbind_api::value::Value;

use crate::config::BinderConfig;
use crate::rules::{ConversionRules, RuleOptions, rules_for};

pub use container::ContainerBinder;
pub use keyvalue::KeyValueBinder;
pub use scalar::ScalarBinder;
pub use sequence::SequenceBinder;

/// Writes one raw value into one field of a record.
pub trait Binder: Send + Sync + fmt::Debug {
    fn field(&self) -> &FieldHandle;

    /// Convert `value` and assign it. On error the field is left unchanged.
    fn bind(&self, value: Value, record: &mut dyn Record) -> Result<(), BindError>;
}

/// Build the binder for `descriptor`.
///
/// Dispatch is two-axis: the target kind picks the binder, the element type
/// picks the conversion rules injected into it.
pub fn build_binder(
    descriptor: &FieldDescriptor,
    config: &BinderConfig,
) -> Result<Arc<dyn Binder>, BindError> {
    let options = RuleOptions::from(config);
    let rules = rules_for(descriptor.element_type(), options);
    let field = descriptor.handle().clone();

    let binder: Arc<dyn Binder> = match descriptor.target_kind() {
        TargetKind::Scalar => Arc::new(ScalarBinder::new(
            field,
            descriptor.storage(),
            rules,
            config.absent_primitive,
        )),
        TargetKind::FixedSequence => {
            Arc::new(SequenceBinder::new(field, descriptor.storage(), rules))
        }
        TargetKind::GrowableContainer(kind) => {
            let ctor = descriptor
                .container()
                .cloned()
                .ok_or_else(|| missing_ctor(descriptor))?;
            Arc::new(ContainerBinder::new(field, kind, rules, ctor)?)
        }
        TargetKind::KeyValueMapping => {
            let ctor = descriptor
                .container()
                .cloned()
                .ok_or_else(|| missing_ctor(descriptor))?;
            let key_type = descriptor.key_type().ok_or_else(|| {
                BindError::schema(format!("mapping field '{}' has no key type", descriptor.name()))
            })?;
            Arc::new(KeyValueBinder::new(
                field,
                rules_for(key_type, options),
                rules,
                ctor,
            )?)
        }
    };
    Ok(binder)
}

fn missing_ctor(descriptor: &FieldDescriptor) -> BindError {
    BindError::NotInstantiableContainer {
        field: descriptor.name().to_owned(),
        container: "<none>".to_owned(),
        reason: format!("{} field has no container constructor", descriptor.target_kind()),
    }
}

/// Check that `ctor` really builds an empty container of kind `expected`.
///
/// The declared kind is not trusted; the constructor is invoked once.
pub(crate) fn check_ctor(
    field: &FieldHandle,
    ctor: &ContainerCtor,
    expected: CtorKind,
) -> Result<(), BindError> {
    let sample = ctor.instantiate();
    let reason = if ctor.kind() != expected {
        format!("declared as {}, field needs a {expected}", ctor.kind())
    } else if sample.kind() != expected {
        format!("declared as {expected} but builds a {}", sample.kind())
    } else if !sample.is_empty() {
        "constructor returned a non-empty container".to_owned()
    } else {
        return Ok(());
    };
    Err(BindError::NotInstantiableContainer {
        field: field.name().to_owned(),
        container: ctor.name().to_owned(),
        reason,
    })
}

/// Raw input normalized by cardinality.
pub(crate) enum Shape {
    Absent,
    Single(Element),
    /// Sequence or container elements in natural order; `None` is a null element.
    Many(Vec<Option<Element>>),
    Mapping(ElementMap),
}

impl From<Value> for Shape {
    fn from(value: Value) -> Self {
        match value {
            Value::Absent => Shape::Absent,
            Value::Scalar(e) => Shape::Single(e),
            Value::Array(items) => Shape::Many(items),
            Value::Primitive(arr) => Shape::Many(arr.elements().map(Some).collect()),
            Value::List(items) => Shape::Many(items.into_iter().map(Some).collect()),
            Value::Set(set) => Shape::Many(set.into_elements().into_iter().map(Some).collect()),
            Value::Map(map) => Shape::Mapping(map),
        }
    }
}

pub(crate) fn convert(
    rules: &dyn ConversionRules,
    field: &FieldHandle,
    element: Element,
) -> Result<Element, BindError> {
    rules.convert(element).map_err(|e| e.for_field(field))
}

pub(crate) fn assign(
    record: &mut dyn Record,
    field: &FieldHandle,
    value: FieldValue,
) -> Result<(), BindError> {
    record.set(field, value).map_err(|e| BindError::Assignment {
        field: field.name().to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn null_element(rules: &dyn ConversionRules, field: &FieldHandle, index: usize) -> BindError {
    BindError::Format {
        field: field.name().to_owned(),
        value: format!("null at index {index}"),
        target: rules.element_type(),
        reason: "null elements are not allowed here".to_owned(),
    }
}

pub(crate) fn unexpected_mapping(rules: &dyn ConversionRules, field: &FieldHandle, len: usize) -> BindError {
    BindError::Format {
        field: field.name().to_owned(),
        value: format!("map of {len} entries"),
        target: rules.element_type(),
        reason: "a mapping only binds to mapping fields".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use fieldbind_api::element::ElementType;
    use fieldbind_api::schema::{FieldSpec, RecordShape, ShapeSchema};
    use fieldbind_api::value::PrimitiveArray;

    use super::*;

    #[test]
    fn factory_covers_every_kind_and_element() {
        let config = BinderConfig::default();
        for ty in ElementType::ALL {
            let schema = ShapeSchema::new("all")
                .field(FieldSpec::scalar("scalar", ty))
                .field(FieldSpec::array("array", ty))
                .field(FieldSpec::list("list", ty))
                .field(FieldSpec::set("set", ty))
                .field(FieldSpec::map("map", ElementType::Text, ty));
            let shape = RecordShape::resolve(&schema).expect("valid shape");
            for descriptor in shape.fields() {
                let binder = build_binder(descriptor, &config).expect("binder");
                assert_eq!(binder.field(), descriptor.handle());
            }
        }
    }

    #[test]
    fn shapes_normalize_by_cardinality() {
        assert!(matches!(Shape::from(Value::Absent), Shape::Absent));
        assert!(matches!(Shape::from(Value::from(1i32)), Shape::Single(Element::Int(1))));
        match Shape::from(Value::Primitive(PrimitiveArray::Bool(vec![true, false]))) {
            Shape::Many(items) => {
                assert_eq!(items, vec![Some(Element::Bool(true)), Some(Element::Bool(false))]);
            }
            _ => panic!("expected many"),
        }
        match Shape::from(Value::set(["b", "a", "b"])) {
            Shape::Many(items) => {
                assert_eq!(items, vec![Some(Element::from("b")), Some(Element::from("a"))]);
            }
            _ => panic!("expected many"),
        }
    }
}
