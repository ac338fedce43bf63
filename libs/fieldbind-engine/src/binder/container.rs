use std::sync::Arc;

use fieldbind_api::container::{Container, ContainerCtor};
use fieldbind_api::element::Element;
use fieldbind_api::error::BindError;
use fieldbind_api::field::FieldValue;
use fieldbind_api::record::Record;
use fieldbind_api::schema::{ContainerKind, FieldHandle};
use fieldbind_api::value::Value;

use super::{Binder, Shape, assign, check_ctor, convert, null_element, unexpected_mapping};
use crate::rules::ConversionRules;

/// Growable list or unique-set field.
///
/// Each bind instantiates a fresh container and inserts converted elements
/// in input order. Sets drop later duplicates silently.
#[derive(Debug)]
pub struct ContainerBinder {
    field: FieldHandle,
    kind: ContainerKind,
    rules: Arc<dyn ConversionRules>,
    ctor: ContainerCtor,
}

impl ContainerBinder {
    pub fn new(
        field: FieldHandle,
        kind: ContainerKind,
        rules: Arc<dyn ConversionRules>,
        ctor: ContainerCtor,
    ) -> Result<Self, BindError> {
        check_ctor(&field, &ctor, kind.ctor_kind())?;
        Ok(Self { field, kind, rules, ctor })
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    fn fill(&self, items: Vec<Option<Element>>) -> Result<Container, BindError> {
        let mut container = self.ctor.instantiate();
        for (index, item) in items.into_iter().enumerate() {
            let element = item.ok_or_else(|| null_element(&*self.rules, &self.field, index))?;
            let converted = convert(&*self.rules, &self.field, element)?;
            match &mut container {
                Container::List(list) => list.push(converted),
                Container::Set(set) => {
                    set.insert(converted);
                }
                Container::Map(_) => {
                    return Err(BindError::NotInstantiableContainer {
                        field: self.field.name().to_owned(),
                        container: self.ctor.name().to_owned(),
                        reason: "constructor produced a map".to_owned(),
                    });
                }
            }
        }
        Ok(container)
    }
}

impl Binder for ContainerBinder {
    fn field(&self) -> &FieldHandle {
        &self.field
    }

    fn bind(&self, value: Value, record: &mut dyn Record) -> Result<(), BindError> {
        let items = match Shape::from(value) {
            Shape::Absent => return assign(record, &self.field, FieldValue::Null),
            Shape::Single(e) => vec![Some(e)],
            Shape::Many(items) => items,
            Shape::Mapping(map) => return Err(unexpected_mapping(&*self.rules, &self.field, map.len())),
        };
        let container = self.fill(items)?;
        tracing::trace!(
            field = %self.field,
            container = self.ctor.name(),
            len = container.len(),
            "bound container"
        );
        assign(record, &self.field, container.into())
    }
}

#[cfg(test)]
mod tests {
    use fieldbind_api::container::{CtorKind, ElementMap, ElementSet};
    use fieldbind_api::element::ElementType;
    use fieldbind_api::record::DocumentRecord;
    use fieldbind_api::schema::{FieldSpec, RecordShape, ShapeSchema};
    use fieldbind_api::value::PrimitiveArray;

    use super::*;
    use crate::rules::{RuleOptions, rules_for};

    fn setup(spec: FieldSpec) -> (ContainerBinder, DocumentRecord) {
        let shape = RecordShape::resolve(&ShapeSchema::new("s").field(spec)).expect("valid shape");
        let descriptor = &shape.fields()[0];
        let kind = match descriptor.target_kind() {
            fieldbind_api::schema::TargetKind::GrowableContainer(kind) => kind,
            other => panic!("not a container: {other}"),
        };
        let binder = ContainerBinder::new(
            descriptor.handle().clone(),
            kind,
            rules_for(descriptor.element_type(), RuleOptions::default()),
            descriptor.container().cloned().expect("ctor"),
        )
        .expect("binder");
        (binder, DocumentRecord::new(&shape))
    }

    #[test]
    fn sequence_to_abstract_list_of_int64() {
        let (binder, mut record) = setup(FieldSpec::list("ids", ElementType::Int64));
        binder
            .bind(Value::Primitive(PrimitiveArray::Int(vec![1, 2, 3])), &mut record)
            .expect("bind");
        assert_eq!(
            record.value("ids"),
            Some(&FieldValue::List(vec![Element::Long(1), Element::Long(2), Element::Long(3)]))
        );
    }

    #[test]
    fn rebinding_replaces_instead_of_appending() {
        let (binder, mut record) = setup(FieldSpec::list("ids", ElementType::Text));
        let input = Value::list(["b", "a"]);
        binder.bind(input.clone(), &mut record).expect("bind");
        let first = record.value("ids").cloned();
        binder.bind(input, &mut record).expect("bind");
        assert_eq!(record.value("ids").cloned(), first);
        assert_eq!(record.value("ids").and_then(FieldValue::as_list).map(<[_]>::len), Some(2));
    }

    #[test]
    fn set_collapses_duplicates_after_conversion() {
        let (binder, mut record) = setup(FieldSpec::set("codes", ElementType::Int32));
        binder.bind(Value::array(["7", "3", "7"]), &mut record).expect("bind");
        let set = record.value("codes").and_then(FieldValue::as_set).expect("set");
        assert_eq!(set.len(), 2);

        binder
            .bind(Value::list([Element::Long(3), Element::Double(7.2), Element::Int(1)]), &mut record)
            .expect("bind");
        let set = record.value("codes").and_then(FieldValue::as_set).expect("set");
        let items: Vec<_> = set.iter().cloned().collect();
        assert_eq!(items, vec![Element::Int(3), Element::Int(7), Element::Int(1)]);
    }

    #[test]
    fn sorted_set_constructor() {
        let (binder, mut record) =
            setup(FieldSpec::set("tags", ElementType::Text).container("btree_set"));
        binder.bind(Value::list(["z", "a", "m"]), &mut record).expect("bind");
        let set = record.value("tags").and_then(FieldValue::as_set).expect("set");
        assert!(matches!(set, ElementSet::Sorted(_)));
        let items: Vec<_> = set.iter().map(ToString::to_string).collect();
        assert_eq!(items, vec!["a", "m", "z"]);
    }

    #[test]
    fn scalar_is_single_element() {
        let (binder, mut record) = setup(FieldSpec::list("flags", ElementType::Boolean));
        binder.bind(Value::from(0i64), &mut record).expect("bind");
        assert_eq!(record.value("flags"), Some(&FieldValue::List(vec![Element::Bool(false)])));
    }

    #[test]
    fn opaque_elements_pass_through() {
        let (binder, mut record) = setup(FieldSpec::list("extra", ElementType::Opaque));
        let input = Value::list([
            Element::Opaque(serde_json::json!({"a": 1})),
            Element::from("text"),
            Element::Short(4),
        ]);
        binder.bind(input.clone(), &mut record).expect("bind");
        let Value::List(expected) = input else { unreachable!() };
        assert_eq!(record.value("extra"), Some(&FieldValue::List(expected)));
    }

    #[test]
    fn failure_keeps_previous_container() {
        let (binder, mut record) = setup(FieldSpec::list("ids", ElementType::Int64));
        binder.bind(Value::list([5i64]), &mut record).expect("bind");
        assert!(binder.bind(Value::list(["1", "nope"]), &mut record).is_err());
        assert!(binder.bind(Value::Array(vec![None]), &mut record).is_err());
        assert_eq!(record.value("ids"), Some(&FieldValue::List(vec![Element::Long(5)])));
    }

    #[test]
    fn mismatched_constructor_rejected() {
        let err = ContainerBinder::new(
            FieldHandle::new(0, "ids"),
            ContainerKind::OrderedList,
            rules_for(ElementType::Int64, RuleOptions::default()),
            ContainerCtor::index_set(),
        )
        .unwrap_err();
        assert!(err.is_schema_level());
    }

    #[test]
    fn constructor_output_is_checked_not_its_label() {
        let mislabelled = ContainerCtor::new("mislabelled", CtorKind::List, || {
            Container::Map(ElementMap::Ordered(Default::default()))
        });
        let err = ContainerBinder::new(
            FieldHandle::new(0, "ids"),
            ContainerKind::OrderedList,
            rules_for(ElementType::Int64, RuleOptions::default()),
            mislabelled,
        )
        .unwrap_err();
        assert!(matches!(
            &err,
            BindError::NotInstantiableContainer { container, reason, .. }
                if container == "mislabelled" && reason.contains("builds a map")
        ));

        let prefilled = ContainerCtor::new("prefilled", CtorKind::List, || {
            Container::List(vec![Element::Long(1)])
        });
        let err = ContainerBinder::new(
            FieldHandle::new(0, "ids"),
            ContainerKind::OrderedList,
            rules_for(ElementType::Int64, RuleOptions::default()),
            prefilled,
        )
        .unwrap_err();
        assert!(err.is_schema_level());
    }
}
