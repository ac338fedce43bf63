use std::sync::Arc;

use fieldbind_api::element::Element;
use fieldbind_api::error::BindError;
use fieldbind_api::field::FieldValue;
use fieldbind_api::record::Record;
use fieldbind_api::schema::{FieldHandle, Storage};
use fieldbind_api::value::Value;

use super::{Binder, Shape, assign, convert, unexpected_mapping};
use crate::config::AbsentPrimitive;
use crate::rules::ConversionRules;

/// Single-valued field.
///
/// Sequences and containers are unwrapped by cardinality: empty means absent,
/// one element binds that element, more is a cardinality error.
#[derive(Debug)]
pub struct ScalarBinder {
    field: FieldHandle,
    storage: Storage,
    rules: Arc<dyn ConversionRules>,
    absent: AbsentPrimitive,
}

impl ScalarBinder {
    pub fn new(
        field: FieldHandle,
        storage: Storage,
        rules: Arc<dyn ConversionRules>,
        absent: AbsentPrimitive,
    ) -> Self {
        Self {
            field,
            storage,
            rules,
            absent,
        }
    }

    fn absent_value(&self) -> Result<FieldValue, BindError> {
        if self.storage == Storage::Boxed {
            return Ok(FieldValue::Null);
        }
        let ty = self.rules.element_type();
        match (self.absent, Element::zero(ty)) {
            (AbsentPrimitive::Zero, Some(zero)) => Ok(FieldValue::Scalar(zero)),
            _ => Err(BindError::Format {
                field: self.field.name().to_owned(),
                value: "absent".to_owned(),
                target: ty,
                reason: "primitive storage cannot hold an absent value".to_owned(),
            }),
        }
    }
}

impl Binder for ScalarBinder {
    fn field(&self) -> &FieldHandle {
        &self.field
    }

    fn bind(&self, value: Value, record: &mut dyn Record) -> Result<(), BindError> {
        let bound = match Shape::from(value) {
            Shape::Absent => self.absent_value()?,
            Shape::Single(e) => FieldValue::Scalar(convert(&*self.rules, &self.field, e)?),
            Shape::Many(items) if items.len() > 1 => {
                return Err(BindError::Cardinality {
                    field: self.field.name().to_owned(),
                    count: items.len(),
                });
            }
            Shape::Many(items) => match items.into_iter().next().flatten() {
                Some(e) => FieldValue::Scalar(convert(&*self.rules, &self.field, e)?),
                None => self.absent_value()?,
            },
            Shape::Mapping(map) => return Err(unexpected_mapping(&*self.rules, &self.field, map.len())),
        };
        tracing::trace!(field = %self.field, "bound scalar");
        assign(record, &self.field, bound)
    }
}

#[cfg(test)]
mod tests {
    use fieldbind_api::element::ElementType;
    use fieldbind_api::record::DocumentRecord;
    use fieldbind_api::schema::{FieldSpec, RecordShape, ShapeSchema};
    use fieldbind_api::value::PrimitiveArray;

    use super::*;
    use crate::rules::{RuleOptions, rules_for};

    fn setup(ty: ElementType, storage: Storage, absent: AbsentPrimitive) -> (ScalarBinder, DocumentRecord) {
        let mut spec = FieldSpec::scalar("f", ty);
        spec.storage = storage;
        let shape = RecordShape::resolve(&ShapeSchema::new("s").field(spec)).expect("valid shape");
        let binder = ScalarBinder::new(
            shape.fields()[0].handle().clone(),
            storage,
            rules_for(ty, RuleOptions::default()),
            absent,
        );
        (binder, DocumentRecord::new(&shape))
    }

    fn boxed(ty: ElementType) -> (ScalarBinder, DocumentRecord) {
        setup(ty, Storage::Boxed, AbsentPrimitive::Zero)
    }

    #[test]
    fn text_to_int64() {
        let (binder, mut record) = boxed(ElementType::Int64);
        binder.bind(Value::text("42"), &mut record).expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::Long(42))));
    }

    #[test]
    fn boolean_to_float64() {
        let (binder, mut record) = boxed(ElementType::Float64);
        binder.bind(Value::from(true), &mut record).expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::Double(1.0))));
    }

    #[test]
    fn singletons_unwrap() {
        let (binder, mut record) = boxed(ElementType::Int32);
        binder
            .bind(Value::Primitive(PrimitiveArray::Double(vec![-3.9])), &mut record)
            .expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::Int(-3))));

        binder.bind(Value::set([9i64]), &mut record).expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::Int(9))));
    }

    #[test]
    fn empty_and_null_singleton_mean_absent() {
        let (binder, mut record) = boxed(ElementType::Text);
        binder.bind(Value::text("x"), &mut record).expect("bind");
        binder.bind(Value::List(vec![]), &mut record).expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Null));

        binder.bind(Value::text("x"), &mut record).expect("bind");
        binder.bind(Value::Array(vec![None]), &mut record).expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Null));
    }

    #[test]
    fn many_values_leave_field_untouched() {
        let (binder, mut record) = boxed(ElementType::Text);
        binder.bind(Value::text("keep"), &mut record).expect("bind");
        let err = binder.bind(Value::array(["a", "b"]), &mut record).unwrap_err();
        assert_eq!(err, BindError::Cardinality { field: "f".into(), count: 2 });
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::from("keep"))));
    }

    #[test]
    fn format_error_leaves_field_untouched() {
        let (binder, mut record) = boxed(ElementType::Int32);
        binder.bind(Value::from(5i32), &mut record).expect("bind");
        let err = binder.bind(Value::text("five"), &mut record).unwrap_err();
        assert!(matches!(err, BindError::Format { target: ElementType::Int32, .. }));
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::Int(5))));
    }

    #[test]
    fn primitive_absence_is_zero_or_rejected() {
        let (binder, mut record) = setup(ElementType::Boolean, Storage::Primitive, AbsentPrimitive::Zero);
        binder.bind(Value::Absent, &mut record).expect("bind");
        assert_eq!(record.value("f"), Some(&FieldValue::Scalar(Element::Bool(false))));

        let (binder, mut record) = setup(ElementType::Short16, Storage::Primitive, AbsentPrimitive::Reject);
        assert!(binder.bind(Value::Absent, &mut record).is_err());
        assert_eq!(record.value("f"), Some(&FieldValue::Null));
    }

    #[test]
    fn mapping_is_rejected() {
        let (binder, mut record) = boxed(ElementType::Opaque);
        let map = [(Element::from("k"), Element::from("v"))].into_iter().collect();
        let err = binder.bind(Value::Map(map), &mut record).unwrap_err();
        assert_eq!(err.kind(), fieldbind_api::error::ErrorKind::Format);
    }
}
