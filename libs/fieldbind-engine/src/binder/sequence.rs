use std::sync::Arc;

use fieldbind_api::element::Element;
use fieldbind_api::error::BindError;
use fieldbind_api::field::FieldValue;
use fieldbind_api::record::Record;
use fieldbind_api::schema::{FieldHandle, Storage, TargetKind};
use fieldbind_api::value::{PrimitiveArray, Value};

use super::{Binder, Shape, assign, convert, null_element, unexpected_mapping};
use crate::rules::{ConversionRules, describe};

/// Fixed-size sequence field, boxed or primitive storage.
///
/// Every bind allocates a new sequence sized to the input; nothing is
/// appended to the previous value.
#[derive(Debug)]
pub struct SequenceBinder {
    field: FieldHandle,
    storage: Storage,
    rules: Arc<dyn ConversionRules>,
}

impl SequenceBinder {
    pub fn new(field: FieldHandle, storage: Storage, rules: Arc<dyn ConversionRules>) -> Self {
        Self { field, storage, rules }
    }

    fn boxed(&self, items: Vec<Option<Element>>) -> Result<FieldValue, BindError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(match item {
                Some(e) => Some(convert(&*self.rules, &self.field, e)?),
                None => None,
            });
        }
        Ok(FieldValue::Array(out))
    }

    fn primitive(&self, items: Vec<Option<Element>>) -> Result<FieldValue, BindError> {
        let ty = self.rules.element_type();
        let mut out = PrimitiveArray::with_capacity(ty, items.len()).ok_or_else(|| {
            BindError::UnsupportedStorage {
                field: self.field.name().to_owned(),
                storage: self.storage,
                element: ty,
                kind: TargetKind::FixedSequence,
            }
        })?;
        for (index, item) in items.into_iter().enumerate() {
            let element = item.ok_or_else(|| null_element(&*self.rules, &self.field, index))?;
            let converted = convert(&*self.rules, &self.field, element)?;
            out.push(converted).map_err(|stray| BindError::Format {
                field: self.field.name().to_owned(),
                value: describe(&stray),
                target: ty,
                reason: format!("conversion produced a non-{ty} element at index {index}"),
            })?;
        }
        Ok(FieldValue::Primitive(out))
    }
}

impl Binder for SequenceBinder {
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
        let len = items.len();
        let bound = match self.storage {
            Storage::Boxed => self.boxed(items)?,
            Storage::Primitive => self.primitive(items)?,
        };
        tracing::trace!(field = %self.field, len, "bound sequence");
        assign(record, &self.field, bound)
    }
}
