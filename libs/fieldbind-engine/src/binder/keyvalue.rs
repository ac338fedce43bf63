use std::sync::Arc;

use fieldbind_api::container::{Container, ContainerCtor, CtorKind, ElementMap};
use fieldbind_api::element::Element;
use fieldbind_api::error::BindError;
use fieldbind_api::field::FieldValue;
use fieldbind_api::record::Record;
use fieldbind_api::schema::FieldHandle;
use fieldbind_api::value::Value;

use super::{Binder, Shape, assign, check_ctor, convert, null_element};
use crate::rules::ConversionRules;

/// Key-value mapping field.
///
/// A flat sequence is read as alternating key, value pairs. A ready-made
/// mapping is assigned as is, without converting its entries.
#[derive(Debug)]
pub struct KeyValueBinder {
    field: FieldHandle,
    key_rules: Arc<dyn ConversionRules>,
    value_rules: Arc<dyn ConversionRules>,
    ctor: ContainerCtor,
}

impl KeyValueBinder {
    pub fn new(
        field: FieldHandle,
        key_rules: Arc<dyn ConversionRules>,
        value_rules: Arc<dyn ConversionRules>,
        ctor: ContainerCtor,
    ) -> Result<Self, BindError> {
        check_ctor(&field, &ctor, CtorKind::Map)?;
        Ok(Self {
            field,
            key_rules,
            value_rules,
            ctor,
        })
    }

    fn odd(&self, len: usize) -> BindError {
        BindError::OddLength {
            field: self.field.name().to_owned(),
            len,
        }
    }

    fn pairs(&self, items: Vec<Option<Element>>) -> Result<ElementMap, BindError> {
        if items.len() % 2 != 0 {
            return Err(self.odd(items.len()));
        }
        let Container::Map(mut map) = self.ctor.instantiate() else {
            return Err(BindError::NotInstantiableContainer {
                field: self.field.name().to_owned(),
                container: self.ctor.name().to_owned(),
                reason: "constructor did not produce a map".to_owned(),
            });
        };
        let mut items = items.into_iter().enumerate();
        while let (Some((ki, key)), Some((vi, value))) = (items.next(), items.next()) {
            let key = key.ok_or_else(|| null_element(&*self.key_rules, &self.field, ki))?;
            let value = value.ok_or_else(|| null_element(&*self.value_rules, &self.field, vi))?;
            let key = convert(&*self.key_rules, &self.field, key)?;
            let value = convert(&*self.value_rules, &self.field, value)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl Binder for KeyValueBinder {
    fn field(&self) -> &FieldHandle {
        &self.field
    }

    fn bind(&self, value: Value, record: &mut dyn Record) -> Result<(), BindError> {
        let map = match Shape::from(value) {
            Shape::Absent => return assign(record, &self.field, FieldValue::Null),
            Shape::Single(_) => return Err(self.odd(1)),
            Shape::Mapping(map) => {
                tracing::trace!(field = %self.field, len = map.len(), "mapping passed through");
                map
            }
            Shape::Many(items) => self.pairs(items)?,
        };
        tracing::trace!(
            field = %self.field,
            container = self.ctor.name(),
            len = map.len(),
            "bound mapping"
        );
        assign(record, &self.field, FieldValue::Map(map))
    }
}
