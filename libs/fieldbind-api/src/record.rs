use std::sync::Arc;

use crate::field::FieldValue;
use crate::schema::{FieldHandle, RecordShape};

/// Write refused by record storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct WriteRefused(pub String);

/// Host record whose fields are populated by binders.
///
/// `set` must be all-or-nothing: on `Err` the field keeps its previous value.
pub trait Record {
    fn get(&self, field: &FieldHandle) -> Option<FieldValue>;

    fn set(&mut self, field: &FieldHandle, value: FieldValue) -> Result<(), WriteRefused>;
}

/// Slot-vector record built from a [`RecordShape`].
///
/// All fields start `Null`. Individual fields can be locked read-only;
/// writes to them are refused.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    shape: Arc<str>,
    names: Vec<Arc<str>>,
    slots: Vec<FieldValue>,
    read_only: Vec<bool>,
}

impl DocumentRecord {
    pub fn new(shape: &RecordShape) -> Self {
        let names: Vec<Arc<str>> = shape.fields().iter().map(|f| Arc::from(f.name())).collect();
        let len = names.len();
        Self {
            shape: Arc::from(shape.name()),
            names,
            slots: vec![FieldValue::Null; len],
            read_only: vec![false; len],
        }
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Borrow a field's current value by name.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        let slot = self.slot_of(name)?;
        self.slots.get(slot)
    }

    /// Mark a field read-only. Returns `false` if the shape has no such field.
    pub fn lock(&mut self, name: &str) -> bool {
        match self.slot_of(name) {
            Some(slot) => {
                self.read_only[slot] = true;
                true
            }
            None => false,
        }
    }

    /// Field names paired with their values, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.names.iter().map(|n| &**n).zip(self.slots.iter())
    }

    fn slot_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| &**n == name)
    }
}

impl Record for DocumentRecord {
    fn get(&self, field: &FieldHandle) -> Option<FieldValue> {
        self.slots.get(field.slot()).cloned()
    }

    fn set(&mut self, field: &FieldHandle, value: FieldValue) -> Result<(), WriteRefused> {
        let slot = field.slot();
        match self.names.get(slot) {
            Some(name) if &**name == field.name() => {}
            _ => {
                return Err(WriteRefused(format!(
                    "record of shape '{}' has no field '{}' at slot {slot}",
                    self.shape,
                    field.name()
                )));
            }
        }
        if self.read_only[slot] {
            return Err(WriteRefused(format!("field '{}' is read-only", field.name())));
        }
        self.slots[slot] = value;
        Ok(())
    }
}
