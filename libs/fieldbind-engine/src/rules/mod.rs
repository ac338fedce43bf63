//! Per-element-type conversion rules.
//!
//! Each element type has one small strategy object implementing
//! [`ConversionRules`]. Binders hold the rules for their element type and call
//! [`ConversionRules::convert`] once per element; the source element's own type
//! selects which `from_*` rule runs.

mod boolean;
mod numeric;
mod opaque;
mod text;

use std::fmt;
use std::sync::Arc;

use fieldbind_api::element::{Element, ElementType};
use fieldbind_api::error::BindError;
use fieldbind_api::schema::FieldHandle;

use crate::config::BinderConfig;

pub use boolean::BooleanRules;
pub use numeric::{NumericKind, NumericRules};
pub use opaque::OpaqueRules;
pub use text::TextRules;

/// A single value failed to convert. Binders attach the field identity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert {value} to {target}: {reason}")]
pub struct ConversionError {
    pub value: String,
    pub target: ElementType,
    pub reason: String,
}

impl ConversionError {
    pub fn new(value: impl Into<String>, target: ElementType, reason: impl fmt::Display) -> Self {
        Self {
            value: value.into(),
            target,
            reason: reason.to_string(),
        }
    }

    pub fn for_field(self, field: &FieldHandle) -> BindError {
        BindError::Format {
            field: field.name().to_owned(),
            value: self.value,
            target: self.target,
            reason: self.reason,
        }
    }
}

/// Render a source element for diagnostics, e.g. `text "abc"` or `int32 7`.
pub fn describe(element: &Element) -> String {
    match element {
        Element::Text(s) => format!("text {s:?}"),
        other => format!("{} {other}", other.element_type()),
    }
}

/// Numeric source value, kept at its original width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Any integer source (8 to 64 bit, and char code units).
    Int(i64),
    Float(f32),
    Double(f64),
}

impl Numeric {
    pub fn from_json(n: &serde_json::Number) -> Option<Numeric> {
        if let Some(i) = n.as_i64() {
            Some(Numeric::Int(i))
        } else {
            n.as_f64().map(Numeric::Double)
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Numeric::Int(v) => v == 0,
            Numeric::Float(v) => v == 0.0,
            Numeric::Double(v) => v == 0.0,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v}"),
            Numeric::Double(v) => write!(f, "{v}"),
        }
    }
}

/// Conversion of a single raw value into one element type.
///
/// Implementations are stateless apart from their options and are shared
/// between threads.
pub trait ConversionRules: Send + Sync + fmt::Debug {
    fn element_type(&self) -> ElementType;

    fn from_text(&self, s: &str) -> Result<Element, ConversionError>;

    fn from_numeric(&self, n: Numeric) -> Result<Element, ConversionError>;

    fn from_boolean(&self, b: bool) -> Result<Element, ConversionError>;

    /// Chars convert through their unsigned code unit.
    fn from_char(&self, c: u16) -> Result<Element, ConversionError> {
        self.from_numeric(Numeric::Int(i64::from(c)))
    }

    fn from_opaque(&self, v: serde_json::Value) -> Result<Element, ConversionError> {
        match v {
            serde_json::Value::String(s) => self.from_text(&s),
            serde_json::Value::Bool(b) => self.from_boolean(b),
            serde_json::Value::Number(n) => match Numeric::from_json(&n) {
                Some(num) => self.from_numeric(num),
                None => Err(ConversionError::new(
                    format!("opaque {n}"),
                    self.element_type(),
                    "number out of range",
                )),
            },
            other => Err(ConversionError::new(
                format!("opaque {other}"),
                self.element_type(),
                "only strings, numbers and booleans convert to typed elements",
            )),
        }
    }

    /// Convert any element into this element type.
    fn convert(&self, element: Element) -> Result<Element, ConversionError> {
        if element.element_type() == self.element_type() {
            return Ok(element);
        }
        match element {
            Element::Text(s) => self.from_text(&s),
            Element::Bool(b) => self.from_boolean(b),
            Element::Char(c) => self.from_char(c),
            Element::Byte(v) => self.from_numeric(Numeric::Int(i64::from(v))),
            Element::Short(v) => self.from_numeric(Numeric::Int(i64::from(v))),
            Element::Int(v) => self.from_numeric(Numeric::Int(i64::from(v))),
            Element::Long(v) => self.from_numeric(Numeric::Int(v)),
            Element::Float(v) => self.from_numeric(Numeric::Float(v)),
            Element::Double(v) => self.from_numeric(Numeric::Double(v)),
            Element::Opaque(v) => self.from_opaque(v),
        }
    }
}

/// Options shared by every rule set built from one configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOptions {
    pub trim_text: bool,
}

impl From<&BinderConfig> for RuleOptions {
    fn from(config: &BinderConfig) -> Self {
        Self { trim_text: config.trim_text }
    }
}

/// Rules for `element`.
pub fn rules_for(element: ElementType, options: RuleOptions) -> Arc<dyn ConversionRules> {
    match element {
        ElementType::Text => Arc::new(TextRules),
        ElementType::Boolean => Arc::new(BooleanRules::new(options)),
        ElementType::Byte8 => Arc::new(NumericRules::<i8>::new(options)),
        ElementType::Char16 => Arc::new(NumericRules::<u16>::new(options)),
        ElementType::Short16 => Arc::new(NumericRules::<i16>::new(options)),
        ElementType::Int32 => Arc::new(NumericRules::<i32>::new(options)),
        ElementType::Int64 => Arc::new(NumericRules::<i64>::new(options)),
        ElementType::Float32 => Arc::new(NumericRules::<f32>::new(options)),
        ElementType::Float64 => Arc::new(NumericRules::<f64>::new(options)),
        ElementType::Opaque => Arc::new(OpaqueRules),
    }
}
