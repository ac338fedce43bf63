use crate::container::{Container, ElementMap, ElementSet};
use crate::element::Element;
use crate::value::PrimitiveArray;

/// Content of a bound record field.
///
/// Every element has been converted to the field's element type.
/// `Null` is the unset state of nullable storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Scalar(Element),
    /// Fixed sequence, boxed storage.
    Array(Vec<Option<Element>>),
    /// Fixed sequence, primitive storage.
    Primitive(PrimitiveArray),
    List(Vec<Element>),
    Set(ElementSet),
    Map(ElementMap),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_scalar(&self) -> Option<&Element> {
        match self {
            FieldValue::Scalar(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Option<Element>]> {
        match self {
            FieldValue::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveArray> {
        match self {
            FieldValue::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            FieldValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&ElementSet> {
        match self {
            FieldValue::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ElementMap> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Container> for FieldValue {
    fn from(c: Container) -> Self {
        match c {
            Container::List(v) => FieldValue::List(v),
            Container::Set(s) => FieldValue::Set(s),
            Container::Map(m) => FieldValue::Map(m),
        }
    }
}

impl From<Element> for FieldValue {
    fn from(e: Element) -> Self {
        FieldValue::Scalar(e)
    }
}
