use crate::container::{ElementMap, ElementSet};
use crate::element::{Element, ElementType};

/// Raw input value, as produced by document deserialization.
///
/// Shape by variant:
/// - `Absent`: no value for the field
/// - `Scalar`: a bare text, boolean, numeric, char or opaque value
/// - `Array` / `Primitive`: fixed sequences with boxed or primitive elements
/// - `List` / `Set`: growable containers, iterated in their natural order
/// - `Map`: a ready-made mapping, bound verbatim to mapping fields
///
/// Any sequence-like variant doubles as a flattened key-value sequence
/// (`k1, v1, k2, v2, ...`) when bound to a mapping field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Scalar(Element),
    /// Boxed elements; `None` is a null element.
    Array(Vec<Option<Element>>),
    Primitive(PrimitiveArray),
    List(Vec<Element>),
    Set(ElementSet),
    Map(ElementMap),
}

impl Value {
    /// Short name of the input shape, for diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Scalar(_) => "scalar",
            Value::Array(_) => "array",
            Value::Primitive(_) => "primitive array",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    /// Element count of sequence-like inputs. `None` for absent, scalar and map.
    pub fn count(&self) -> Option<usize> {
        match self {
            Value::Array(v) => Some(v.len()),
            Value::Primitive(p) => Some(p.len()),
            Value::List(v) => Some(v.len()),
            Value::Set(s) => Some(s.len()),
            Value::Absent | Value::Scalar(_) | Value::Map(_) => None,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Scalar(Element::Text(s.into()))
    }

    /// Boxed array without null elements.
    pub fn array<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Value::Array(items.into_iter().map(|e| Some(e.into())).collect())
    }

    pub fn list<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Insertion-ordered set; duplicates collapse.
    pub fn set<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! scalar_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_from!(Element, &str, String, bool, i8, i16, i32, i64, f32, f64, serde_json::Value);

impl From<PrimitiveArray> for Value {
    fn from(v: PrimitiveArray) -> Self {
        Value::Primitive(v)
    }
}

/// Fixed sequence of unboxed elements. Cannot hold nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Bool(Vec<bool>),
    Byte(Vec<i8>),
    Char(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl PrimitiveArray {
    /// Empty array with room for `capacity` elements.
    /// `None` for element types without primitive storage.
    pub fn with_capacity(ty: ElementType, capacity: usize) -> Option<Self> {
        Some(match ty {
            ElementType::Boolean => PrimitiveArray::Bool(Vec::with_capacity(capacity)),
            ElementType::Byte8 => PrimitiveArray::Byte(Vec::with_capacity(capacity)),
            ElementType::Char16 => PrimitiveArray::Char(Vec::with_capacity(capacity)),
            ElementType::Short16 => PrimitiveArray::Short(Vec::with_capacity(capacity)),
            ElementType::Int32 => PrimitiveArray::Int(Vec::with_capacity(capacity)),
            ElementType::Int64 => PrimitiveArray::Long(Vec::with_capacity(capacity)),
            ElementType::Float32 => PrimitiveArray::Float(Vec::with_capacity(capacity)),
            ElementType::Float64 => PrimitiveArray::Double(Vec::with_capacity(capacity)),
            ElementType::Text | ElementType::Opaque => return None,
        })
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            PrimitiveArray::Bool(_) => ElementType::Boolean,
            PrimitiveArray::Byte(_) => ElementType::Byte8,
            PrimitiveArray::Char(_) => ElementType::Char16,
            PrimitiveArray::Short(_) => ElementType::Short16,
            PrimitiveArray::Int(_) => ElementType::Int32,
            PrimitiveArray::Long(_) => ElementType::Int64,
            PrimitiveArray::Float(_) => ElementType::Float32,
            PrimitiveArray::Double(_) => ElementType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrimitiveArray::Bool(v) => v.len(),
            PrimitiveArray::Byte(v) => v.len(),
            PrimitiveArray::Char(v) => v.len(),
            PrimitiveArray::Short(v) => v.len(),
            PrimitiveArray::Int(v) => v.len(),
            PrimitiveArray::Long(v) => v.len(),
            PrimitiveArray::Float(v) => v.len(),
            PrimitiveArray::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Element> {
        match self {
            PrimitiveArray::Bool(v) => v.get(index).copied().map(Element::Bool),
            PrimitiveArray::Byte(v) => v.get(index).copied().map(Element::Byte),
            PrimitiveArray::Char(v) => v.get(index).copied().map(Element::Char),
            PrimitiveArray::Short(v) => v.get(index).copied().map(Element::Short),
            PrimitiveArray::Int(v) => v.get(index).copied().map(Element::Int),
            PrimitiveArray::Long(v) => v.get(index).copied().map(Element::Long),
            PrimitiveArray::Float(v) => v.get(index).copied().map(Element::Float),
            PrimitiveArray::Double(v) => v.get(index).copied().map(Element::Double),
        }
    }

    /// Elements in index order, boxed.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Append an element of the array's own type.
    /// A mismatched element is handed back unchanged.
    pub fn push(&mut self, element: Element) -> Result<(), Element> {
        match (self, element) {
            (PrimitiveArray::Bool(v), Element::Bool(e)) => v.push(e),
            (PrimitiveArray::Byte(v), Element::Byte(e)) => v.push(e),
            (PrimitiveArray::Char(v), Element::Char(e)) => v.push(e),
            (PrimitiveArray::Short(v), Element::Short(e)) => v.push(e),
            (PrimitiveArray::Int(v), Element::Int(e)) => v.push(e),
            (PrimitiveArray::Long(v), Element::Long(e)) => v.push(e),
            (PrimitiveArray::Float(v), Element::Float(e)) => v.push(e),
            (PrimitiveArray::Double(v), Element::Double(e)) => v.push(e),
            (_, other) => return Err(other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_push_rejects_foreign_elements() {
        let mut arr = PrimitiveArray::with_capacity(ElementType::Int32, 2).expect("int storage");
        assert!(arr.push(Element::Int(4)).is_ok());
        assert_eq!(arr.push(Element::Long(4)), Err(Element::Long(4)));
        assert_eq!(arr, PrimitiveArray::Int(vec![4]));
    }

    #[test]
    fn text_has_no_primitive_storage() {
        assert!(PrimitiveArray::with_capacity(ElementType::Text, 1).is_none());
    }

    #[test]
    fn counts_follow_shape() {
        assert_eq!(Value::array([1i32, 2, 3]).count(), Some(3));
        assert_eq!(Value::from(7i64).count(), None);
        assert_eq!(Value::set(["a", "a", "b"]).count(), Some(2));
        assert_eq!(Value::Primitive(PrimitiveArray::Double(vec![])).count(), Some(0));
    }
}
