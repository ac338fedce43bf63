use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Element type of a target field.
///
/// For scalar fields this is the type of the single value; for sequences,
/// containers and mapping values it is the type of every element.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    #[serde(alias = "string")]
    Text,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "byte", alias = "i8")]
    Byte8,
    #[serde(alias = "char")]
    Char16,
    #[serde(alias = "short", alias = "i16")]
    Short16,
    #[serde(alias = "int", alias = "i32")]
    Int32,
    #[serde(alias = "long", alias = "i64")]
    Int64,
    #[serde(alias = "float", alias = "f32")]
    Float32,
    #[serde(alias = "double", alias = "f64")]
    Float64,
    #[serde(alias = "object")]
    Opaque,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        ElementType::Text,
        ElementType::Boolean,
        ElementType::Byte8,
        ElementType::Char16,
        ElementType::Short16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::Opaque,
    ];

    /// Numeric kinds: the 8/16/32/64-bit integers and both float widths.
    /// `Char16` is not numeric even though it converts through its code unit.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ElementType::Byte8
                | ElementType::Short16
                | ElementType::Int32
                | ElementType::Int64
                | ElementType::Float32
                | ElementType::Float64
        )
    }

    /// Whether values of this type can live in primitive (non-nullable) storage.
    pub fn has_primitive_storage(self) -> bool {
        !matches!(self, ElementType::Text | ElementType::Opaque)
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Boolean => "boolean",
            ElementType::Byte8 => "byte8",
            ElementType::Char16 => "char16",
            ElementType::Short16 => "short16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed value.
///
/// Serves both as a bare scalar input and as the content of a bound field.
/// Equality, hashing and ordering are total so elements can live in unique
/// sets and sorted containers:
/// - floats compare by bit pattern (`NaN == NaN`, `0.0 != -0.0`)
/// - opaque JSON values compare by their compact rendering
/// - elements of different types are never equal and order by type first
#[derive(Debug, Clone)]
pub enum Element {
    Text(String),
    Bool(bool),
    Byte(i8),
    /// UTF-16 code unit.
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Opaque(serde_json::Value),
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        match self {
            Element::Text(_) => ElementType::Text,
            Element::Bool(_) => ElementType::Boolean,
            Element::Byte(_) => ElementType::Byte8,
            Element::Char(_) => ElementType::Char16,
            Element::Short(_) => ElementType::Short16,
            Element::Int(_) => ElementType::Int32,
            Element::Long(_) => ElementType::Int64,
            Element::Float(_) => ElementType::Float32,
            Element::Double(_) => ElementType::Float64,
            Element::Opaque(_) => ElementType::Opaque,
        }
    }

    /// Zero value for primitive storage. `None` for text and opaque.
    pub fn zero(ty: ElementType) -> Option<Element> {
        match ty {
            ElementType::Boolean => Some(Element::Bool(false)),
            ElementType::Byte8 => Some(Element::Byte(0)),
            ElementType::Char16 => Some(Element::Char(0)),
            ElementType::Short16 => Some(Element::Short(0)),
            ElementType::Int32 => Some(Element::Int(0)),
            ElementType::Int64 => Some(Element::Long(0)),
            ElementType::Float32 => Some(Element::Float(0.0)),
            ElementType::Float64 => Some(Element::Double(0.0)),
            ElementType::Text | ElementType::Opaque => None,
        }
    }

    /// Build a `Char16` element from a `char` in the basic multilingual plane.
    pub fn char16(c: char) -> Option<Element> {
        u16::try_from(c as u32).ok().map(Element::Char)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Element::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value of any integer-like element, including `Char16`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Element::Byte(v) => Some(i64::from(*v)),
            Element::Char(v) => Some(i64::from(*v)),
            Element::Short(v) => Some(i64::from(*v)),
            Element::Int(v) => Some(i64::from(*v)),
            Element::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Element::Float(v) => Some(f64::from(*v)),
            Element::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Element::Text(_) => 0,
            Element::Bool(_) => 1,
            Element::Byte(_) => 2,
            Element::Char(_) => 3,
            Element::Short(_) => 4,
            Element::Int(_) => 5,
            Element::Long(_) => 6,
            Element::Float(_) => 7,
            Element::Double(_) => 8,
            Element::Opaque(_) => 9,
        }
    }
}

/// Canonical human-readable rendering. Text binders stringify through this.
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Text(s) => f.write_str(s),
            Element::Bool(b) => write!(f, "{b}"),
            Element::Byte(v) => write!(f, "{v}"),
            Element::Char(c) => match char::from_u32(u32::from(*c)) {
                Some(ch) => write!(f, "{ch}"),
                // Lone surrogate: no scalar value to print.
                None => write!(f, "\\u{{{c:04x}}}"),
            },
            Element::Short(v) => write!(f, "{v}"),
            Element::Int(v) => write!(f, "{v}"),
            Element::Long(v) => write!(f, "{v}"),
            Element::Float(v) => write!(f, "{v}"),
            Element::Double(v) => write!(f, "{v}"),
            Element::Opaque(serde_json::Value::String(s)) => f.write_str(s),
            Element::Opaque(v) => write!(f, "{v}"),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Text(a), Element::Text(b)) => a == b,
            (Element::Bool(a), Element::Bool(b)) => a == b,
            (Element::Byte(a), Element::Byte(b)) => a == b,
            (Element::Char(a), Element::Char(b)) => a == b,
            (Element::Short(a), Element::Short(b)) => a == b,
            (Element::Int(a), Element::Int(b)) => a == b,
            (Element::Long(a), Element::Long(b)) => a == b,
            (Element::Float(a), Element::Float(b)) => a.to_bits() == b.to_bits(),
            (Element::Double(a), Element::Double(b)) => a.to_bits() == b.to_bits(),
            (Element::Opaque(a), Element::Opaque(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Element::Text(s) => s.hash(state),
            Element::Bool(b) => b.hash(state),
            Element::Byte(v) => v.hash(state),
            Element::Char(v) => v.hash(state),
            Element::Short(v) => v.hash(state),
            Element::Int(v) => v.hash(state),
            Element::Long(v) => v.hash(state),
            Element::Float(v) => v.to_bits().hash(state),
            Element::Double(v) => v.to_bits().hash(state),
            Element::Opaque(v) => v.to_string().hash(state),
        }
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Element::Text(a), Element::Text(b)) => a.cmp(b),
            (Element::Bool(a), Element::Bool(b)) => a.cmp(b),
            (Element::Byte(a), Element::Byte(b)) => a.cmp(b),
            (Element::Char(a), Element::Char(b)) => a.cmp(b),
            (Element::Short(a), Element::Short(b)) => a.cmp(b),
            (Element::Int(a), Element::Int(b)) => a.cmp(b),
            (Element::Long(a), Element::Long(b)) => a.cmp(b),
            (Element::Float(a), Element::Float(b)) => a.total_cmp(b),
            (Element::Double(a), Element::Double(b)) => a.total_cmp(b),
            (Element::Opaque(a), Element::Opaque(b)) => a.to_string().cmp(&b.to_string()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Element {
    fn from(v: &str) -> Self {
        Element::Text(v.to_owned())
    }
}

impl From<String> for Element {
    fn from(v: String) -> Self {
        Element::Text(v)
    }
}

impl From<bool> for Element {
    fn from(v: bool) -> Self {
        Element::Bool(v)
    }
}

impl From<i8> for Element {
    fn from(v: i8) -> Self {
        Element::Byte(v)
    }
}

impl From<i16> for Element {
    fn from(v: i16) -> Self {
        Element::Short(v)
    }
}

impl From<i32> for Element {
    fn from(v: i32) -> Self {
        Element::Int(v)
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Element::Long(v)
    }
}

impl From<f32> for Element {
    fn from(v: f32) -> Self {
        Element::Float(v)
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::Double(v)
    }
}

impl From<serde_json::Value> for Element {
    fn from(v: serde_json::Value) -> Self {
        Element::Opaque(v)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Element::Double(f64::NAN), Element::Double(f64::NAN));
        assert_ne!(Element::Double(0.0), Element::Double(-0.0));
        assert_ne!(Element::Int(1), Element::Long(1));
    }

    #[test]
    fn elements_are_hashable_and_ordered() {
        let set: HashSet<Element> = [Element::from("a"), Element::from("a"), Element::from(1i32)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);

        let sorted: BTreeSet<Element> = [Element::Long(3), Element::Long(-1), Element::from("z")]
            .into_iter()
            .collect();
        let first = sorted.iter().next().cloned();
        // Text ranks before numbers.
        assert_eq!(first, Some(Element::from("z")));
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Element::Double(1.5).to_string(), "1.5");
        assert_eq!(Element::Char(u16::from(b'x')).to_string(), "x");
        assert_eq!(Element::Opaque(serde_json::json!("raw")).to_string(), "raw");
        assert_eq!(Element::Opaque(serde_json::json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn element_type_parses_aliases() {
        let ty: ElementType = serde_json::from_str(r#""long""#).expect("alias");
        assert_eq!(ty, ElementType::Int64);
        assert!(!ElementType::Text.has_primitive_storage());
        assert!(!ElementType::Char16.is_numeric());
    }
}
