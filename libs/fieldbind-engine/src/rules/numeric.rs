use std::fmt;
use std::marker::PhantomData;

use fieldbind_api::element::{Element, ElementType};

use super::{ConversionError, ConversionRules, Numeric, RuleOptions};

/// Fixed-width primitive behind a numeric (or char) element type.
///
/// Casts follow `as` semantics: integer narrowing wraps (two's complement),
/// float to integer truncates toward zero and saturates at the bounds
/// (`NaN` becomes 0), widening is lossless.
pub trait NumericKind: Copy + Send + Sync + fmt::Debug + 'static {
    const TYPE: ElementType;

    fn from_i64(v: i64) -> Self;
    fn from_f32(v: f32) -> Self;
    fn from_f64(v: f64) -> Self;
    fn parse(s: &str) -> Result<Self, String>;
    fn into_element(self) -> Element;
}

macro_rules! numeric_kind {
    ($t:ty, $ty:ident, $variant:ident) => {
        impl NumericKind for $t {
            const TYPE: ElementType = ElementType::$ty;

            fn from_i64(v: i64) -> Self {
                v as $t
            }

            fn from_f32(v: f32) -> Self {
                v as $t
            }

            fn from_f64(v: f64) -> Self {
                v as $t
            }

            fn parse(s: &str) -> Result<Self, String> {
                s.parse::<$t>().map_err(|e| e.to_string())
            }

            fn into_element(self) -> Element {
                Element::$variant(self)
            }
        }
    };
}

numeric_kind!(i8, Byte8, Byte);
numeric_kind!(i16, Short16, Short);
numeric_kind!(i32, Int32, Int);
numeric_kind!(i64, Int64, Long);
numeric_kind!(f32, Float32, Float);
numeric_kind!(f64, Float64, Double);

/// `Char16` converts numerically through its code unit, but parses from
/// text as a single character.
impl NumericKind for u16 {
    const TYPE: ElementType = ElementType::Char16;

    fn from_i64(v: i64) -> Self {
        v as u16
    }

    fn from_f32(v: f32) -> Self {
        v as u16
    }

    fn from_f64(v: f64) -> Self {
        v as u16
    }

    fn parse(s: &str) -> Result<Self, String> {
        let mut units = s.encode_utf16();
        match (units.next(), units.next()) {
            (Some(unit), None) => Ok(unit),
            _ => Err("expected exactly one UTF-16 code unit".to_owned()),
        }
    }

    fn into_element(self) -> Element {
        Element::Char(self)
    }
}

/// Rules for one numeric kind.
pub struct NumericRules<N> {
    options: RuleOptions,
    _kind: PhantomData<fn() -> N>,
}

impl<N: NumericKind> NumericRules<N> {
    pub fn new(options: RuleOptions) -> Self {
        Self {
            options,
            _kind: PhantomData,
        }
    }
}

impl<N: NumericKind> fmt::Debug for NumericRules<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericRules")
            .field("type", &N::TYPE)
            .field("options", &self.options)
            .finish()
    }
}

impl<N: NumericKind> ConversionRules for NumericRules<N> {
    fn element_type(&self) -> ElementType {
        N::TYPE
    }

    fn from_text(&self, s: &str) -> Result<Element, ConversionError> {
        let input = if self.options.trim_text { s.trim() } else { s };
        N::parse(input)
            .map(N::into_element)
            .map_err(|reason| ConversionError::new(format!("text {s:?}"), N::TYPE, reason))
    }

    fn from_numeric(&self, n: Numeric) -> Result<Element, ConversionError> {
        let v = match n {
            Numeric::Int(v) => N::from_i64(v),
            Numeric::Float(v) => N::from_f32(v),
            Numeric::Double(v) => N::from_f64(v),
        };
        Ok(v.into_element())
    }

    fn from_boolean(&self, b: bool) -> Result<Element, ConversionError> {
        Ok(N::from_i64(i64::from(b)).into_element())
    }
}
