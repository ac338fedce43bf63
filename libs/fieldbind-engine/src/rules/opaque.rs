use fieldbind_api::element::{Element, ElementType};

use super::{ConversionError, ConversionRules, Numeric};

/// Opaque elements: every value passes through unchanged.
///
/// No check is made that the element fits whatever the caller means by
/// "object"; supplying a compatible value is the caller's contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueRules;

impl ConversionRules for OpaqueRules {
    fn element_type(&self) -> ElementType {
        ElementType::Opaque
    }

    fn from_text(&self, s: &str) -> Result<Element, ConversionError> {
        Ok(Element::Text(s.to_owned()))
    }

    fn from_numeric(&self, n: Numeric) -> Result<Element, ConversionError> {
        Ok(match n {
            Numeric::Int(v) => Element::Long(v),
            Numeric::Float(v) => Element::Float(v),
            Numeric::Double(v) => Element::Double(v),
        })
    }

    fn from_boolean(&self, b: bool) -> Result<Element, ConversionError> {
        Ok(Element::Bool(b))
    }

    fn from_char(&self, c: u16) -> Result<Element, ConversionError> {
        Ok(Element::Char(c))
    }

    fn from_opaque(&self, v: serde_json::Value) -> Result<Element, ConversionError> {
        Ok(Element::Opaque(v))
    }

    fn convert(&self, element: Element) -> Result<Element, ConversionError> {
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_is_identity() {
        for element in [
            Element::from("x"),
            Element::Short(3),
            Element::Opaque(serde_json::json!({"nested": true})),
        ] {
            assert_eq!(OpaqueRules.convert(element.clone()), Ok(element));
        }
    }
}
