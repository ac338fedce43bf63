use fieldbind_api::element::{Element, ElementType};

use super::{ConversionError, ConversionRules, Numeric};

/// Text elements. Every source stringifies canonically; nothing fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRules;

impl ConversionRules for TextRules {
    fn element_type(&self) -> ElementType {
        ElementType::Text
    }

    fn from_text(&self, s: &str) -> Result<Element, ConversionError> {
        Ok(Element::Text(s.to_owned()))
    }

    fn from_numeric(&self, n: Numeric) -> Result<Element, ConversionError> {
        Ok(Element::Text(n.to_string()))
    }

    fn from_boolean(&self, b: bool) -> Result<Element, ConversionError> {
        Ok(Element::Text(b.to_string()))
    }

    fn from_char(&self, c: u16) -> Result<Element, ConversionError> {
        Ok(Element::Text(Element::Char(c).to_string()))
    }

    fn from_opaque(&self, v: serde_json::Value) -> Result<Element, ConversionError> {
        Ok(Element::Text(Element::Opaque(v).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_strings_are_unquoted() {
        let rules = TextRules;
        assert_eq!(
            rules.from_opaque(serde_json::json!("plain")),
            Ok(Element::from("plain"))
        );
        assert_eq!(
            rules.from_opaque(serde_json::json!({"k": [1, 2]})),
            Ok(Element::from(r#"{"k":[1,2]}"#))
        );
    }

    #[test]
    fn numbers_use_display() {
        let rules = TextRules;
        assert_eq!(rules.from_numeric(Numeric::Double(3.0)), Ok(Element::from("3")));
        assert_eq!(rules.from_numeric(Numeric::Int(-17)), Ok(Element::from("-17")));
    }
}
