use fieldbind_api::element::{Element, ElementType};

use super::{ConversionError, ConversionRules, Numeric, RuleOptions};

/// Boolean elements. Numbers and chars are `true` when nonzero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanRules {
    options: RuleOptions,
}

impl BooleanRules {
    pub fn new(options: RuleOptions) -> Self {
        Self { options }
    }
}

impl ConversionRules for BooleanRules {
    fn element_type(&self) -> ElementType {
        ElementType::Boolean
    }

    /// Accepts `true` / `false` in any letter case.
    fn from_text(&self, s: &str) -> Result<Element, ConversionError> {
        let input = if self.options.trim_text { s.trim() } else { s };
        if input.eq_ignore_ascii_case("true") {
            Ok(Element::Bool(true))
        } else if input.eq_ignore_ascii_case("false") {
            Ok(Element::Bool(false))
        } else {
            Err(ConversionError::new(
                format!("text {s:?}"),
                ElementType::Boolean,
                "expected 'true' or 'false'",
            ))
        }
    }

    fn from_numeric(&self, n: Numeric) -> Result<Element, ConversionError> {
        Ok(Element::Bool(!n.is_zero()))
    }

    fn from_boolean(&self, b: bool) -> Result<Element, ConversionError> {
        Ok(Element::Bool(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonzero_is_true() {
        let rules = BooleanRules::default();
        assert_eq!(rules.convert(Element::Int(0)), Ok(Element::Bool(false)));
        assert_eq!(rules.convert(Element::Int(-5)), Ok(Element::Bool(true)));
        assert_eq!(rules.convert(Element::Long(7)), Ok(Element::Bool(true)));
        assert_eq!(rules.convert(Element::Double(-0.0)), Ok(Element::Bool(false)));
        assert_eq!(rules.convert(Element::Float(0.25)), Ok(Element::Bool(true)));
        assert_eq!(rules.convert(Element::Char(0)), Ok(Element::Bool(false)));
    }

    #[test]
    fn text_is_case_insensitive() {
        let rules = BooleanRules::default();
        assert_eq!(rules.from_text("TRUE"), Ok(Element::Bool(true)));
        assert_eq!(rules.from_text("False"), Ok(Element::Bool(false)));
        assert!(rules.from_text("yes").is_err());
        assert!(rules.from_text(" true").is_err());
    }

    #[test]
    fn trimming_is_opt_in() {
        let rules = BooleanRules::new(RuleOptions { trim_text: true });
        assert_eq!(rules.from_text(" true\n"), Ok(Element::Bool(true)));
    }
}
