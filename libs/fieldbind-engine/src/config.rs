use serde::Deserialize;

use fieldbind_api::schema::ShapeSchema;

use crate::error::EngineError;

/// Root configuration — parsed from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BinderConfig {
    /// What a primitive scalar field receives when the input is absent.
    #[serde(default)]
    pub absent_primitive: AbsentPrimitive,

    /// Trim surrounding whitespace before parsing text into non-text elements.
    #[serde(default)]
    pub trim_text: bool,

    /// Whole-document policy when a single field fails.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Record shapes resolved up front by `Dispatcher::from_config`.
    #[serde(default)]
    pub shapes: Vec<ShapeSchema>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentPrimitive {
    /// Store the type's zero (`0`, `false`, `'\0'`).
    #[default]
    Zero,
    /// Fail with a format error.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failing field fails the whole document.
    #[default]
    Abort,
    /// Failing fields are reported and skipped; the document is accepted partially.
    Skip,
}

impl BinderConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }
}
