use std::fmt;

use crate::element::ElementType;
use crate::schema::{Storage, TargetKind};

/// Category of a bind error. Lets the ingestion pipeline decide whether to
/// skip the field, fail the record, or fail at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value cannot be parsed/converted into the element type.
    Format,
    /// More than one value for a scalar field.
    Cardinality,
    /// Flattened key-value sequence with an odd element count.
    OddLength,
    /// Descriptor or shape cannot be built. Raised before any document is bound.
    Schema,
    /// Record storage refused the write.
    Assignment,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Cardinality => f.write_str("cardinality"),
            ErrorKind::OddLength => f.write_str("odd_length"),
            ErrorKind::Schema => f.write_str("schema"),
            ErrorKind::Assignment => f.write_str("assignment"),
        }
    }
}

/// Classified bind failure. Carries the field name, the offending value and
/// the attempted conversion so it can be logged without further lookups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    #[error("field '{field}': cannot convert {value} to {target}: {reason}")]
    Format {
        field: String,
        value: String,
        target: ElementType,
        reason: String,
    },

    #[error("field '{field}': scalar field received {count} values")]
    Cardinality { field: String, count: usize },

    #[error("field '{field}': flattened key-value sequence has odd length {len}")]
    OddLength { field: String, len: usize },

    #[error("field '{field}': container '{container}' is not instantiable: {reason}")]
    NotInstantiableContainer {
        field: String,
        container: String,
        reason: String,
    },

    #[error("field '{field}': assignment refused: {reason}")]
    Assignment { field: String, reason: String },

    #[error("field '{field}': {storage} storage cannot hold {element} in a {kind} field")]
    UnsupportedStorage {
        field: String,
        storage: Storage,
        element: ElementType,
        kind: TargetKind,
    },

    #[error("schema error: {0}")]
    Schema(String),
}

impl BindError {
    pub fn schema(msg: impl Into<String>) -> Self {
        BindError::Schema(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::Format { .. } => ErrorKind::Format,
            BindError::Cardinality { .. } => ErrorKind::Cardinality,
            BindError::OddLength { .. } => ErrorKind::OddLength,
            BindError::Assignment { .. } => ErrorKind::Assignment,
            BindError::NotInstantiableContainer { .. }
            | BindError::UnsupportedStorage { .. }
            | BindError::Schema(_) => ErrorKind::Schema,
        }
    }

    /// Construction-time failures: the shape is unusable for every document.
    pub fn is_schema_level(&self) -> bool {
        self.kind() == ErrorKind::Schema
    }

    /// Name of the field the error is attributed to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            BindError::Format { field, .. }
            | BindError::Cardinality { field, .. }
            | BindError::OddLength { field, .. }
            | BindError::NotInstantiableContainer { field, .. }
            | BindError::Assignment { field, .. }
            | BindError::UnsupportedStorage { field, .. } => Some(field),
            BindError::Schema(_) => None,
        }
    }

    /// Add context to the error, preserving its kind.
    ///
    /// Free-text variants get `"context: original"`; structured variants
    /// get the context prefixed to the field name.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        match self {
            BindError::Schema(msg) => BindError::Schema(format!("{ctx}: {msg}")),
            BindError::Format { field, value, target, reason } => BindError::Format {
                field: format!("{ctx}.{field}"),
                value,
                target,
                reason,
            },
            BindError::Cardinality { field, count } => BindError::Cardinality {
                field: format!("{ctx}.{field}"),
                count,
            },
            BindError::OddLength { field, len } => BindError::OddLength {
                field: format!("{ctx}.{field}"),
                len,
            },
            BindError::NotInstantiableContainer { field, container, reason } => {
                BindError::NotInstantiableContainer {
                    field: format!("{ctx}.{field}"),
                    container,
                    reason,
                }
            }
            BindError::Assignment { field, reason } => BindError::Assignment {
                field: format!("{ctx}.{field}"),
                reason,
            },
            BindError::UnsupportedStorage { field, storage, element, kind } => {
                BindError::UnsupportedStorage {
                    field: format!("{ctx}.{field}"),
                    storage,
                    element,
                    kind,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_field_and_value() {
        let err = BindError::Format {
            field: "price".into(),
            value: "text \"abc\"".into(),
            target: ElementType::Int64,
            reason: "invalid digit found in string".into(),
        };
        assert_eq!(
            err.to_string(),
            "field 'price': cannot convert text \"abc\" to int64: invalid digit found in string"
        );
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.field(), Some("price"));
    }

    #[test]
    fn context_is_prefixed_to_field() {
        let err = BindError::Cardinality { field: "symbol".into(), count: 2 }.with_context("quote");
        assert_eq!(err.field(), Some("quote.symbol"));
        assert_eq!(err.kind(), ErrorKind::Cardinality);

        let err = BindError::schema("duplicate field").with_context("shape 'quote'");
        assert_eq!(err.to_string(), "schema error: shape 'quote': duplicate field");
        assert!(err.is_schema_level());
    }
}
