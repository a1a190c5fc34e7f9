//! Validation errors
//!
//! Validation runs over a structurally complete model, so these errors carry
//! descriptive context (type and field names) rather than source positions.

use crate::logging::{codes, Code};
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A type reference that does not resolve. `context` says where it was
    /// written, e.g. "struct field 'Foo.b'".
    #[error("Undefined type '{name}' in {context}")]
    UndefinedType { name: String, context: String },

    #[error("Cannot have a default value for required field: '{0}'")]
    RequiredWithDefault(String),

    #[error("Cannot have both 'values' and 'pattern' constraints in one string field: '{0}'")]
    PatternAndValues(String),

    /// Contradictory bounds such as `min` above `max`
    #[error("Conflicting constraints in {context}: {message}")]
    ConflictingConstraints { context: String, message: String },

    /// A literal that does not satisfy the type it is checked against
    #[error("{0}")]
    ConstraintViolation(String),

    #[error("{0}")]
    InvalidUnitValue(String),

    #[error("{0}")]
    InvalidHttpBinding(String),

    #[error("Bad pattern in {context}: {message}")]
    InvalidPattern { context: String, message: String },

    #[error("Example for {target} is invalid: {message}")]
    InvalidExample { target: String, message: String },
}

impl ValidationError {
    pub fn undefined_type(name: &str, context: impl Into<String>) -> Self {
        Self::UndefinedType {
            name: name.to_string(),
            context: context.into(),
        }
    }

    pub fn conflicting(context: &str, message: impl Into<String>) -> Self {
        Self::ConflictingConstraints {
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn pattern(context: &str, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UndefinedType { .. } => codes::validation::UNDEFINED_TYPE,
            Self::RequiredWithDefault(_) => codes::validation::REQUIRED_WITH_DEFAULT,
            Self::PatternAndValues(_) | Self::ConflictingConstraints { .. } => {
                codes::validation::CONFLICTING_CONSTRAINTS
            }
            Self::ConstraintViolation(_) => codes::validation::CONSTRAINT_VIOLATION,
            Self::InvalidUnitValue(_) => codes::validation::INVALID_UNIT_VALUE,
            Self::InvalidHttpBinding(_) => codes::validation::INVALID_HTTP_BINDING,
            Self::InvalidPattern { .. } => codes::validation::INVALID_PATTERN,
            Self::InvalidExample { .. } => codes::validation::INVALID_EXAMPLE,
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    /// Short name of the variant, used as a log field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::UndefinedType { .. } => "UndefinedType",
            Self::RequiredWithDefault(_) => "RequiredWithDefault",
            Self::PatternAndValues(_) => "PatternAndValues",
            Self::ConflictingConstraints { .. } => "ConflictingConstraints",
            Self::ConstraintViolation(_) => "ConstraintViolation",
            Self::InvalidUnitValue(_) => "InvalidUnitValue",
            Self::InvalidHttpBinding(_) => "InvalidHttpBinding",
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::InvalidExample { .. } => "InvalidExample",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ValidationError::undefined_type("Bar", "struct field 'Foo.b'");
        assert_eq!(err.to_string(), "Undefined type 'Bar' in struct field 'Foo.b'");
        assert_eq!(err.error_code(), codes::validation::UNDEFINED_TYPE);

        let err = ValidationError::RequiredWithDefault("Test.s".into());
        assert_eq!(
            err.to_string(),
            "Cannot have a default value for required field: 'Test.s'"
        );
        assert_eq!(err.error_type(), "RequiredWithDefault");
    }
}
