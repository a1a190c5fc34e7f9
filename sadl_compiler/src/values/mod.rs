//! Scalar value types with canonical text and JSON forms
//!
//! These back numeric literals, `Timestamp`/`UUID` defaults and examples, and
//! `UnitValue` quantities. Each parses from and renders to its canonical string.

pub mod decimal;
pub mod timestamp;
pub mod unit_value;
pub mod uuid;

pub use decimal::Decimal;
pub use timestamp::Timestamp;
pub use unit_value::UnitValue;
pub use uuid::Uuid;

use crate::logging::codes;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("Bad Decimal number: {0}")]
    BadDecimal(String),

    #[error("Bad Timestamp: {0:?}")]
    BadTimestamp(String),

    #[error("Bad UUID: {0}")]
    BadUuid(String),

    #[error("Not a valid UnitValue: {0:?}")]
    BadUnitValue(String),
}

impl ValueError {
    pub fn error_code(&self) -> crate::logging::Code {
        codes::validation::INVALID_VALUE
    }
}
