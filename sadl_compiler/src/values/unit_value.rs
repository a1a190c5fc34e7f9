//! A decimal quantity paired with a unit, written `"<value> <unit>"`

use super::{Decimal, ValueError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitValue {
    pub value: Decimal,
    pub unit: String,
}

impl UnitValue {
    pub fn new(value: Decimal, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Split at the first space: a decimal, then a non-empty unit
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let bad = || ValueError::BadUnitValue(text.to_string());
        let (value, unit) = text.split_once(' ').ok_or_else(bad)?;
        if value.is_empty() || unit.is_empty() {
            return Err(bad());
        }
        let value = Decimal::parse(value).map_err(|_| bad())?;
        Ok(Self::new(value, unit))
    }
}

impl FromStr for UnitValue {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitValue::parse(s)
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl Serialize for UnitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UnitValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        UnitValue::parse(&text).map_err(serde::de::Error::custom)
    }
}
