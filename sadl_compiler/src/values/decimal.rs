//! Arbitrary-precision decimal used for every numeric literal and bound

use super::ValueError;
use bigdecimal::BigDecimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal(BigDecimal);

impl Decimal {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        BigDecimal::from_str(text.trim())
            .map(Decimal)
            .map_err(|_| ValueError::BadDecimal(text.to_string()))
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// The value as an `i64`, if it is integral and in range
    pub fn as_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.0.with_scale(0).to_string().parse().ok()
    }

    /// Nearest `f64`; precision beyond `f64` is lost
    pub fn as_f64(&self) -> f64 {
        self.0.to_string().parse().unwrap_or(f64::NAN)
    }

    pub fn as_big_decimal(&self) -> &BigDecimal {
        &self.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(BigDecimal::from(value))
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal(BigDecimal::from(value))
    }
}

impl FromStr for Decimal {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

/// Always plain notation (`0.0000001`, never `1E-7`) so the text scans
/// back as a SADL number literal
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (unscaled, scale) = self.0.as_bigint_and_exponent();
        let text = unscaled.to_string();
        let (sign, digits) = match text.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", text.as_str()),
        };
        if scale <= 0 {
            return write!(f, "{}{}{}", sign, digits, "0".repeat(scale.unsigned_abs() as usize));
        }
        let scale = scale as usize;
        if digits.len() > scale {
            let (whole, fraction) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, whole, fraction)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

/// Serialized as a JSON string so no digits are lost
impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal number or a string holding one")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Decimal::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal(BigDecimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Decimal::parse(&v.to_string()).map_err(E::custom)
    }
}

/// Accepts either a quoted decimal string or a raw JSON number
impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI: &str = "3.141592653589793238462643383279502884197169399375105819";

    #[test]
    fn test_precision_survives_json() {
        let pi = Decimal::parse(PI).unwrap();
        let json = serde_json::to_string(&pi).unwrap();
        assert_eq!(json, format!("\"{}\"", PI));

        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pi);
        assert_eq!(back.to_string(), PI);
    }

    #[test]
    fn test_plain_notation() {
        for text in ["0.0000001", "-0.00042", "1000000.5", "120", "2.0", "0"] {
            assert_eq!(Decimal::parse(text).unwrap().to_string(), text);
        }
        assert_eq!(Decimal::parse("1E-7").unwrap().to_string(), "0.0000001");
        assert_eq!(Decimal::parse("1.5e3").unwrap().to_string(), "1500");
        assert_eq!(Decimal::parse("-25e2").unwrap().to_string(), "-2500");
    }

    #[test]
    fn test_deserialize_from_number() {
        let d: Decimal = serde_json::from_str("23").unwrap();
        assert_eq!(d, Decimal::from(23));
        let f: Decimal = serde_json::from_str("2.5").unwrap();
        assert_eq!(f, Decimal::parse("2.5").unwrap());
    }

    #[test]
    fn test_integer_conversion() {
        assert_eq!(Decimal::parse("42").unwrap().as_i64(), Some(42));
        assert_eq!(Decimal::parse("-7").unwrap().as_i64(), Some(-7));
        assert_eq!(Decimal::parse("4.5").unwrap().as_i64(), None);
        assert!((Decimal::parse("4.5").unwrap().as_f64() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ordering_and_errors() {
        assert!(Decimal::parse("1.5").unwrap() < Decimal::from(2));
        assert_eq!(Decimal::parse("2.0").unwrap(), Decimal::from(2));
        assert_eq!(
            Decimal::parse("1.2.3").unwrap_err().to_string(),
            "Bad Decimal number: 1.2.3"
        );
    }
}
