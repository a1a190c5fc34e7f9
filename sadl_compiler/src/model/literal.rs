//! Literal values written in `default=` options and `example` directives
//!
//! Every numeric literal is kept as a [`Decimal`]; narrowing to a concrete
//! numeric type happens when the literal is validated against a type.

use crate::values::Decimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(Decimal),
    /// Quoted strings and bare words other than `true`, `false` and `null`
    String(String),
    Array(Vec<Literal>),
    Object(BTreeMap<String, Literal>),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Decimal> {
        match self {
            Literal::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Name of the literal's shape, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "bool",
            Literal::Number(_) => "number",
            Literal::String(_) => "string",
            Literal::Array(_) => "array",
            Literal::Object(_) => "object",
        }
    }

    /// JSON form. Numbers that survive an `i64`/`f64` round trip become JSON
    /// numbers; anything more precise is kept as a decimal string.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => number_to_json(n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Array(items) => Value::Array(items.iter().map(Literal::to_json).collect()),
            Literal::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn number_to_json(n: &Decimal) -> serde_json::Value {
    if let Some(i) = n.as_i64() {
        return serde_json::Value::from(i);
    }
    let f = n.as_f64();
    match serde_json::Number::from_f64(f) {
        Some(num) if Decimal::parse(&f.to_string()).ok().as_ref() == Some(n) => {
            serde_json::Value::Number(num)
        }
        _ => serde_json::Value::String(n.to_string()),
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Renders the literal as SADL source, e.g. `{"a": [1, "x"], "b": null}`
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => f.write_str(&quote(s)),
            Literal::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Literal::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", quote(key), value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Quote a string using only the escapes the scanner understands
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pairs: &[(&str, Literal)]) -> Literal {
        Literal::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_source_rendering() {
        let lit = object(&[
            ("something", Literal::String("Hey".into())),
            ("oranother", Literal::Number(Decimal::from(23))),
            (
                "list",
                Literal::Array(vec![Literal::Bool(true), Literal::Null]),
            ),
        ]);
        assert_eq!(
            lit.to_string(),
            r#"{"list": [true, null], "oranother": 23, "something": "Hey"}"#
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\n"), r#""a\"b\\c\n""#);
        assert_eq!(quote("\u{1}"), r#""\u0001""#);
    }

    #[test]
    fn test_json_numbers() {
        let small = Literal::Number(Decimal::parse("2.5").unwrap());
        assert_eq!(small.to_json(), serde_json::json!(2.5));

        let int = Literal::Number(Decimal::from(23));
        assert_eq!(int.to_json(), serde_json::json!(23));

        let pi = "3.141592653589793238462643383279502884197169399375105819";
        let precise = Literal::Number(Decimal::parse(pi).unwrap());
        assert_eq!(precise.to_json(), serde_json::json!(pi));
    }
}
