//! Checking literal values (field defaults, parameter defaults, examples)
//! against the type they are written for

use super::error::{ValidationError, ValidationResult};
use super::Validator;
use crate::config::constants::compile_time::validation::MAX_PATTERN_REGEX_SIZE;
use crate::model::{Literal, NumberKind, StringSpec, TypeSpec};
use crate::values::{Decimal, Timestamp, UnitValue, Uuid};
use regex::RegexBuilder;

impl<'m> Validator<'m> {
    /// Check `value` against `spec`. `context` names the value in messages,
    /// e.g. `Test.foo` or `Point.x`.
    pub fn check_literal(&self, context: &str, spec: &TypeSpec, value: &Literal) -> ValidationResult<()> {
        match spec {
            TypeSpec::Any => Ok(()),
            TypeSpec::Bool => match value {
                Literal::Bool(_) => Ok(()),
                _ => Err(not_valid(context, value)),
            },
            TypeSpec::Number { kind, min, max } => {
                self.check_number(context, *kind, min.as_ref(), max.as_ref(), value)
            }
            TypeSpec::Bytes { .. } => match value {
                Literal::String(_) => Ok(()),
                _ => Err(fail("Bytes", "", value)),
            },
            TypeSpec::String(s) => self.check_string(context, s, value),
            TypeSpec::Timestamp => match value {
                Literal::String(text) if Timestamp::parse(text).is_ok() => Ok(()),
                _ => Err(fail("Timestamp", "format invalid", value)),
            },
            TypeSpec::Uuid { .. } => match value {
                Literal::String(text) if Uuid::parse(text).is_ok() => Ok(()),
                _ => Err(not_valid(context, value)),
            },
            TypeSpec::Array {
                items,
                min_size,
                max_size,
            } => {
                let Literal::Array(elements) = value else {
                    return Err(violation(format!("{}: Not an Array: {}", context, value)));
                };
                if items != "Any" {
                    let item_spec = self.lookup(context, items)?;
                    for (i, element) in elements.iter().enumerate() {
                        self.check_literal(&format!("{}[{}]", context, i), item_spec, element)?;
                    }
                }
                check_size(context, "Array", elements.len(), *min_size, *max_size, value)
            }
            TypeSpec::Map {
                items,
                min_size,
                max_size,
                ..
            } => {
                let Literal::Object(entries) = value else {
                    return Err(violation(format!("{}: Not a Map: {}", context, value)));
                };
                if items != "Any" {
                    let item_spec = self.lookup(context, items)?;
                    for (key, entry) in entries {
                        self.check_literal(&format!("{}[{:?}]", context, key), item_spec, entry)?;
                    }
                }
                check_size(context, "Map", entries.len(), *min_size, *max_size, value)
            }
            TypeSpec::Struct { fields } => {
                let Literal::Object(entries) = value else {
                    return Err(violation(format!("{}: Not a Struct: {}", context, value)));
                };
                if let Some(key) = entries.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
                    return Err(violation(format!("Undefined field in {}: '{}'", context, key)));
                }
                for field in fields {
                    match entries.get(&field.name) {
                        Some(entry) => {
                            self.check_literal(&format!("{}.{}", context, field.name), &field.spec, entry)?
                        }
                        None if field.required => {
                            return Err(violation(format!(
                                "{} missing required field '{}': {}",
                                context, field.name, value
                            )))
                        }
                        None => {}
                    }
                }
                Ok(())
            }
            TypeSpec::Enum { elements } => match value {
                Literal::String(symbol) if elements.iter().any(|e| &e.symbol == symbol) => Ok(()),
                _ => Err(not_valid(context, value)),
            },
            TypeSpec::Union { variants } => {
                let matched = variants
                    .iter()
                    .any(|variant| self.check_literal(context, &variant.spec, value).is_ok());
                if matched {
                    Ok(())
                } else {
                    Err(violation(format!(
                        "{}: Not valid for any variant of {}: {}",
                        context, spec, value
                    )))
                }
            }
            TypeSpec::UnitValue {
                value: value_type,
                unit: unit_type,
            } => {
                let parsed = value
                    .as_str()
                    .and_then(|text| UnitValue::parse(text).ok())
                    .ok_or_else(|| not_valid(context, value))?;
                let value_spec = self.lookup(context, value_type)?;
                self.check_literal(
                    &format!("{}.value", context),
                    value_spec,
                    &Literal::Number(parsed.value.clone()),
                )?;
                let unit_spec = self.lookup(context, unit_type)?;
                self.check_literal(
                    &format!("{}.unit", context),
                    unit_spec,
                    &Literal::String(parsed.unit.clone()),
                )
            }
            TypeSpec::Ref { name } => {
                let target = self.lookup(context, name)?;
                self.check_literal(context, target, value)
            }
        }
    }

    /// The spec behind a type name, or an undefined-type error
    fn lookup(&self, context: &str, name: &str) -> ValidationResult<&'m TypeSpec> {
        self.model
            .find_type(name)
            .map(|td| &td.spec)
            .ok_or_else(|| ValidationError::undefined_type(name, context.to_string()))
    }

    fn check_number(
        &self,
        context: &str,
        kind: NumberKind,
        min: Option<&Decimal>,
        max: Option<&Decimal>,
        value: &Literal,
    ) -> ValidationResult<()> {
        let Literal::Number(n) = value else {
            return Err(violation(format!("{}: Not a number: {}", context, value)));
        };
        let implicit = kind.implicit_bounds();
        if implicit.is_some() && !n.is_integer() {
            return Err(violation(format!("{}: Not an integer: {}", context, n)));
        }
        let min = min.cloned().or_else(|| implicit.map(|(lo, _)| Decimal::from(lo)));
        let max = max.cloned().or_else(|| implicit.map(|(_, hi)| Decimal::from(hi)));
        if let Some(min) = min {
            if *n < min {
                return Err(violation(format!(
                    "{}: Numeric value less than the minimum allowed ({})",
                    context, min
                )));
            }
        }
        if let Some(max) = max {
            if *n > max {
                return Err(violation(format!(
                    "{}: Numeric value greater than the maximum allowed ({})",
                    context, max
                )));
            }
        }
        Ok(())
    }

    fn check_string(&self, context: &str, spec: &StringSpec, value: &Literal) -> ValidationResult<()> {
        let Literal::String(text) = value else {
            return Err(fail("String", context, value));
        };
        let length = text.chars().count();
        if let Some(min) = spec.min_size {
            if length < min.max(0) as usize {
                return Err(fail("String", &format!("'minsize={}' constraint failed", min), value));
            }
        }
        if let Some(max) = spec.max_size {
            if length > max.max(0) as usize {
                return Err(fail("String", &format!("'maxsize={}' constraint failed", max), value));
            }
        }
        if let Some(values) = &spec.values {
            if values.iter().any(|v| v == text) {
                return Ok(());
            }
            return Err(fail(
                "String",
                &format!("'values={:?}' constraint failed", values),
                value,
            ));
        }
        if let Some(pattern) = &spec.pattern {
            let expanded = self.expand_pattern(context, pattern)?;
            let matcher = compile_pattern(&expanded)
                .map_err(|_| fail("String", &format!("Bad pattern specified in String type definition {:?}", pattern), value))?;
            if !matcher.is_match(text) {
                return Err(fail(
                    "String",
                    &format!("'pattern={:?}' constraint failed", pattern),
                    value,
                ));
            }
        }
        Ok(())
    }

    /// Replace each `{TypeName}` in `pattern` with that String type's own
    /// pattern, minus its anchors. Only one level is expanded: references
    /// inside a substituted pattern are left as written.
    pub fn expand_pattern(&self, context: &str, pattern: &str) -> ValidationResult<String> {
        let mut expanded = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            let name = &after[..close];
            expanded.push_str(&rest[..open]);
            if is_type_name(name) {
                let embedded = self
                    .model
                    .resolve_name(name)
                    .and_then(TypeSpec::string_spec)
                    .and_then(|s| s.pattern.as_deref())
                    .ok_or_else(|| {
                        ValidationError::pattern(
                            context,
                            format!("'{}' is not a String type with a pattern", name),
                        )
                    })?;
                let embedded = embedded.strip_prefix('^').unwrap_or(embedded);
                let embedded = embedded.strip_suffix('$').unwrap_or(embedded);
                expanded.push_str(embedded);
            } else {
                // regex repetition such as {2,4}
                expanded.push('{');
                expanded.push_str(name);
                expanded.push('}');
            }
            rest = &after[close + 1..];
        }
        expanded.push_str(rest);
        Ok(expanded)
    }
}

pub(super) fn compile_pattern(pattern: &str) -> Result<regex::Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .size_limit(MAX_PATTERN_REGEX_SIZE)
        .build()
}

fn is_type_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic())
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn check_size(
    context: &str,
    kind: &str,
    length: usize,
    min_size: Option<i32>,
    max_size: Option<i32>,
    value: &Literal,
) -> ValidationResult<()> {
    if let Some(max) = max_size {
        if length > max.max(0) as usize {
            return Err(violation(format!(
                "{}: {} is too large (maxsize={}): {}",
                context, kind, max, value
            )));
        }
    }
    if let Some(min) = min_size {
        if length < min.max(0) as usize {
            return Err(violation(format!(
                "{}: {} is too small (minsize={}): {}",
                context, kind, min, value
            )));
        }
    }
    Ok(())
}

fn violation(message: String) -> ValidationError {
    ValidationError::ConstraintViolation(message)
}

fn not_valid(context: &str, value: &Literal) -> ValidationError {
    violation(format!("{}: Not valid: {}", context, value))
}

fn fail(type_name: &str, message: &str, value: &Literal) -> ValidationError {
    if message.is_empty() {
        return violation(format!("Validation error: not a valid {}: {}", type_name, value));
    }
    violation(format!(
        "Validation error: not a valid {} ({}): {}",
        type_name, message, value
    ))
}
