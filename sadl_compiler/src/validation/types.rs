//! Type definition checks: references resolve, constraints agree with each
//! other and defaults satisfy the field they belong to

use super::error::{ValidationError, ValidationResult};
use super::literals::compile_pattern;
use super::Validator;
use crate::model::{StructFieldDef, TypeDef, TypeSpec};
use std::fmt;

/// Where a spec was written, for diagnostics: `struct field 'Foo.b'`
#[derive(Debug, Clone)]
pub struct Site {
    kind: &'static str,
    pub path: String,
}

impl Site {
    pub fn new(kind: &'static str, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    fn field(&self, name: &str) -> Site {
        Site::new("struct field", format!("{}.{}", self.path, name))
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.path)
    }
}

impl<'m> Validator<'m> {
    pub(super) fn check_type_def(&self, td: &TypeDef) -> ValidationResult<()> {
        self.check_spec(&Site::new("type", td.name.as_str()), &td.spec)
    }

    /// Check one spec in place: its references and its own constraints.
    /// Inline structs are walked field by field.
    pub(super) fn check_spec(&self, site: &Site, spec: &TypeSpec) -> ValidationResult<()> {
        match spec {
            TypeSpec::Any | TypeSpec::Bool | TypeSpec::Timestamp | TypeSpec::Enum { .. } => Ok(()),
            TypeSpec::Number { min, max, .. } => match (min, max) {
                (Some(min), Some(max)) if min > max => Err(ValidationError::conflicting(
                    &site.path,
                    format!("min ({}) is greater than max ({})", min, max),
                )),
                _ => Ok(()),
            },
            TypeSpec::Bytes { min_size, max_size } => check_sizes(site, *min_size, *max_size),
            TypeSpec::String(s) => {
                if s.pattern.is_some() && s.values.is_some() {
                    return Err(ValidationError::PatternAndValues(site.path.clone()));
                }
                check_sizes(site, s.min_size, s.max_size)?;
                if let Some(pattern) = &s.pattern {
                    let expanded = self.expand_pattern(&site.path, pattern)?;
                    compile_pattern(&expanded)
                        .map_err(|e| ValidationError::pattern(&site.path, e.to_string()))?;
                }
                match &s.reference {
                    Some(name) => self.require_type(site, name),
                    None => Ok(()),
                }
            }
            TypeSpec::Uuid { reference } => match reference {
                Some(name) => self.require_type(site, name),
                None => Ok(()),
            },
            TypeSpec::Array {
                items,
                min_size,
                max_size,
            } => {
                self.require_type(site, items)?;
                check_sizes(site, *min_size, *max_size)
            }
            TypeSpec::Map {
                keys,
                items,
                min_size,
                max_size,
            } => {
                self.require_type(site, keys)?;
                self.require_type(site, items)?;
                check_sizes(site, *min_size, *max_size)
            }
            TypeSpec::Struct { fields } => {
                for field in fields {
                    self.check_field(site, field)?;
                }
                Ok(())
            }
            TypeSpec::Union { variants } => {
                for variant in variants {
                    self.check_spec(site, &variant.spec)?;
                }
                Ok(())
            }
            TypeSpec::UnitValue { value, unit } => self.check_unit_value(site, value, unit),
            TypeSpec::Ref { name } => self.require_type(site, name),
        }
    }

    fn check_field(&self, owner: &Site, field: &StructFieldDef) -> ValidationResult<()> {
        let site = owner.field(&field.name);
        self.check_spec(&site, &field.spec)?;
        if let Some(default) = &field.default {
            if field.required {
                return Err(ValidationError::RequiredWithDefault(site.path));
            }
            self.check_literal(&site.path, &field.spec, default)?;
        }
        Ok(())
    }

    fn check_unit_value(&self, site: &Site, value: &str, unit: &str) -> ValidationResult<()> {
        self.require_type(site, value)?;
        if !self.model.is_numeric_type(&TypeSpec::named(value)) {
            return Err(ValidationError::InvalidUnitValue(format!(
                "UnitValue value type of {} is not numeric: {}",
                site.path, value
            )));
        }
        self.require_type(site, unit)?;
        match self.model.resolve_name(unit) {
            Some(TypeSpec::String(_)) | Some(TypeSpec::Enum { .. }) => Ok(()),
            _ => Err(ValidationError::InvalidUnitValue(format!(
                "UnitValue unit type of {} is not String or Enum: {}",
                site.path, unit
            ))),
        }
    }

    pub(super) fn require_type(&self, site: &Site, name: &str) -> ValidationResult<()> {
        match self.model.find_type(name) {
            Some(_) => Ok(()),
            None => Err(ValidationError::undefined_type(name, site.to_string())),
        }
    }
}

fn check_sizes(site: &Site, min_size: Option<i32>, max_size: Option<i32>) -> ValidationResult<()> {
    match (min_size, max_size) {
        (Some(min), Some(max)) if min > max => Err(ValidationError::conflicting(
            &site.path,
            format!("minsize ({}) is greater than maxsize ({})", min, max),
        )),
        _ => Ok(()),
    }
}
