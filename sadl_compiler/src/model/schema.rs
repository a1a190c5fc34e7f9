//! Parsed schema: type definitions, actions, HTTP operations and examples
//!
//! Type references (array items, map keys, field types, union variants,
//! unit value parts) are stored by name and resolved later against the
//! [`Model`](super::Model) index.

use super::http::HttpDef;
use super::literal::Literal;
use crate::values::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// `x_*` annotations; a bare flag maps to an empty string
pub type Annotations = BTreeMap<String, String>;

// ============================================================================
// SCHEMA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Path prefix shared by every HTTP operation
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
    pub types: Vec<TypeDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<OperationDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub http: Vec<HttpDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(flatten)]
    pub spec: TypeSpec,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            comment: String::new(),
            annotations: Annotations::new(),
        }
    }
}

// ============================================================================
// TYPE SPECS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
}

impl NumberKind {
    pub const ALL: [NumberKind; 7] = [
        NumberKind::Int8,
        NumberKind::Int16,
        NumberKind::Int32,
        NumberKind::Int64,
        NumberKind::Float32,
        NumberKind::Float64,
        NumberKind::Decimal,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Int8 => "Int8",
            NumberKind::Int16 => "Int16",
            NumberKind::Int32 => "Int32",
            NumberKind::Int64 => "Int64",
            NumberKind::Float32 => "Float32",
            NumberKind::Float64 => "Float64",
            NumberKind::Decimal => "Decimal",
        }
    }

    /// Bounds implied by the width of an integer kind
    pub fn implicit_bounds(&self) -> Option<(i64, i64)> {
        match self {
            NumberKind::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            NumberKind::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            NumberKind::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            NumberKind::Int64 => Some((i64::MIN, i64::MAX)),
            NumberKind::Float32 | NumberKind::Float64 | NumberKind::Decimal => None,
        }
    }
}

/// Constraints that only make sense for strings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StringSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(rename = "minSize", skip_serializing_if = "Option::is_none")]
    pub min_size: Option<i32>,
    #[serde(rename = "maxSize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<i32>,
    /// Name of the type this string identifies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// The structure of a type. The variant decides which constraints exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum TypeSpec {
    Any,
    Bool,
    Number {
        kind: NumberKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<Decimal>,
    },
    Bytes {
        #[serde(rename = "minSize", skip_serializing_if = "Option::is_none")]
        min_size: Option<i32>,
        #[serde(rename = "maxSize", skip_serializing_if = "Option::is_none")]
        max_size: Option<i32>,
    },
    String(StringSpec),
    Timestamp,
    #[serde(rename = "UUID")]
    Uuid {
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
    },
    Array {
        items: String,
        #[serde(rename = "minSize", skip_serializing_if = "Option::is_none")]
        min_size: Option<i32>,
        #[serde(rename = "maxSize", skip_serializing_if = "Option::is_none")]
        max_size: Option<i32>,
    },
    Map {
        keys: String,
        items: String,
        #[serde(rename = "minSize", skip_serializing_if = "Option::is_none")]
        min_size: Option<i32>,
        #[serde(rename = "maxSize", skip_serializing_if = "Option::is_none")]
        max_size: Option<i32>,
    },
    Struct {
        fields: Vec<StructFieldDef>,
    },
    Enum {
        elements: Vec<EnumElementDef>,
    },
    Union {
        variants: Vec<UnionVariantDef>,
    },
    UnitValue {
        value: String,
        unit: String,
    },
    /// A user-defined type, by name
    Ref {
        #[serde(rename = "ref")]
        name: String,
    },
}

impl TypeSpec {
    /// The unconstrained spec for a type name: base type names map to their
    /// own variant (with default parameters), anything else is a reference.
    pub fn named(name: &str) -> Self {
        if let Some(kind) = NumberKind::from_name(name) {
            return TypeSpec::Number {
                kind,
                min: None,
                max: None,
            };
        }
        match name {
            "Any" => TypeSpec::Any,
            "Bool" => TypeSpec::Bool,
            "Bytes" => TypeSpec::Bytes {
                min_size: None,
                max_size: None,
            },
            "String" => TypeSpec::String(StringSpec::default()),
            "Timestamp" => TypeSpec::Timestamp,
            "UUID" => TypeSpec::Uuid { reference: None },
            "Array" => TypeSpec::Array {
                items: "Any".to_string(),
                min_size: None,
                max_size: None,
            },
            "Map" => TypeSpec::Map {
                keys: "String".to_string(),
                items: "Any".to_string(),
                min_size: None,
                max_size: None,
            },
            "Struct" => TypeSpec::Struct { fields: Vec::new() },
            "Enum" => TypeSpec::Enum {
                elements: Vec::new(),
            },
            "Union" => TypeSpec::Union {
                variants: Vec::new(),
            },
            "UnitValue" => TypeSpec::UnitValue {
                value: "Decimal".to_string(),
                unit: "String".to_string(),
            },
            _ => TypeSpec::Ref {
                name: name.to_string(),
            },
        }
    }

    /// The type name as written in source: a base type name or the
    /// referenced type's name
    pub fn type_name(&self) -> &str {
        match self {
            TypeSpec::Any => "Any",
            TypeSpec::Bool => "Bool",
            TypeSpec::Number { kind, .. } => kind.as_str(),
            TypeSpec::Bytes { .. } => "Bytes",
            TypeSpec::String(_) => "String",
            TypeSpec::Timestamp => "Timestamp",
            TypeSpec::Uuid { .. } => "UUID",
            TypeSpec::Array { .. } => "Array",
            TypeSpec::Map { .. } => "Map",
            TypeSpec::Struct { .. } => "Struct",
            TypeSpec::Enum { .. } => "Enum",
            TypeSpec::Union { .. } => "Union",
            TypeSpec::UnitValue { .. } => "UnitValue",
            TypeSpec::Ref { name } => name,
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, TypeSpec::Ref { .. })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeSpec::Number { .. })
    }

    pub fn string_spec(&self) -> Option<&StringSpec> {
        match self {
            TypeSpec::String(spec) => Some(spec),
            _ => None,
        }
    }

    /// Names this spec refers to directly, in source order
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            TypeSpec::Array { items, .. } => vec![items.as_str()],
            TypeSpec::Map { keys, items, .. } => vec![keys.as_str(), items.as_str()],
            TypeSpec::UnitValue { value, unit } => vec![value.as_str(), unit.as_str()],
            TypeSpec::Union { variants } => variants.iter().map(|v| v.spec.type_name()).collect(),
            TypeSpec::Ref { name } => vec![name.as_str()],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Array { items, .. } => write!(f, "Array<{}>", items),
            TypeSpec::Map { keys, items, .. } => write!(f, "Map<{},{}>", keys, items),
            TypeSpec::UnitValue { value, unit } => write!(f, "UnitValue<{},{}>", value, unit),
            TypeSpec::Union { variants } => {
                let names: Vec<&str> = variants.iter().map(|v| v.spec.type_name()).collect();
                write!(f, "Union<{}>", names.join(","))
            }
            other => f.write_str(other.type_name()),
        }
    }
}

// ============================================================================
// STRUCT / ENUM / UNION MEMBERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructFieldDef {
    pub name: String,
    #[serde(flatten)]
    pub spec: TypeSpec,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl StructFieldDef {
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            required: false,
            default: None,
            comment: String::new(),
            annotations: Annotations::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumElementDef {
    pub symbol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl EnumElementDef {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            comment: String::new(),
            annotations: Annotations::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionVariantDef {
    #[serde(flatten)]
    pub spec: TypeSpec,
}

impl UnionVariantDef {
    pub fn named(name: &str) -> Self {
        Self {
            spec: TypeSpec::named(name),
        }
    }
}

// ============================================================================
// ACTIONS AND EXAMPLES
// ============================================================================

/// A transport-independent operation: `action Name(Input) Output except E1, E2`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationDef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

/// `example <Target> <literal>`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleDef {
    pub target: String,
    pub example: Literal,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_specs() {
        assert_eq!(TypeSpec::named("Int32").type_name(), "Int32");
        assert!(TypeSpec::named("Decimal").is_numeric());
        assert_eq!(TypeSpec::named("UUID").type_name(), "UUID");
        assert_eq!(
            TypeSpec::named("Map"),
            TypeSpec::Map {
                keys: "String".into(),
                items: "Any".into(),
                min_size: None,
                max_size: None
            }
        );
        assert_eq!(
            TypeSpec::named("Money"),
            TypeSpec::Ref {
                name: "Money".into()
            }
        );
    }

    #[test]
    fn test_display_with_params() {
        let spec = TypeSpec::UnitValue {
            value: "Decimal".into(),
            unit: "Currency".into(),
        };
        assert_eq!(spec.to_string(), "UnitValue<Decimal,Currency>");
        let union = TypeSpec::Union {
            variants: vec![UnionVariantDef::named("Int32"), UnionVariantDef::named("String")],
        };
        assert_eq!(union.to_string(), "Union<Int32,String>");
        assert_eq!(union.referenced_names(), vec!["Int32", "String"]);
    }

    #[test]
    fn test_json_shape() {
        let mut td = TypeDef::new(
            "Age",
            TypeSpec::Number {
                kind: NumberKind::Int32,
                min: Some(Decimal::from(0)),
                max: None,
            },
        );
        td.comment = "years".into();
        let json = serde_json::to_value(&td).unwrap();
        assert_eq!(json["name"], "Age");
        assert_eq!(json["type"], "Number");
        assert_eq!(json["kind"], "Int32");
        assert_eq!(json["min"], "0");
        assert!(json.get("max").is_none());
        assert_eq!(json["comment"], "years");
    }

    #[test]
    fn test_reference_field_json() {
        let field = StructFieldDef::new("b", TypeSpec::named("Bar"));
        let text = serde_json::to_string(&field).unwrap();
        assert_eq!(text.matches("\"name\"").count(), 1);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["name"], "b");
        assert_eq!(json["type"], "Ref");
        assert_eq!(json["ref"], "Bar");
    }

    #[test]
    fn test_implicit_bounds() {
        assert_eq!(NumberKind::Int8.implicit_bounds(), Some((-128, 127)));
        assert_eq!(NumberKind::Decimal.implicit_bounds(), None);
    }
}
