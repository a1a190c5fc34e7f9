//! Schema model and the name-indexed [`Model`] built from it
//!
//! A [`Schema`] is the raw parse result. [`Model::new`] indexes its type
//! definitions by name, pre-seeded with the base types, and rejects duplicate
//! type, action and HTTP operation names. Everything downstream (validation,
//! extensions, decompile) resolves type references through this index.

pub mod http;
pub mod literal;
pub mod schema;

pub use http::{
    HttpDef, HttpExceptionSpec, HttpExpectedSpec, HttpMethod, HttpParamSpec, ParamBinding,
};
pub use literal::Literal;
pub use schema::{
    Annotations, EnumElementDef, ExampleDef, NumberKind, OperationDef, Schema, StringSpec,
    StructFieldDef, TypeDef, TypeSpec, UnionVariantDef,
};

use crate::logging::{codes, Code};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;

/// Type names that always resolve without a definition
pub const BASE_TYPES: &[&str] = &[
    "Any",
    "Bool",
    "Int8",
    "Int16",
    "Int32",
    "Int64",
    "Float32",
    "Float64",
    "Decimal",
    "Bytes",
    "String",
    "Timestamp",
    "UUID",
    "Array",
    "Map",
    "Struct",
    "Enum",
    "Union",
    "UnitValue",
];

pub fn is_base_type(name: &str) -> bool {
    BASE_TYPES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    #[error("Duplicate http action: {0:?}")]
    DuplicateHttpOperation(String),

    #[error("Duplicate action: {0:?}")]
    DuplicateAction(String),
}

impl ModelError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::DuplicateType(_) => codes::model::DUPLICATE_TYPE,
            Self::DuplicateHttpOperation(_) => codes::model::DUPLICATE_HTTP_OPERATION,
            Self::DuplicateAction(_) => codes::model::DUPLICATE_ACTION,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TypeSlot {
    Base(usize),
    Defined(usize),
}

/// A schema plus name indexes for its types, actions and HTTP operations
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    #[serde(flatten)]
    schema: Schema,
    /// Results contributed by extensions, keyed by extension name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
    #[serde(skip)]
    base_types: Vec<TypeDef>,
    #[serde(skip)]
    type_index: HashMap<String, TypeSlot>,
    #[serde(skip)]
    http_index: HashMap<String, usize>,
    #[serde(skip)]
    action_index: HashMap<String, usize>,
}

impl Model {
    pub fn new(schema: Schema) -> Result<Self, ModelError> {
        log_debug!("Building model",
            "schema" => &schema.name,
            "types" => schema.types.len()
        );

        let base_types: Vec<TypeDef> = BASE_TYPES
            .iter()
            .map(|name| TypeDef::new(*name, TypeSpec::named(name)))
            .collect();

        let mut type_index = HashMap::new();
        for (i, td) in base_types.iter().enumerate() {
            type_index.insert(td.name.clone(), TypeSlot::Base(i));
        }
        for (i, td) in schema.types.iter().enumerate() {
            if type_index.contains_key(&td.name) {
                return Err(Self::fail(ModelError::DuplicateType(td.name.clone())));
            }
            type_index.insert(td.name.clone(), TypeSlot::Defined(i));
        }

        let mut action_index = HashMap::new();
        for (i, action) in schema.actions.iter().enumerate() {
            if action_index.insert(action.name.clone(), i).is_some() {
                return Err(Self::fail(ModelError::DuplicateAction(action.name.clone())));
            }
        }

        // unnamed operations are not indexed
        let mut http_index = HashMap::new();
        for (i, hd) in schema.http.iter().enumerate() {
            if let Some(name) = &hd.name {
                if http_index.insert(name.clone(), i).is_some() {
                    return Err(Self::fail(ModelError::DuplicateHttpOperation(name.clone())));
                }
            }
        }

        log_success!(
            codes::success::MODEL_CONSTRUCTION_COMPLETE,
            "Model constructed",
            "types" => schema.types.len(),
            "actions" => schema.actions.len(),
            "http" => schema.http.len()
        );

        Ok(Self {
            schema,
            extensions: BTreeMap::new(),
            base_types,
            type_index,
            http_index,
            action_index,
        })
    }

    fn fail(error: ModelError) -> ModelError {
        log_error!(error.error_code(), "Model construction failed",
            "error" => &error
        );
        error
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn into_schema(self) -> Schema {
        self.schema
    }

    /// Look up a base or defined type by name
    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        match self.type_index.get(name)? {
            TypeSlot::Base(i) => self.base_types.get(*i),
            TypeSlot::Defined(i) => self.schema.types.get(*i),
        }
    }

    pub fn find_http(&self, name: &str) -> Option<&HttpDef> {
        self.http_index
            .get(name)
            .and_then(|i| self.schema.http.get(*i))
    }

    pub fn find_action(&self, name: &str) -> Option<&OperationDef> {
        self.action_index
            .get(name)
            .and_then(|i| self.schema.actions.get(*i))
    }

    /// Follow references until a structural spec is reached. Returns `None`
    /// for an undefined name or a reference cycle.
    pub fn resolve<'a>(&'a self, spec: &'a TypeSpec) -> Option<&'a TypeSpec> {
        let mut current = spec;
        for _ in 0..=self.type_index.len() {
            match current {
                TypeSpec::Ref { name } => current = &self.find_type(name)?.spec,
                other => return Some(other),
            }
        }
        None
    }

    /// The structural spec behind a type name
    pub fn resolve_name(&self, name: &str) -> Option<&TypeSpec> {
        let td = self.find_type(name)?;
        self.resolve(&td.spec)
    }

    /// True for the numeric base types and types derived from them
    pub fn is_numeric_type(&self, spec: &TypeSpec) -> bool {
        self.resolve(spec).map_or(false, TypeSpec::is_numeric)
    }

    /// Attach an extension's result so it is emitted with the model
    pub fn set_extension_result(&mut self, name: &str, value: serde_json::Value) {
        self.extensions.insert(name.to_string(), value);
    }
}

impl Deref for Model {
    type Target = Schema;

    fn deref(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn schema_with(types: Vec<TypeDef>) -> Schema {
        Schema {
            name: "test".into(),
            types,
            ..Schema::default()
        }
    }

    #[test]
    fn test_base_types_resolve() {
        let model = Model::new(Schema::default()).unwrap();
        for name in BASE_TYPES {
            assert!(model.find_type(name).is_some(), "{}", name);
        }
        assert!(model.find_type("Nope").is_none());
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let schema = schema_with(vec![
            TypeDef::new("Foo", TypeSpec::named("String")),
            TypeDef::new("Foo", TypeSpec::named("Struct")),
        ]);
        let err = Model::new(schema).unwrap_err();
        assert_matches!(err, ModelError::DuplicateType(ref name) if name == "Foo");
        assert_eq!(err.to_string(), "Duplicate type: Foo");
    }

    #[test]
    fn test_base_type_name_collision() {
        let schema = schema_with(vec![TypeDef::new("String", TypeSpec::named("Int32"))]);
        assert_matches!(Model::new(schema), Err(ModelError::DuplicateType(_)));
    }

    #[test]
    fn test_duplicate_http_names() {
        let mut one = HttpDef::new(HttpMethod::Get, "/a");
        one.name = Some("getA".into());
        let two = one.clone();
        let unnamed = HttpDef::new(HttpMethod::Get, "/b");
        let schema = Schema {
            http: vec![unnamed.clone(), unnamed, one.clone()],
            ..Schema::default()
        };
        let model = Model::new(schema).unwrap();
        assert_eq!(model.find_http("getA").map(|h| h.path.as_str()), Some("/a"));

        let schema = Schema {
            http: vec![one, two],
            ..Schema::default()
        };
        assert_eq!(
            Model::new(schema).unwrap_err().to_string(),
            "Duplicate http action: \"getA\""
        );
    }

    #[test]
    fn test_numeric_resolution() {
        let schema = schema_with(vec![
            TypeDef::new("Amount", TypeSpec::named("Decimal")),
            TypeDef::new("Code", TypeSpec::named("String")),
        ]);
        let model = Model::new(schema).unwrap();
        assert!(model.is_numeric_type(&TypeSpec::named("Amount")));
        assert!(model.is_numeric_type(&TypeSpec::named("Int8")));
        assert!(!model.is_numeric_type(&TypeSpec::named("Code")));
        assert!(!model.is_numeric_type(&TypeSpec::named("Missing")));
        assert_eq!(model.types.len(), 2);
    }
}
