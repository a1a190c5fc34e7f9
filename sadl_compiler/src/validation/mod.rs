//! Semantic validation of a constructed [`Model`]
//!
//! Runs after model construction, when every type name can be resolved.
//! Checks type definitions, HTTP operations, actions and examples in source
//! order and stops at the first error.

pub mod error;
mod literals;
mod operations;
mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::Site;

use crate::config::runtime_config;
use crate::logging::codes;
use crate::model::{Model, TypeSpec};
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// Counts of what a successful validation covered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub types: usize,
    pub fields: usize,
    pub defaults: usize,
    pub http: usize,
    pub actions: usize,
    pub examples: usize,
}

impl ValidationSummary {
    fn of(model: &Model) -> Self {
        let mut summary = Self {
            types: model.types.len(),
            http: model.http.len(),
            actions: model.actions.len(),
            examples: model.examples.len(),
            ..Self::default()
        };
        for td in &model.types {
            count_fields(&td.spec, &mut summary);
        }
        summary
    }
}

fn count_fields(spec: &TypeSpec, summary: &mut ValidationSummary) {
    if let TypeSpec::Struct { fields } = spec {
        for field in fields {
            summary.fields += 1;
            if field.default.is_some() {
                summary.defaults += 1;
            }
            count_fields(&field.spec, summary);
        }
    }
}

/// Read-only checker over one model
pub struct Validator<'m> {
    model: &'m Model,
}

impl<'m> Validator<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    pub fn run(&self) -> ValidationResult<()> {
        let details = runtime_config().validation.log_validation_details;
        for td in &self.model.types {
            if details {
                log_debug!("Validating type", "name" => &td.name, "type" => &td.spec);
            }
            self.check_type_def(td)?;
        }
        for hd in &self.model.http {
            self.check_http(hd)?;
        }
        for action in &self.model.actions {
            self.check_action(action)?;
        }
        for example in &self.model.examples {
            self.check_example(example)?;
        }
        Ok(())
    }
}

/// Validate a model, logging the outcome
pub fn validate(model: &Model) -> ValidationResult<ValidationSummary> {
    log_debug!("Starting validation",
        "schema" => &model.name,
        "types" => model.types.len()
    );

    if let Err(error) = Validator::new(model).run() {
        log_error!(error.error_code(), &error.to_string(),
            "schema" => &model.name,
            "error_type" => error.error_type()
        );
        return Err(error);
    }

    let summary = ValidationSummary::of(model);
    if runtime_config().validation.include_validation_summary {
        log_success!(
            codes::success::VALIDATION_COMPLETE,
            "Validation completed",
            "types" => summary.types,
            "fields" => summary.fields,
            "defaults" => summary.defaults,
            "http" => summary.http,
            "actions" => summary.actions,
            "examples" => summary.examples
        );
    } else {
        log_success!(codes::success::VALIDATION_COMPLETE, "Validation completed");
    }
    Ok(summary)
}

/// Check that the validation error codes are registered
pub fn init_validation_logging() -> Result<(), String> {
    let validation_codes = [
        codes::validation::UNDEFINED_TYPE,
        codes::validation::REQUIRED_WITH_DEFAULT,
        codes::validation::CONFLICTING_CONSTRAINTS,
        codes::validation::CONSTRAINT_VIOLATION,
        codes::validation::INVALID_UNIT_VALUE,
        codes::validation::INVALID_HTTP_BINDING,
        codes::validation::INVALID_PATTERN,
        codes::validation::INVALID_EXAMPLE,
        codes::validation::INVALID_VALUE,
    ];
    for code in validation_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Validation error code {} not found in metadata registry",
                code
            ));
        }
    }
    log_debug!("Validation error codes verified", "count" => validation_codes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use assert_matches::assert_matches;

    fn check(source: &str) -> ValidationResult<ValidationSummary> {
        let schema = parse_source(source, None).unwrap();
        let model = Model::new(schema).unwrap();
        validate(&model)
    }

    fn check_field(field: &str) -> ValidationResult<ValidationSummary> {
        check(&format!("type Test Struct {{\n    {}\n}}\n", field))
    }

    #[test]
    fn test_init_logging() {
        assert!(init_validation_logging().is_ok());
    }

    #[test]
    fn test_base_types() {
        let source = r#"
name basetypes

type Currency String (pattern="^[A-Z]{3}$")
type Money UnitValue<Decimal,Currency>
type ByteArray Bytes (maxsize=4,minsize=2,x_one,x_two="Hey")
type Tags Array<String> (maxsize=3)
type Counts Map<String,Int32>
type Either Union<Int32,String>
type Color Enum {
    RED
    GREEN
}
type Everything Struct {
    b Bool
    i8 Int8 (min=-2, max=2)
    f Float64
    d Decimal
    s String (values=["a", "b"], default="a")
    t Timestamp
    u UUID (reference=Money)
    tags Tags
    price Money (default="9.99 USD")
    color Color (default=GREEN)
    anything Any
}
"#;
        let summary = check(source).unwrap();
        assert_eq!(summary.types, 8);
        assert_eq!(summary.fields, 11);
        assert_eq!(summary.defaults, 3);
    }

    #[test]
    fn test_field_default_validates() {
        let cases = [
            ("foo Timestamp (default=\"2019-01-14T21:56:18.123Z\")", true),
            ("foo Timestamp (default=23)", false),
            ("foo String (default=\"one\")", true),
            ("foo String (default=[\"one\"])", false),
            ("foo String (minSize=1, default=\"one\")", true),
            ("foo String (minSize=5, default=\"one\")", false),
            ("foo String (maxSize=3, default=\"one\")", true),
            ("foo String (maxSize=2, default=\"one\")", false),
            ("foo String (values=[\"one\",\"two\"], default=\"one\")", true),
            ("foo String (values=[\"one\",\"two\"], default=\"three\")", false),
            ("foo String (pattern=\"^[a-z]*$\", values=[\"one\",\"two\"], default=\"one\")", false),
            ("foo String (pattern=\"^[a-z]*$\", default=\"one\")", true),
            ("foo String (pattern=\"^[a-z]*$\", default=\"three21\")", false),
            ("foo Int8 (default=300)", false),
            ("foo Int32 (min=0, default=-1)", false),
            ("foo Int32 (default=1.5)", false),
            ("foo Decimal (default=3.141592653589793238462643383279502884197169399375105819)", true),
            ("foo Array<Int32> (maxsize=2, default=[1, 2, 3])", false),
            ("foo Array<Int32> (default=[1, \"two\"])", false),
            ("foo Map<String,Bool> (default={\"a\": true})", true),
            ("foo UUID (default=\"1ce437b0-1dd2-11b2-81ef-003ee1be85f9\")", true),
            ("foo UUID (default=\"1ce437b01dd211b281ef003ee1be85f9\")", false),
        ];
        for (field, valid) in cases {
            assert_eq!(check_field(field).is_ok(), valid, "{}", field);
        }
    }

    #[test]
    fn test_string_constraint_messages() {
        let err = check_field("foo String (minSize=5, default=\"one\")").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: not a valid String ('minsize=5' constraint failed): \"one\""
        );
        let err = check_field("foo String (pattern=\"^[a-z]*$\", values=[\"one\"])").unwrap_err();
        assert_matches!(err, ValidationError::PatternAndValues(ref path) if path == "Test.foo");
    }

    #[test]
    fn test_required_with_default() {
        let err = check_field("s String (required, default=\"blah\")").unwrap_err();
        assert_matches!(err, ValidationError::RequiredWithDefault(ref path) if path == "Test.s");
    }

    #[test]
    fn test_undefined_field_type() {
        let err = check("type Foo Struct {\n    b Bar\n}\n").unwrap_err();
        assert_matches!(err, ValidationError::UndefinedType { ref name, .. } if name == "Bar");
        assert_eq!(err.to_string(), "Undefined type 'Bar' in struct field 'Foo.b'");
    }

    #[test]
    fn test_nested_struct_default() {
        let field = |default: &str| {
            format!(
                "mynestedstruct Struct {{ something String; oranother Int32 }} (default={})",
                default
            )
        };
        assert!(check_field(&field("{\"something\": \"Hey\", \"oranother\": 23}")).is_ok());

        let err = check_field(&field("{\"something\": \"Hey\", \"oranother\": \"x\"}")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Test.mynestedstruct.oranother: Not a number: \"x\""
        );
        let err = check_field(&field("{\"something\": \"Hey\", \"other\": 1}")).unwrap_err();
        assert_eq!(err.to_string(), "Undefined field in Test.mynestedstruct: 'other'");
    }

    #[test]
    fn test_embedded_patterns() {
        let source = |default: &str| {
            format!(
                "type Code String (pattern=\"^[A-Z]{{3}}$\")\ntype Ref String (pattern=\"^{{Code}}-[0-9]+$\")\ntype Test Struct {{\n    r Ref (default=\"{}\")\n}}\n",
                default
            )
        };
        assert!(check(&source("ABC-12")).is_ok());
        assert_matches!(
            check(&source("abc-12")),
            Err(ValidationError::ConstraintViolation(_))
        );

        let err = check("type Bad String (pattern=\"^{Missing}$\")\n").unwrap_err();
        assert_matches!(err, ValidationError::InvalidPattern { .. });
        let err = check("type Bad String (pattern=\"^[a-z\")\n").unwrap_err();
        assert_matches!(err, ValidationError::InvalidPattern { .. });
    }

    #[test]
    fn test_conflicting_bounds() {
        assert_matches!(
            check("type Age Int32 (min=10, max=1)\n"),
            Err(ValidationError::ConflictingConstraints { .. })
        );
        assert_matches!(
            check("type Short String (minsize=4, maxsize=2)\n"),
            Err(ValidationError::ConflictingConstraints { .. })
        );
    }

    #[test]
    fn test_unit_value_types() {
        assert!(check("type Currency Enum { USD, EUR }\ntype Money UnitValue<Decimal,Currency>\n").is_ok());
        let err = check("type Bad UnitValue<String,String>\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "UnitValue value type of Bad is not numeric: String"
        );
        let err = check("type Bad UnitValue<Int32,Bool>\n").unwrap_err();
        assert_matches!(err, ValidationError::InvalidUnitValue(_));
        let err = check("type Bad UnitValue<Int32,Unit>\n").unwrap_err();
        assert_matches!(err, ValidationError::UndefinedType { ref name, .. } if name == "Unit");
    }

    #[test]
    fn test_references_resolve() {
        assert_matches!(
            check("type Ids Array<Id>\n"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "Id"
        );
        assert_matches!(
            check("type Lookup Map<String,Thing>\n"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "Thing"
        );
        assert_matches!(
            check("type Either Union<Int32,Other>\n"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "Other"
        );
        assert_matches!(
            check_field("owner UUID (reference=User)"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "User"
        );
    }

    #[test]
    fn test_http_bindings() {
        assert!(check("http GET \"/one/{two}\" {\n    two String\n}\n").is_ok());

        let err = check("http GET \"/one/{two}\" { }\n").unwrap_err();
        assert_matches!(err, ValidationError::InvalidHttpBinding(_));
        assert_eq!(
            err.to_string(),
            "HTTP operation GET /one/{two} has no input parameter for path variable 'two'"
        );

        let err = check("http GET \"/items\" {\n    q String\n}\n").unwrap_err();
        assert_matches!(err, ValidationError::InvalidHttpBinding(_));

        let item = "type Item Struct {\n    id String\n}\n";
        assert!(check(&format!(
            "{}http POST \"/items\" (operation=createItem) {{\n    item Item\n    expect 201 Item\n}}\n",
            item
        ))
        .is_ok());
        let err = check(&format!(
            "{}http POST \"/items\" (operation=createItem) {{\n    a Item\n    b Item\n}}\n",
            item
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP operation createItem has more than one body parameter"
        );
    }

    #[test]
    fn test_http_types_resolve() {
        assert_matches!(
            check("http GET \"/items\" {\n    expect 200 Items\n}\n"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "Items"
        );
        assert_matches!(
            check("http GET \"/items\" {\n    expect 200\n    except 404 NotFound\n}\n"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "NotFound"
        );
        assert_matches!(
            check("http GET \"/items?limit={limit}\" {\n    limit Int32 (default=\"ten\")\n}\n"),
            Err(ValidationError::ConstraintViolation(_))
        );
    }

    #[test]
    fn test_action_types_resolve() {
        let err = check("action getItem(ItemRequest) Item\n").unwrap_err();
        assert_eq!(err.to_string(), "Undefined type 'ItemRequest' in action 'getItem'");
        assert!(check("type Item Struct\ntype Missing Struct\naction getItem(Item) Item except Missing\n").is_ok());
    }

    #[test]
    fn test_examples() {
        let point = "type Point Struct {\n    x Int32 (required)\n    y Int32\n}\n";
        assert!(check(&format!("{}example Point {{\"x\": 1, \"y\": 2}}\n", point)).is_ok());

        let err = check(&format!("{}example Point {{\"y\": 2}}\n", point)).unwrap_err();
        assert_matches!(err, ValidationError::InvalidExample { ref target, .. } if target == "Point");

        assert_matches!(
            check("example Nope {}\n"),
            Err(ValidationError::UndefinedType { ref name, .. }) if name == "Nope"
        );
    }
}
