//! HTTP operation, action and example checks

use super::error::{ValidationError, ValidationResult};
use super::types::Site;
use super::Validator;
use crate::model::http::{path_variables, split_template};
use crate::model::{ExampleDef, HttpDef, HttpParamSpec, OperationDef};

impl<'m> Validator<'m> {
    pub(super) fn check_http(&self, hd: &HttpDef) -> ValidationResult<()> {
        let label = hd.label();
        for param in &hd.inputs {
            self.check_param(&label, param)?;
        }

        for var in template_variables(&hd.path) {
            if !hd.inputs.iter().any(|p| p.name == var) {
                return Err(ValidationError::InvalidHttpBinding(format!(
                    "HTTP operation {} has no input parameter for path variable '{}'",
                    label, var
                )));
            }
        }

        let bodies: Vec<&HttpParamSpec> = hd.body_params().collect();
        if !hd.method.accepts_body() {
            if let Some(param) = bodies.first() {
                return Err(ValidationError::InvalidHttpBinding(format!(
                    "HTTP {} operation {} cannot have a body parameter: '{}'",
                    hd.method, label, param.name
                )));
            }
        } else if bodies.len() > 1 {
            return Err(ValidationError::InvalidHttpBinding(format!(
                "HTTP operation {} has more than one body parameter",
                label
            )));
        }

        if let Some(expected) = &hd.expected {
            for output in &expected.outputs {
                self.check_param(&label, output)?;
            }
        }
        for exception in &hd.exceptions {
            let site = Site::new("http exception", format!("{} {}", label, exception.status));
            self.require_type(&site, &exception.type_name)?;
        }
        Ok(())
    }

    fn check_param(&self, label: &str, param: &HttpParamSpec) -> ValidationResult<()> {
        let site = Site::new("http parameter", format!("{}.{}", label, param.name));
        self.check_spec(&site, &param.spec)?;
        if let Some(default) = &param.default {
            if param.required {
                return Err(ValidationError::RequiredWithDefault(site.path));
            }
            self.check_literal(&site.path, &param.spec, default)?;
        }
        Ok(())
    }

    pub(super) fn check_action(&self, action: &OperationDef) -> ValidationResult<()> {
        let site = Site::new("action", action.name.as_str());
        let names = action
            .input
            .iter()
            .chain(action.output.iter())
            .chain(action.exceptions.iter());
        for name in names {
            self.require_type(&site, name)?;
        }
        Ok(())
    }

    pub(super) fn check_example(&self, example: &ExampleDef) -> ValidationResult<()> {
        let target = self
            .model
            .find_type(&example.target)
            .ok_or_else(|| ValidationError::undefined_type(&example.target, "example"))?;
        self.check_literal(&example.target, &target.spec, &example.example)
            .map_err(|e| ValidationError::InvalidExample {
                target: example.target.clone(),
                message: e.to_string(),
            })
    }
}

/// `{var}` names in the path part plus `key={var}` names in the query part
fn template_variables(template: &str) -> Vec<&str> {
    let (_, query) = split_template(template);
    let mut vars = path_variables(template);
    for pair in query.split('&') {
        if let Some((_, value)) = pair.split_once('=') {
            if let Some(var) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
                vars.push(var);
            }
        }
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_variables() {
        assert_eq!(
            template_variables("/items/{id}/parts/{part}?limit={limit}&sort=asc"),
            vec!["id", "part", "limit"]
        );
        assert!(template_variables("/items").is_empty());
    }
}
