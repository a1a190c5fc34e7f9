//! HTTP operation bindings
//!
//! Parameter bindings are inferred from the path template when the operation
//! is parsed: `{name}` in the path binds a path parameter, `key={name}` in
//! the query part binds a query parameter, an explicit `header="..."` option
//! binds a header, and anything left over is the request body.

use super::literal::Literal;
use super::schema::{Annotations, TypeSpec};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
}

impl HttpMethod {
    /// Case-insensitive match against the supported methods
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "PUT" => Some(HttpMethod::Put),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Only POST and PUT carry a request body
    pub fn accepts_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "in", content = "key")]
pub enum ParamBinding {
    Path,
    /// Bound to the named query parameter
    Query(String),
    /// Bound to the named header
    Header(String),
    Body,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpParamSpec {
    pub name: String,
    #[serde(flatten)]
    pub spec: TypeSpec,
    pub binding: ParamBinding,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl HttpParamSpec {
    pub fn new(name: impl Into<String>, spec: TypeSpec, binding: ParamBinding) -> Self {
        Self {
            name: name.into(),
            spec,
            binding,
            required: false,
            default: None,
            comment: String::new(),
            annotations: Annotations::new(),
        }
    }
}

/// The success response: status plus header and body outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpExpectedSpec {
    pub status: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<HttpParamSpec>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

/// An error response. A status of 0 stands for "any other status".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpExceptionSpec {
    pub status: i32,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpDef {
    pub method: HttpMethod,
    pub path: String,
    /// Operation name from the `operation=` option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<HttpParamSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<HttpExpectedSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<HttpExceptionSpec>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
}

impl HttpDef {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            name: None,
            inputs: Vec::new(),
            expected: None,
            exceptions: Vec::new(),
            comment: String::new(),
            annotations: Annotations::new(),
        }
    }

    pub fn body_params(&self) -> impl Iterator<Item = &HttpParamSpec> {
        self.inputs
            .iter()
            .filter(|p| p.binding == ParamBinding::Body)
    }

    /// A label for diagnostics: the operation name, or `METHOD path`
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// Split a path template into its path and query parts at the first `?`
pub fn split_template(template: &str) -> (&str, &str) {
    match template.split_once('?') {
        Some((path, query)) => (path, query),
        None => (template, ""),
    }
}

/// Variable names written as `{name}` in the path part of a template
pub fn path_variables(template: &str) -> Vec<&str> {
    let (path, _) = split_template(template);
    let mut vars = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                vars.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    vars
}

/// Work out how a parameter named `name` is bound by the template
pub fn binding_for(template: &str, name: &str) -> ParamBinding {
    let (path, query) = split_template(template);
    let placeholder = format!("{{{}}}", name);
    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if value == placeholder {
                return ParamBinding::Query(key.to_string());
            }
        }
    }
    if path.contains(&placeholder) {
        return ParamBinding::Path;
    }
    ParamBinding::Body
}

/// Check that template braces are balanced and not nested, that each `{`
/// opens directly after a `/` in the path part (or after `=` in the query
/// part), and that each variable closes before the next `/`.
pub fn check_path_template(template: &str) -> Result<(), String> {
    let (path, query) = split_template(template);
    check_template_part(path, '/', template)?;
    if !query.is_empty() {
        check_template_part(query, '=', template)?;
    }
    Ok(())
}

fn check_template_part(part: &str, opener: char, template: &str) -> Result<(), String> {
    let bad = |why: &str| format!("Bad path template {:?}: {}", template, why);
    let mut open = false;
    let mut prev: Option<char> = None;
    for ch in part.chars() {
        match ch {
            '{' => {
                if open {
                    return Err(bad("nested '{'"));
                }
                if prev != Some(opener) {
                    return Err(bad(&format!("'{{' must follow '{}'", opener)));
                }
                open = true;
            }
            '}' => {
                if !open {
                    return Err(bad("unbalanced '}'"));
                }
                if prev == Some('{') {
                    return Err(bad("empty variable"));
                }
                open = false;
            }
            '/' if open => return Err(bad("unclosed '{'")),
            _ => {}
        }
        prev = Some(ch);
    }
    if open {
        return Err(bad("unclosed '{'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        let template = "/items/{id}?limit={max}&skip={skip}";
        assert_eq!(binding_for(template, "id"), ParamBinding::Path);
        assert_eq!(
            binding_for(template, "max"),
            ParamBinding::Query("limit".into())
        );
        assert_eq!(binding_for(template, "body"), ParamBinding::Body);
        assert_eq!(path_variables(template), vec!["id"]);
    }

    #[test]
    fn test_path_templates() {
        assert!(check_path_template("/one/{two}").is_ok());
        assert!(check_path_template("/one/{two}/three?x={y}").is_ok());
        assert!(check_path_template("/").is_ok());
        for bad in ["/one/{two", "/one/{two}}", "/one{/two}", "/one/{{two}", "/one/{}"] {
            assert!(check_path_template(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(HttpMethod::parse("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("PATCH"), None);
        assert!(HttpMethod::Put.accepts_body());
        assert!(!HttpMethod::Delete.accepts_body());
    }
}
