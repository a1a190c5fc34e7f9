//! Decompile a [`Model`] back into SADL source
//!
//! The output re-parses into an equivalent schema. Layout is normalized:
//! four-space indentation, one directive per line, long comments wrapped into
//! `//` blocks and short member comments kept on the member's line. Extension
//! results are not rendered.

use crate::logging::codes;
use crate::model::literal::quote;
use crate::model::{
    Annotations, EnumElementDef, ExampleDef, HttpDef, HttpParamSpec, Model, OperationDef,
    ParamBinding, StructFieldDef, TypeDef, TypeSpec,
};
use crate::{log_debug, log_success};

const INDENT: &str = "    ";
const COMMENT_WIDTH: usize = 100;

/// Render `model` as SADL source
pub fn decompile(model: &Model) -> String {
    log_debug!("Decompiling model", "schema" => &model.name);

    let mut writer = SadlWriter::default();
    writer.header(model);
    for td in &model.types {
        writer.type_def(td);
    }
    for action in &model.actions {
        writer.action(action);
    }
    for hd in &model.http {
        writer.http(hd);
    }
    for example in &model.examples {
        writer.example(example);
    }

    log_success!(
        codes::success::DECOMPILE_COMPLETE,
        "Model decompiled",
        "schema" => &model.name,
        "bytes" => writer.out.len()
    );
    writer.out
}

#[derive(Default)]
struct SadlWriter {
    out: String,
}

impl SadlWriter {
    fn line(&mut self, indent: &str, text: &str) {
        self.out.push_str(indent);
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `// ...` lines wrapped at the comment width
    fn block_comment(&mut self, indent: &str, comment: &str) {
        let mut line = String::new();
        for word in comment.split_whitespace() {
            if !line.is_empty() && line.len() + word.len() + 1 > COMMENT_WIDTH {
                self.line(indent, &format!("// {}", line));
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            self.line(indent, &format!("// {}", line));
        }
    }

    fn header(&mut self, model: &Model) {
        self.block_comment("", &model.comment);
        if !model.namespace.is_empty() {
            self.line("", &format!("namespace {}", quote(&model.namespace)));
        }
        if !model.name.is_empty() {
            self.line("", &format!("name {}", symbol_or_string(&model.name)));
        }
        if !model.version.is_empty() {
            self.line("", &format!("version {}", quote(&model.version)));
        }
        if !model.base.is_empty() {
            self.line("", &format!("base {}", quote(&model.base)));
        }
        for (key, value) in &model.annotations {
            if value.is_empty() {
                self.line("", key);
            } else {
                self.line("", &format!("{} {}", key, quote(value)));
            }
        }
    }

    // ========================================================================
    // TYPES
    // ========================================================================

    fn type_def(&mut self, td: &TypeDef) {
        self.out.push('\n');
        self.block_comment("", &td.comment);
        let mut opts = Vec::new();
        annotation_options(&td.annotations, &mut opts);
        let spec = self.spec(&td.spec, opts, "");
        self.line("", &format!("type {} {}", td.name, spec));
    }

    /// A type spec followed by its option list. `extra` holds options that
    /// belong to the enclosing field or parameter.
    fn spec(&mut self, spec: &TypeSpec, extra: Vec<String>, indent: &str) -> String {
        let mut opts = constraint_options(spec);
        opts.extend(extra);
        let text = match spec {
            TypeSpec::Struct { fields } => self.struct_body(fields, indent),
            TypeSpec::Enum { elements } => enum_body(elements, indent),
            other => other.to_string(),
        };
        with_options(text, &opts)
    }

    fn struct_body(&mut self, fields: &[StructFieldDef], indent: &str) -> String {
        if fields.is_empty() {
            return "Struct {\n".to_string() + indent + "}";
        }
        let inner = format!("{}{}", indent, INDENT);
        let mut body = String::from("Struct {\n");
        for field in fields {
            let mut opts = Vec::new();
            if field.required {
                opts.push("required".to_string());
            }
            if let Some(default) = &field.default {
                opts.push(format!("default={}", default));
            }
            annotation_options(&field.annotations, &mut opts);
            let spec = self.spec(&field.spec, opts, &inner);
            body.push_str(&format!(
                "{}{} {}{}\n",
                inner,
                field.name,
                spec,
                trailing_comment(&field.comment)
            ));
        }
        body.push_str(indent);
        body.push('}');
        body
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    fn action(&mut self, action: &OperationDef) {
        self.out.push('\n');
        self.block_comment("", &action.comment);
        let mut text = format!(
            "action {}({})",
            action.name,
            action.input.as_deref().unwrap_or("")
        );
        if let Some(output) = &action.output {
            text.push(' ');
            text.push_str(output);
        }
        if !action.exceptions.is_empty() {
            text.push_str(" except ");
            text.push_str(&action.exceptions.join(", "));
        }
        let mut opts = Vec::new();
        annotation_options(&action.annotations, &mut opts);
        self.line("", &with_options(text, &opts));
    }

    fn http(&mut self, hd: &HttpDef) {
        self.out.push('\n');
        self.block_comment("", &hd.comment);
        let mut opts = Vec::new();
        if let Some(name) = &hd.name {
            opts.push(format!("operation={}", name));
        }
        annotation_options(&hd.annotations, &mut opts);
        let head = with_options(format!("http {} {}", hd.method, quote(&hd.path)), &opts);
        self.line("", &format!("{} {{", head));

        for param in &hd.inputs {
            let text = self.param(param, INDENT);
            self.line(INDENT, &text);
        }

        if let Some(expected) = &hd.expected {
            self.block_comment(INDENT, &expected.comment);
            let mut opts = Vec::new();
            annotation_options(&expected.annotations, &mut opts);
            let head = with_options(format!("expect {}", expected.status), &opts);
            if expected.outputs.is_empty() {
                self.line(INDENT, &head);
            } else {
                self.line(INDENT, &format!("{} {{", head));
                let inner = format!("{}{}", INDENT, INDENT);
                for output in &expected.outputs {
                    let text = self.param(output, &inner);
                    self.line(&inner, &text);
                }
                self.line(INDENT, "}");
            }
        }

        for exception in &hd.exceptions {
            self.block_comment(INDENT, &exception.comment);
            let mut text = String::from("except ");
            if exception.status != 0 {
                text.push_str(&format!("{} ", exception.status));
            }
            text.push_str(&exception.type_name);
            let mut opts = Vec::new();
            annotation_options(&exception.annotations, &mut opts);
            self.line(INDENT, &with_options(text, &opts));
        }
        self.line("", "}");
    }

    fn param(&mut self, param: &HttpParamSpec, indent: &str) -> String {
        let mut opts = Vec::new();
        if param.required {
            opts.push("required".to_string());
        }
        if let Some(default) = &param.default {
            opts.push(format!("default={}", default));
        }
        if let ParamBinding::Header(name) = &param.binding {
            opts.push(format!("header={}", quote(name)));
        }
        annotation_options(&param.annotations, &mut opts);
        let spec = self.spec(&param.spec, opts, indent);
        format!("{} {}{}", param.name, spec, trailing_comment(&param.comment))
    }

    fn example(&mut self, example: &ExampleDef) {
        self.out.push('\n');
        self.block_comment("", &example.comment);
        self.line("", &format!("example {} {}", example.target, example.example));
    }
}

fn enum_body(elements: &[EnumElementDef], indent: &str) -> String {
    let mut body = String::from("Enum {\n");
    for element in elements {
        let mut opts = Vec::new();
        annotation_options(&element.annotations, &mut opts);
        body.push_str(&format!(
            "{}{}{}{}\n",
            indent,
            INDENT,
            with_options(element.symbol.clone(), &opts),
            trailing_comment(&element.comment)
        ));
    }
    body.push_str(indent);
    body.push('}');
    body
}

/// The structural constraints a spec carries, as option entries
fn constraint_options(spec: &TypeSpec) -> Vec<String> {
    let mut opts = Vec::new();
    match spec {
        TypeSpec::Number { min, max, .. } => {
            if let Some(min) = min {
                opts.push(format!("min={}", min));
            }
            if let Some(max) = max {
                opts.push(format!("max={}", max));
            }
        }
        TypeSpec::String(s) => {
            if let Some(pattern) = &s.pattern {
                opts.push(format!("pattern={}", quote(pattern)));
            }
            if let Some(values) = &s.values {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                opts.push(format!("values=[{}]", quoted.join(", ")));
            }
            size_options(s.min_size, s.max_size, &mut opts);
            if let Some(reference) = &s.reference {
                opts.push(format!("reference={}", reference));
            }
        }
        TypeSpec::Uuid {
            reference: Some(reference),
        } => opts.push(format!("reference={}", reference)),
        TypeSpec::Bytes { min_size, max_size }
        | TypeSpec::Array {
            min_size, max_size, ..
        }
        | TypeSpec::Map {
            min_size, max_size, ..
        } => size_options(*min_size, *max_size, &mut opts),
        _ => {}
    }
    opts
}

fn size_options(min: Option<i32>, max: Option<i32>, opts: &mut Vec<String>) {
    if let Some(min) = min {
        opts.push(format!("minsize={}", min));
    }
    if let Some(max) = max {
        opts.push(format!("maxsize={}", max));
    }
}

fn annotation_options(annotations: &Annotations, opts: &mut Vec<String>) {
    for (key, value) in annotations {
        if value.is_empty() {
            opts.push(key.clone());
        } else {
            opts.push(format!("{}={}", key, quote(value)));
        }
    }
}

/// Bare when `text` scans as a single symbol, quoted otherwise
fn symbol_or_string(text: &str) -> String {
    let mut chars = text.chars();
    let is_symbol = chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if is_symbol {
        text.to_string()
    } else {
        quote(text)
    }
}

fn with_options(text: String, opts: &[String]) -> String {
    if opts.is_empty() {
        return text;
    }
    format!("{} ({})", text, opts.join(", "))
}

fn trailing_comment(comment: &str) -> String {
    if comment.is_empty() {
        return String::new();
    }
    format!(" // {}", comment)
}
