//! Template loading and Ballerina type descriptors

use openapi_typegen_common::{
    RecordMember, Result, ScalarKind, TypeExpression, TypeShape, TypegenError,
};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Template name of the types file
pub const TYPES_TEMPLATE: &str = "types.bal";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("bal_type", bal_type_filter);
    tera.register_filter("bal_union", bal_union_filter);
    tera.register_filter("bal_scalar", bal_scalar_filter);
    tera.register_filter("bal_string", bal_string_filter);

    tera.add_raw_template(TYPES_TEMPLATE, include_str!("../templates/types.bal.tera"))
        .map_err(|e| {
            TypegenError::Generation(format!("Failed to load {} template: {}", TYPES_TEMPLATE, e))
        })?;

    Ok(tera)
}

/// Ballerina keyword for a scalar kind
pub fn scalar_keyword(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "string",
        ScalarKind::Int => "int",
        ScalarKind::Float => "float",
        ScalarKind::Decimal => "decimal",
        ScalarKind::Boolean => "boolean",
    }
}

/// Ballerina type descriptor for an expression
///
/// Unions are parenthesized wherever a suffix follows them, so a nullable
/// union renders as `(Cat|Dog)?` and an array of one as `(Cat|Dog)[]`.
pub fn type_descriptor(expr: &TypeExpression) -> String {
    let base = match &expr.shape {
        TypeShape::NamedReference(name) => name.clone(),
        TypeShape::Scalar(kind) => scalar_keyword(*kind).to_string(),
        TypeShape::Any => "anydata".to_string(),
        TypeShape::Array(element) => format!("{}[]", suffixable(element)),
        TypeShape::Union(members) => union_descriptor(members),
        TypeShape::InlineRecord(members) => record_descriptor(members),
    };

    if expr.nullable {
        if matches!(expr.shape, TypeShape::Union(_)) {
            format!("({})?", base)
        } else {
            format!("{}?", base)
        }
    } else {
        base
    }
}

fn suffixable(expr: &TypeExpression) -> String {
    let descriptor = type_descriptor(expr);
    if expr.nullable || matches!(expr.shape, TypeShape::Union(_)) {
        format!("({})", descriptor)
    } else {
        descriptor
    }
}

fn union_descriptor(members: &[TypeExpression]) -> String {
    members
        .iter()
        .map(type_descriptor)
        .collect::<Vec<_>>()
        .join("|")
}

fn record_descriptor(members: &[RecordMember]) -> String {
    let mut out = String::from("record {");
    for member in members {
        match member {
            RecordMember::Inclusion { name } => {
                out.push_str(&format!(" *{};", name));
            }
            RecordMember::Field(field) => {
                out.push_str(&format!(
                    " {} {}{};",
                    type_descriptor(&field.type_expr),
                    field.name,
                    if field.required { "" } else { "?" }
                ));
            }
        }
    }
    out.push_str(" }");
    out
}

/// Quoted Ballerina string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn parse_expression(value: &Value, filter: &str) -> tera::Result<TypeExpression> {
    serde_json::from_value(value.clone()).map_err(|e| {
        tera::Error::msg(format!("{} filter expects a type expression: {}", filter, e))
    })
}

/// `{{ field.type_expr | bal_type }}`, or `bal_type(array=true)` to wrap in an array
fn bal_type_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let expr = parse_expression(value, "bal_type")?;
    let as_array = args.get("array").and_then(Value::as_bool).unwrap_or(false);

    let descriptor = if as_array {
        type_descriptor(&TypeExpression::array(expr))
    } else {
        type_descriptor(&expr)
    };
    Ok(Value::String(descriptor))
}

/// `{{ decl.members | bal_union }}`
fn bal_union_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let members = value
        .as_array()
        .ok_or_else(|| tera::Error::msg("bal_union filter expects a list of type expressions"))?
        .iter()
        .map(|member| parse_expression(member, "bal_union"))
        .collect::<tera::Result<Vec<_>>>()?;

    Ok(Value::String(union_descriptor(&members)))
}

/// `{{ decl.scalar | bal_scalar(nullable=decl.nullable) }}`
fn bal_scalar_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let kind: ScalarKind = serde_json::from_value(value.clone())
        .map_err(|e| tera::Error::msg(format!("bal_scalar filter expects a scalar kind: {}", e)))?;
    let nullable = args.get("nullable").and_then(Value::as_bool).unwrap_or(false);

    let mut keyword = scalar_keyword(kind).to_string();
    if nullable {
        keyword.push('?');
    }
    Ok(Value::String(keyword))
}

/// `{{ member.value | bal_string }}`
fn bal_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("bal_string filter expects a string"))?;
    Ok(Value::String(string_literal(s)))
}
