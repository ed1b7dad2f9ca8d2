use indexmap::IndexMap;
use serde_json::Value;

use super::style::{ParamValue, Style, serialize};
use crate::error::ResolveError;
use crate::har::NameValue;
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};

/// A parameter with its value picked and its encoding settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    pub name: String,
    pub location: ParameterLocation,
    pub value: ParamValue,
    pub style: Option<Style>,
    pub explode: Option<bool>,
}

impl ResolvedParam {
    pub fn serialize(&self) -> Vec<NameValue> {
        serialize(
            &self.name,
            &self.value,
            self.location,
            self.style,
            self.explode,
        )
    }
}

/// The value a parameter takes when the caller or the document provides one.
///
/// Precedence: caller value, parameter `default`, schema `default`,
/// parameter `example`, schema `example`, then the first `examples` entry.
pub fn explicit_value(
    param: &Parameter,
    values: &IndexMap<String, Value>,
    resolver: &RefResolver<'_>,
) -> Result<Option<Value>, ResolveError> {
    if let Some(value) = values.get(&param.name) {
        return Ok(Some(value.clone()));
    }
    if let Some(value) = &param.default_value {
        return Ok(Some(value.clone()));
    }
    let schema = parameter_schema(param, resolver)?;
    if let Some(value) = schema.as_ref().and_then(|s| s.default_value.clone()) {
        return Ok(Some(value));
    }
    if let Some(value) = &param.example {
        return Ok(Some(value.clone()));
    }
    if let Some(value) = schema.as_ref().and_then(|s| s.example.clone()) {
        return Ok(Some(value));
    }
    match param.examples.values().next() {
        Some(example) => resolver.resolve_example(example),
        None => Ok(None),
    }
}

/// Explicit value, falling back to a `SOME_<TYPE>_VALUE` placeholder.
pub fn value_or_placeholder(
    param: &Parameter,
    values: &IndexMap<String, Value>,
    resolver: &RefResolver<'_>,
) -> Result<Value, ResolveError> {
    match explicit_value(param, values, resolver)? {
        Some(value) => Ok(value),
        None => Ok(Value::String(placeholder(param, resolver)?)),
    }
}

/// `SOME_STRING_VALUE`, `SOME_INTEGER_VALUE`, ...
pub fn placeholder(param: &Parameter, resolver: &RefResolver<'_>) -> Result<String, ResolveError> {
    let type_name = match &param.param_type {
        Some(t) => t.clone(),
        None => schema_type_name(param, resolver)?.to_string(),
    };
    Ok(format!("SOME_{}_VALUE", type_name.to_uppercase()))
}

fn schema_type_name(
    param: &Parameter,
    resolver: &RefResolver<'_>,
) -> Result<&'static str, ResolveError> {
    let Some(schema) = parameter_schema(param, resolver)? else {
        return Ok(SchemaType::String.as_str());
    };
    let referenced = matches!(param.schema, Some(SchemaOrRef::Ref { .. }));
    Ok(match schema.effective_type() {
        Some(t) => t.as_str(),
        None if referenced => SchemaType::Object.as_str(),
        None => SchemaType::String.as_str(),
    })
}

/// The parameter's schema with one level of `$ref` resolved. External
/// references are skipped.
fn parameter_schema(
    param: &Parameter,
    resolver: &RefResolver<'_>,
) -> Result<Option<Schema>, ResolveError> {
    let Some(schema) = &param.schema else {
        return Ok(None);
    };
    match resolver.resolve_schema(schema) {
        Ok(schema) => Ok(Some(schema)),
        Err(ResolveError::ExternalRef(r)) => {
            log::warn!("skipping external schema reference {} on parameter {}", r, param.name);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
