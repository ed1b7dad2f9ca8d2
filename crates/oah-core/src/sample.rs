//! Schema sampling: turning a (possibly referenced) schema into one concrete
//! example value.
//!
//! The translator only depends on the [`Sampler`] trait. [`SchemaSampler`]
//! is the default implementation.

use serde_json::{Map, Value, json};

use crate::error::SampleError;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

/// Knobs passed to a [`Sampler`] on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOptions {
    /// Omit `readOnly` properties (request payloads never carry them).
    pub skip_read_only: bool,
    /// Omit `writeOnly` properties.
    pub skip_write_only: bool,
    /// Only emit properties listed in `required`.
    pub skip_non_required: bool,
    /// Nesting depth after which `null` is produced.
    pub max_depth: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            skip_read_only: true,
            skip_write_only: false,
            skip_non_required: false,
            max_depth: 16,
        }
    }
}

/// Upper bound on the items sampled for one array, whatever its `minItems`.
pub const MAX_SAMPLE_ITEMS: u64 = 32;

/// Produces one example value for a schema.
pub trait Sampler {
    fn sample(
        &self,
        schema: &SchemaOrRef,
        options: &SampleOptions,
        resolver: &RefResolver<'_>,
    ) -> Result<Value, SampleError>;
}

/// Deterministic example generator: explicit examples and defaults first,
/// then a fixed placeholder per type and format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaSampler;

impl Sampler for SchemaSampler {
    fn sample(
        &self,
        schema: &SchemaOrRef,
        options: &SampleOptions,
        resolver: &RefResolver<'_>,
    ) -> Result<Value, SampleError> {
        let mut walk = Walk {
            options,
            resolver,
            ref_stack: Vec::new(),
        };
        walk.sample_or_ref(schema, 0)
    }
}

struct Walk<'o, 'r, 'a> {
    options: &'o SampleOptions,
    resolver: &'r RefResolver<'a>,
    ref_stack: Vec<String>,
}

impl Walk<'_, '_, '_> {
    fn sample_or_ref(&mut self, schema: &SchemaOrRef, depth: usize) -> Result<Value, SampleError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                let target = self.resolver.resolve_schema(schema)?;
                if self.ref_stack.contains(ref_path) {
                    return Ok(empty_value(&target));
                }
                self.ref_stack.push(ref_path.clone());
                let result = self.sample_schema(&target, depth);
                self.ref_stack.pop();
                result
            }
            SchemaOrRef::Schema(s) => self.sample_schema(s, depth),
        }
    }

    fn sample_schema(&mut self, schema: &Schema, depth: usize) -> Result<Value, SampleError> {
        if depth > self.options.max_depth {
            return Ok(Value::Null);
        }
        if let Some(value) = &schema.const_value {
            return Ok(value.clone());
        }
        if let Some(value) = &schema.example {
            return Ok(value.clone());
        }
        if let Some(value) = &schema.default_value {
            return Ok(value.clone());
        }
        if let Some(first) = schema.enum_values.first() {
            return Ok(first.clone());
        }
        if !schema.all_of.is_empty() {
            return self.sample_all_of(schema, depth);
        }
        if let Some(first) = schema.one_of.first().or_else(|| schema.any_of.first()) {
            return self.sample_or_ref(first, depth + 1);
        }

        match schema.effective_type() {
            Some(SchemaType::Object) => self.sample_object(schema, depth),
            Some(SchemaType::Array) => self.sample_array(schema, depth),
            Some(SchemaType::String) | Some(SchemaType::File) => {
                Ok(Value::String(string_for_format(schema.format.as_deref()).to_string()))
            }
            Some(SchemaType::Integer) => Ok(json!(schema.minimum.unwrap_or(0.0) as i64)),
            Some(SchemaType::Number) => Ok(number(schema.minimum.unwrap_or(0.0))),
            Some(SchemaType::Boolean) => Ok(Value::Bool(true)),
            Some(SchemaType::Null) | None => Ok(Value::Null),
        }
    }

    fn sample_object(&mut self, schema: &Schema, depth: usize) -> Result<Value, SampleError> {
        let mut object = Map::new();
        for (name, property) in &schema.properties {
            if self.options.skip_non_required && !schema.required.contains(name) {
                continue;
            }
            if self.is_skipped(property)? {
                continue;
            }
            object.insert(name.clone(), self.sample_or_ref(property, depth + 1)?);
        }

        if schema.properties.is_empty() {
            if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
                let value = self.sample_or_ref(extra, depth + 1)?;
                object.insert("property1".to_string(), value.clone());
                object.insert("property2".to_string(), value);
            }
        }
        Ok(Value::Object(object))
    }

    fn sample_array(&mut self, schema: &Schema, depth: usize) -> Result<Value, SampleError> {
        let count = schema.min_items.unwrap_or(1).min(MAX_SAMPLE_ITEMS) as usize;
        let Some(items) = &schema.items else {
            return Ok(Value::Array(Vec::new()));
        };
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.sample_or_ref(items, depth + 1)?);
        }
        Ok(Value::Array(values))
    }

    /// Merge the samples of every `allOf` member (and the schema's own
    /// properties). Object samples are merged key by key; a mix of object
    /// and scalar samples cannot be satisfied.
    fn sample_all_of(&mut self, schema: &Schema, depth: usize) -> Result<Value, SampleError> {
        let mut merged: Option<Value> = None;
        let own = Schema {
            all_of: Vec::new(),
            ..schema.clone()
        };
        let own_sample = if own.effective_type().is_some() {
            Some(self.sample_schema(&own, depth)?)
        } else {
            None
        };

        for part in &schema.all_of {
            let value = self.sample_or_ref(part, depth + 1)?;
            merged = Some(merge(merged, value)?);
        }
        if let Some(value) = own_sample {
            merged = Some(merge(merged, value)?);
        }
        Ok(merged.unwrap_or(Value::Null))
    }

    fn is_skipped(&self, property: &SchemaOrRef) -> Result<bool, SampleError> {
        if !self.options.skip_read_only && !self.options.skip_write_only {
            return Ok(false);
        }
        let resolved = match property {
            SchemaOrRef::Schema(s) => s.as_ref().clone(),
            SchemaOrRef::Ref { .. } => self.resolver.resolve_schema(property)?,
        };
        Ok((self.options.skip_read_only && resolved.read_only == Some(true))
            || (self.options.skip_write_only && resolved.write_only == Some(true)))
    }
}

fn merge(acc: Option<Value>, next: Value) -> Result<Value, SampleError> {
    match (acc, next) {
        (None, next) => Ok(next),
        (Some(acc), Value::Null) => Ok(acc),
        (Some(Value::Null), next) => Ok(next),
        (Some(Value::Object(mut acc)), Value::Object(next)) => {
            acc.extend(next);
            Ok(Value::Object(acc))
        }
        (Some(acc), next) if acc.is_object() || next.is_object() => Err(
            SampleError::Unsatisfiable(format!("allOf mixes {} and {}", acc, next)),
        ),
        (Some(_), next) => Ok(next),
    }
}

/// Placeholder for a recursive reference: keeps the shape, drops the content.
fn empty_value(schema: &Schema) -> Value {
    match schema.effective_type() {
        Some(SchemaType::Object) => Value::Object(Map::new()),
        Some(SchemaType::Array) => Value::Array(Vec::new()),
        _ => Value::Null,
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn string_for_format(format: Option<&str>) -> &'static str {
    match format {
        Some("date-time") => "2019-08-24T14:15:22Z",
        Some("date") => "2019-08-24",
        Some("email") => "user@example.com",
        Some("uuid") => "095be615-a8ad-4c33-8e9c-c7612fbf6c9f",
        Some("uri") | Some("url") => "http://example.com",
        Some("hostname") => "example.com",
        Some("ipv4") => "192.168.0.1",
        Some("ipv6") => "2001:0db8:85a3:0000:0000:8a2e:0370:7334",
        Some("password") => "pa$$word",
        Some("byte") => "U3dhZ2dlciByb2Nrcw==",
        _ => "string",
    }
}
