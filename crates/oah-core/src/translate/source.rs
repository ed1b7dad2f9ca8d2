//! Version adapters. Swagger 2.0 and OpenAPI 3.x disagree on where
//! encodings, request bodies and response types live; everything else in
//! the translator is shared.

use indexmap::IndexMap;
use serde_json::Value;

use super::payload::{self, FORM_URLENCODED, JSON, MULTIPART, SUPPORTED_CONTENT_TYPES};
use super::style::{ParamValue, Style};
use super::values::{ResolvedParam, value_or_placeholder};
use crate::error::{ResolveError, TranslateError};
use crate::har::PostData;
use crate::parse::operation::Operation;
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::request_body::RequestBody;
use crate::parse::spec::{ApiDocument, SpecVersion};
use crate::sample::{SampleOptions, Sampler};

/// Everything known about one operation while it is being translated.
pub struct OperationContext<'a> {
    pub document: &'a ApiDocument,
    pub resolver: RefResolver<'a>,
    pub operation: &'a Operation,
    /// Path-level and operation-level parameters after merging.
    pub parameters: &'a [Parameter],
    pub values: &'a IndexMap<String, Value>,
}

impl OperationContext<'_> {
    fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// Parameter encodings and the response type a request accepts.
pub trait ParameterSource {
    /// The `style` and `explode` a parameter is serialized with. `None`
    /// leaves the location default in place.
    fn encoding(&self, param: &Parameter) -> (Option<Style>, Option<bool>);

    /// Value of the `accept` header.
    fn accept(&self, ctx: &OperationContext<'_>) -> Option<String>;
}

/// Request payloads of an operation.
pub trait BodySource {
    /// One payload per content type that could be synthesized, in order.
    fn payloads(
        &self,
        ctx: &OperationContext<'_>,
        sampler: &dyn Sampler,
        options: &SampleOptions,
    ) -> Result<Vec<PostData>, TranslateError>;

    /// First declared request content type, for records without a payload.
    fn request_content_type(&self, ctx: &OperationContext<'_>) -> Option<String>;
}

pub trait Dialect: ParameterSource + BodySource {}

impl<T: ParameterSource + BodySource> Dialect for T {}

/// The adapter matching a document's version.
pub fn dialect(version: SpecVersion) -> &'static dyn Dialect {
    match version {
        SpecVersion::Swagger2 => &Swagger2,
        SpecVersion::OpenApi3 => &OpenApi3,
    }
}

fn declared_style(param: &Parameter) -> Option<Style> {
    let name = param.style.as_deref()?;
    let style = Style::parse(name);
    if style.is_none() {
        log::warn!("unknown style {} on parameter {}, using the default", name, param.name);
    }
    style
}

/// Swagger 2.0: `collectionFormat`, `produces`/`consumes`, `body` and
/// `formData` parameters.
#[derive(Debug, Clone, Copy)]
pub struct Swagger2;

impl ParameterSource for Swagger2 {
    fn encoding(&self, param: &Parameter) -> (Option<Style>, Option<bool>) {
        if let Some(style) = declared_style(param) {
            return (Some(style), param.explode);
        }
        let format = match (&param.collection_format, &param.param_type) {
            (Some(format), _) => format.as_str(),
            (None, Some(t)) if t == "array" => "csv",
            _ => return (None, param.explode),
        };
        match format {
            "ssv" => (Some(Style::SpaceDelimited), Some(false)),
            "tsv" => (Some(Style::TabDelimited), Some(false)),
            "pipes" => (Some(Style::PipeDelimited), Some(false)),
            "multi" => (Some(Style::Form), Some(true)),
            _ => (None, Some(false)),
        }
    }

    fn accept(&self, ctx: &OperationContext<'_>) -> Option<String> {
        ctx.operation
            .produces
            .first()
            .or_else(|| ctx.document.spec.produces.first())
            .cloned()
    }
}

impl BodySource for Swagger2 {
    fn payloads(
        &self,
        ctx: &OperationContext<'_>,
        sampler: &dyn Sampler,
        options: &SampleOptions,
    ) -> Result<Vec<PostData>, TranslateError> {
        let mut payloads = Vec::new();

        let body = ctx.parameters_in(ParameterLocation::Body).find_map(|p| p.schema.as_ref());
        if let Some(schema) = body {
            match sampler.sample(schema, options, &ctx.resolver) {
                Ok(sample) => payloads.push(payload::json(JSON, &sample)),
                Err(e) => log::warn!("could not sample body parameter: {}", e),
            }
        }

        let form: Vec<&Parameter> = ctx.parameters_in(ParameterLocation::FormData).collect();
        if !form.is_empty() {
            let mut fields = Vec::new();
            for p in &form {
                let value = value_or_placeholder(p, ctx.values, &ctx.resolver)?;
                let (style, explode) = self.encoding(p);
                let resolved = ResolvedParam {
                    name: p.name.clone(),
                    location: p.location,
                    value: ParamValue::from_json(&value),
                    style,
                    explode,
                };
                fields.extend(resolved.serialize().into_iter().map(|f| (f.name, f.value)));
            }
            let multipart = self.consumes(ctx).iter().any(|c| payload::essence(c) == MULTIPART)
                || form.iter().any(|p| p.param_type.as_deref() == Some("file"));
            payloads.push(if multipart {
                payload::multipart(MULTIPART, fields)
            } else {
                payload::urlencoded(FORM_URLENCODED, fields)
            });
        }
        Ok(payloads)
    }

    fn request_content_type(&self, ctx: &OperationContext<'_>) -> Option<String> {
        let has_body = ctx.parameters.iter().any(|p| {
            matches!(p.location, ParameterLocation::Body | ParameterLocation::FormData)
        });
        if !has_body {
            return None;
        }
        self.consumes(ctx).first().cloned()
    }
}

impl Swagger2 {
    fn consumes<'a>(&self, ctx: &OperationContext<'a>) -> &'a [String] {
        if ctx.operation.consumes.is_empty() {
            &ctx.document.spec.consumes
        } else {
            &ctx.operation.consumes
        }
    }
}

/// OpenAPI 3.x: `style`/`explode`, `requestBody` and response `content`.
#[derive(Debug, Clone, Copy)]
pub struct OpenApi3;

impl OpenApi3 {
    fn request_body(
        &self,
        ctx: &OperationContext<'_>,
    ) -> Result<Option<RequestBody>, ResolveError> {
        let Some(body) = &ctx.operation.request_body else {
            return Ok(None);
        };
        match ctx.resolver.resolve_request_body(body) {
            Ok(body) => Ok(Some(body)),
            Err(ResolveError::ExternalRef(r)) => {
                log::warn!("skipping external request body reference {}", r);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl ParameterSource for OpenApi3 {
    fn encoding(&self, param: &Parameter) -> (Option<Style>, Option<bool>) {
        (declared_style(param), param.explode)
    }

    fn accept(&self, ctx: &OperationContext<'_>) -> Option<String> {
        ctx.operation
            .responses
            .iter()
            .filter(|(code, _)| code.starts_with('2') || code.as_str() == "default")
            .filter_map(|(code, response)| match ctx.resolver.resolve_response(response) {
                Ok(response) => Some(response),
                Err(e) => {
                    log::warn!("skipping response {}: {}", code, e);
                    None
                }
            })
            .find_map(|response| response.content.keys().next().cloned())
    }
}

impl BodySource for OpenApi3 {
    fn payloads(
        &self,
        ctx: &OperationContext<'_>,
        sampler: &dyn Sampler,
        options: &SampleOptions,
    ) -> Result<Vec<PostData>, TranslateError> {
        let Some(body) = self.request_body(ctx)? else {
            return Ok(Vec::new());
        };

        let mut payloads = Vec::new();
        for wanted in SUPPORTED_CONTENT_TYPES {
            let Some((mime_type, media)) = body
                .content
                .iter()
                .find(|(key, _)| payload::essence(key) == wanted)
            else {
                continue;
            };

            let example = match (&media.example, media.examples.values().next()) {
                (Some(example), _) => Some(example.clone()),
                (None, Some(entry)) => ctx.resolver.resolve_example(entry).unwrap_or_else(|e| {
                    log::warn!("ignoring unresolvable example for {}: {}", mime_type, e);
                    None
                }),
                (None, None) => None,
            };
            let sample = match (example, &media.schema) {
                (Some(example), _) => example,
                (None, Some(schema)) => match sampler.sample(schema, options, &ctx.resolver) {
                    Ok(sample) => sample,
                    Err(e) => {
                        log::warn!("could not sample {} body: {}", mime_type, e);
                        continue;
                    }
                },
                (None, None) => {
                    log::debug!("{} body declares no schema", mime_type);
                    continue;
                }
            };

            match payload::shape(mime_type, &sample) {
                Some(post) => payloads.push(post),
                None => log::warn!("{} body sample is not an object, skipping", mime_type),
            }
        }
        Ok(payloads)
    }

    fn request_content_type(&self, ctx: &OperationContext<'_>) -> Option<String> {
        match self.request_body(ctx) {
            Ok(body) => body.and_then(|b| b.content.keys().next().cloned()),
            Err(e) => {
                log::warn!("could not resolve request body: {}", e);
                None
            }
        }
    }
}
