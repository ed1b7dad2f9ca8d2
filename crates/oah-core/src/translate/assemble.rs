use indexmap::IndexMap;
use serde_json::Value;

use super::base_url::base_url;
use super::path::materialize;
use super::security::select_credential;
use super::source::{OperationContext, dialect};
use super::style::ParamValue;
use super::values::{ResolvedParam, explicit_value, value_or_placeholder};
use crate::error::{ResolveError, TranslateError};
use crate::har::{Endpoint, HarRequest, NameValue, PostData, endpoint};
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::spec::ApiDocument;
use crate::sample::{SampleOptions, Sampler, SchemaSampler};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Header parameters OpenAPI says are controlled elsewhere.
const RESERVED_HEADERS: [&str; 3] = ["accept", "content-type", "authorization"];

/// Settings shared by every operation a [`Translator`] handles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslateOptions {
    pub sample: SampleOptions,
    /// Parameter values by name, used before any document default.
    pub values: IndexMap<String, Value>,
}

/// Turns the operations of an API description into HAR request records.
#[derive(Debug, Clone, Default)]
pub struct Translator<S: Sampler = SchemaSampler> {
    options: TranslateOptions,
    sampler: S,
}

impl Translator {
    pub fn new(options: TranslateOptions) -> Self {
        Self {
            options,
            sampler: SchemaSampler,
        }
    }
}

impl<S: Sampler> Translator<S> {
    pub fn with_sampler(options: TranslateOptions, sampler: S) -> Self {
        Self { options, sampler }
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Records for every operation, in path order then method order.
    pub fn translate(&self, document: &ApiDocument) -> Result<Vec<HarRequest>, TranslateError> {
        let mut requests = Vec::new();
        for (path, item) in &document.spec.paths {
            for (method, operation) in item.operations() {
                requests.extend(self.operation_requests(
                    document,
                    path,
                    item,
                    method,
                    operation,
                    &self.options.values,
                )?);
            }
        }
        Ok(requests)
    }

    /// Records for one operation. `values` take precedence over the
    /// configured defaults.
    pub fn translate_one(
        &self,
        document: &ApiDocument,
        path: &str,
        method: &str,
        values: &IndexMap<String, Value>,
    ) -> Result<Vec<HarRequest>, TranslateError> {
        let item = document
            .spec
            .paths
            .get(path)
            .ok_or_else(|| TranslateError::PathNotFound(path.to_string()))?;
        let http_method = HttpMethod::parse(method)
            .ok_or_else(|| TranslateError::InvalidMethod(method.to_string()))?;
        let operation = item
            .operation(http_method)
            .ok_or_else(|| TranslateError::MethodNotFound {
                path: path.to_string(),
                method: method.to_string(),
            })?;

        let mut merged = self.options.values.clone();
        merged.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.operation_requests(document, path, item, http_method, operation, &merged)
    }

    /// One listing entry per operation, grouped by resource.
    pub fn endpoints(&self, document: &ApiDocument) -> Result<Vec<Endpoint>, TranslateError> {
        let mut endpoints = Vec::new();
        for (path, item) in &document.spec.paths {
            for (method, operation) in item.operations() {
                let url = format!("{}{}", base_url(document, path, method), path);
                let description = operation
                    .description
                    .clone()
                    .or_else(|| operation.summary.clone())
                    .unwrap_or_else(|| endpoint::NO_DESCRIPTION.to_string());
                endpoints.push(Endpoint {
                    method: method.as_str().to_string(),
                    resource: endpoint::resource_name(&url),
                    url,
                    description,
                    requests: self.operation_requests(
                        document,
                        path,
                        item,
                        method,
                        operation,
                        &self.options.values,
                    )?,
                });
            }
        }
        endpoints.sort_by(|a, b| {
            a.resource
                .cmp(&b.resource)
                .then_with(|| listing_rank(&a.method).cmp(&listing_rank(&b.method)))
        });
        Ok(endpoints)
    }

    fn operation_requests(
        &self,
        document: &ApiDocument,
        path: &str,
        item: &PathItem,
        method: HttpMethod,
        operation: &Operation,
        values: &IndexMap<String, Value>,
    ) -> Result<Vec<HarRequest>, TranslateError> {
        log::debug!("translating {} {}", method.as_str(), path);
        let resolver = RefResolver::new(document);
        let parameters = merge_parameters(&item.parameters, &operation.parameters, &resolver)?;
        let ctx = OperationContext {
            document,
            resolver,
            operation,
            parameters: &parameters,
            values,
        };
        let source = dialect(document.version);

        let mut path_params = Vec::new();
        let mut query = Vec::new();
        let mut header_params = Vec::new();
        let mut cookies = Vec::new();
        for param in &parameters {
            let value = match param.location {
                ParameterLocation::Path => match explicit_value(param, values, &resolver)? {
                    Some(value) => value,
                    None => {
                        log::debug!("no value for path parameter {}", param.name);
                        continue;
                    }
                },
                ParameterLocation::Header
                    if RESERVED_HEADERS.contains(&param.name.to_ascii_lowercase().as_str()) =>
                {
                    log::debug!("ignoring reserved header parameter {}", param.name);
                    continue;
                }
                ParameterLocation::Query
                | ParameterLocation::Header
                | ParameterLocation::Cookie => value_or_placeholder(param, values, &resolver)?,
                ParameterLocation::Body | ParameterLocation::FormData => continue,
            };
            let (style, explode) = source.encoding(param);
            let resolved = ResolvedParam {
                name: param.name.clone(),
                location: param.location,
                value: ParamValue::from_json(&value),
                style,
                explode,
            };
            match param.location {
                ParameterLocation::Path => path_params.push(resolved),
                ParameterLocation::Query => query.extend(resolved.serialize()),
                ParameterLocation::Header => header_params.extend(resolved.serialize()),
                _ => cookies.extend(resolved.serialize()),
            }
        }

        let credential = select_credential(&document.spec, operation);
        if let Some(credential) = &credential {
            query.extend(credential.query());
            cookies.extend(credential.cookie());
        }

        let url = format!(
            "{}{}",
            base_url(document, path, method),
            materialize(path, &path_params)
        );
        let accept = source.accept(&ctx);

        let record = |content_type: Option<String>, post_data: Option<PostData>| {
            let mut headers = Vec::new();
            if let Some(accept) = &accept {
                headers.push(NameValue::new("accept", accept));
            }
            if let Some(content_type) = content_type {
                headers.push(NameValue::new("content-type", content_type));
            }
            headers.extend(header_params.iter().cloned());
            headers.extend(credential.as_ref().and_then(|c| c.header()));
            HarRequest {
                method: method.as_str().to_string(),
                url: url.clone(),
                http_version: HTTP_VERSION.to_string(),
                cookies: cookies.clone(),
                headers,
                query_string: query.clone(),
                comment: post_data.as_ref().map(|p| p.mime_type.clone()),
                post_data,
                headers_size: 0,
                body_size: 0,
            }
        };

        let payloads = source.payloads(&ctx, &self.sampler, &self.options.sample)?;
        if payloads.is_empty() {
            return Ok(vec![record(source.request_content_type(&ctx), None)]);
        }
        Ok(payloads
            .into_iter()
            .map(|post| record(Some(post.mime_type.clone()), Some(post)))
            .collect())
    }
}

/// Translate every operation with default options.
pub fn translate(document: &ApiDocument) -> Result<Vec<HarRequest>, TranslateError> {
    Translator::new(TranslateOptions::default()).translate(document)
}

/// Translate one operation with default options.
pub fn translate_one(
    document: &ApiDocument,
    path: &str,
    method: &str,
    values: &IndexMap<String, Value>,
) -> Result<Vec<HarRequest>, TranslateError> {
    Translator::new(TranslateOptions::default()).translate_one(document, path, method, values)
}

/// The sorted endpoint listing with default options.
pub fn endpoints(document: &ApiDocument) -> Result<Vec<Endpoint>, TranslateError> {
    Translator::new(TranslateOptions::default()).endpoints(document)
}

/// Path-level parameters in declaration order with operation entries
/// replacing those sharing `(name, in)`, then the remaining operation
/// entries.
fn merge_parameters(
    path_level: &[ParameterOrRef],
    operation_level: &[ParameterOrRef],
    resolver: &RefResolver<'_>,
) -> Result<Vec<Parameter>, ResolveError> {
    let resolve_all = |params: &[ParameterOrRef]| -> Result<Vec<Parameter>, ResolveError> {
        let mut resolved = Vec::with_capacity(params.len());
        for param in params {
            match resolver.resolve_parameter(param) {
                Ok(p) => resolved.push(p),
                Err(ResolveError::ExternalRef(r)) => {
                    log::warn!("skipping external parameter reference {}", r)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(resolved)
    };

    let mut merged: IndexMap<(String, ParameterLocation), Parameter> = resolve_all(path_level)?
        .into_iter()
        .map(|p| ((p.name.clone(), p.location), p))
        .collect();
    for param in resolve_all(operation_level)? {
        merged.insert((param.name.clone(), param.location), param);
    }
    Ok(merged.into_values().collect())
}

fn listing_rank(method: &str) -> usize {
    ["GET", "POST", "PUT", "DELETE", "PATCH"]
        .iter()
        .position(|m| m.eq_ignore_ascii_case(method))
        .unwrap_or(5)
}
