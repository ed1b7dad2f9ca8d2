pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::ParseError;
use spec::{ApiDocument, OpenApiSpec, SpecVersion};

/// Parse an API description from YAML.
pub fn from_yaml(input: &str) -> Result<ApiDocument, ParseError> {
    let root: serde_json::Value = serde_yaml_ng::from_str(input)?;
    from_value(root)
}

/// Parse an API description from JSON.
pub fn from_json(input: &str) -> Result<ApiDocument, ParseError> {
    let root: serde_json::Value = serde_json::from_str(input)?;
    from_value(root)
}

/// Build a document from an already decoded JSON tree.
pub fn from_value(root: serde_json::Value) -> Result<ApiDocument, ParseError> {
    let spec: OpenApiSpec = serde_json::from_value(root.clone())?;
    let version = detect_version(&spec)?;
    Ok(ApiDocument {
        root,
        spec,
        version,
    })
}

fn detect_version(spec: &OpenApiSpec) -> Result<SpecVersion, ParseError> {
    match (&spec.swagger, &spec.openapi) {
        (_, Some(v)) if v.starts_with("3.") => Ok(SpecVersion::OpenApi3),
        (Some(v), None) if v == "2.0" => Ok(SpecVersion::Swagger2),
        (_, Some(v)) | (Some(v), None) => Err(ParseError::UnsupportedVersion(v.clone())),
        (None, None) => Err(ParseError::MissingField("openapi".to_string())),
    }
}
