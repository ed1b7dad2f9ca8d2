use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::operation::PathItem;
use super::parameter::ParameterOrRef;
use super::schema::SchemaOrRef;
use super::security::{SecurityRequirement, SecurityScheme};
use super::server::Server;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub version: String,
}

/// Which family of API description a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// Swagger 2.0 (`swagger: "2.0"`).
    Swagger2,
    /// OpenAPI 3.x (`openapi: "3.*"`).
    OpenApi3,
}

/// Top-level API description covering both Swagger 2.0 and OpenAPI 3.x
/// fields. Only one family's fields are populated for a given document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    #[serde(
        default,
        deserialize_with = "version_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub swagger: Option<String>,

    #[serde(
        default,
        deserialize_with = "version_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub openapi: Option<String>,

    #[serde(default)]
    pub info: Info,

    // OpenAPI 3.x
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    // Swagger 2.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(
        rename = "securityDefinitions",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_definitions: IndexMap<String, SecurityScheme>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOrRef>,

    // Shared
    pub paths: IndexMap<String, PathItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

impl OpenApiSpec {
    /// Look up a security scheme by name in either `securityDefinitions`
    /// (Swagger 2.0) or `components.securitySchemes` (OpenAPI 3.x).
    pub fn security_scheme(&self, name: &str) -> Option<&SecurityScheme> {
        self.security_definitions.get(name).or_else(|| {
            self.components
                .as_ref()
                .and_then(|c| c.security_schemes.get(name))
        })
    }
}

/// Accept `swagger: 2.0` written as a bare YAML number as well as a string.
fn version_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => Some(format!("{:.1}", f)),
            _ => Some(n.to_string()),
        },
        Some(other) => Some(other.to_string()),
        None => None,
    })
}

/// A parsed API description: the raw JSON tree used as the root for
/// `$ref` resolution, plus the typed view used by the translator.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDocument {
    pub root: serde_json::Value,
    pub spec: OpenApiSpec,
    pub version: SpecVersion,
}
