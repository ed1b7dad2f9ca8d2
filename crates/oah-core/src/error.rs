use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported API description version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("external reference not supported: {0}")]
    ExternalRef(String),

    #[error("reference {ref_path} does not point to a valid {expected}: {source}")]
    Deserialize {
        ref_path: String,
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("unsatisfiable schema: {0}")]
    Unsatisfiable(String),
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("method {method} not defined for path {path}")]
    MethodNotFound { path: String, method: String },

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
}

#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("invalid target: {0}")]
    UnknownTarget(String),

    #[error("failed to render {target}: {message}")]
    Render { target: String, message: String },
}
