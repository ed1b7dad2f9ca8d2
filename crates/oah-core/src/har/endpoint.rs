use serde::{Deserialize, Serialize};

use super::request::HarRequest;

/// Description used when an operation declares none.
pub const NO_DESCRIPTION: &str = "No description available";

/// One operation of the document, as listed for snippet generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: String,
    /// Base URL joined with the raw path template.
    pub url: String,
    pub description: String,
    /// Last literal segment of the URL, e.g. `users` for `/users/{id}`.
    pub resource: String,
    pub requests: Vec<HarRequest>,
}

/// The resource name exposed by a URL: its last non-empty segment that is
/// not a `{parameter}`.
pub fn resource_name(url: &str) -> String {
    url.rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or_default()
        .to_string()
}
