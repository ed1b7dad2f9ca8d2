use crate::parse::operation::HttpMethod;
use crate::parse::spec::{ApiDocument, OpenApiSpec};

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";

/// The URL an operation's path is appended to.
///
/// The most specific `servers` entry wins: operation, then path item, then
/// document. Without any, the Swagger 2.0 `schemes`/`host`/`basePath`
/// triple is used. One trailing `/` is dropped.
pub fn base_url(document: &ApiDocument, path: &str, method: HttpMethod) -> String {
    let item = document.spec.paths.get(path);
    let server = item
        .and_then(|i| i.operation(method))
        .and_then(|op| op.servers.first())
        .or_else(|| item.and_then(|i| i.servers.first()))
        .or_else(|| document.spec.servers.first());

    let url = match server {
        Some(server) => server.expanded_url(),
        None => host_url(&document.spec),
    };
    match url.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => url,
    }
}

fn host_url(spec: &OpenApiSpec) -> String {
    let scheme = spec
        .schemes
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_SCHEME);
    let host = spec.host.as_deref().unwrap_or(DEFAULT_HOST);
    let base_path = spec
        .base_path
        .as_deref()
        .filter(|p| *p != "/")
        .unwrap_or_default();
    format!("{}://{}{}", scheme, host, base_path)
}
