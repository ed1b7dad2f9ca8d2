use std::collections::HashSet;

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::{Schema, SchemaOrRef};
use super::spec::ApiDocument;
use crate::error::ResolveError;

/// Resolves local `$ref` JSON Pointers against the raw document tree.
///
/// The resolver only borrows the document: every resolved node is returned
/// by reference or as a freshly deserialized value, so one document can be
/// shared by concurrent translations. Chains of references (`$ref` pointing
/// at another `$ref`) are followed with a visited set so cycles fail fast.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(document: &'a ApiDocument) -> Self {
        Self::from_root(&document.root)
    }

    pub fn from_root(root: &'a Value) -> Self {
        Self { root }
    }

    /// Locate the node a pointer such as `#/components/schemas/Pet` refers
    /// to, following further `$ref`s until a concrete node is reached.
    pub fn resolve_pointer(&self, ref_path: &str) -> Result<&'a Value, ResolveError> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = ref_path.to_string();
        loop {
            if !visited.insert(current.clone()) {
                return Err(ResolveError::CircularRef(current));
            }
            let node = self.lookup(&current)?;
            match node.get("$ref").and_then(Value::as_str) {
                Some(next) => current = next.to_string(),
                None => return Ok(node),
            }
        }
    }

    /// Resolve a pointer and deserialize the target.
    pub fn resolve_as<T: DeserializeOwned>(
        &self,
        ref_path: &str,
        expected: &'static str,
    ) -> Result<T, ResolveError> {
        let node = self.resolve_pointer(ref_path)?;
        serde_json::from_value(node.clone()).map_err(|source| ResolveError::Deserialize {
            ref_path: ref_path.to_string(),
            expected,
            source,
        })
    }

    pub fn resolve_parameter(&self, param: &ParameterOrRef) -> Result<Parameter, ResolveError> {
        match param {
            ParameterOrRef::Ref { ref_path } => self.resolve_as(ref_path, "parameter"),
            ParameterOrRef::Parameter(p) => Ok(p.clone()),
        }
    }

    pub fn resolve_request_body(
        &self,
        body: &RequestBodyOrRef,
    ) -> Result<RequestBody, ResolveError> {
        match body {
            RequestBodyOrRef::Ref { ref_path } => self.resolve_as(ref_path, "request body"),
            RequestBodyOrRef::RequestBody(rb) => Ok(rb.clone()),
        }
    }

    pub fn resolve_response(&self, response: &ResponseOrRef) -> Result<Response, ResolveError> {
        match response {
            ResponseOrRef::Ref { ref_path } => self.resolve_as(ref_path, "response"),
            ResponseOrRef::Response(r) => Ok(r.clone()),
        }
    }

    /// Resolve one level of schema reference. Nested `$ref`s inside
    /// `properties`, `items` or compositions are left to the caller.
    pub fn resolve_schema(&self, schema: &SchemaOrRef) -> Result<Schema, ResolveError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => self.resolve_as(ref_path, "schema"),
            SchemaOrRef::Schema(s) => Ok(s.as_ref().clone()),
        }
    }

    /// The value of an `examples` entry: an Example object's `value`, after
    /// resolving the entry if it is a `$ref`. `None` for `externalValue`-only
    /// examples.
    pub fn resolve_example(&self, example: &Value) -> Result<Option<Value>, ResolveError> {
        let example = match example.get("$ref").and_then(Value::as_str) {
            Some(ref_path) => self.resolve_pointer(ref_path)?,
            None => example,
        };
        Ok(example.get("value").cloned())
    }

    fn lookup(&self, ref_path: &str) -> Result<&'a Value, ResolveError> {
        let segments = parse_pointer(ref_path)?;
        segments.iter().try_fold(self.root, |node, segment| {
            let next = match node {
                Value::Object(map) => map.get(segment.as_str()),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            next.ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
        })
    }
}

/// Split a local reference like `#/paths/~1pets/get` into unescaped
/// segments (`["paths", "/pets", "get"]`). `#` alone addresses the root.
pub fn parse_pointer(ref_path: &str) -> Result<Vec<String>, ResolveError> {
    let Some(fragment) = ref_path.strip_prefix('#') else {
        return Err(ResolveError::ExternalRef(ref_path.to_string()));
    };
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    let pointer = fragment
        .strip_prefix('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    Ok(pointer.split('/').map(unescape_segment).collect())
}

/// Decode one JSON Pointer segment: URI percent-decoding first, then
/// `~1` → `/` and `~0` → `~` (in that order, so `~01` becomes `~1`).
pub fn unescape_segment(segment: &str) -> String {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    decoded.replace("~1", "/").replace("~0", "~")
}
