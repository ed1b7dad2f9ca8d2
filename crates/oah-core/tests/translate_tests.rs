use indexmap::IndexMap;
use serde_json::{Value, json};

use oah_core::error::{SampleError, TranslateError};
use oah_core::har::{HarRequest, NameValue};
use oah_core::parse::ref_resolve::RefResolver;
use oah_core::parse::schema::SchemaOrRef;
use oah_core::parse::{self, spec::ApiDocument};
use oah_core::sample::{SampleOptions, Sampler};
use oah_core::translate::{self, TranslateOptions, Translator};

const PETSTORE: &str = include_str!("fixtures/petstore-oas.yaml");
const GITHUB: &str = include_str!("fixtures/github-swagger.json");
const SCHEMA_REF: &str = include_str!("fixtures/parameter-schema-reference.yaml");

fn petstore() -> ApiDocument {
    parse::from_yaml(PETSTORE).expect("should parse petstore")
}

fn github() -> ApiDocument {
    parse::from_json(GITHUB).expect("should parse github")
}

fn values(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

const MIXED_BODIES: &str = r#"
openapi: 3.0.3
info: { title: Mixed, version: "1" }
paths:
  /pets:
    post:
      requestBody:
        content:
          application/json:
            schema:
              allOf:
                - type: object
                  properties:
                    name: { type: string }
                - type: string
          application/x-www-form-urlencoded:
            schema:
              type: object
              properties:
                name: { type: string, example: Rex }
"#;

const FORM_ARRAYS: &str = r#"
swagger: "2.0"
info: { title: Forms, version: "1" }
host: api.example.com
paths:
  /tags:
    post:
      consumes: [application/x-www-form-urlencoded]
      parameters:
        - name: tags
          in: formData
          type: array
          items: { type: string }
          default: [a, b]
        - name: ids
          in: formData
          type: array
          items: { type: integer }
          collectionFormat: multi
          default: [1, 2]
        - name: sep
          in: formData
          type: array
          items: { type: string }
          collectionFormat: pipes
          default: [x, y]
"#;

/// A sampler that fails on every schema.
struct Refusing;

impl Sampler for Refusing {
    fn sample(
        &self,
        _schema: &SchemaOrRef,
        _options: &SampleOptions,
        _resolver: &RefResolver<'_>,
    ) -> Result<Value, SampleError> {
        Err(SampleError::Unsatisfiable("refused".to_string()))
    }
}

fn one(doc: &ApiDocument, path: &str, method: &str) -> HarRequest {
    let mut requests =
        translate::translate_one(doc, path, method, &IndexMap::new()).expect("should translate");
    assert_eq!(requests.len(), 1, "expected a single record");
    requests.remove(0)
}

#[test]
fn operation_parameter_shadows_path_parameter() {
    let req = one(&petstore(), "/pets", "get");
    assert_eq!(req.query_values("limit"), vec!["50"]);
    assert_eq!(
        req.query_string,
        vec![
            NameValue::new("limit", "50"),
            NameValue::new("tags", "dog,cat"),
        ]
    );
}

#[test]
fn path_level_parameter_used_without_override() {
    let requests =
        translate::translate_one(&petstore(), "/pets", "post", &IndexMap::new()).unwrap();
    for req in &requests {
        assert_eq!(req.query_values("limit"), vec!["20"]);
    }
}

#[test]
fn headers_follow_fixed_order() {
    let req = one(&petstore(), "/pets", "get");
    assert_eq!(req.url, "https://api.petstore.example.com/v1/pets");
    assert_eq!(
        req.headers,
        vec![
            NameValue::new("accept", "application/json"),
            NameValue::new("X-Request-Id", "SOME_STRING_VALUE"),
            NameValue::new("X-API-Key", "REPLACE_KEY_VALUE"),
        ]
    );
    assert_eq!(req.method, "GET");
    assert_eq!(req.http_version, "HTTP/1.1");
    assert_eq!(req.headers_size, 0);
    assert_eq!(req.body_size, 0);
    assert!(req.post_data.is_none());
    assert!(req.comment.is_none());
}

#[test]
fn one_record_per_request_content_type() {
    let requests =
        translate::translate_one(&petstore(), "/pets", "post", &IndexMap::new()).unwrap();
    let types: Vec<&str> = requests
        .iter()
        .map(|r| r.header("content-type").expect("content-type"))
        .collect();
    assert_eq!(
        types,
        vec![
            "application/json",
            "application/x-www-form-urlencoded",
            "multipart/form-data",
        ]
    );
    for req in &requests {
        let post = req.post_data.as_ref().expect("postData");
        assert_eq!(req.header("content-type"), Some(post.mime_type.as_str()));
        assert_eq!(req.comment.as_deref(), Some(post.mime_type.as_str()));
        assert_eq!(req.header("authorization"), Some("Bearer REPLACE_BEARER_TOKEN"));
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    let json_body = requests[0].post_data.as_ref().unwrap();
    assert_eq!(
        json_body.text.as_deref(),
        Some(r#"{"name":"Rex","tag":"good boy"}"#)
    );

    let form = requests[1].post_data.as_ref().unwrap();
    assert_eq!(form.text.as_deref(), Some("name=Rex&tag=good+boy"));

    let multipart = requests[2].post_data.as_ref().unwrap();
    assert_eq!(
        multipart.params,
        vec![
            NameValue::new("name", "Rex"),
            NameValue::new("photo", "string"),
            NameValue::new("tags", r#"["good boy"]"#),
        ]
    );
}

#[test]
fn matrix_exploded_path_parameter() {
    let req = one(&petstore(), "/pets/{id}", "get");
    assert_eq!(
        req.url,
        "https://api.petstore.example.com/v1/pets/;id=3;id=4;id=5"
    );
    assert_eq!(req.header("accept"), Some("application/xml"));
}

#[test]
fn operation_server_and_empty_security() {
    let req = one(&petstore(), "/pets/{id}", "delete");
    assert_eq!(req.url, "https://admin.petstore.example.com/pets/;id=3;id=4;id=5");
    assert!(req.headers.is_empty());
}

#[test]
fn unresolved_path_parameter_keeps_token() {
    let doc = petstore();
    let req = one(&doc, "/owners/{ownerId}/pets/{petId}", "get");
    assert!(req.url.ends_with("/owners/{ownerId}/pets/7"));

    let requests = translate::translate_one(
        &doc,
        "/owners/{ownerId}/pets/{petId}",
        "GET",
        &values(&[("ownerId", json!("alice"))]),
    )
    .unwrap();
    assert!(requests[0].url.ends_with("/owners/alice/pets/7"));
}

#[test]
fn form_exploded_object_and_deep_object() {
    let req = one(&petstore(), "/users", "get");
    assert_eq!(
        req.query_string,
        vec![
            NameValue::new("role", "admin"),
            NameValue::new("firstName", "Alex"),
            NameValue::new("filter[role]", "admin"),
        ]
    );
    assert_eq!(
        req.cookies,
        vec![
            NameValue::new("theme", "SOME_STRING_VALUE"),
            NameValue::new("session", "REPLACE_KEY_VALUE"),
        ]
    );
}

#[test]
fn swagger_default_used_without_values() {
    let req = one(&github(), "/issues", "get");
    assert_eq!(req.url, "https://api.github.com/issues");
    assert_eq!(req.query_values("filter"), vec!["all"]);
    assert_eq!(req.query_values("labels"), vec!["bug,ui"]);
    assert_eq!(req.query_values("sort"), vec!["created", "updated"]);
    assert_eq!(req.query_values("page"), vec!["SOME_INTEGER_VALUE"]);
    assert_eq!(req.header("accept"), Some("application/json"));
    assert_eq!(req.header("content-type"), None);
    assert_eq!(req.header("authorization"), Some("Basic REPLACE_BASIC_AUTH"));
    assert!(req.query_values("access_token").is_empty());
}

#[test]
fn supplied_value_wins_over_default() {
    let requests = translate::translate_one(
        &github(),
        "/issues",
        "get",
        &values(&[("filter", json!("assigned")), ("unused", json!("foo"))]),
    )
    .unwrap();
    let req = &requests[0];
    assert_eq!(req.query_values("filter"), vec!["assigned"]);
    assert!(req.query_string.iter().all(|q| q.value != "all"));
    assert!(req.query_string.iter().all(|q| q.name != "unused"));
}

#[test]
fn swagger_body_parameter() {
    let doc = github();
    let requests = translate::translate_one(
        &doc,
        "/repos/{owner}/{repo}/issues",
        "post",
        &values(&[("owner", json!("octocat")), ("repo", json!("hello-world"))]),
    )
    .unwrap();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.url, "https://api.github.com/repos/octocat/hello-world/issues");
    assert_eq!(req.header("content-type"), Some("application/json"));
    let post = req.post_data.as_ref().expect("postData");
    assert_eq!(
        post.text.as_deref(),
        Some(r#"{"title":"Found a bug","body":"string","labels":[{"name":"bug"}]}"#)
    );
}

#[test]
fn swagger_form_data() {
    let doc = github();

    let avatar = one(&doc, "/user/avatar", "post");
    let post = avatar.post_data.as_ref().expect("postData");
    assert_eq!(post.mime_type, "multipart/form-data");
    assert_eq!(
        post.params,
        vec![
            NameValue::new("file", "SOME_FILE_VALUE"),
            NameValue::new("caption", "my avatar"),
        ]
    );
    assert_eq!(avatar.header("accept"), Some("application/vnd.github+json"));
    assert_eq!(avatar.header("authorization"), None);

    let markdown = one(&doc, "/markdown/raw", "post");
    let post = markdown.post_data.as_ref().expect("postData");
    assert_eq!(post.mime_type, "application/x-www-form-urlencoded");
    assert_eq!(
        post.text.as_deref(),
        Some("text=Hello+world&mode=SOME_STRING_VALUE")
    );
}

#[test]
fn referenced_parameter_schema_placeholder() {
    let doc = parse::from_yaml(SCHEMA_REF).unwrap();
    let req = one(&doc, "/pets", "post");
    assert_eq!(req.url, "http://petstore.swagger.io/v1/pets");
    assert_eq!(req.query_values("pet"), vec!["SOME_OBJECT_VALUE"]);
    assert_eq!(req.query_values("kind"), vec!["SOME_STRING_VALUE"]);
}

#[test]
fn translation_is_deterministic() {
    let doc = petstore();
    let first = translate::translate(&doc).unwrap();
    let second = translate::translate(&doc).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 8);
}

#[test]
fn translate_walks_paths_then_methods() {
    let requests = translate::translate(&petstore()).unwrap();
    let order: Vec<&str> = requests.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(
        order,
        vec!["GET", "POST", "POST", "POST", "GET", "DELETE", "GET", "GET"]
    );
}

#[test]
fn translate_one_errors() {
    let doc = petstore();
    let none = IndexMap::new();
    assert!(matches!(
        translate::translate_one(&doc, "/nope", "get", &none),
        Err(TranslateError::PathNotFound(_))
    ));
    assert!(matches!(
        translate::translate_one(&doc, "/pets", "fetch", &none),
        Err(TranslateError::InvalidMethod(_))
    ));
    assert!(matches!(
        translate::translate_one(&doc, "/pets", "patch", &none),
        Err(TranslateError::MethodNotFound { .. })
    ));
}

#[test]
fn configured_values_apply_to_every_operation() {
    let options = TranslateOptions {
        values: values(&[("limit", json!(5))]),
        ..TranslateOptions::default()
    };
    let translator = Translator::new(options);
    let requests = translator.translate(&petstore()).unwrap();
    assert_eq!(requests[0].query_values("limit"), vec!["5"]);

    let overridden = translator
        .translate_one(&petstore(), "/pets", "get", &values(&[("limit", json!(7))]))
        .unwrap();
    assert_eq!(overridden[0].query_values("limit"), vec!["7"]);
}

#[test]
fn endpoints_sorted_by_resource_then_method() {
    let endpoints = translate::endpoints(&petstore()).unwrap();
    let listing: Vec<(&str, &str)> = endpoints
        .iter()
        .map(|e| (e.resource.as_str(), e.method.as_str()))
        .collect();
    assert_eq!(
        listing,
        vec![
            ("pets", "GET"),
            ("pets", "GET"),
            ("pets", "GET"),
            ("pets", "POST"),
            ("pets", "DELETE"),
            ("users", "GET"),
        ]
    );

    let list = &endpoints[0];
    assert_eq!(list.url, "https://api.petstore.example.com/v1/pets");
    assert_eq!(list.description, "Returns every pet the caller may see.");

    let delete = &endpoints[4];
    assert_eq!(delete.url, "https://admin.petstore.example.com/pets/{id}");
    assert_eq!(delete.description, "No description available");
    assert_eq!(delete.requests.len(), 1);
}

#[test]
fn records_serialize_with_har_field_names() {
    let req = one(&petstore(), "/pets/{id}", "delete");
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["httpVersion"], "HTTP/1.1");
    assert!(value["queryString"].is_array());
    assert_eq!(value["headersSize"], 0);
    assert!(value.get("postData").is_none());
}

#[test]
fn unsatisfiable_body_drops_only_its_content_type() {
    let doc = parse::from_yaml(MIXED_BODIES).unwrap();
    let requests = translate::translate_one(&doc, "/pets", "post", &IndexMap::new()).unwrap();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.comment.as_deref(), Some("application/x-www-form-urlencoded"));
    assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
    let post = req.post_data.as_ref().expect("postData");
    assert_eq!(post.text.as_deref(), Some("name=Rex"));
}

#[test]
fn failing_sampler_leaves_one_bodiless_record() {
    let translator = Translator::with_sampler(TranslateOptions::default(), Refusing);

    let doc = parse::from_yaml(MIXED_BODIES).unwrap();
    let requests = translator
        .translate_one(&doc, "/pets", "post", &IndexMap::new())
        .unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].post_data.is_none());
    assert!(requests[0].comment.is_none());
    assert_eq!(requests[0].header("content-type"), Some("application/json"));

    let requests = translator
        .translate_one(
            &github(),
            "/repos/{owner}/{repo}/issues",
            "post",
            &values(&[("owner", json!("octocat")), ("repo", json!("hello-world"))]),
        )
        .unwrap();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert!(req.post_data.is_none());
    assert!(req.comment.is_none());
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.url, "https://api.github.com/repos/octocat/hello-world/issues");
}

#[test]
fn swagger_form_arrays_follow_collection_format() {
    let doc = parse::from_yaml(FORM_ARRAYS).unwrap();
    let req = one(&doc, "/tags", "post");
    let post = req.post_data.as_ref().expect("postData");
    assert_eq!(post.mime_type, "application/x-www-form-urlencoded");
    assert_eq!(post.text.as_deref(), Some("tags=a%2Cb&ids=1&ids=2&sep=x%7Cy"));
}

#[test]
fn huge_min_items_is_sampled_with_a_bounded_array() {
    let doc = parse::from_yaml(
        r#"
openapi: 3.0.3
info: { title: Big, version: "1" }
paths:
  /batch:
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: array
              minItems: 100000000000
              items: { type: integer }
"#,
    )
    .unwrap();
    let req = one(&doc, "/batch", "post");
    let text = req
        .post_data
        .as_ref()
        .and_then(|p| p.text.as_deref())
        .expect("body");
    let body: Value = serde_json::from_str(text).unwrap();
    assert_eq!(
        body.as_array().map(Vec::len),
        Some(oah_core::sample::MAX_SAMPLE_ITEMS as usize)
    );
}
