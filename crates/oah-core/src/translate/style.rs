//! Parameter serialization per the OpenAPI `style` / `explode` rules.
//!
//! A value is classified once into [`ParamValue`] and then rendered by a
//! single `match` over `(shape, style, explode)`.

use serde_json::Value;

use crate::har::NameValue;
use crate::parse::parameter::ParameterLocation;

/// Value emitted for style/location combinations OpenAPI does not allow.
pub const INVALID_STYLE_MARKER: &str = "error";

/// Serialization style of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Simple,
    Label,
    Matrix,
    Form,
    SpaceDelimited,
    PipeDelimited,
    /// Swagger 2.0 `collectionFormat: tsv`.
    TabDelimited,
    DeepObject,
}

impl Style {
    pub fn parse(name: &str) -> Option<Style> {
        match name {
            "simple" => Some(Style::Simple),
            "label" => Some(Style::Label),
            "matrix" => Some(Style::Matrix),
            "form" => Some(Style::Form),
            "spaceDelimited" => Some(Style::SpaceDelimited),
            "pipeDelimited" => Some(Style::PipeDelimited),
            "deepObject" => Some(Style::DeepObject),
            _ => None,
        }
    }

    /// `form` for query-like locations, `simple` for path and header.
    pub fn default_for(location: ParameterLocation) -> Style {
        match location {
            ParameterLocation::Path | ParameterLocation::Header => Style::Simple,
            ParameterLocation::Query
            | ParameterLocation::Cookie
            | ParameterLocation::Body
            | ParameterLocation::FormData => Style::Form,
        }
    }

    fn delimiter(&self) -> &'static str {
        match self {
            Style::SpaceDelimited => " ",
            Style::PipeDelimited => "|",
            Style::TabDelimited => "\t",
            _ => ",",
        }
    }

    fn is_delimited(&self) -> bool {
        matches!(
            self,
            Style::SpaceDelimited | Style::PipeDelimited | Style::TabDelimited
        )
    }

    fn prefix(&self, name: &str) -> String {
        match self {
            Style::Label => ".".to_string(),
            Style::Matrix => format!(";{}=", name),
            _ => String::new(),
        }
    }
}

/// Shape of a parameter value, with every leaf already coerced to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Primitive(String),
    Array(Vec<String>),
    Object(Vec<(String, String)>),
}

impl ParamValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => ParamValue::Array(items.iter().map(leaf_string).collect()),
            Value::Object(map) => ParamValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), leaf_string(v)))
                    .collect(),
            ),
            other => ParamValue::Primitive(leaf_string(other)),
        }
    }
}

/// String form of a leaf value: strings verbatim, everything else as JSON
/// text (`5000`, `true`, `null`, `{"a":1}`).
pub fn leaf_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Encode one parameter into the name/value pairs it contributes.
///
/// `style` defaults by location and `explode` defaults to `style == form`.
pub fn serialize(
    name: &str,
    value: &ParamValue,
    location: ParameterLocation,
    style: Option<Style>,
    explode: Option<bool>,
) -> Vec<NameValue> {
    let style = style.unwrap_or_else(|| Style::default_for(location));
    let explode = explode.unwrap_or(style == Style::Form);

    if matches!(
        (style, location),
        (Style::Form, ParameterLocation::Path) | (Style::Simple, ParameterLocation::Query)
    ) {
        return vec![NameValue::new(name, INVALID_STYLE_MARKER)];
    }

    match value {
        ParamValue::Primitive(v) => vec![NameValue::new(name, style.prefix(name) + v)],
        ParamValue::Array(items) => serialize_array(name, items, style, explode),
        ParamValue::Object(entries) => serialize_object(name, entries, style, explode),
    }
}

fn serialize_array(name: &str, items: &[String], style: Style, explode: bool) -> Vec<NameValue> {
    match (style, explode) {
        (Style::Form | Style::DeepObject, true) | (Style::DeepObject, false) => {
            items.iter().map(|v| NameValue::new(name, v)).collect()
        }
        (s, true) if s.is_delimited() => items.iter().map(|v| NameValue::new(name, v)).collect(),
        (Style::Label, true) => {
            let joined: String = items.iter().map(|v| format!(".{}", v)).collect();
            vec![NameValue::new(name, joined)]
        }
        (Style::Matrix, true) => items
            .iter()
            .map(|v| NameValue::new(name, format!(";{}={}", name, v)))
            .collect(),
        // simple (either explode), form/label/matrix without explode, and
        // the delimited styles without explode
        (s, _) => vec![NameValue::new(
            name,
            s.prefix(name) + &items.join(s.delimiter()),
        )],
    }
}

fn serialize_object(
    name: &str,
    entries: &[(String, String)],
    style: Style,
    explode: bool,
) -> Vec<NameValue> {
    match (style, explode) {
        (Style::DeepObject, _) => entries
            .iter()
            .map(|(k, v)| NameValue::new(format!("{}[{}]", name, k), v))
            .collect(),
        (Style::Form, true) => entries.iter().map(|(k, v)| NameValue::new(k, v)).collect(),
        (s, true) if s.is_delimited() => {
            entries.iter().map(|(k, v)| NameValue::new(k, v)).collect()
        }
        (Style::Simple, true) => {
            let joined: Vec<String> = entries.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            vec![NameValue::new(name, joined.join(","))]
        }
        (Style::Label, true) => {
            let joined: String = entries.iter().map(|(k, v)| format!(".{}={}", k, v)).collect();
            vec![NameValue::new(name, joined)]
        }
        (Style::Matrix, true) => {
            let joined: String = entries.iter().map(|(k, v)| format!(";{}={}", k, v)).collect();
            vec![NameValue::new(name, joined)]
        }
        (s, _) => {
            let flat: Vec<&str> = entries
                .iter()
                .flat_map(|(k, v)| [k.as_str(), v.as_str()])
                .collect();
            vec![NameValue::new(name, s.prefix(name) + &flat.join(s.delimiter()))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(pairs: &[NameValue]) -> Vec<&str> {
        pairs.iter().map(|p| p.value.as_str()).collect()
    }

    fn array() -> ParamValue {
        ParamValue::from_json(&json!([3, 4, 5]))
    }

    fn object() -> ParamValue {
        ParamValue::from_json(&json!({ "role": "admin", "firstName": "Alex" }))
    }

    #[test]
    fn test_defaults_by_location() {
        assert_eq!(Style::default_for(ParameterLocation::Query), Style::Form);
        assert_eq!(Style::default_for(ParameterLocation::Cookie), Style::Form);
        assert_eq!(Style::default_for(ParameterLocation::Path), Style::Simple);
        assert_eq!(Style::default_for(ParameterLocation::Header), Style::Simple);
    }

    #[test]
    fn test_primitive_prefixes() {
        let v = ParamValue::Primitive("5".to_string());
        let path = ParameterLocation::Path;
        assert_eq!(values(&serialize("id", &v, path, None, None)), vec!["5"]);
        assert_eq!(
            values(&serialize("id", &v, path, Some(Style::Label), None)),
            vec![".5"]
        );
        assert_eq!(
            values(&serialize("id", &v, path, Some(Style::Matrix), None)),
            vec![";id=5"]
        );
        assert_eq!(
            values(&serialize("id", &v, ParameterLocation::Query, None, None)),
            vec!["5"]
        );
    }

    #[test]
    fn test_primitive_verbatim_for_every_query_style() {
        let v = ParamValue::Primitive("a b/c".to_string());
        for style in [
            Style::Form,
            Style::SpaceDelimited,
            Style::PipeDelimited,
            Style::DeepObject,
        ] {
            for explode in [true, false] {
                let pairs = serialize(
                    "q",
                    &v,
                    ParameterLocation::Query,
                    Some(style),
                    Some(explode),
                );
                assert_eq!(pairs, vec![NameValue::new("q", "a b/c")]);
            }
        }
    }

    #[test]
    fn test_form_explode_array() {
        let pairs = serialize("id", &array(), ParameterLocation::Query, None, None);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|p| p.name == "id"));
        assert_eq!(values(&pairs), vec!["3", "4", "5"]);
    }

    #[test]
    fn test_form_no_explode_array() {
        let pairs = serialize("id", &array(), ParameterLocation::Query, None, Some(false));
        assert_eq!(pairs, vec![NameValue::new("id", "3,4,5")]);
    }

    #[test]
    fn test_path_array_styles() {
        let path = ParameterLocation::Path;
        assert_eq!(
            values(&serialize("id", &array(), path, None, None)),
            vec!["3,4,5"]
        );
        assert_eq!(
            values(&serialize("id", &array(), path, Some(Style::Simple), Some(true))),
            vec!["3,4,5"]
        );
        assert_eq!(
            values(&serialize("id", &array(), path, Some(Style::Label), Some(false))),
            vec![".3,4,5"]
        );
        assert_eq!(
            values(&serialize("id", &array(), path, Some(Style::Label), Some(true))),
            vec![".3.4.5"]
        );
        assert_eq!(
            values(&serialize("id", &array(), path, Some(Style::Matrix), Some(false))),
            vec![";id=3,4,5"]
        );
        assert_eq!(
            values(&serialize("id", &array(), path, Some(Style::Matrix), Some(true))),
            vec![";id=3", ";id=4", ";id=5"]
        );
    }

    #[test]
    fn test_delimited_arrays() {
        let query = ParameterLocation::Query;
        assert_eq!(
            values(&serialize("id", &array(), query, Some(Style::SpaceDelimited), Some(false))),
            vec!["3 4 5"]
        );
        assert_eq!(
            values(&serialize("id", &array(), query, Some(Style::PipeDelimited), Some(false))),
            vec!["3|4|5"]
        );
        let exploded = serialize("id", &array(), query, Some(Style::PipeDelimited), Some(true));
        assert_eq!(
            exploded,
            serialize("id", &array(), query, Some(Style::Form), Some(true))
        );
    }

    #[test]
    fn test_form_explode_object() {
        let pairs = serialize("id", &object(), ParameterLocation::Query, None, None);
        insta::assert_debug_snapshot!(pairs, @r#"
        [
            NameValue {
                name: "role",
                value: "admin",
            },
            NameValue {
                name: "firstName",
                value: "Alex",
            },
        ]
        "#);
    }

    #[test]
    fn test_object_styles() {
        let path = ParameterLocation::Path;
        assert_eq!(
            values(&serialize("id", &object(), path, None, None)),
            vec!["role,admin,firstName,Alex"]
        );
        assert_eq!(
            values(&serialize("id", &object(), path, Some(Style::Simple), Some(true))),
            vec!["role=admin,firstName=Alex"]
        );
        assert_eq!(
            values(&serialize("id", &object(), path, Some(Style::Label), Some(false))),
            vec![".role,admin,firstName,Alex"]
        );
        assert_eq!(
            values(&serialize("id", &object(), path, Some(Style::Label), Some(true))),
            vec![".role=admin.firstName=Alex"]
        );
        assert_eq!(
            values(&serialize("id", &object(), path, Some(Style::Matrix), Some(false))),
            vec![";id=role,admin,firstName,Alex"]
        );
        assert_eq!(
            values(&serialize("id", &object(), path, Some(Style::Matrix), Some(true))),
            vec![";role=admin;firstName=Alex"]
        );
        assert_eq!(
            serialize("id", &object(), ParameterLocation::Query, None, Some(false)),
            vec![NameValue::new("id", "role,admin,firstName,Alex")]
        );
    }

    #[test]
    fn test_deep_object_ignores_explode() {
        let v = ParamValue::from_json(&json!({ "role": "admin" }));
        for explode in [None, Some(true), Some(false)] {
            let pairs = serialize(
                "id",
                &v,
                ParameterLocation::Query,
                Some(Style::DeepObject),
                explode,
            );
            assert_eq!(pairs, vec![NameValue::new("id[role]", "admin")]);
        }
    }

    #[test]
    fn test_invalid_combinations() {
        let v = ParamValue::Primitive("x".to_string());
        assert_eq!(
            serialize("id", &v, ParameterLocation::Path, Some(Style::Form), None),
            vec![NameValue::new("id", INVALID_STYLE_MARKER)]
        );
        assert_eq!(
            serialize("id", &array(), ParameterLocation::Query, Some(Style::Simple), None),
            vec![NameValue::new("id", INVALID_STYLE_MARKER)]
        );
    }

    #[test]
    fn test_leaf_coercion() {
        assert_eq!(
            ParamValue::from_json(&json!(5000)),
            ParamValue::Primitive("5000".to_string())
        );
        assert_eq!(
            ParamValue::from_json(&json!(true)),
            ParamValue::Primitive("true".to_string())
        );
        assert_eq!(
            ParamValue::from_json(&json!([{ "a": 1 }])),
            ParamValue::Array(vec![r#"{"a":1}"#.to_string()])
        );
    }
}
