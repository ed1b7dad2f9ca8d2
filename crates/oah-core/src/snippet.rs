//! Snippet targets and the renderer seam.
//!
//! Rendering a request as source code is left to a [`SnippetRenderer`];
//! this module only knows which `language[_library]` ids exist.

use crate::error::SnippetError;
use crate::har::HarRequest;

/// A known language with its default client and every supported client.
struct Language {
    id: &'static str,
    default_client: &'static str,
    clients: &'static [&'static str],
}

const LANGUAGES: &[Language] = &[
    Language {
        id: "c",
        default_client: "libcurl",
        clients: &["libcurl"],
    },
    Language {
        id: "clojure",
        default_client: "clj_http",
        clients: &["clj_http"],
    },
    Language {
        id: "csharp",
        default_client: "restsharp",
        clients: &["restsharp", "httpclient"],
    },
    Language {
        id: "go",
        default_client: "native",
        clients: &["native"],
    },
    Language {
        id: "http",
        default_client: "http1.1",
        clients: &["http1.1"],
    },
    Language {
        id: "java",
        default_client: "unirest",
        clients: &["okhttp", "unirest", "asynchttp", "nethttp"],
    },
    Language {
        id: "javascript",
        default_client: "xhr",
        clients: &["jquery", "fetch", "xhr", "axios"],
    },
    Language {
        id: "kotlin",
        default_client: "okhttp",
        clients: &["okhttp"],
    },
    Language {
        id: "node",
        default_client: "native",
        clients: &["native", "request", "unirest", "axios", "fetch"],
    },
    Language {
        id: "objc",
        default_client: "nsurlsession",
        clients: &["nsurlsession"],
    },
    Language {
        id: "ocaml",
        default_client: "cohttp",
        clients: &["cohttp"],
    },
    Language {
        id: "php",
        default_client: "curl",
        clients: &["curl", "http1", "http2"],
    },
    Language {
        id: "powershell",
        default_client: "webrequest",
        clients: &["webrequest", "restmethod"],
    },
    Language {
        id: "python",
        default_client: "python3",
        clients: &["python3", "requests"],
    },
    Language {
        id: "r",
        default_client: "httr",
        clients: &["httr"],
    },
    Language {
        id: "ruby",
        default_client: "native",
        clients: &["native"],
    },
    Language {
        id: "shell",
        default_client: "curl",
        clients: &["curl", "httpie", "wget"],
    },
    Language {
        id: "swift",
        default_client: "nsurlsession",
        clients: &["nsurlsession"],
    },
];

/// A validated snippet target such as `node_request` or `shell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The id as given by the caller.
    pub id: String,
    pub language: &'static str,
    pub client: &'static str,
    /// Whether the client was named explicitly.
    pub explicit_client: bool,
}

impl Target {
    /// Parse `language` or `language_client`. The language is the part
    /// before the first `_`, so clients like `clj_http` stay intact.
    pub fn parse(id: &str) -> Result<Target, SnippetError> {
        let unknown = || SnippetError::UnknownTarget(id.to_string());
        let (language_id, client_id) = match id.split_once('_') {
            Some((language, client)) => (language, Some(client)),
            None => (id, None),
        };
        let language = LANGUAGES
            .iter()
            .find(|l| l.id == language_id)
            .ok_or_else(unknown)?;
        let client = match client_id {
            Some(wanted) => *language
                .clients
                .iter()
                .find(|c| **c == wanted)
                .ok_or_else(unknown)?,
            None => language.default_client,
        };
        Ok(Target {
            id: id.to_string(),
            language: language.id,
            client,
            explicit_client: client_id.is_some(),
        })
    }

    /// Every language with its default client, in table order.
    pub fn all() -> Vec<Target> {
        LANGUAGES
            .iter()
            .map(|l| Target {
                id: l.id.to_string(),
                language: l.id,
                client: l.default_client,
                explicit_client: false,
            })
            .collect()
    }

    /// Supported clients of this target's language.
    pub fn clients(&self) -> &'static [&'static str] {
        LANGUAGES
            .iter()
            .find(|l| l.id == self.language)
            .map(|l| l.clients)
            .unwrap_or_default()
    }

    /// `Node`, or `Node + Request` when the client was named.
    pub fn title(&self) -> String {
        let language = capitalize(self.language);
        if self.explicit_client {
            format!("{} + {}", language, capitalize(self.client))
        } else {
            language
        }
    }
}

/// Upper-case the first character only.
fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a request as code for one target.
pub trait SnippetRenderer {
    type Error: std::fmt::Display;

    fn render(&self, request: &HarRequest, target: &Target) -> Result<String, Self::Error>;
}

/// One rendered snippet.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Snippet {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Render `request` for every target id. All ids are validated before
/// anything is rendered.
pub fn render_snippets<R: SnippetRenderer>(
    request: &HarRequest,
    target_ids: &[String],
    renderer: &R,
) -> Result<Vec<Snippet>, SnippetError> {
    let targets = target_ids
        .iter()
        .map(|id| Target::parse(id))
        .collect::<Result<Vec<_>, _>>()?;

    targets
        .into_iter()
        .map(|target| {
            let content = renderer
                .render(request, &target)
                .map_err(|e| SnippetError::Render {
                    target: target.id.clone(),
                    message: e.to_string(),
                })?;
            Ok(Snippet {
                title: target.title(),
                id: target.id,
                content,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Echo {
        calls: Cell<usize>,
    }

    impl SnippetRenderer for Echo {
        type Error = String;

        fn render(&self, request: &HarRequest, target: &Target) -> Result<String, String> {
            self.calls.set(self.calls.get() + 1);
            Ok(format!("{} {} via {}", request.method, request.url, target.client))
        }
    }

    fn request() -> HarRequest {
        HarRequest {
            method: "GET".to_string(),
            url: "http://localhost/pets".to_string(),
            http_version: "HTTP/1.1".to_string(),
            cookies: Vec::new(),
            headers: Vec::new(),
            query_string: Vec::new(),
            post_data: None,
            headers_size: 0,
            body_size: 0,
            comment: None,
        }
    }

    #[test]
    fn test_parse_targets() {
        let node = Target::parse("node").unwrap();
        assert_eq!(node.client, "native");
        assert_eq!(node.title(), "Node");

        let request_lib = Target::parse("node_request").unwrap();
        assert_eq!(request_lib.client, "request");
        assert_eq!(request_lib.title(), "Node + Request");

        let clojure = Target::parse("clojure_clj_http").unwrap();
        assert_eq!(clojure.client, "clj_http");
        assert_eq!(clojure.title(), "Clojure + Clj_http");

        let http = Target::parse("http_http1.1").unwrap();
        assert_eq!(http.title(), "Http + Http1.1");
    }

    #[test]
    fn test_unknown_targets() {
        let err = Target::parse("node_asfd").unwrap_err();
        assert_eq!(err.to_string(), "invalid target: node_asfd");
        assert!(Target::parse("cobol").is_err());
    }

    #[test]
    fn test_validates_before_rendering() {
        let echo = Echo { calls: Cell::new(0) };
        let ids = vec!["shell_curl".to_string(), "node_asfd".to_string()];
        assert!(render_snippets(&request(), &ids, &echo).is_err());
        assert_eq!(echo.calls.get(), 0);
    }

    #[test]
    fn test_render_snippets() {
        let echo = Echo { calls: Cell::new(0) };
        let ids = vec!["shell_curl".to_string(), "python".to_string()];
        let snippets = render_snippets(&request(), &ids, &echo).unwrap();
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].title, "Shell + Curl");
        assert_eq!(snippets[0].content, "GET http://localhost/pets via curl");
        assert_eq!(snippets[1].id, "python");
        assert_eq!(snippets[1].title, "Python");
    }

    #[test]
    fn test_all_targets_parse() {
        for target in Target::all() {
            assert_eq!(Target::parse(&target.id).unwrap(), target);
            assert!(target.clients().contains(&target.client));
        }
    }
}
