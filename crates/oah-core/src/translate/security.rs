use crate::har::NameValue;
use crate::parse::operation::Operation;
use crate::parse::security::{ApiKeyLocation, SecurityScheme, SecuritySchemeType};
use crate::parse::spec::OpenApiSpec;

pub const BASIC_PLACEHOLDER: &str = "Basic REPLACE_BASIC_AUTH";
pub const BEARER_PLACEHOLDER: &str = "Bearer REPLACE_BEARER_TOKEN";
pub const KEY_PLACEHOLDER: &str = "REPLACE_KEY_VALUE";

/// The single credential a request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Basic,
    Bearer,
    ApiKey {
        name: String,
        location: ApiKeyLocation,
    },
}

impl Credential {
    fn from_scheme(scheme: &SecurityScheme) -> Option<Credential> {
        match scheme.scheme_type {
            SecuritySchemeType::Basic => Some(Credential::Basic),
            SecuritySchemeType::Http => match scheme.scheme.as_deref() {
                Some(s) if s.eq_ignore_ascii_case("basic") => Some(Credential::Basic),
                Some(s) if s.eq_ignore_ascii_case("bearer") => Some(Credential::Bearer),
                _ => None,
            },
            SecuritySchemeType::OAuth2 | SecuritySchemeType::OpenIdConnect => {
                Some(Credential::Bearer)
            }
            SecuritySchemeType::ApiKey => match (&scheme.name, &scheme.location) {
                (Some(name), Some(location)) => Some(Credential::ApiKey {
                    name: name.clone(),
                    location: location.clone(),
                }),
                _ => None,
            },
            SecuritySchemeType::MutualTls | SecuritySchemeType::Unknown => None,
        }
    }

    fn is_authorization(&self) -> bool {
        matches!(self, Credential::Basic | Credential::Bearer)
    }

    fn is_header_key(&self) -> bool {
        matches!(
            self,
            Credential::ApiKey {
                location: ApiKeyLocation::Header,
                ..
            }
        )
    }

    pub fn header(&self) -> Option<NameValue> {
        match self {
            Credential::Basic => Some(NameValue::new("Authorization", BASIC_PLACEHOLDER)),
            Credential::Bearer => Some(NameValue::new("Authorization", BEARER_PLACEHOLDER)),
            Credential::ApiKey {
                name,
                location: ApiKeyLocation::Header,
            } => Some(NameValue::new(name, KEY_PLACEHOLDER)),
            Credential::ApiKey { .. } => None,
        }
    }

    pub fn query(&self) -> Option<NameValue> {
        self.key_in(ApiKeyLocation::Query)
    }

    pub fn cookie(&self) -> Option<NameValue> {
        self.key_in(ApiKeyLocation::Cookie)
    }

    fn key_in(&self, wanted: ApiKeyLocation) -> Option<NameValue> {
        match self {
            Credential::ApiKey { name, location } if *location == wanted => {
                Some(NameValue::new(name, KEY_PLACEHOLDER))
            }
            _ => None,
        }
    }
}

/// Pick the credential for an operation.
///
/// The operation's `security` replaces the document's when present, even
/// when empty. Basic and bearer schemes win in declaration order; failing
/// those, the first header API key, then the first query or cookie key.
pub fn select_credential(spec: &OpenApiSpec, operation: &Operation) -> Option<Credential> {
    let requirements = operation.security.as_ref().or(spec.security.as_ref())?;

    let mut header_key = None;
    let mut other_key = None;
    for name in requirements.iter().flat_map(|r| r.keys()) {
        let Some(scheme) = spec.security_scheme(name) else {
            log::warn!("security scheme {} is not defined", name);
            continue;
        };
        let Some(credential) = Credential::from_scheme(scheme) else {
            log::debug!("security scheme {} yields no credential", name);
            continue;
        };
        if credential.is_authorization() {
            return Some(credential);
        }
        if credential.is_header_key() {
            header_key.get_or_insert(credential);
        } else {
            other_key.get_or_insert(credential);
        }
    }
    header_key.or(other_key)
}
