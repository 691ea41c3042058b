//! Static credentials attached to outgoing requests.
//!
//! There is no token exchange here: a key is read from configuration and sent
//! verbatim on every request that asks for it.

use crate::error::ConfigError;
use crate::http::request::RequestSpec;

pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthMethod {
    #[default]
    None,
    ApiKeyHeader {
        header: String,
        value: String,
    },
    BearerToken {
        token: String,
    },
}

impl AuthMethod {
    /// An API key sent under `header`. A blank key means no auth at all.
    pub fn api_key(header: &str, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if !value.is_empty() => AuthMethod::ApiKeyHeader {
                header: header.trim().to_string(),
                value: value.to_string(),
            },
            _ => AuthMethod::None,
        }
    }

    /// The raw secret, if any. Used to expose the key as `{{api_key}}`.
    pub fn secret(&self) -> Option<&str> {
        match self {
            AuthMethod::None => None,
            AuthMethod::ApiKeyHeader { value, .. } => Some(value),
            AuthMethod::BearerToken { token } => Some(token),
        }
    }

    pub fn apply(&self, spec: RequestSpec) -> Result<RequestSpec, ConfigError> {
        match self {
            AuthMethod::None => Ok(spec),
            AuthMethod::ApiKeyHeader { header, value } => spec.with_header(header, value),
            AuthMethod::BearerToken { token } => {
                spec.with_header("authorization", &format!("Bearer {token}"))
            }
        }
    }
}
