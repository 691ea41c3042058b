use std::time::Duration;

use reqwest::Url;

use crate::auth::{AuthMethod, DEFAULT_API_KEY_HEADER};
use crate::cli::{AuthScheme, Cli};
use crate::environment::{Environment, Variable};
use crate::error::ConfigError;
use crate::http::request::DEFAULT_TIMEOUT;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_FLOW_BASE_URL: &str = "http://127.0.0.1:7860";
pub const DEFAULT_FLOW_INPUT: &str = "I want to learn about flowers";

/// Name under which the configured target is exposed to collections.
pub const ACTIVE_ENVIRONMENT: &str = "active";

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub base_url: String,
    pub flow_id: Option<String>,
    pub input_value: String,
}

/// Everything a suite needs to know about the target it runs against.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub base_url: String,
    pub auth: AuthMethod,
    pub timeout: Duration,
    pub include_destructive: bool,
    pub flow: FlowConfig,
    pub globals: Vec<Variable>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: AuthMethod::None,
            timeout: DEFAULT_TIMEOUT,
            include_destructive: false,
            flow: FlowConfig {
                base_url: DEFAULT_FLOW_BASE_URL.to_string(),
                flow_id: None,
                input_value: DEFAULT_FLOW_INPUT.to_string(),
            },
            globals: Vec::new(),
        }
    }
}

impl RunnerConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let base_url = validate_base_url(&cli.base_url)?;
        let flow_base_url = validate_base_url(&cli.flow_base_url)?;

        let auth = match cli.auth_scheme {
            AuthScheme::ApiKey => {
                let header = if cli.api_key_header.trim().is_empty() {
                    DEFAULT_API_KEY_HEADER
                } else {
                    cli.api_key_header.as_str()
                };
                AuthMethod::api_key(header, cli.api_key.as_deref())
            }
            AuthScheme::Bearer => match cli.api_key.as_deref().map(str::trim) {
                Some(token) if !token.is_empty() => AuthMethod::BearerToken {
                    token: token.to_string(),
                },
                _ => AuthMethod::None,
            },
        };

        let globals = cli
            .vars
            .iter()
            .map(|raw| Variable::parse_global(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let flow_id = cli
            .flow_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(Self {
            base_url,
            auth,
            timeout: Duration::from_secs(cli.timeout_secs),
            include_destructive: cli.include_destructive,
            flow: FlowConfig {
                base_url: flow_base_url,
                flow_id,
                input_value: cli.flow_input.clone(),
            },
            globals,
        })
    }

    /// The configured target as a variable scope for `{{...}}` placeholders.
    pub fn environment(&self) -> Environment {
        let mut variables = vec![
            Variable::new("base_url", &self.base_url),
            Variable::new("flow_base_url", &self.flow.base_url),
        ];
        if let Some(secret) = self.auth.secret() {
            variables.push(Variable::new("api_key", secret));
        }
        if let Some(flow_id) = &self.flow.flow_id {
            variables.push(Variable::new("flow_id", flow_id));
        }

        Environment {
            name: ACTIVE_ENVIRONMENT.to_string(),
            variables,
        }
    }
}

/// Checks the URL parses and strips any trailing slash so paths can be
/// appended directly.
fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}
