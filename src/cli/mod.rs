//! Command-line surface. Every option can also come from an `APISMOKE_*`
//! environment variable or a `.env` file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::auth::DEFAULT_API_KEY_HEADER;
use crate::config::{DEFAULT_BASE_URL, DEFAULT_FLOW_BASE_URL, DEFAULT_FLOW_INPUT};

#[derive(Debug, Clone, Parser)]
#[command(name = "apismoke", version, about = "Run HTTP smoke tests against a JSON API")]
pub struct Cli {
    /// Base URL of the lesson service.
    #[arg(long, env = "APISMOKE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Static key sent with every request.
    #[arg(long, env = "APISMOKE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "APISMOKE_API_KEY_HEADER", default_value = DEFAULT_API_KEY_HEADER)]
    pub api_key_header: String,

    #[arg(long, value_enum, env = "APISMOKE_AUTH_SCHEME", default_value_t = AuthScheme::ApiKey)]
    pub auth_scheme: AuthScheme,

    /// Per-request timeout.
    #[arg(
        long,
        env = "APISMOKE_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Built-in suites to run, in order. Defaults to `lessons` unless a
    /// collection is given.
    #[arg(long = "suite", value_enum)]
    pub suites: Vec<SuiteName>,

    /// Also run cases that delete or reset server data.
    #[arg(long, env = "APISMOKE_INCLUDE_DESTRUCTIVE")]
    pub include_destructive: bool,

    #[arg(long, env = "APISMOKE_FLOW_BASE_URL", default_value = DEFAULT_FLOW_BASE_URL)]
    pub flow_base_url: String,

    #[arg(long, env = "APISMOKE_FLOW_ID")]
    pub flow_id: Option<String>,

    #[arg(long, env = "APISMOKE_FLOW_INPUT", default_value = DEFAULT_FLOW_INPUT)]
    pub flow_input: String,

    /// JSON collection file with additional cases.
    #[arg(long)]
    pub collection: Option<PathBuf>,

    /// Variable override for collection placeholders.
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print every response body in the text report. The JSON report always
    /// carries them.
    #[arg(long, env = "APISMOKE_SHOW_BODY")]
    pub show_body: bool,
}

impl Cli {
    /// Suites to run after applying the default.
    pub fn selected_suites(&self) -> Vec<SuiteName> {
        if self.suites.is_empty() && self.collection.is_none() {
            vec![SuiteName::Lessons]
        } else {
            self.suites.clone()
        }
    }
}

/// Parse arguments only, ignoring any `APISMOKE_*` variables set in the
/// calling environment.
#[cfg(test)]
pub(crate) fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::{CommandFactory, FromArgMatches};

    let matches = Cli::command()
        .mut_args(|arg| arg.env(None::<&'static str>))
        .try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteName {
    Lessons,
    ReceiveLesson,
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthScheme {
    /// Key sent under `--api-key-header`.
    ApiKey,
    /// Key sent as `Authorization: Bearer <key>`.
    Bearer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
