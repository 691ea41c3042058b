//! # Variables
//!
//! Resolves `{{variable}}` placeholders used in collection files. Three scopes
//! are merged: collection variables, the active environment (derived from the
//! runner configuration) and global `--var` overrides.

use std::collections::HashMap;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Variable {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Parse a `key=value` command-line override.
    pub fn parse_global(raw: &str) -> Result<Self, ConfigError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidVariable(raw.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidVariable(raw.to_string()));
        }
        Ok(Self::new(key, value.trim()))
    }
}

/// A named set of variables describing one target deployment.
#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentManager {
    pub globals: Vec<Variable>,
    pub environments: Vec<Environment>,
    pub active_environment: Option<String>,
}

impl EnvironmentManager {
    /// Resolve all variables into a flat map. Precedence, lowest first:
    /// collection, active environment, globals.
    pub fn resolve(&self, collection_vars: &HashMap<String, String>) -> HashMap<String, String> {
        let mut resolved: HashMap<String, String> = collection_vars
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if let Some(active_name) = &self.active_environment {
            if let Some(env) = self.environments.iter().find(|e| &e.name == active_name) {
                insert_enabled(&mut resolved, &env.variables);
            }
        }

        insert_enabled(&mut resolved, &self.globals);
        resolved
    }
}

fn insert_enabled(resolved: &mut HashMap<String, String>, variables: &[Variable]) {
    for var in variables {
        if var.enabled && !var.key.is_empty() {
            resolved.insert(var.key.clone(), var.value.clone());
        }
    }
}

/// Replace `{{key}}` placeholders in one left-to-right pass. Unknown
/// placeholders are left as-is and substituted values are not expanded again.
pub fn interpolate(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        let Some(len) = rest[open + 2..].find("}}") else {
            break;
        };
        let close = open + 2 + len + 2;
        result.push_str(&rest[..open]);
        match variables.get(&rest[open + 2..open + 2 + len]) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[open..close]),
        }
        rest = &rest[close..];
    }

    result.push_str(rest);
    result
}
