//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` is a
//!   literal `${VAR}`.
//! - Well-known variables (`PROPSCOPE_PORT`, `ANTHROPIC_API_KEY`, ...) that
//!   override or fill specific fields.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{PropscopeConfig, ProviderConfig, SamplesConfig, ServerConfig};

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\$)?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, MissingEnvVarError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references using a provided map.
///
/// Only string leaves are touched. An unset or empty variable is an error.
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, MissingEnvVarError> {
    substitute_value(value, env, "")
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let substituted = ENV_REF.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(substituted.into_owned()),
    }
}

/// Collect all env var names referenced in a config value tree.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            ENV_REF
                .captures_iter(s)
                .filter(|caps| caps.get(1).is_none())
                .map(|caps| caps[2].to_string()),
        ),
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

/// Apply well-known environment variables on top of the file config.
///
/// `PROPSCOPE_*` variables override file values. Provider API keys from
/// `ANTHROPIC_API_KEY` / `OPENAI_API_KEY` only fill an unset `apiKey`, and
/// only for the matching provider kind.
pub fn apply_env_overrides(
    mut config: PropscopeConfig,
    env: &HashMap<String, String>,
) -> PropscopeConfig {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(bind) = get("PROPSCOPE_BIND") {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.to_string());
    }
    if let Some(port) = get("PROPSCOPE_PORT") {
        match port.parse() {
            Ok(port) => {
                config.server.get_or_insert_with(ServerConfig::default).port = Some(port)
            }
            Err(_) => tracing::warn!(value = %port, "Ignoring invalid PROPSCOPE_PORT"),
        }
    }
    if let Some(dir) = get("PROPSCOPE_SAMPLES_DIR") {
        config.samples.get_or_insert_with(SamplesConfig::default).dir = Some(dir.to_string());
    }
    if let Some(kind) = get("PROPSCOPE_PROVIDER") {
        config.provider.get_or_insert_with(ProviderConfig::default).kind = Some(kind.to_string());
    }
    if let Some(model) = get("PROPSCOPE_MODEL") {
        config.provider.get_or_insert_with(ProviderConfig::default).model = Some(model.to_string());
    }

    let key_var = match config.provider_kind() {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    };
    if let Some(key) = key_var.and_then(get) {
        let provider = config.provider.get_or_insert_with(ProviderConfig::default);
        if provider.api_key.as_deref().map_or(true, str::is_empty) {
            provider.api_key = Some(key.to_string());
        }
    }

    config
}

/// Snapshot of the process environment for [`apply_env_overrides`].
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}
