use super::types::*;
use crate::config::{env_var_pattern, expand_env_vars, expand_tilde};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string)
}

/// Parse and validate config from a YAML string.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;
    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let mut unexpanded: Vec<String> = env_var_pattern()
        .captures_iter(yaml_string)
        .map(|cap| cap[1].to_string())
        .collect();

    if unexpanded.is_empty() {
        return Ok(());
    }

    unexpanded.sort();
    unexpanded.dedup();

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}",
        unexpanded.join(", ")
    )))
}

fn expand_paths(config: &mut Config) {
    if let Some(path) = config.input.sincedb_path.as_mut() {
        *path = expand_tilde(path);
    }
    if let Some(path) = config.input.data_dir.as_mut() {
        *path = expand_tilde(path);
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.input.log_group.is_empty() {
        errors.push("input.log_group must contain at least one log group".to_string());
    }
    for (i, group) in config.input.log_group.iter().enumerate() {
        if group.trim().is_empty() {
            errors.push(format!("input.log_group[{}]: log group cannot be empty", i));
        }
    }

    if config.input.interval == 0 {
        errors.push("input.interval must be greater than 0".to_string());
    }

    if config.api.endpoint.trim().is_empty() {
        errors.push("api.endpoint cannot be empty".to_string());
    }

    if config.output.buffer_limit == 0 {
        errors.push("output.buffer_limit must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}
