pub mod generate;
pub mod parse;
pub mod types;

use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use parse::{load_config, ConfigError};
pub use types::{ApiConfig, CodecKind, Config, InputConfig, OutputConfig, SourceErrorPolicy};

const CONFIG_RELATIVE: &str = "cwingest/config.yml";

/// Matches `$env{NAME}`; group 1 is the variable name.
pub(crate) fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex")
    })
}

/// Substitute `$env{NAME}` from the process environment.
pub fn expand_env_vars(text: &str) -> String {
    expand_env_vars_with(text, |name| std::env::var(name).ok())
}

/// Substitute `$env{NAME}` using `lookup`. Names it cannot resolve stay in
/// place so validation can report them.
pub fn expand_env_vars_with(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    env_var_pattern()
        .replace_all(text, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace a leading `~` component with the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home,
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Config file to load: the explicit path if given, else the first existing
/// of the per-user and system-wide locations.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }

    [user_config_path(), Some(system_config_path())]
        .into_iter()
        .flatten()
        .find(|path| path.exists())
}

/// `cwingest/config.yml` under the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_RELATIVE))
}

pub fn system_config_path() -> PathBuf {
    Path::new("/etc").join(CONFIG_RELATIVE)
}
