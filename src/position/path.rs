use super::store::{PositionError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

/// Work out where the position file lives.
///
/// Order: explicit path, `<data_dir>/plugins/inputs/cloudwatch_logs/`,
/// `$SINCEDB_DIR`, `$HOME`. Derived file names are keyed by the configured
/// log groups so differently configured engines do not share a file.
pub fn resolve_position_path(
    explicit: Option<&Path>,
    data_dir: Option<&Path>,
    log_groups: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let file_name = format!(".sincedb_{}", log_group_digest(log_groups));

    if let Some(data_dir) = data_dir {
        let dir = data_dir.join("plugins").join("inputs").join("cloudwatch_logs");
        std::fs::create_dir_all(&dir).map_err(|source| PositionError::Io {
            path: dir.clone(),
            source,
        })?;
        return Ok(dir.join(file_name));
    }

    let dir = env("SINCEDB_DIR")
        .filter(|d| !d.is_empty())
        .or_else(|| env("HOME").filter(|d| !d.is_empty()))
        .ok_or(PositionError::NoPath)?;

    let path = PathBuf::from(dir).join(file_name);
    info!(
        path = %path.display(),
        "No sincedb_path set, generated one from the log_group setting"
    );
    Ok(path)
}

fn log_group_digest(log_groups: &[String]) -> String {
    let digest = Sha256::digest(log_groups.join(",").as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
