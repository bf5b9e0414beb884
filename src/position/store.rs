use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("io error on position file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "no position file location: set input.sincedb_path or input.data_dir, \
         or set SINCEDB_DIR or HOME in the environment"
    )]
    NoPath,
}

pub type Result<T> = std::result::Result<T, PositionError>;

/// Durable map from source to resume cursor (epoch milliseconds).
///
/// Persisted as one `<source> <cursor>` line per source. Every write
/// replaces the whole file.
#[derive(Debug)]
pub struct PositionStore {
    path: PathBuf,
    positions: BTreeMap<String, i64>,
}

impl PositionStore {
    /// Load the store from `path`. A missing or unreadable file yields an
    /// empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let positions = match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), "Reading position file");
                parse_positions(&contents)
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No position file to load");
                BTreeMap::new()
            }
        };

        Self { path, positions }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, source: &str) -> Option<i64> {
        self.positions.get(source).copied()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.positions.contains_key(source)
    }

    pub fn insert(&mut self, source: impl Into<String>, cursor: i64) {
        self.positions.insert(source.into(), cursor);
    }

    /// Move a source's cursor forward. Never moves it backwards.
    pub fn advance(&mut self, source: &str, cursor: i64) {
        match self.positions.get_mut(source) {
            Some(current) => *current = (*current).max(cursor),
            None => {
                self.positions.insert(source.to_string(), cursor);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.positions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Write the full store through a temp file and rename it into place.
    pub fn persist(&self) -> Result<()> {
        let tmp_path = temp_path(&self.path);
        let io_err = |source| PositionError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(serialize_positions(&self.positions).as_bytes())
            .map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Persist, logging instead of failing. The next successful flush
    /// supersedes a failed one.
    pub fn flush(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to write position file, will retry after next page");
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn parse_positions(contents: &str) -> BTreeMap<String, i64> {
    let mut positions = BTreeMap::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let Some((source, cursor)) = line.split_once(' ') else {
            warn!(line = %line, "Skipping position line without cursor");
            continue;
        };

        match cursor.trim().parse::<i64>() {
            Ok(cursor) => {
                debug!(source = %source, cursor, "Restored position");
                positions.insert(source.to_string(), cursor);
            }
            Err(e) => {
                warn!(source = %source, value = %cursor, error = %e, "Skipping unparsable position");
            }
        }
    }

    positions
}

fn serialize_positions(positions: &BTreeMap<String, i64>) -> String {
    positions
        .iter()
        .map(|(source, cursor)| format!("{} {}\n", source, cursor))
        .collect()
}
