use crate::error::{Result, WeatherError};
use crate::models::{Coordinate, Forecast, Place};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Place → coordinate, or `None` when no candidate matched the region filter.
pub type GeolocationCache = BTreeMap<Place, Option<Coordinate>>;

/// Place → most recently fetched forecast.
pub type ForecastCache = BTreeMap<Place, Forecast>;

/// A mapping persisted as one JSON document.
///
/// Saves go through a temporary file in the same directory that is renamed
/// over the target, so readers only ever see a complete document.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file yields `None`; so does an
    /// unreadable or corrupt one, after logging a warning.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.path.exists() {
            tracing::debug!("No cache at {}", self.path.display());
            return None;
        }

        match self.read() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable cache {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn read<T: DeserializeOwned>(&self) -> Result<T> {
        let file = File::open(&self.path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Replace the whole document.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|e| WeatherError::Io(e.error))?;

        tracing::debug!("Wrote cache {}", self.path.display());
        Ok(())
    }
}
