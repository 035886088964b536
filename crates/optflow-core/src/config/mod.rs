//! JSON configuration for the job writers.

mod job;
mod response;

pub use job::JobConfig;
pub use response::ResponseConfig;

use crate::domain::{OptError, OptResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Reads and parses a JSON configuration file.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> OptResult<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
        OptError::file_system(
            "IO.CONFIG_READ",
            format!("failed to read config '{}': {}", path.display(), source),
        )
    })?;
    parse_config(&content).map_err(|error| {
        OptError::configuration(
            "CONFIG.PARSE",
            format!("{}: {}", path.display(), error.message()),
        )
    })
}

pub fn parse_config<T: DeserializeOwned>(json: &str) -> OptResult<T> {
    serde_json::from_str(json)
        .map_err(|source| OptError::configuration("CONFIG.PARSE", source.to_string()))
}
