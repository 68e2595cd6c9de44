//! Loading the home description from disk.

use homenet_core::HomeConfig;
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid home configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a [`HomeConfig`] from a JSON file, or returns the default home
/// when no path is given.
pub fn load_home(path: Option<&Path>) -> Result<HomeConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(HomeConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_home(&text)
}

pub fn parse_home(text: &str) -> Result<HomeConfig, ConfigError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_means_default_home() -> anyhow::Result<()> {
        assert_eq!(load_home(None)?, HomeConfig::default());
        Ok(())
    }

    #[test]
    fn reads_rooms_from_json() -> anyhow::Result<()> {
        let home = parse_home(
            r#"{
                "server": "10.0.0.1:8080",
                "server_mac": "02:00:00:00:00:01",
                "rooms": [{
                    "id": "garage",
                    "name": "Garage",
                    "ip": "10.0.0.20",
                    "mac": "02:00:00:00:00:20",
                    "zigbee_address": 30000,
                    "zwave_node": 9
                }]
            }"#,
        )?;
        assert_eq!(home.rooms.len(), 1);
        assert_eq!(home.zwave_node("garage"), 9);
        assert_eq!(home.rooms[0].temperature, 22.0);
        assert_eq!(home.server.port, 8080);
        Ok(())
    }

    #[test]
    fn reports_bad_input() {
        assert!(matches!(parse_home("{"), Err(ConfigError::Json(_))));
        let missing = load_home(Some(Path::new("/nonexistent/home.json")));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
