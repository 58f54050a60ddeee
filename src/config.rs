use std::net::SocketAddr;
use std::path::PathBuf;

use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu, UtcOffsetSnafu};
use crate::prelude::*;

/// Everything read from the environment at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(rename = "host_address")]
    pub host: SocketAddr,
    pub log_dir: PathBuf,
    /// Offset of the local clock used for night, early and daily badges. Defaults to the host's.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    /// Replaces the built-in badge catalog when seeding.
    #[serde(default)]
    pub badge_catalog: Option<PathBuf>,
    /// Lines and stations to seed.
    #[serde(default)]
    pub network_catalog: Option<PathBuf>,
}

impl Config {
    // Loaded separately: envy cannot parse numbers inside flattened structs.
    pub fn from_env() -> Result<Config, ApplicationError> {
        Ok(Config {
            server: envy::from_env().context(ConfigLoadSnafu)?,
            database: envy::from_env().context(ConfigLoadSnafu)?,
        })
    }

    pub fn clock(&self) -> Result<LocalTime, ApplicationError> {
        match self.server.utc_offset_minutes {
            None => Ok(LocalTime::host()),
            Some(minutes) => {
                LocalTime::from_offset_minutes(minutes).context(UtcOffsetSnafu { minutes })
            }
        }
    }
}
