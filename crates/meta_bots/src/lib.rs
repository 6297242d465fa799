pub mod batch;

use config::{Config, ConfigError, File};
use meta_alchemy::SimulatorConfig;
use meta_common::enums::Network;
use meta_integration::{Secrets, SecretsConfig, SheetsConfig};
use meta_tracing::TraceConfig;
use serde::Deserialize;
use std::{collections::HashMap, env, str::FromStr};
use strum::IntoEnumIterator;
use tracing::Level;

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigLog {
    pub file_name_prefix: String,
    pub dir: String,
    pub level: String,
    pub console: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    pub log: ConfigLog,
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
}

impl MonitorConfig {
    pub fn load(dir: &str) -> Result<Config, ConfigError> {
        let env = env::var("ENV").unwrap_or("dev".into());
        Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)))
            .add_source(File::with_name(&format!("{}/{}", dir, env)).required(false))
            .add_source(File::with_name(&format!("{}/local", dir)).required(false))
            .add_source(config::Environment::with_prefix("META_MONITOR").separator("__"))
            .build()
    }

    pub fn try_new(dir: &str) -> Result<Self, ConfigError> {
        let config = Self::load(dir)?;
        config.try_deserialize()
    }
}

impl From<ConfigLog> for TraceConfig {
    fn from(config_log: ConfigLog) -> Self {
        let level = Level::from_str(&config_log.level).unwrap_or(Level::INFO);
        TraceConfig {
            file_name_prefix: config_log.file_name_prefix,
            dir: config_log.dir,
            level,
            console: config_log.console,
        }
    }
}

/// Upstream RPC url of every known network that has one among the secrets.
pub fn network_endpoints(secrets: &Secrets) -> HashMap<Network, String> {
    Network::iter()
        .filter_map(|network| {
            secrets.get(&network.endpoint_key()).map(|url| (network, url.to_string()))
        })
        .collect()
}
