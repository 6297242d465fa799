use crate::IntegrationError;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::{error::DisplayErrorContext, Client};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{collections::HashMap, env, fs, path::PathBuf};
use tracing::{debug, info, warn};

fn default_json_env() -> String {
    "AWS_SECRETS".to_string()
}

fn default_manager_secret() -> Option<String> {
    Some("exchange-monitoring-secrets-2".to_string())
}

fn default_region_env() -> String {
    "EXCHANGE_MONITORING_ECR_REGION".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// Environment variable holding the secret bundle as a JSON object.
    #[serde(default = "default_json_env")]
    pub json_env: String,
    /// Optional JSON file with the same layout.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Secret id in AWS Secrets Manager, fetched when the region variable is set.
    #[serde(default = "default_manager_secret")]
    pub manager_secret: Option<String>,
    #[serde(default = "default_region_env")]
    pub region_env: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        SecretsConfig {
            json_env: default_json_env(),
            file: None,
            manager_secret: default_manager_secret(),
            region_env: default_region_env(),
        }
    }
}

impl SecretsConfig {
    /// Region and secret id to ask the secret manager for, if both are configured.
    pub fn manager_target(&self) -> Option<(String, String)> {
        let name = self.manager_secret.clone().filter(|n| !n.is_empty())?;
        let region = env::var(&self.region_env).ok().filter(|r| !r.is_empty())?;
        Some((region, name))
    }
}

async fn fetch_manager_secret(region: String, name: &str) -> Result<String, IntegrationError> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region))
        .load()
        .await;
    let response = Client::new(&sdk_config)
        .get_secret_value()
        .secret_id(name)
        .version_stage("AWSCURRENT")
        .send()
        .await
        .map_err(|e| IntegrationError::SecretManager {
            name: name.to_string(),
            message: DisplayErrorContext(e).to_string(),
        })?;
    response.secret_string().map(str::to_string).ok_or_else(|| IntegrationError::SecretManager {
        name: name.to_string(),
        message: "no secret string".to_string(),
    })
}

/// Key/value credential store.
#[derive(Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Merges the process environment, the secrets file, the JSON bundle and the secret manager,
    /// later sources winning. An unreachable secret manager falls back to the other sources.
    pub async fn load(config: &SecretsConfig) -> Result<Self, IntegrationError> {
        let values = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        let mut secrets = Secrets { values };

        if let Some(path) = &config.file {
            let content = fs::read_to_string(path)?;
            let n = secrets.merge_json(&path.display().to_string(), &content)?;
            info!("loaded {} secrets from {}", n, path.display());
        }

        if let Ok(content) = env::var(&config.json_env) {
            let n = secrets.merge_json(&config.json_env, &content)?;
            info!("loaded {} secrets from ${}", n, config.json_env);
        } else {
            debug!("${} not set, using process environment", config.json_env);
        }

        if let Some((region, name)) = config.manager_target() {
            match fetch_manager_secret(region, &name).await {
                Ok(content) => {
                    let n = secrets.merge_json(&name, &content)?;
                    info!("loaded {} secrets from secret manager `{}`", n, name);
                }
                Err(e) => warn!("{}, using local secrets", e),
            }
        } else {
            debug!("${} not set, secret manager skipped", config.region_env);
        }
        Ok(secrets)
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Secrets { values }
    }

    fn merge_json(&mut self, origin: &str, content: &str) -> Result<usize, IntegrationError> {
        let bundle: Map<String, Value> = serde_json::from_str(content).map_err(|source| {
            IntegrationError::SecretsFormat { origin: origin.to_string(), source }
        })?;
        let n = bundle.len();
        for (key, value) in bundle {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.values.insert(key, value);
        }
        Ok(n)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<String, IntegrationError> {
        self.get(key).map(str::to_string).ok_or_else(|| IntegrationError::MissingSecret(key.to_string()))
    }
}
