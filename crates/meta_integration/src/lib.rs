pub mod column;
pub mod secrets;
pub mod sheets;

use async_trait::async_trait;
use meta_model::TokenList;
use serde_json::Value;
use thiserror::Error;

pub use secrets::{Secrets, SecretsConfig};
pub use sheets::{GoogleSheets, SheetsConfig};

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("missing secret `{0}`")]
    MissingSecret(String),

    #[error("secrets in {origin} are not a JSON object: {source}")]
    SecretsFormat { origin: String, source: serde_json::Error },

    #[error("secret manager `{name}`: {message}")]
    SecretManager { name: String, message: String },

    #[error("unable to read secrets file: {0}")]
    SecretsFile(#[from] std::io::Error),

    #[error("invalid private key: {0}")]
    PrivateKey(String),

    #[error("google auth error: {0}")]
    Auth(#[from] gcp_auth::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("sheets api returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Where the monitored token lists come from.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token_lists(&self) -> Result<Vec<TokenList>, IntegrationError>;
}

/// Where measured rows go, one sheet per network.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn append_rows(&self, network: &str, rows: Vec<Vec<Value>>) -> Result<(), IntegrationError>;
}
