use ethers::prelude::*;
use meta_common::enums::Network;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    #[error("no endpoint for {network}, expected secret `{key}`")]
    MissingEndpoint { network: Network, key: String },

    #[error("no network bound to the session")]
    NotBound,

    #[error("invalid node url: {0}")]
    NodeUrl(#[from] url::ParseError),

    #[error("invalid signer key: {0}")]
    Wallet(#[from] WalletError),

    #[error("node provider error: {0}")]
    Provider(#[from] ProviderError),
}
