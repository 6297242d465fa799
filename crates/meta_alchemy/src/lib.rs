pub mod errors;
pub mod oracle;

use errors::SessionError;
use ethers::prelude::*;
use meta_address::{find_network_profile, NetworkProfile};
use meta_common::enums::Network;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::HashMap, fmt, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

pub type SessionClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Local forking node the swaps are simulated on.
#[derive(Clone, Deserialize)]
pub struct SimulatorConfig {
    /// JSON-RPC url of an anvil or hardhat node.
    pub node_url: String,
    pub private_key: String,
}

impl fmt::Debug for SimulatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatorConfig")
            .field("node_url", &self.node_url)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// A forked chain bound to one network at a time.
///
/// The session is owned by a single driver and lent out mutably, so at most one swap sequence
/// runs against the fork at any moment.
pub struct ChainSession {
    provider: Provider<Http>,
    wallet: LocalWallet,
    client: Arc<SessionClient>,
    endpoints: HashMap<Network, String>,
    profile: Option<NetworkProfile>,
    snapshot: Option<U256>,
}

impl ChainSession {
    /// Prepares a session against the node; nothing is sent until the first reset.
    pub fn connect(
        config: &SimulatorConfig,
        endpoints: HashMap<Network, String>,
    ) -> Result<Self, SessionError> {
        let provider =
            Provider::<Http>::try_from(config.node_url.as_str())?.interval(Duration::from_millis(100));
        let wallet: LocalWallet = config.private_key.parse()?;
        let client = Arc::new(SignerMiddleware::new(provider.clone(), wallet.clone()));
        debug!("session signer {:?} on node {}", wallet.address(), config.node_url);

        Ok(ChainSession { provider, wallet, client, endpoints, profile: None, snapshot: None })
    }

    /// Re-forks the node from the named network's upstream endpoint at its current head.
    pub async fn reset_to_network(&mut self, name: &str) -> Result<&NetworkProfile, SessionError> {
        let profile = find_network_profile(name)
            .ok_or_else(|| SessionError::UnknownNetwork(name.to_string()))?;
        let url = self.endpoints.get(&profile.network).cloned().ok_or_else(|| {
            SessionError::MissingEndpoint {
                network: profile.network,
                key: profile.network.endpoint_key(),
            }
        })?;

        self.profile = None;
        self.snapshot = None;
        self.provider
            .request::<_, Value>(
                "hardhat_reset",
                [json!({ "forking": { "enabled": true, "jsonRpcUrl": url } })],
            )
            .await?;

        let chain_id = self.provider.get_chainid().await?;
        let wallet = self.wallet.clone().with_chain_id(chain_id.as_u64());
        self.client = Arc::new(SignerMiddleware::new(self.provider.clone(), wallet));

        if let Some(balance) = profile.signer_balance {
            self.provider
                .request::<_, Value>("hardhat_setBalance", (self.wallet.address(), balance))
                .await?;
        }

        self.snapshot = Some(self.take_snapshot().await?);
        info!("forked {} (chain id {})", profile.network, chain_id);
        Ok(self.profile.insert(profile))
    }

    /// Restores the state captured right after the last reset.
    ///
    /// Falls back to a full re-fork when the node has no usable snapshot.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let network = self.network().ok_or(SessionError::NotBound)?;
        if let Some(id) = self.snapshot.take() {
            match self.provider.request::<_, bool>("evm_revert", [id]).await {
                Ok(true) => {
                    self.snapshot = Some(self.take_snapshot().await?);
                    debug!("reverted {} to snapshot {}", network, id);
                    return Ok(());
                }
                Ok(false) => warn!("snapshot {} of {} is gone, re-forking", id, network),
                Err(e) => warn!("evm_revert failed on {}: {}, re-forking", network, e),
            }
        }
        self.reset_to_network(network.as_ref()).await.map(|_| ())
    }

    async fn take_snapshot(&self) -> Result<U256, SessionError> {
        Ok(self.provider.request::<_, U256>("evm_snapshot", ()).await?)
    }

    pub fn profile(&self) -> Option<&NetworkProfile> {
        self.profile.as_ref()
    }

    pub fn network(&self) -> Option<Network> {
        self.profile.as_ref().map(|p| p.network)
    }

    /// Signing client bound to the current fork.
    pub fn client(&self) -> Arc<SessionClient> {
        self.client.clone()
    }

    pub fn provider(&self) -> &Provider<Http> {
        &self.provider
    }

    pub fn signer(&self) -> Address {
        self.wallet.address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // first anvil dev account
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn session(endpoints: HashMap<Network, String>) -> ChainSession {
        let config =
            SimulatorConfig { node_url: "http://127.0.0.1:1".to_string(), private_key: DEV_KEY.to_string() };
        ChainSession::connect(&config, endpoints).unwrap()
    }

    #[test]
    fn test_connect() {
        let session = session(HashMap::new());
        assert_eq!(
            format!("{:?}", session.signer()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert!(session.profile().is_none());

        let config = SimulatorConfig { node_url: "not a url".to_string(), private_key: DEV_KEY.to_string() };
        assert!(matches!(
            ChainSession::connect(&config, HashMap::new()),
            Err(SessionError::NodeUrl(_))
        ));
        let config =
            SimulatorConfig { node_url: "http://127.0.0.1:1".to_string(), private_key: "0x12".to_string() };
        assert!(matches!(ChainSession::connect(&config, HashMap::new()), Err(SessionError::Wallet(_))));
    }

    #[tokio::test]
    async fn test_reset_fails_closed_before_touching_node() {
        let mut session = session(HashMap::new());
        assert!(matches!(
            session.reset_to_network("Fantom").await,
            Err(SessionError::UnknownNetwork(name)) if name == "Fantom"
        ));
        match session.reset_to_network("polygon").await {
            Err(SessionError::MissingEndpoint { network, key }) => {
                assert_eq!(network, Network::Polygon);
                assert_eq!(key, "POLYGON_URL");
            }
            other => panic!("unexpected {:?}", other.map(|p| p.network)),
        }
        assert!(session.network().is_none());
    }

    #[tokio::test]
    async fn test_refresh_requires_bound_network() {
        let mut session = session(HashMap::new());
        assert!(matches!(session.refresh().await, Err(SessionError::NotBound)));
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config =
            SimulatorConfig { node_url: "http://127.0.0.1:8545".to_string(), private_key: DEV_KEY.to_string() };
        assert!(!format!("{:?}", config).contains("ac0974"));
    }
}
