use ethers::{
    core::types::{Address, U256},
    utils::parse_ether,
};
use meta_common::enums::Network;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{collections::HashMap, str::FromStr};

/// Deployment data of one monitored network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    pub network: Network,
    /// Exchange/aggregator contract swaps are routed through.
    pub exchange: Address,
    pub wrapped_native: Address,
    /// Chainlink feed pricing the native asset in USD.
    pub price_feed: Address,
    /// Trade size of the first measurement, in wei.
    pub base_amount: U256,
    /// Balance credited to the signer after every fork, in wei.
    pub signer_balance: Option<U256>,
}

#[derive(Clone, Debug, Deserialize)]
struct ProfileEntry {
    exchange: Address,
    wrapped_native: Address,
    price_feed: Address,
    base_amount: String,
    #[serde(default)]
    signer_balance: Option<String>,
}

impl ProfileEntry {
    fn into_profile(self, network: Network) -> Option<NetworkProfile> {
        let signer_balance = match self.signer_balance {
            Some(balance) => Some(parse_ether(balance).ok()?),
            None => None,
        };
        Some(NetworkProfile {
            network,
            exchange: self.exchange,
            wrapped_native: self.wrapped_native,
            price_feed: self.price_feed,
            base_amount: parse_ether(self.base_amount).ok()?,
            signer_balance,
        })
    }
}

const NETWORK_PROFILE_JSON: &str = include_str!("../static/network_profile.json");

static NETWORK_PROFILE_BOOK: Lazy<HashMap<Network, NetworkProfile>> = Lazy::new(|| {
    let entries: HashMap<Network, ProfileEntry> =
        serde_json::from_str(NETWORK_PROFILE_JSON).expect("malformed network_profile.json");
    entries
        .into_iter()
        .filter_map(|(network, entry)| entry.into_profile(network).map(|profile| (network, profile)))
        .collect()
});

pub fn get_network_profile(network: Network) -> Option<NetworkProfile> {
    NETWORK_PROFILE_BOOK.get(&network).cloned()
}

/// Case-insensitive lookup by display name; unknown names yield `None`.
pub fn find_network_profile(name: &str) -> Option<NetworkProfile> {
    Network::from_str(name.trim()).ok().and_then(get_network_profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::parse_ether;

    #[test]
    fn test_every_network_has_profile() {
        use strum::IntoEnumIterator;
        for network in Network::iter() {
            let profile = get_network_profile(network).unwrap();
            assert_eq!(profile.network, network);
            assert!(!profile.exchange.is_zero());
        }
    }

    #[test]
    fn test_base_amounts() {
        let polygon = get_network_profile(Network::Polygon).unwrap();
        assert_eq!(polygon.base_amount, parse_ether(2500).unwrap());
        assert_eq!(polygon.signer_balance, Some(parse_ether(15_000_000).unwrap()));

        let ethereum = get_network_profile(Network::Ethereum).unwrap();
        assert_eq!(ethereum.base_amount, parse_ether(1).unwrap());
        assert!(ethereum.signer_balance.is_none());
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_network_profile("optimism").unwrap().network, Network::Optimism);
        assert_eq!(
            find_network_profile("Optimism").unwrap().wrapped_native,
            Address::from_str("0x4200000000000000000000000000000000000006").unwrap()
        );
        assert!(find_network_profile("Fantom").is_none());
        assert!(find_network_profile("").is_none());
    }
}
