use serde::Deserialize;
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, EnumVariantNames};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,         // AsRef<str>, fmt::Display and serde::Serialize
    EnumVariantNames, // Network::VARIANTS
    EnumString,       // FromStr, TryFrom<&str>
    EnumIter,         // Network::iter
    EnumCount,        // Network::COUNT
    Deserialize,
    Display,
)]
pub enum Network {
    #[strum(ascii_case_insensitive, serialize = "Ethereum")]
    Ethereum,

    #[strum(ascii_case_insensitive, serialize = "Polygon")]
    Polygon,

    #[strum(ascii_case_insensitive, serialize = "Optimism")]
    Optimism,
}

impl Default for Network {
    fn default() -> Self {
        Self::Ethereum
    }
}

impl Network {
    /// Credential key holding the upstream RPC url of this network.
    pub fn endpoint_key(&self) -> String {
        endpoint_key(self.as_ref())
    }
}

/// `Polygon` -> `POLYGON_URL`, `Arbitrum One` -> `ARBITRUM_ONE_URL`.
pub fn endpoint_key(network_name: &str) -> String {
    format!("{}_URL", network_name.trim().to_uppercase().replace(' ', "_"))
}
