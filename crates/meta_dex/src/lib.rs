pub mod error;
pub mod measurement;
pub mod swap;
pub mod prelude {
    pub use super::{error::*, measurement::*, MeasurementSession, Venue};
}

use async_trait::async_trait;
use ethers::types::{Address, U256};
use meta_util::FixedPoint;

/// Somewhere swaps can be executed on behalf of a single signer.
#[async_trait]
pub trait Venue: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Swaps `amount` of `from` into `to` and returns what the signer received, at the output
    /// asset's precision. Native asset legs use the sentinel (or zero) address.
    async fn swap(&mut self, from: Address, to: Address, amount: U256)
        -> Result<FixedPoint, Self::Error>;

    /// Signer balance of an ERC20 token.
    async fn token_balance(&self, token: Address) -> Result<U256, Self::Error>;

    /// USD price of the native asset.
    async fn reference_price(&self) -> Result<FixedPoint, Self::Error>;
}

/// A venue that can be re-pointed at a network and rolled back between measurements.
#[async_trait]
pub trait MeasurementSession: Venue {
    /// Binds the named network and returns its canonical name.
    async fn reset_to_network(&mut self, name: &str) -> Result<String, Self::Error>;

    async fn refresh(&mut self) -> Result<(), Self::Error>;

    /// Trade size of the first measurement on the bound network, in wei.
    fn base_amount(&self) -> Option<U256>;

    async fn route_length(&self, token: Address) -> Result<usize, Self::Error>;

    async fn token_symbol(&self, token: Address) -> Result<String, Self::Error>;
}
