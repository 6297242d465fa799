//! Bindings of the contracts the monitor talks to, generated from human-readable ABIs.

mod erc20;
pub use erc20::ERC20;

mod exchange;
pub use exchange::IExchange;

mod oracle;
pub use oracle::IChainlinkOracle;
