mod erc20;
pub use erc20::*;

mod exchange;
pub use exchange::*;
