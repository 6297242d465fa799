use ethers::prelude::*;

/// Sentinel the exchange contract uses for the chain's native asset.
pub const NATIVE_ASSET: H160 = H160([0xee; 20]);

/// Gas limit attached to every simulated swap.
pub const SWAP_GAS_LIMIT: u64 = 30_000_000;

/// The second measurement trades this many times the base amount.
pub const SIZE_MULTIPLIER: u64 = 10;

/// Number of decimals of the native asset.
pub const NATIVE_DECIMALS: u32 = 18;

/// Both the sentinel and the zero address denote the native asset.
pub fn is_native(asset: &Address) -> bool {
    *asset == NATIVE_ASSET || asset.is_zero()
}
