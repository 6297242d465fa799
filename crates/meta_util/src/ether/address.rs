use ethers::types::Address;
use std::str::FromStr;

pub fn address_to_str(addr: &Address) -> String {
    format!("{addr:?}")
}

/// Parses a `0x`-prefixed (or bare) hex address, tolerating surrounding whitespace from sheet cells.
pub fn address_from_str(addr: &str) -> Option<Address> {
    Address::from_str(addr.trim()).ok()
}
