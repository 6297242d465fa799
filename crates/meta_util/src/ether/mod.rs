mod address;
pub use address::*;

use ethers::{types::U256, utils::format_units};

/// Wei amount in ether without trailing zeros, keeping one fractional digit (`2500.0`).
pub fn format_ether_amount(amount: U256) -> String {
    let text = format_units(amount, 18u32).unwrap_or_else(|_| amount.to_string());
    match text.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            format!("{}.{}", int, if frac.is_empty() { "0" } else { frac })
        }
        None => text,
    }
}
