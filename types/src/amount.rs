//! Native balance helpers.
//!
//! Balances are carried as raw integers in the smallest unit (wei) to avoid
//! floating-point errors. Conversion to ether is for display only.

/// Number of wei in one ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Format a wei amount as a decimal ether string, e.g. `1.5 ETH`.
///
/// Trailing fractional zeros are dropped.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;
    if frac == 0 {
        return format!("{whole} ETH");
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{} ETH", digits.trim_end_matches('0'))
}
