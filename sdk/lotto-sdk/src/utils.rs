use alloy::primitives::{Address, U256};

/// Abbreviate an address for display, keeping the `0x` prefix and the last
/// four hex digits.
pub fn short_address(address: &Address) -> String {
    let hex = address.to_string();
    format!("{}...{}", &hex[..6], &hex[38..])
}

/// Render a minor-unit amount as a decimal string in whole currency units.
///
/// Pure integer arithmetic; trailing zeros in the fraction are trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let base = U256::from(10u8).pow(U256::from(decimals));
    let whole = amount / base;
    let frac = amount % base;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
