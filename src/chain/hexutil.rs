//! Parsing and formatting of EVM hex quantities and addresses.

use alloy_primitives::U256;

fn strip_0x(raw: &str) -> Option<&str> {
    raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))
}

pub(super) fn parse_hex_u64(raw: &str) -> Option<u64> {
    let digits = strip_0x(raw.trim())?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// 256-bit quantity such as a wei balance; at most 64 hex digits.
pub(super) fn parse_hex_u256(raw: &str) -> Option<U256> {
    let digits = strip_0x(raw.trim())?;
    if digits.is_empty() || digits.len() > 64 {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Lowercased `0x` + 40 hex digits, or `None`.
pub(super) fn normalize_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_ascii_lowercase();
    let valid = trimmed.len() == 42
        && trimmed.starts_with("0x")
        && trimmed.bytes().skip(2).all(|b| b.is_ascii_hexdigit());
    valid.then_some(trimmed)
}

/// Lowercased even-length `0x` hex blob (signed transactions, calldata).
pub(super) fn normalize_hex_blob(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_ascii_lowercase();
    let digits = trimmed.strip_prefix("0x")?;
    let valid = !digits.is_empty()
        && digits.len() % 2 == 0
        && digits.bytes().all(|b| b.is_ascii_hexdigit());
    valid.then_some(trimmed)
}

/// Render wei as a decimal ether amount without trailing zeros.
pub(super) fn format_ether(wei: U256) -> String {
    let formatted = alloy_primitives::utils::format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => formatted,
    }
}
