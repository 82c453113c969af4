use alloy::primitives::{utils::format_ether, U256};
use bytesize::ByteSize;
use owo_colors::OwoColorize;

pub fn format_gas(gas: u64) -> String {
    let text = format!("{gas} gas");
    if gas <= 3_000_000 {
        text.bright_green().to_string()
    } else if gas <= 7_000_000 {
        text.yellow().to_string()
    } else {
        text.bright_purple().to_string()
    }
}

/// Colors a code size against two KiB limits.
///
/// Init code is checked against the 24 KiB runtime limit of EIP-170 and the
/// 48 KiB init-code limit of EIP-3860: within the first it is green, within
/// the second yellow, and past both the node will refuse it.
pub fn format_file_size(len: usize, warn_kib: u64, limit_kib: u64) -> String {
    let size = ByteSize::b(len as u64);
    if size <= ByteSize::kib(warn_kib) {
        size.bright_green().to_string()
    } else if size <= ByteSize::kib(limit_kib) {
        size.yellow().to_string()
    } else {
        size.bright_purple().to_string()
    }
}

/// Pretty-prints an amount of wei in ether.
pub fn format_cost(wei: U256) -> String {
    let text = format!("Ξ{}", format_ether(wei));
    if wei <= U256::from(10_000_000_000_000_000u64) {
        text.bright_green().to_string()
    } else if wei <= U256::from(100_000_000_000_000_000u64) {
        text.yellow().to_string()
    } else {
        text.bright_purple().to_string()
    }
}
