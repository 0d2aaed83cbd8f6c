//! Clock and hashing helpers.

use alloy_primitives::{keccak256, B256};

/// Current UNIX timestamp in seconds, or 0 if the system clock is before the
/// epoch.
pub fn current_timestamp() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Keccak-256 of a UTF-8 string.
///
/// Used to derive schema ids and imprints from human-readable inputs.
pub fn sha(value: &str) -> B256 {
	keccak256(value.as_bytes())
}
