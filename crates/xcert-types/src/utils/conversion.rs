//! Parsing of decimal amounts and 32-byte hex values used in order payloads.

use super::formatting::without_0x_prefix;
use alloy_primitives::{B256, U256};
use thiserror::Error;

/// Error returned when an order field cannot be parsed into its fixed-width
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
	#[error("Invalid uint256 '{0}'")]
	InvalidUint256(String),
	#[error("Invalid bytes32 '{0}'")]
	InvalidBytes32(String),
}

/// Parses a decimal string into a 256-bit unsigned integer.
///
/// Amounts, asset ids and supplies are decimal strings in orders because they
/// routinely exceed `u64`.
pub fn parse_uint256(value: &str) -> Result<U256, ConversionError> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		return Err(ConversionError::InvalidUint256(value.to_string()));
	}
	U256::from_str_radix(trimmed, 10).map_err(|_| ConversionError::InvalidUint256(value.to_string()))
}

/// Parses a 64-digit hex string (with or without `0x`) into 32 bytes.
pub fn parse_bytes32(value: &str) -> Result<B256, ConversionError> {
	let stripped = without_0x_prefix(value.trim());
	if stripped.len() != 64 {
		return Err(ConversionError::InvalidBytes32(value.to_string()));
	}
	let mut out = [0u8; 32];
	hex::decode_to_slice(stripped, &mut out)
		.map_err(|_| ConversionError::InvalidBytes32(value.to_string()))?;
	Ok(B256::from(out))
}
