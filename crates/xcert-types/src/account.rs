//! Account and contract identifiers.
//!
//! Every identifier that enters an order (maker, taker, ledger, receiver,
//! gateway) is normalized into an `AccountId` before it is encoded, so two
//! parties writing the same address in different letter case still derive
//! the same order hash.

use crate::utils::without_0x_prefix;
use alloy_primitives::Address as AlloyAddress;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a valid 20-byte identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identifier '{input}': {reason}")]
pub struct IdentifierError {
	pub input: String,
	pub reason: String,
}

/// A canonical 20-byte Ethereum account or contract identifier.
///
/// Parsing accepts an optional `0x` prefix and hex digits in any case.
/// Display always produces the lowercase `0x`-prefixed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(AlloyAddress);

impl AccountId {
	/// The all-zero identifier.
	pub const ZERO: AccountId = AccountId(AlloyAddress::ZERO);

	/// Parses and normalizes an identifier.
	pub fn parse(input: &str) -> Result<Self, IdentifierError> {
		let trimmed = input.trim();
		let digits = without_0x_prefix(trimmed);
		if digits.len() != 40 {
			return Err(IdentifierError {
				input: input.to_string(),
				reason: format!("expected 40 hex characters, got {}", digits.len()),
			});
		}
		let mut bytes = [0u8; 20];
		hex::decode_to_slice(digits, &mut bytes).map_err(|e| IdentifierError {
			input: input.to_string(),
			reason: e.to_string(),
		})?;
		Ok(Self(AlloyAddress::from(bytes)))
	}

	/// Returns the raw 20 bytes.
	pub fn as_bytes(&self) -> &[u8] {
		self.0.as_slice()
	}

	/// Returns the alloy address.
	pub fn to_alloy(&self) -> AlloyAddress {
		self.0
	}

	pub fn is_zero(&self) -> bool {
		self.0 == AlloyAddress::ZERO
	}
}

impl From<AlloyAddress> for AccountId {
	fn from(address: AlloyAddress) -> Self {
		Self(address)
	}
}

impl From<AccountId> for AlloyAddress {
	fn from(id: AccountId) -> Self {
		id.0
	}
}

impl FromStr for AccountId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0.as_slice()))
	}
}

impl Serialize for AccountId {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for AccountId {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		AccountId::parse(&s).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_normalizes_case_and_prefix() {
		let mixed = AccountId::parse("0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
		let bare = AccountId::parse("f39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
		assert_eq!(mixed, bare);
		assert_eq!(
			mixed.to_string(),
			"0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
		);
	}

	#[test]
	fn test_parse_rejects_malformed() {
		assert!(AccountId::parse("").is_err());
		assert!(AccountId::parse("0x1234").is_err());
		assert!(AccountId::parse("0xZZ9fd6e51aad88f6f4ce6ab8827279cfffb92266").is_err());
		assert!(AccountId::parse("0xf39fd6e51aad88f6f4ce6ab8827279cfffb9226600").is_err());
	}

	#[test]
	fn test_serde_roundtrip_uses_canonical_form() {
		let id: AccountId =
			serde_json::from_str("\"0x70997970C51812dc3A010C7d01b50e0d17dc79C8\"").unwrap();
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"0x70997970c51812dc3a010c7d01b50e0d17dc79c8\"");
	}

	#[test]
	fn test_zero() {
		assert!(AccountId::ZERO.is_zero());
		assert_eq!(
			AccountId::ZERO.to_string(),
			"0x0000000000000000000000000000000000000000"
		);
	}
}
