//! Asset ledger records returned by ledger queries.

use serde::{Deserialize, Serialize};

/// Descriptive data of a deployed asset ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLedgerInfo {
	pub name: String,
	pub symbol: String,
	pub uri_prefix: String,
	pub uri_postfix: String,
	/// Schema identifier as `0x`-prefixed hex.
	pub schema_id: String,
	/// Total number of assets, as a decimal string.
	pub supply: String,
}

/// A single asset held by a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLedgerItem {
	/// Asset id as a decimal string.
	pub id: String,
	pub uri: String,
	/// Imprint (proof) as `0x`-prefixed hex.
	pub imprint: String,
}

/// Recipe for minting a new asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLedgerItemRecipe {
	pub receiver_id: String,
	pub id: String,
	pub imprint: String,
}

/// Recipe for transferring an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLedgerTransferRecipe {
	pub sender_id: Option<String>,
	pub receiver_id: String,
	pub id: String,
	/// Extra calldata forwarded to a receiving contract.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

/// State of an order claim as recorded by a gateway contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerOrderStatus {
	/// The gateway has no record of the claim.
	Unknown,
	/// The order was performed and the claim consumed.
	Performed,
	/// The maker cancelled the claim.
	Cancelled,
}
