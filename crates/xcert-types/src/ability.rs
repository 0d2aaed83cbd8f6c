//! Ledger abilities and capabilities.
//!
//! Abilities are permissions granted to an account on an asset ledger.
//! Capabilities are optional features a ledger is deployed with. Both are
//! small closed sets of integer codes and are carried as ordered lists,
//! never as bitmasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission an account may hold on an asset ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum AssetLedgerAbility {
	ManageAbilities = 0,
	MintAsset = 1,
	RevokeAsset = 2,
	PauseTransfer = 3,
	UpdateProof = 4,
	SignMintClaim = 5,
}

impl AssetLedgerAbility {
	/// All abilities in code order.
	pub const ALL: [AssetLedgerAbility; 6] = [
		AssetLedgerAbility::ManageAbilities,
		AssetLedgerAbility::MintAsset,
		AssetLedgerAbility::RevokeAsset,
		AssetLedgerAbility::PauseTransfer,
		AssetLedgerAbility::UpdateProof,
		AssetLedgerAbility::SignMintClaim,
	];

	pub fn code(self) -> u8 {
		self as u8
	}

	pub fn from_code(code: u8) -> Option<Self> {
		Self::ALL.into_iter().find(|a| a.code() == code)
	}
}

/// Optional feature an asset ledger is deployed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum AssetLedgerCapability {
	DestroyAsset = 1,
	UpdateAsset = 2,
	ToggleTransfers = 3,
	RevokeAsset = 4,
}

impl AssetLedgerCapability {
	pub const ALL: [AssetLedgerCapability; 4] = [
		AssetLedgerCapability::DestroyAsset,
		AssetLedgerCapability::UpdateAsset,
		AssetLedgerCapability::ToggleTransfers,
		AssetLedgerCapability::RevokeAsset,
	];

	pub fn code(self) -> u8 {
		self as u8
	}

	pub fn from_code(code: u8) -> Option<Self> {
		Self::ALL.into_iter().find(|c| c.code() == code)
	}
}

/// Ability on the token transfer proxy that lets a gateway move tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TokenTransferProxyAbility {
	Execute = 2,
}

impl TokenTransferProxyAbility {
	pub fn code(self) -> u8 {
		self as u8
	}
}

impl fmt::Display for AssetLedgerAbility {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			AssetLedgerAbility::ManageAbilities => "MANAGE_ABILITIES",
			AssetLedgerAbility::MintAsset => "MINT_ASSET",
			AssetLedgerAbility::RevokeAsset => "REVOKE_ASSET",
			AssetLedgerAbility::PauseTransfer => "PAUSE_TRANSFER",
			AssetLedgerAbility::UpdateProof => "UPDATE_PROOF",
			AssetLedgerAbility::SignMintClaim => "SIGN_MINT_CLAIM",
		};
		write!(f, "{}", name)
	}
}
