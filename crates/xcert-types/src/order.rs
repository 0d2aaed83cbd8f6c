//! Exchange orders and their kind-specific payloads.
//!
//! An order is a tagged union over the gateway order kinds. Each kind has a
//! fixed payload record; identifiers and amounts are kept exactly as the
//! caller supplied them and are normalized by the codec when the order is
//! encoded.

use crate::{AssetLedgerAbility, AssetLedgerCapability, Numeric};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminator of an order, used for gateway lookup and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
	ActionsOrder,
	AssetLedgerDeployOrder,
	ValueLedgerDeployOrder,
}

impl fmt::Display for OrderKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderKind::ActionsOrder => write!(f, "ActionsOrder"),
			OrderKind::AssetLedgerDeployOrder => write!(f, "AssetLedgerDeployOrder"),
			OrderKind::ValueLedgerDeployOrder => write!(f, "ValueLedgerDeployOrder"),
		}
	}
}

/// Party that has to sign an order before it can be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerRole {
	Maker,
	Taker,
}

impl fmt::Display for SignerRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SignerRole::Maker => write!(f, "maker"),
			SignerRole::Taker => write!(f, "taker"),
		}
	}
}

/// A gateway order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Order {
	#[serde(rename = "ACTIONS_ORDER")]
	Actions(ActionsOrder),
	#[serde(rename = "ASSET_LEDGER_DEPLOY_ORDER")]
	AssetLedgerDeploy(AssetLedgerDeployOrder),
	#[serde(rename = "VALUE_LEDGER_DEPLOY_ORDER")]
	ValueLedgerDeploy(ValueLedgerDeployOrder),
}

/// Order deploying a new asset ledger on behalf of the maker, paid for by a
/// token transfer from the taker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLedgerDeployOrder {
	pub maker_id: String,
	pub taker_id: String,
	pub seed: Numeric,
	/// Expiration timestamp in milliseconds.
	pub expiration: Numeric,
	pub asset_ledger_data: AssetLedgerData,
	pub token_transfer_data: TokenTransferData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetLedgerData {
	pub name: String,
	pub symbol: String,
	pub uri_prefix: String,
	pub uri_postfix: String,
	/// 32-byte schema identifier as hex, with or without `0x`.
	pub schema_id: String,
	/// Capabilities in the order they are encoded.
	#[serde(default)]
	pub capabilities: Vec<AssetLedgerCapability>,
	pub owner_id: String,
}

/// Order deploying a new value (fungible token) ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueLedgerDeployOrder {
	pub maker_id: String,
	pub taker_id: String,
	pub seed: Numeric,
	/// Expiration timestamp in milliseconds.
	pub expiration: Numeric,
	pub value_ledger_data: ValueLedgerData,
	pub token_transfer_data: TokenTransferData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueLedgerData {
	pub name: String,
	pub symbol: String,
	/// Total supply as a decimal string.
	pub supply: String,
	pub decimals: u8,
	pub owner_id: String,
}

/// Token payment attached to a deploy order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferData {
	pub ledger_id: String,
	pub receiver_id: String,
	/// Amount as a decimal string.
	pub value: String,
}

/// Order bundling an ordered list of ledger actions between maker and taker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionsOrder {
	pub maker_id: String,
	pub taker_id: String,
	pub seed: Numeric,
	/// Expiration timestamp in milliseconds.
	pub expiration: Numeric,
	pub actions: Vec<Action>,
}

/// Code identifying an action inside an actions order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionKind {
	CreateAsset = 1,
	TransferAsset = 2,
	TransferValue = 3,
	SetAbilities = 4,
	DestroyAsset = 5,
	UpdateAssetImprint = 6,
}

impl ActionKind {
	pub fn code(self) -> u8 {
		self as u8
	}
}

/// A single ledger action of an actions order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
	tag = "kind",
	rename_all = "SCREAMING_SNAKE_CASE",
	rename_all_fields = "camelCase"
)]
pub enum Action {
	CreateAsset {
		ledger_id: String,
		receiver_id: String,
		asset_id: String,
		asset_imprint: String,
	},
	TransferAsset {
		ledger_id: String,
		sender_id: String,
		receiver_id: String,
		asset_id: String,
	},
	TransferValue {
		ledger_id: String,
		sender_id: String,
		receiver_id: String,
		value: String,
	},
	SetAbilities {
		ledger_id: String,
		receiver_id: String,
		abilities: Vec<AssetLedgerAbility>,
	},
	DestroyAsset {
		ledger_id: String,
		asset_id: String,
	},
	UpdateAssetImprint {
		ledger_id: String,
		asset_id: String,
		asset_imprint: String,
	},
}

impl Action {
	pub fn kind(&self) -> ActionKind {
		match self {
			Action::CreateAsset { .. } => ActionKind::CreateAsset,
			Action::TransferAsset { .. } => ActionKind::TransferAsset,
			Action::TransferValue { .. } => ActionKind::TransferValue,
			Action::SetAbilities { .. } => ActionKind::SetAbilities,
			Action::DestroyAsset { .. } => ActionKind::DestroyAsset,
			Action::UpdateAssetImprint { .. } => ActionKind::UpdateAssetImprint,
		}
	}

	pub fn ledger_id(&self) -> &str {
		match self {
			Action::CreateAsset { ledger_id, .. }
			| Action::TransferAsset { ledger_id, .. }
			| Action::TransferValue { ledger_id, .. }
			| Action::SetAbilities { ledger_id, .. }
			| Action::DestroyAsset { ledger_id, .. }
			| Action::UpdateAssetImprint { ledger_id, .. } => ledger_id,
		}
	}
}

const MAKER_ONLY: &[SignerRole] = &[SignerRole::Maker];
const MAKER_AND_TAKER: &[SignerRole] = &[SignerRole::Maker, SignerRole::Taker];

impl Order {
	pub fn kind(&self) -> OrderKind {
		match self {
			Order::Actions(_) => OrderKind::ActionsOrder,
			Order::AssetLedgerDeploy(_) => OrderKind::AssetLedgerDeployOrder,
			Order::ValueLedgerDeploy(_) => OrderKind::ValueLedgerDeployOrder,
		}
	}

	pub fn maker_id(&self) -> &str {
		match self {
			Order::Actions(o) => &o.maker_id,
			Order::AssetLedgerDeploy(o) => &o.maker_id,
			Order::ValueLedgerDeploy(o) => &o.maker_id,
		}
	}

	pub fn taker_id(&self) -> &str {
		match self {
			Order::Actions(o) => &o.taker_id,
			Order::AssetLedgerDeploy(o) => &o.taker_id,
			Order::ValueLedgerDeploy(o) => &o.taker_id,
		}
	}

	pub fn seed(&self) -> &Numeric {
		match self {
			Order::Actions(o) => &o.seed,
			Order::AssetLedgerDeploy(o) => &o.seed,
			Order::ValueLedgerDeploy(o) => &o.seed,
		}
	}

	/// Expiration as supplied, in milliseconds.
	pub fn expiration(&self) -> &Numeric {
		match self {
			Order::Actions(o) => &o.expiration,
			Order::AssetLedgerDeploy(o) => &o.expiration,
			Order::ValueLedgerDeploy(o) => &o.expiration,
		}
	}

	/// Roles whose signatures the gateway requires before the order can be
	/// performed. Deploy orders are claimed by the maker and performed by the
	/// taker; actions orders need both parties' signatures.
	pub fn required_signers(&self) -> &'static [SignerRole] {
		match self {
			Order::Actions(_) => MAKER_AND_TAKER,
			Order::AssetLedgerDeploy(_) | Order::ValueLedgerDeploy(_) => MAKER_ONLY,
		}
	}

	/// Identifier expected to sign for the given role.
	pub fn signer_id(&self, role: SignerRole) -> &str {
		match role {
			SignerRole::Maker => self.maker_id(),
			SignerRole::Taker => self.taker_id(),
		}
	}
}
