//! Canonical order encoding for the Xcert gateway.
//!
//! This crate turns an [`Order`] into the exact byte sequence the gateway
//! contracts hash when they check a claim, and hashes it with keccak-256.
//! Maker and taker compute the hash independently, so the layout is fixed per
//! order kind and every identifier is normalized before it is written.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{sol_data, SolType, SolValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xcert_types::{
	parse_bytes32, parse_uint256, AccountId, Action, ActionsOrder,
	AssetLedgerDeployOrder, ConversionError, IdentifierError, NumericError, Order, OrderKind,
	TokenTransferData, ValueLedgerDeployOrder,
};

/// Errors that can occur while encoding an order.
#[derive(Debug, Error)]
pub enum CodecError {
	/// A field is missing, malformed or cannot be represented.
	#[error("Encoding error: {0}")]
	Encoding(String),
	/// An identifier is not a valid 20-byte address.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
}

impl From<NumericError> for CodecError {
	fn from(e: NumericError) -> Self {
		CodecError::Encoding(e.to_string())
	}
}

impl From<ConversionError> for CodecError {
	fn from(e: ConversionError) -> Self {
		CodecError::Encoding(e.to_string())
	}
}

/// Deployed gateway contracts, one per order kind.
///
/// The contract id is the first field of every encoding, so an order hashed
/// for one gateway is never valid on another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
	#[serde(default)]
	pub actions_order_id: Option<AccountId>,
	#[serde(default)]
	pub asset_ledger_deploy_order_id: Option<AccountId>,
	#[serde(default)]
	pub value_ledger_deploy_order_id: Option<AccountId>,
}

impl GatewayConfig {
	/// Gateway contract handling the given order kind.
	pub fn gateway_id(&self, kind: OrderKind) -> Option<AccountId> {
		match kind {
			OrderKind::ActionsOrder => self.actions_order_id,
			OrderKind::AssetLedgerDeployOrder => self.asset_ledger_deploy_order_id,
			OrderKind::ValueLedgerDeployOrder => self.value_ledger_deploy_order_id,
		}
	}
}

/// Encodes and hashes orders for a fixed set of gateway contracts.
#[derive(Debug, Clone)]
pub struct OrderCodec {
	gateways: GatewayConfig,
}

impl OrderCodec {
	pub fn new(gateways: GatewayConfig) -> Self {
		Self { gateways }
	}

	pub fn gateways(&self) -> &GatewayConfig {
		&self.gateways
	}

	/// Parses an order from its JSON form.
	///
	/// Unknown kinds and missing fields surface as encoding errors.
	pub fn decode_order(json: &str) -> Result<Order, CodecError> {
		serde_json::from_str(json).map_err(|e| CodecError::Encoding(e.to_string()))
	}

	/// Produces the canonical packed encoding of an order.
	pub fn encode_order(&self, order: &Order) -> Result<Vec<u8>, CodecError> {
		let kind = order.kind();
		let gateway = self.gateways.gateway_id(kind).ok_or_else(|| {
			CodecError::Encoding(format!("No gateway contract configured for {}", kind))
		})?;

		let body = match order {
			Order::AssetLedgerDeploy(o) => encode_asset_ledger_deploy(o)?,
			Order::ValueLedgerDeploy(o) => encode_value_ledger_deploy(o)?,
			Order::Actions(o) => encode_actions(o)?,
		};
		let bytes = (
			gateway.to_alloy(),
			body,
			U256::from(order.seed().to_integer()?),
			U256::from(order.expiration().to_seconds()?),
		)
			.abi_encode_packed();
		tracing::debug!(kind = %kind, len = bytes.len(), "Encoded order");
		Ok(bytes)
	}

	/// Keccak-256 of [`encode_order`](Self::encode_order).
	pub fn hash_order(&self, order: &Order) -> Result<B256, CodecError> {
		let hash = keccak256(self.encode_order(order)?);
		tracing::debug!(order_hash = %hash, "Hashed order");
		Ok(hash)
	}
}

fn address(id: &str) -> Result<Address, CodecError> {
	Ok(AccountId::parse(id)?.to_alloy())
}

/// One byte per code, packed back to back.
fn codes(codes: impl Iterator<Item = u8>) -> Bytes {
	codes.collect::<Vec<u8>>().into()
}

fn encode_token_transfer(data: &TokenTransferData) -> Result<Bytes, CodecError> {
	Ok((
		address(&data.ledger_id)?,
		address(&data.receiver_id)?,
		parse_uint256(&data.value)?,
	)
		.abi_encode_packed()
		.into())
}

fn encode_asset_ledger_deploy(o: &AssetLedgerDeployOrder) -> Result<Bytes, CodecError> {
	let data = &o.asset_ledger_data;
	// Caller order is kept; contracts hash the list as given.
	let capabilities = codes(data.capabilities.iter().map(|c| c.code()));
	Ok((
		address(&o.maker_id)?,
		address(&o.taker_id)?,
		data.name.clone(),
		data.symbol.clone(),
		data.uri_prefix.clone(),
		data.uri_postfix.clone(),
		parse_bytes32(&data.schema_id)?,
		capabilities,
		address(&data.owner_id)?,
		encode_token_transfer(&o.token_transfer_data)?,
	)
		.abi_encode_packed()
		.into())
}

fn encode_value_ledger_deploy(o: &ValueLedgerDeployOrder) -> Result<Bytes, CodecError> {
	let data = &o.value_ledger_data;
	Ok((
		address(&o.maker_id)?,
		address(&o.taker_id)?,
		data.name.clone(),
		data.symbol.clone(),
		parse_uint256(&data.supply)?,
		U256::from(data.decimals),
		address(&data.owner_id)?,
		encode_token_transfer(&o.token_transfer_data)?,
	)
		.abi_encode_packed()
		.into())
}

fn encode_actions(o: &ActionsOrder) -> Result<Bytes, CodecError> {
	let mut actions = Vec::new();
	for action in &o.actions {
		let packed = <(sol_data::Uint<8>, sol_data::Address, sol_data::Bytes)>::abi_encode_packed(&(
			action.kind().code(),
			address(action.ledger_id())?,
			Bytes::from(encode_action_payload(action)?),
		));
		actions.extend_from_slice(&packed);
	}
	Ok((address(&o.maker_id)?, address(&o.taker_id)?, Bytes::from(actions))
		.abi_encode_packed()
		.into())
}

/// Packed kind-specific payload of one action, without its kind and ledger
/// prefix. Gateway calldata carries the same bytes as the action `params`.
pub fn encode_action_payload(action: &Action) -> Result<Vec<u8>, CodecError> {
	let payload = match action {
		Action::CreateAsset {
			receiver_id,
			asset_id,
			asset_imprint,
			..
		} => (
			address(receiver_id)?,
			parse_uint256(asset_id)?,
			parse_bytes32(asset_imprint)?,
		)
			.abi_encode_packed(),
		Action::TransferAsset {
			sender_id,
			receiver_id,
			asset_id,
			..
		} => (
			address(sender_id)?,
			address(receiver_id)?,
			parse_uint256(asset_id)?,
		)
			.abi_encode_packed(),
		Action::TransferValue {
			sender_id,
			receiver_id,
			value,
			..
		} => (
			address(sender_id)?,
			address(receiver_id)?,
			parse_uint256(value)?,
		)
			.abi_encode_packed(),
		Action::SetAbilities {
			receiver_id,
			abilities,
			..
		} => (
			address(receiver_id)?,
			codes(abilities.iter().map(|a| a.code())),
		)
			.abi_encode_packed(),
		Action::DestroyAsset { asset_id, .. } => parse_uint256(asset_id)?.abi_encode_packed(),
		Action::UpdateAssetImprint {
			asset_id,
			asset_imprint,
			..
		} => (parse_uint256(asset_id)?, parse_bytes32(asset_imprint)?).abi_encode_packed(),
	};
	Ok(payload)
}

#[cfg(test)]
mod tests {
	use super::*;
	use xcert_types::{AssetLedgerAbility, AssetLedgerCapability, Numeric};

	const GATEWAY: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
	const MAKER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
	const TAKER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
	const LEDGER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
	const SCHEMA: &str = "9c22ff5f21f0b81b113e63f7db6da94fedef11b2119b4088b89664fb9a3cb658";
	const IMPRINT: &str = "0x1e205550c221490347e5e2393a02e94d284bbe9903f023ba098355b8d75974c8";

	fn codec() -> OrderCodec {
		let gateway = AccountId::parse(GATEWAY).unwrap();
		OrderCodec::new(GatewayConfig {
			actions_order_id: Some(gateway),
			asset_ledger_deploy_order_id: Some(gateway),
			value_ledger_deploy_order_id: Some(gateway),
		})
	}

	fn deploy_order() -> Order {
		Order::AssetLedgerDeploy(AssetLedgerDeployOrder {
			maker_id: MAKER.to_string(),
			taker_id: TAKER.to_string(),
			seed: Numeric::from(1535113220.12345),
			expiration: Numeric::from(1_700_000_000_999u64),
			asset_ledger_data: xcert_types::AssetLedgerData {
				name: "test".to_string(),
				symbol: "TST".to_string(),
				uri_prefix: "https://base.com/".to_string(),
				uri_postfix: ".json".to_string(),
				schema_id: SCHEMA.to_string(),
				capabilities: vec![
					AssetLedgerCapability::ToggleTransfers,
					AssetLedgerCapability::DestroyAsset,
				],
				owner_id: TAKER.to_string(),
			},
			token_transfer_data: TokenTransferData {
				ledger_id: LEDGER.to_string(),
				receiver_id: MAKER.to_string(),
				value: "10000".to_string(),
			},
		})
	}

	fn actions_order(actions: Vec<Action>) -> Order {
		Order::Actions(ActionsOrder {
			maker_id: MAKER.to_string(),
			taker_id: TAKER.to_string(),
			seed: Numeric::from(7u64),
			expiration: Numeric::from(1_700_000_000_000u64),
			actions,
		})
	}

	fn word(v: u64) -> Vec<u8> {
		let mut w = vec![0u8; 32];
		w[24..].copy_from_slice(&v.to_be_bytes());
		w
	}

	#[test]
	fn test_deploy_layout() {
		let bytes = codec().encode_order(&deploy_order()).unwrap();
		let strings = "test".len() + "TST".len() + "https://base.com/".len() + ".json".len();
		assert_eq!(bytes.len(), 60 + strings + 32 + 2 + 60 + 96);

		assert_eq!(&bytes[..20], AccountId::parse(GATEWAY).unwrap().as_bytes());
		assert_eq!(&bytes[20..40], AccountId::parse(MAKER).unwrap().as_bytes());
		assert_eq!(&bytes[60..64], b"test");

		let caps_at = 60 + strings + 32;
		assert_eq!(&bytes[caps_at..caps_at + 2], &[3, 1]);

		let tail = bytes.len() - 64;
		assert_eq!(&bytes[tail..tail + 32], word(1535113220).as_slice());
		assert_eq!(&bytes[tail + 32..], word(1_700_000_000).as_slice());
	}

	#[test]
	fn test_hash_is_deterministic() {
		let c = codec();
		let a = c.hash_order(&deploy_order()).unwrap();
		let b = c.hash_order(&deploy_order()).unwrap();
		assert_eq!(a, b);
		assert_eq!(a, keccak256(c.encode_order(&deploy_order()).unwrap()));
	}

	#[test]
	fn test_float_and_integer_seed_hash_equal() {
		let c = codec();
		let mut order = deploy_order();
		let float_hash = c.hash_order(&order).unwrap();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.seed = Numeric::from(1535113220u64);
			o.expiration = Numeric::from(1_700_000_000_000.5);
		}
		assert_eq!(c.hash_order(&order).unwrap(), float_hash);
	}

	#[test]
	fn test_identifier_case_does_not_change_hash() {
		let c = codec();
		let mut order = deploy_order();
		let hash = c.hash_order(&order).unwrap();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.maker_id = MAKER.to_lowercase();
			o.token_transfer_data.ledger_id = LEDGER.to_uppercase().replacen("0X", "0x", 1);
		}
		assert_eq!(c.hash_order(&order).unwrap(), hash);
	}

	#[test]
	fn test_single_field_changes_hash() {
		let c = codec();
		let hash = c.hash_order(&deploy_order()).unwrap();

		let mut order = deploy_order();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.token_transfer_data.value = "10001".to_string();
		}
		assert_ne!(c.hash_order(&order).unwrap(), hash);

		let mut order = deploy_order();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.asset_ledger_data.capabilities.reverse();
		}
		assert_ne!(c.hash_order(&order).unwrap(), hash);
	}

	#[test]
	fn test_gateway_is_part_of_hash() {
		let other = OrderCodec::new(GatewayConfig {
			asset_ledger_deploy_order_id: Some(AccountId::parse(LEDGER).unwrap()),
			..Default::default()
		});
		assert_ne!(
			other.hash_order(&deploy_order()).unwrap(),
			codec().hash_order(&deploy_order()).unwrap()
		);
	}

	#[test]
	fn test_missing_gateway_is_encoding_error() {
		let c = OrderCodec::new(GatewayConfig::default());
		assert!(matches!(
			c.encode_order(&deploy_order()),
			Err(CodecError::Encoding(_))
		));
	}

	#[test]
	fn test_invalid_identifier() {
		let mut order = deploy_order();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.taker_id = "0x1234".to_string();
		}
		assert!(matches!(
			codec().encode_order(&order),
			Err(CodecError::InvalidIdentifier(_))
		));
	}

	#[test]
	fn test_malformed_amount_and_seed() {
		let mut order = deploy_order();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.token_transfer_data.value = "ten".to_string();
		}
		assert!(matches!(codec().encode_order(&order), Err(CodecError::Encoding(_))));

		let mut order = deploy_order();
		if let Order::AssetLedgerDeploy(o) = &mut order {
			o.seed = Numeric::from(-5.0);
		}
		assert!(matches!(codec().encode_order(&order), Err(CodecError::Encoding(_))));
	}

	#[test]
	fn test_value_ledger_layout() {
		let order = Order::ValueLedgerDeploy(ValueLedgerDeployOrder {
			maker_id: MAKER.to_string(),
			taker_id: TAKER.to_string(),
			seed: Numeric::from(1u64),
			expiration: Numeric::from(2000u64),
			value_ledger_data: xcert_types::ValueLedgerData {
				name: "V".to_string(),
				symbol: "V".to_string(),
				supply: "500000000000000000000".to_string(),
				decimals: 18,
				owner_id: MAKER.to_string(),
			},
			token_transfer_data: TokenTransferData {
				ledger_id: LEDGER.to_string(),
				receiver_id: TAKER.to_string(),
				value: "1".to_string(),
			},
		});
		let bytes = codec().encode_order(&order).unwrap();
		assert_eq!(bytes.len(), 60 + 2 + 32 + 32 + 60 + 32 + 64);
		assert_eq!(&bytes[62 + 32..62 + 64], word(18).as_slice());
		assert_eq!(&bytes[bytes.len() - 32..], word(2).as_slice());
	}

	#[test]
	fn test_actions_layout() {
		let order = actions_order(vec![
			Action::CreateAsset {
				ledger_id: LEDGER.to_string(),
				receiver_id: TAKER.to_string(),
				asset_id: "100".to_string(),
				asset_imprint: IMPRINT.to_string(),
			},
			Action::SetAbilities {
				ledger_id: LEDGER.to_string(),
				receiver_id: TAKER.to_string(),
				abilities: vec![AssetLedgerAbility::MintAsset, AssetLedgerAbility::ManageAbilities],
			},
			Action::DestroyAsset {
				ledger_id: LEDGER.to_string(),
				asset_id: "100".to_string(),
			},
		]);
		let bytes = codec().encode_order(&order).unwrap();

		let create = 1 + 20 + 20 + 32 + 32;
		let abilities = 1 + 20 + 20 + 2;
		let destroy = 1 + 20 + 32;
		assert_eq!(bytes.len(), 60 + create + abilities + destroy + 64);

		assert_eq!(bytes[60], 1);
		assert_eq!(&bytes[61..81], AccountId::parse(LEDGER).unwrap().as_bytes());
		assert_eq!(&bytes[101..133], word(100).as_slice());

		let set = 60 + create;
		assert_eq!(bytes[set], 4);
		assert_eq!(&bytes[set + 41..set + 43], &[1, 0]);
		assert_eq!(bytes[set + abilities], 5);
	}

	#[test]
	fn test_transfer_actions_hash_differs_by_kind() {
		let transfer_asset = actions_order(vec![Action::TransferAsset {
			ledger_id: LEDGER.to_string(),
			sender_id: MAKER.to_string(),
			receiver_id: TAKER.to_string(),
			asset_id: "5".to_string(),
		}]);
		let transfer_value = actions_order(vec![Action::TransferValue {
			ledger_id: LEDGER.to_string(),
			sender_id: MAKER.to_string(),
			receiver_id: TAKER.to_string(),
			value: "5".to_string(),
		}]);
		let c = codec();
		let a = c.encode_order(&transfer_asset).unwrap();
		let b = c.encode_order(&transfer_value).unwrap();
		assert_eq!(a.len(), b.len());
		assert_ne!(a, b);
	}

	#[test]
	fn test_action_payload_matches_order_bytes() {
		let action = Action::UpdateAssetImprint {
			ledger_id: LEDGER.to_string(),
			asset_id: "9".to_string(),
			asset_imprint: IMPRINT.to_string(),
		};
		let payload = encode_action_payload(&action).unwrap();
		assert_eq!(payload.len(), 64);
		let bytes = codec().encode_order(&actions_order(vec![action])).unwrap();
		assert_eq!(&bytes[81..145], payload.as_slice());
	}

	#[test]
	fn test_decode_order_errors_are_encoding() {
		assert!(matches!(
			OrderCodec::decode_order(r#"{"kind": "UNKNOWN"}"#),
			Err(CodecError::Encoding(_))
		));
		let order = OrderCodec::decode_order(
			r#"{
				"kind": "ACTIONS_ORDER",
				"makerId": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
				"takerId": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
				"seed": 7,
				"expiration": 1700000000000,
				"actions": []
			}"#,
		)
		.unwrap();
		assert_eq!(
			codec().hash_order(&order).unwrap(),
			codec().hash_order(&actions_order(vec![])).unwrap()
		);
	}
}
