//! Gateway contract bindings and calldata builders.
//!
//! Each order kind has its own gateway contract with `perform` and `cancel`
//! entry points taking the order as a struct. The struct fields mirror the
//! canonical encoding, so the contract can rebuild the claim the signers
//! signed.

use alloy_primitives::{Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall};
use xcert_codec::{encode_action_payload, CodecError};
use xcert_types::{
	parse_bytes32, parse_uint256, AccountId, ActionsOrder, AssetLedgerDeployOrder, Numeric, Order,
	Signature, TokenTransferData, ValueLedgerDeployOrder, SIGNATURE_LENGTH,
};

use crate::verifier::VerifyError;

sol! {
	struct SignatureData {
		bytes32 r;
		bytes32 s;
		uint8 v;
		uint8 kind;
	}

	struct TransferData {
		address token;
		address to;
		uint256 value;
	}

	struct AssetLedgerData {
		string name;
		string symbol;
		string uriPrefix;
		string uriPostfix;
		bytes32 schemaId;
		uint8[] capabilities;
		address owner;
	}

	struct AssetLedgerDeployData {
		address maker;
		address taker;
		AssetLedgerData assetLedgerData;
		TransferData transferData;
		uint256 seed;
		uint256 expiration;
	}

	struct ValueLedgerData {
		string name;
		string symbol;
		uint256 supply;
		uint8 decimals;
		address owner;
	}

	struct ValueLedgerDeployData {
		address maker;
		address taker;
		ValueLedgerData valueLedgerData;
		TransferData transferData;
		uint256 seed;
		uint256 expiration;
	}

	struct ActionData {
		uint8 kind;
		address ledgerId;
		bytes params;
	}

	struct ActionsOrderData {
		address maker;
		address taker;
		ActionData[] actions;
		uint256 seed;
		uint256 expiration;
	}

	interface IAssetLedgerDeployGateway {
		function perform(AssetLedgerDeployData _data, SignatureData _signature) external;
		function cancel(AssetLedgerDeployData _data) external;
	}

	interface IValueLedgerDeployGateway {
		function perform(ValueLedgerDeployData _data, SignatureData _signature) external;
		function cancel(ValueLedgerDeployData _data) external;
	}

	interface IActionsGateway {
		function perform(ActionsOrderData _data, SignatureData[] _signatures) external;
		function cancel(ActionsOrderData _data) external;
	}

	interface IOrderGateway {
		function orderPerformed(bytes32 _claim) external view returns (bool);
		function orderCancelled(bytes32 _claim) external view returns (bool);
	}
}

fn address(id: &str) -> Result<alloy_primitives::Address, CodecError> {
	Ok(AccountId::parse(id)?.to_alloy())
}

fn seconds(expiration: &Numeric) -> Result<U256, CodecError> {
	Ok(U256::from(expiration.to_seconds()?))
}

fn transfer_data(data: &TokenTransferData) -> Result<TransferData, CodecError> {
	Ok(TransferData {
		token: address(&data.ledger_id)?,
		to: address(&data.receiver_id)?,
		value: parse_uint256(&data.value)?,
	})
}

fn asset_ledger_deploy_data(o: &AssetLedgerDeployOrder) -> Result<AssetLedgerDeployData, CodecError> {
	let data = &o.asset_ledger_data;
	Ok(AssetLedgerDeployData {
		maker: address(&o.maker_id)?,
		taker: address(&o.taker_id)?,
		assetLedgerData: AssetLedgerData {
			name: data.name.clone(),
			symbol: data.symbol.clone(),
			uriPrefix: data.uri_prefix.clone(),
			uriPostfix: data.uri_postfix.clone(),
			schemaId: parse_bytes32(&data.schema_id)?,
			capabilities: data.capabilities.iter().map(|c| c.code()).collect(),
			owner: address(&data.owner_id)?,
		},
		transferData: transfer_data(&o.token_transfer_data)?,
		seed: U256::from(o.seed.to_integer()?),
		expiration: seconds(&o.expiration)?,
	})
}

fn value_ledger_deploy_data(o: &ValueLedgerDeployOrder) -> Result<ValueLedgerDeployData, CodecError> {
	let data = &o.value_ledger_data;
	Ok(ValueLedgerDeployData {
		maker: address(&o.maker_id)?,
		taker: address(&o.taker_id)?,
		valueLedgerData: ValueLedgerData {
			name: data.name.clone(),
			symbol: data.symbol.clone(),
			supply: parse_uint256(&data.supply)?,
			decimals: data.decimals,
			owner: address(&data.owner_id)?,
		},
		transferData: transfer_data(&o.token_transfer_data)?,
		seed: U256::from(o.seed.to_integer()?),
		expiration: seconds(&o.expiration)?,
	})
}

fn actions_order_data(o: &ActionsOrder) -> Result<ActionsOrderData, CodecError> {
	let actions = o
		.actions
		.iter()
		.map(|action| {
			Ok(ActionData {
				kind: action.kind().code(),
				ledgerId: address(action.ledger_id())?,
				params: Bytes::from(encode_action_payload(action)?),
			})
		})
		.collect::<Result<Vec<_>, CodecError>>()?;
	Ok(ActionsOrderData {
		maker: address(&o.maker_id)?,
		taker: address(&o.taker_id)?,
		actions,
		seed: U256::from(o.seed.to_integer()?),
		expiration: seconds(&o.expiration)?,
	})
}

/// Splits a 65-byte claim into the contract's signature struct.
///
/// The contract expects `v` as 27 or 28.
pub fn signature_data(signature: &Signature) -> Result<SignatureData, VerifyError> {
	let payload = &signature.payload;
	if payload.len() != SIGNATURE_LENGTH {
		return Err(VerifyError::MalformedSignature(format!(
			"Expected {} bytes, got {}",
			SIGNATURE_LENGTH,
			payload.len()
		)));
	}
	let v = match payload[64] {
		v @ (0 | 1) => v + 27,
		v @ (27 | 28) => v,
		v => {
			return Err(VerifyError::MalformedSignature(format!(
				"Invalid recovery id {}",
				v
			)))
		},
	};
	Ok(SignatureData {
		r: B256::from_slice(&payload[..32]),
		s: B256::from_slice(&payload[32..64]),
		v,
		kind: signature.method.code(),
	})
}

/// Calldata for `perform`. `signatures` must be in required-signer order.
pub fn perform_calldata(order: &Order, signatures: &[SignatureData]) -> Result<Vec<u8>, CodecError> {
	let first = || {
		signatures
			.first()
			.cloned()
			.ok_or_else(|| CodecError::Encoding("Missing maker signature".to_string()))
	};
	Ok(match order {
		Order::AssetLedgerDeploy(o) => IAssetLedgerDeployGateway::performCall {
			_data: asset_ledger_deploy_data(o)?,
			_signature: first()?,
		}
		.abi_encode(),
		Order::ValueLedgerDeploy(o) => IValueLedgerDeployGateway::performCall {
			_data: value_ledger_deploy_data(o)?,
			_signature: first()?,
		}
		.abi_encode(),
		Order::Actions(o) => IActionsGateway::performCall {
			_data: actions_order_data(o)?,
			_signatures: signatures.to_vec(),
		}
		.abi_encode(),
	})
}

/// Calldata for `cancel`.
pub fn cancel_calldata(order: &Order) -> Result<Vec<u8>, CodecError> {
	Ok(match order {
		Order::AssetLedgerDeploy(o) => IAssetLedgerDeployGateway::cancelCall {
			_data: asset_ledger_deploy_data(o)?,
		}
		.abi_encode(),
		Order::ValueLedgerDeploy(o) => IValueLedgerDeployGateway::cancelCall {
			_data: value_ledger_deploy_data(o)?,
		}
		.abi_encode(),
		Order::Actions(o) => IActionsGateway::cancelCall {
			_data: actions_order_data(o)?,
		}
		.abi_encode(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use xcert_types::{Action, SignMethod};

	const MAKER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
	const TAKER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
	const LEDGER: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

	fn actions_order() -> Order {
		Order::Actions(ActionsOrder {
			maker_id: MAKER.to_string(),
			taker_id: TAKER.to_string(),
			seed: Numeric::from(3.9),
			expiration: Numeric::from(1_700_000_000_999u64),
			actions: vec![Action::DestroyAsset {
				ledger_id: LEDGER.to_string(),
				asset_id: "12".to_string(),
			}],
		})
	}

	#[test]
	fn test_signature_data_normalizes_v() {
		let mut payload = vec![0x11u8; 65];
		payload[64] = 1;
		let data = signature_data(&Signature::new(SignMethod::Direct, payload)).unwrap();
		assert_eq!(data.v, 28);
		assert_eq!(data.kind, 2);
		assert_eq!(data.r, B256::repeat_byte(0x11));
	}

	#[test]
	fn test_signature_data_rejects_malformed() {
		let short = Signature::new(SignMethod::Direct, vec![0u8; 10]);
		assert!(matches!(
			signature_data(&short),
			Err(VerifyError::MalformedSignature(_))
		));
	}

	#[test]
	fn test_actions_perform_calldata_round_trips() {
		let sig = SignatureData {
			r: B256::repeat_byte(1),
			s: B256::repeat_byte(2),
			v: 27,
			kind: 0,
		};
		let data = perform_calldata(&actions_order(), &[sig.clone(), sig]).unwrap();
		assert_eq!(&data[..4], &IActionsGateway::performCall::SELECTOR);

		let call = IActionsGateway::performCall::abi_decode(&data, true).unwrap();
		assert_eq!(call._signatures.len(), 2);
		assert_eq!(call._data.seed, U256::from(3u64));
		assert_eq!(call._data.expiration, U256::from(1_700_000_000u64));
		assert_eq!(call._data.actions[0].kind, 5);
		assert_eq!(call._data.actions[0].params.len(), 32);
	}

	#[test]
	fn test_deploy_perform_requires_signature() {
		let order = Order::ValueLedgerDeploy(ValueLedgerDeployOrder {
			maker_id: MAKER.to_string(),
			taker_id: TAKER.to_string(),
			seed: Numeric::from(1u64),
			expiration: Numeric::from(1_700_000_000_000u64),
			value_ledger_data: xcert_types::ValueLedgerData {
				name: "Value".to_string(),
				symbol: "VAL".to_string(),
				supply: "1000000".to_string(),
				decimals: 18,
				owner_id: MAKER.to_string(),
			},
			token_transfer_data: TokenTransferData {
				ledger_id: LEDGER.to_string(),
				receiver_id: MAKER.to_string(),
				value: "1".to_string(),
			},
		});
		assert!(matches!(
			perform_calldata(&order, &[]),
			Err(CodecError::Encoding(_))
		));
		let cancel = cancel_calldata(&order).unwrap();
		assert_eq!(&cancel[..4], &IValueLedgerDeployGateway::cancelCall::SELECTOR);
	}
}
