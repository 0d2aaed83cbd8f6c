//! Asset ledger client.
//!
//! Thin wrapper over a deployed Xcert contract: queries are `eth_call`s
//! decoded with the contract ABI, mutations are transactions sent from the
//! provider's active account. Each mutation returns the transaction hash so
//! the caller decides whether to wait for confirmations.

use alloy_primitives::{Address as AlloyAddress, Bytes, U256};
use alloy_sol_types::SolCall;
use std::sync::Arc;
use thiserror::Error;
use xcert_delivery::{LedgerError, LedgerService};
use xcert_types::{
	parse_bytes32, parse_uint256, AccountId, AssetLedgerAbility, AssetLedgerInfo, AssetLedgerItem,
	AssetLedgerItemRecipe, AssetLedgerTransferRecipe, Mutation,
};

pub mod abi;

use abi::IXcert;

/// Errors returned by asset ledger operations.
#[derive(Debug, Error)]
pub enum AssetLedgerError {
	#[error(transparent)]
	Ledger(#[from] LedgerError),
	#[error("Invalid input: {0}")]
	InvalidInput(String),
	#[error("Failed to decode contract response: {0}")]
	Decode(String),
}

/// Client for one asset ledger contract.
pub struct AssetLedger {
	ledger: Arc<LedgerService>,
	id: AccountId,
}

fn account(id: &str) -> Result<AlloyAddress, AssetLedgerError> {
	AccountId::parse(id)
		.map(|a| a.to_alloy())
		.map_err(|e| AssetLedgerError::InvalidInput(e.to_string()))
}

fn uint(value: &str) -> Result<U256, AssetLedgerError> {
	parse_uint256(value).map_err(|e| AssetLedgerError::InvalidInput(e.to_string()))
}

/// A reverted call surfaces as a JSON-RPC error; lookups treat it as "absent".
fn absent_on_revert<T>(result: Result<T, AssetLedgerError>) -> Result<Option<T>, AssetLedgerError> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(AssetLedgerError::Ledger(LedgerError::Rpc { .. })) => Ok(None),
		Err(e) => Err(e),
	}
}

impl AssetLedger {
	pub fn new(ledger: Arc<LedgerService>, id: AccountId) -> Self {
		Self { ledger, id }
	}

	pub fn id(&self) -> AccountId {
		self.id
	}

	async fn query<C: SolCall>(&self, call: C) -> Result<C::Return, AssetLedgerError> {
		let data = self.ledger.call_contract(&self.id, &call.abi_encode()).await?;
		C::abi_decode_returns(&data, true).map_err(|e| AssetLedgerError::Decode(e.to_string()))
	}

	async fn mutate<C: SolCall>(&self, call: C) -> Result<Mutation, AssetLedgerError> {
		let sender = self.active_account().await?;
		let hash = self
			.ledger
			.send_transaction(&sender, &self.id, &call.abi_encode())
			.await?;
		tracing::info!(ledger = %self.id, tx_hash = %hash, "Asset ledger mutation sent");
		Ok(Mutation {
			hash,
			sender_id: sender,
			receiver_id: self.id,
		})
	}

	async fn active_account(&self) -> Result<AccountId, AssetLedgerError> {
		self.ledger
			.accounts()
			.await?
			.first()
			.copied()
			.ok_or(AssetLedgerError::Ledger(LedgerError::NoProviderAvailable))
	}

	/// Name, symbol, URI parts, schema id and supply of the ledger.
	pub async fn get_info(&self) -> Result<AssetLedgerInfo, AssetLedgerError> {
		let name = self.query(IXcert::nameCall {}).await?._0;
		let symbol = self.query(IXcert::symbolCall {}).await?._0;
		let uri_prefix = self.query(IXcert::uriPrefixCall {}).await?._0;
		let uri_postfix = self.query(IXcert::uriPostfixCall {}).await?._0;
		let schema_id = self.query(IXcert::schemaIdCall {}).await?._0;
		let supply = self.query(IXcert::totalSupplyCall {}).await?._0;
		Ok(AssetLedgerInfo {
			name,
			symbol,
			uri_prefix,
			uri_postfix,
			schema_id: schema_id.to_string(),
			supply: supply.to_string(),
		})
	}

	/// URI and imprint of an asset, `None` if it does not exist.
	pub async fn get_asset(&self, asset_id: &str) -> Result<Option<AssetLedgerItem>, AssetLedgerError> {
		let token_id = uint(asset_id)?;
		let uri = match absent_on_revert(self.query(IXcert::tokenURICall { _tokenId: token_id }).await)? {
			Some(ret) => ret._0,
			None => return Ok(None),
		};
		let imprint = self
			.query(IXcert::tokenImprintCall { _tokenId: token_id })
			.await?
			._0;
		Ok(Some(AssetLedgerItem {
			id: token_id.to_string(),
			uri,
			imprint: imprint.to_string(),
		}))
	}

	/// Abilities held by `account_id`, checked one by one in code order.
	pub async fn get_abilities(
		&self,
		account_id: &str,
	) -> Result<Vec<AssetLedgerAbility>, AssetLedgerError> {
		let target = account(account_id)?;
		let mut abilities = Vec::new();
		for ability in AssetLedgerAbility::ALL {
			let able = self
				.query(IXcert::isAbleCall {
					_target: target,
					_ability: ability.code(),
				})
				.await?
				._0;
			if able {
				abilities.push(ability);
			}
		}
		Ok(abilities)
	}

	/// Id of the asset at `index` in the account's list, `None` past the end.
	pub async fn get_account_asset_id_at(
		&self,
		account_id: &str,
		index: u64,
	) -> Result<Option<String>, AssetLedgerError> {
		let call = IXcert::tokenOfOwnerByIndexCall {
			_owner: account(account_id)?,
			_index: U256::from(index),
		};
		Ok(absent_on_revert(self.query(call).await)?.map(|ret| ret._0.to_string()))
	}

	/// Number of assets held by `account_id`, as a decimal string.
	pub async fn get_balance(&self, account_id: &str) -> Result<String, AssetLedgerError> {
		let call = IXcert::balanceOfCall {
			_owner: account(account_id)?,
		};
		Ok(self.query(call).await?._0.to_string())
	}

	/// Owner of an asset, `None` if it does not exist.
	pub async fn get_asset_account(
		&self,
		asset_id: &str,
	) -> Result<Option<AccountId>, AssetLedgerError> {
		let call = IXcert::ownerOfCall {
			_tokenId: uint(asset_id)?,
		};
		Ok(absent_on_revert(self.query(call).await)?.map(|ret| AccountId::from(ret._0)))
	}

	/// Account approved to move an asset, `None` when nobody is.
	pub async fn get_approved_account(
		&self,
		asset_id: &str,
	) -> Result<Option<AccountId>, AssetLedgerError> {
		let call = IXcert::getApprovedCall {
			_tokenId: uint(asset_id)?,
		};
		let approved = AccountId::from(self.query(call).await?._0);
		Ok((!approved.is_zero()).then_some(approved))
	}

	pub async fn is_approved_account(
		&self,
		account_id: &str,
		asset_id: &str,
	) -> Result<bool, AssetLedgerError> {
		let expected = AccountId::from(account(account_id)?);
		Ok(self.get_approved_account(asset_id).await? == Some(expected))
	}

	/// Whether transfers are currently enabled.
	pub async fn is_transferable(&self) -> Result<bool, AssetLedgerError> {
		Ok(!self.query(IXcert::isPausedCall {}).await?._0)
	}

	pub async fn create_asset(
		&self,
		recipe: &AssetLedgerItemRecipe,
	) -> Result<Mutation, AssetLedgerError> {
		let imprint = parse_bytes32(&recipe.imprint)
			.map_err(|e| AssetLedgerError::InvalidInput(e.to_string()))?;
		self.mutate(IXcert::createCall {
			_to: account(&recipe.receiver_id)?,
			_id: uint(&recipe.id)?,
			_imprint: imprint,
		})
		.await
	}

	/// Transfers an asset.
	///
	/// Uses `safeTransferFrom` unless the receiver is listed in the
	/// provider's `unsafe_recipient_ids`. The sender defaults to the active
	/// account.
	pub async fn transfer_asset(
		&self,
		recipe: &AssetLedgerTransferRecipe,
	) -> Result<Mutation, AssetLedgerError> {
		let from = match &recipe.sender_id {
			Some(id) => account(id)?,
			None => self.active_account().await?.to_alloy(),
		};
		let to = account(&recipe.receiver_id)?;
		let token_id = uint(&recipe.id)?;

		if self.ledger.options().is_unsafe_recipient(&AccountId::from(to)) {
			return self
				.mutate(IXcert::transferFromCall {
					_from: from,
					_to: to,
					_tokenId: token_id,
				})
				.await;
		}

		let data = match &recipe.data {
			Some(hex_data) => hex::decode(xcert_types::without_0x_prefix(hex_data))
				.map_err(|e| AssetLedgerError::InvalidInput(e.to_string()))?,
			None => Vec::new(),
		};
		self.mutate(IXcert::safeTransferFromCall {
			_from: from,
			_to: to,
			_tokenId: token_id,
			_data: Bytes::from(data),
		})
		.await
	}

	pub async fn destroy_asset(&self, asset_id: &str) -> Result<Mutation, AssetLedgerError> {
		self.mutate(IXcert::destroyCall {
			_tokenId: uint(asset_id)?,
		})
		.await
	}

	pub async fn revoke_asset(&self, asset_id: &str) -> Result<Mutation, AssetLedgerError> {
		self.mutate(IXcert::revokeCall {
			_tokenId: uint(asset_id)?,
		})
		.await
	}

	/// Replaces the imprint of an existing asset.
	pub async fn update_asset(
		&self,
		asset_id: &str,
		imprint: &str,
	) -> Result<Mutation, AssetLedgerError> {
		let imprint =
			parse_bytes32(imprint).map_err(|e| AssetLedgerError::InvalidInput(e.to_string()))?;
		self.mutate(IXcert::updateTokenImprintCall {
			_tokenId: uint(asset_id)?,
			_imprint: imprint,
		})
		.await
	}

	pub async fn approve_account(
		&self,
		account_id: &str,
		asset_id: &str,
	) -> Result<Mutation, AssetLedgerError> {
		self.mutate(IXcert::approveCall {
			_approved: account(account_id)?,
			_tokenId: uint(asset_id)?,
		})
		.await
	}

	pub async fn grant_abilities(
		&self,
		account_id: &str,
		abilities: &[AssetLedgerAbility],
	) -> Result<Mutation, AssetLedgerError> {
		self.mutate(IXcert::assignAbilitiesCall {
			_target: account(account_id)?,
			_abilities: abilities.iter().map(|a| a.code()).collect(),
		})
		.await
	}

	pub async fn revoke_abilities(
		&self,
		account_id: &str,
		abilities: &[AssetLedgerAbility],
	) -> Result<Mutation, AssetLedgerError> {
		self.mutate(IXcert::revokeAbilitiesCall {
			_target: account(account_id)?,
			_abilities: abilities.iter().map(|a| a.code()).collect(),
		})
		.await
	}

	/// Enables or disables transfers.
	pub async fn set_transfer_state(&self, enabled: bool) -> Result<Mutation, AssetLedgerError> {
		self.mutate(IXcert::setPauseCall { _isPaused: !enabled }).await
	}
}
