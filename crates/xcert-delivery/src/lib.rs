//! Ledger access for the Xcert gateway client.
//!
//! Everything the client needs from the chain goes through a single JSON-RPC
//! `call(method, params)` collaborator. This module defines that interface,
//! the service that layers provider options (gas price multipliers,
//! confirmations, sandbox mode) on top of it, and the watcher that reports
//! network and account changes.

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use xcert_types::{
	with_0x_prefix, without_0x_prefix, AccountId, ConfigSchema, ImplementationRegistry,
	TransactionHash, TransactionReceipt,
};

pub mod options;
pub mod watcher;

pub use options::{ProviderOptions, ProviderOptionsSchema};
pub use watcher::{ProviderWatcher, WatcherHandle};

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod mock;
}

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Transport failure or timeout.
	#[error("Network error: {0}")]
	Network(String),
	/// The node answered with a JSON-RPC error object.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The node answered with something that could not be interpreted.
	#[error("Decode error: {0}")]
	Decode(String),
	/// No collaborator is configured.
	#[error("No provider available")]
	NoProviderAvailable,
}

/// JSON-RPC collaborator.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Sends one JSON-RPC request and returns its `result`.
	async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError>;
}

/// Type alias for ledger collaborator factory functions.
pub type LedgerFactory = fn(&toml::Value) -> Result<Box<dyn LedgerInterface>, LedgerError>;

/// Registry trait for ledger collaborator implementations.
pub trait LedgerRegistry: ImplementationRegistry<Factory = LedgerFactory> {}

/// Get all registered ledger collaborator implementations.
pub fn get_all_implementations() -> Vec<(&'static str, LedgerFactory)> {
	use implementations::evm::alloy;

	vec![(alloy::Registry::NAME, alloy::Registry::factory())]
}

/// Parses a `0x` hex quantity into a `u64`.
pub fn parse_quantity(value: &Value) -> Result<u64, LedgerError> {
	let s = value
		.as_str()
		.ok_or_else(|| LedgerError::Decode(format!("Expected hex quantity, got {}", value)))?;
	u64::from_str_radix(without_0x_prefix(s), 16)
		.map_err(|e| LedgerError::Decode(format!("Invalid quantity '{}': {}", s, e)))
}

/// Parses `0x` hex data into bytes.
pub fn parse_data(value: &Value) -> Result<Vec<u8>, LedgerError> {
	let s = value
		.as_str()
		.ok_or_else(|| LedgerError::Decode(format!("Expected hex data, got {}", value)))?;
	hex::decode(without_0x_prefix(s))
		.map_err(|e| LedgerError::Decode(format!("Invalid hex data: {}", e)))
}

fn to_data(bytes: &[u8]) -> String {
	with_0x_prefix(&hex::encode(bytes))
}

/// Scales a wei amount by a float multiplier at per-mille precision.
fn scale(amount: U256, multiplier: f64) -> U256 {
	let per_mille = (multiplier * 1000.0).round().max(0.0) as u64;
	amount.saturating_mul(U256::from(per_mille)) / U256::from(1000u64)
}

/// Service wrapping a collaborator with the configured provider options.
pub struct LedgerService {
	implementation: Arc<dyn LedgerInterface>,
	options: ProviderOptions,
}

impl LedgerService {
	pub fn new(implementation: Arc<dyn LedgerInterface>, options: ProviderOptions) -> Self {
		Self {
			implementation,
			options,
		}
	}

	pub fn options(&self) -> &ProviderOptions {
		&self.options
	}

	/// Sends a raw request, logging it at info level in verbose mode.
	pub async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
		if self.options.verbose {
			tracing::info!(method, params = %params, "RPC request");
		} else {
			tracing::debug!(method, "RPC request");
		}
		let result = self.implementation.call(method, params).await;
		match &result {
			Ok(value) if self.options.verbose => tracing::info!(method, result = %value, "RPC response"),
			Err(e) => tracing::warn!(method, error = %e, "RPC request failed"),
			_ => {},
		}
		result
	}

	/// Executes a read-only contract call against the latest block.
	pub async fn call_contract(&self, to: &AccountId, data: &[u8]) -> Result<Vec<u8>, LedgerError> {
		let result = self
			.call(
				"eth_call",
				json!([{ "to": to.to_string(), "data": to_data(data) }, "latest"]),
			)
			.await?;
		parse_data(&result)
	}

	/// Accounts exposed by the provider, first one being the active account.
	pub async fn accounts(&self) -> Result<Vec<AccountId>, LedgerError> {
		let result = self.call("eth_accounts", json!([])).await?;
		let list = result
			.as_array()
			.ok_or_else(|| LedgerError::Decode("eth_accounts did not return a list".to_string()))?;
		list.iter()
			.map(|v| {
				v.as_str()
					.ok_or_else(|| LedgerError::Decode(format!("Invalid account {}", v)))
					.and_then(|s| {
						AccountId::parse(s).map_err(|e| LedgerError::Decode(e.to_string()))
					})
			})
			.collect()
	}

	pub async fn network_version(&self) -> Result<String, LedgerError> {
		let result = self.call("net_version", json!([])).await?;
		result
			.as_str()
			.map(str::to_string)
			.ok_or_else(|| LedgerError::Decode(format!("Invalid network version {}", result)))
	}

	pub async fn block_number(&self) -> Result<u64, LedgerError> {
		parse_quantity(&self.call("eth_blockNumber", json!([])).await?)
	}

	pub async fn gas_price(&self) -> Result<U256, LedgerError> {
		let result = self.call("eth_gasPrice", json!([])).await?;
		let s = result
			.as_str()
			.ok_or_else(|| LedgerError::Decode(format!("Invalid gas price {}", result)))?;
		U256::from_str_radix(without_0x_prefix(s), 16)
			.map_err(|e| LedgerError::Decode(format!("Invalid gas price '{}': {}", s, e)))
	}

	/// Sends a state-changing transaction from an account held by the node.
	///
	/// The gas price is the node's current price scaled by
	/// `gas_price_multiplier`. In sandbox mode the transaction is only
	/// dry-run with `eth_call` and an all-zero hash is returned.
	pub async fn send_transaction(
		&self,
		from: &AccountId,
		to: &AccountId,
		data: &[u8],
	) -> Result<TransactionHash, LedgerError> {
		self.send_with_multiplier(from, to, data, self.options.gas_price_multiplier)
			.await
	}

	/// Re-sends a transaction that did not confirm, bidding
	/// `retry_gas_price_multiplier` times the current gas price.
	pub async fn resend_transaction(
		&self,
		from: &AccountId,
		to: &AccountId,
		data: &[u8],
	) -> Result<TransactionHash, LedgerError> {
		self.send_with_multiplier(from, to, data, self.options.retry_gas_price_multiplier)
			.await
	}

	async fn send_with_multiplier(
		&self,
		from: &AccountId,
		to: &AccountId,
		data: &[u8],
		multiplier: f64,
	) -> Result<TransactionHash, LedgerError> {
		if self.options.sandbox {
			self.call(
				"eth_call",
				json!([{ "from": from.to_string(), "to": to.to_string(), "data": to_data(data) }, "latest"]),
			)
			.await?;
			tracing::info!(to = %to, "Sandbox mode, transaction not broadcast");
			return Ok(TransactionHash(vec![0u8; 32]));
		}

		let gas_price = scale(self.gas_price().await?, multiplier);
		let result = self
			.call(
				"eth_sendTransaction",
				json!([{
					"from": from.to_string(),
					"to": to.to_string(),
					"data": to_data(data),
					"gasPrice": with_0x_prefix(&format!("{:x}", gas_price)),
				}]),
			)
			.await?;
		let hash = result
			.as_str()
			.ok_or_else(|| LedgerError::Decode(format!("Invalid transaction hash {}", result)))
			.and_then(|s| {
				TransactionHash::from_hex(s).map_err(|e| LedgerError::Decode(e.to_string()))
			})?;
		tracing::info!(tx_hash = %hash, from = %from, to = %to, "Submitted transaction");
		Ok(hash)
	}

	/// Receipt of a mined transaction, `None` while it is pending.
	pub async fn get_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, LedgerError> {
		let result = self
			.call("eth_getTransactionReceipt", json!([hash.to_string()]))
			.await?;
		if result.is_null() {
			return Ok(None);
		}
		let block_number = parse_quantity(&result["blockNumber"])?;
		let success = match result.get("status") {
			Some(status) => parse_quantity(status)? == 1,
			None => true,
		};
		Ok(Some(TransactionReceipt {
			hash: hash.clone(),
			block_number,
			success,
		}))
	}

	/// Waits until a transaction has `required_confirmations` blocks on top
	/// of it, or `mutation_timeout_ms` elapses.
	pub async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, LedgerError> {
		let confirmations = self.options.required_confirmations;
		let poll_interval = Duration::from_secs(self.options.poll_interval_secs.max(1));
		let max_wait_time = Duration::from_millis(self.options.mutation_timeout_ms);
		let start_time = tokio::time::Instant::now();

		tracing::info!(
			tx_hash = %hash,
			confirmations,
			timeout_ms = self.options.mutation_timeout_ms,
			"Waiting for confirmations"
		);

		loop {
			if start_time.elapsed() > max_wait_time {
				return Err(LedgerError::Network(format!(
					"Timeout waiting for {} confirmations after {} ms",
					confirmations, self.options.mutation_timeout_ms
				)));
			}

			if let Some(receipt) = self.get_receipt(hash).await? {
				let current_block = self.block_number().await?;
				// The inclusion block counts as the first confirmation.
				let current_confirmations = current_block.saturating_sub(receipt.block_number) + 1;
				if current_confirmations >= confirmations {
					return Ok(receipt);
				}
				tracing::debug!(
					tx_hash = %hash,
					remaining = confirmations.saturating_sub(current_confirmations),
					"Waiting for more confirmations"
				);
			}

			tokio::time::sleep(poll_interval).await;
		}
	}
}
