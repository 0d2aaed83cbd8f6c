//! JSON-RPC over HTTP using Alloy.
//!
//! Forwards each request to the configured node through an Alloy
//! `RootProvider`. Requests are sent once; retrying is left to the caller.

use crate::{LedgerError, LedgerFactory, LedgerInterface, LedgerRegistry};
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use async_trait::async_trait;
use serde_json::Value;
use xcert_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};

/// Alloy-based HTTP ledger collaborator.
pub struct AlloyLedger {
	provider: RootProvider<Http<reqwest::Client>>,
}

impl AlloyLedger {
	/// Creates a collaborator talking to `rpc_url`.
	pub fn new(rpc_url: &str) -> Result<Self, LedgerError> {
		let provider = RootProvider::new_http(
			rpc_url
				.parse()
				.map_err(|e| LedgerError::Network(format!("Invalid RPC URL: {}", e)))?,
		);
		Ok(Self { provider })
	}
}

/// Configuration schema for the Alloy ledger collaborator.
pub struct AlloyLedgerSchema;

impl AlloyLedgerSchema {
	pub fn validate_config(config: &toml::Value) -> Result<(), ValidationError> {
		Self.validate(config)
	}
}

impl ConfigSchema for AlloyLedgerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![Field::new("rpc_url", FieldType::Url)], vec![]).validate(config)
	}
}

#[async_trait]
impl LedgerInterface for AlloyLedger {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloyLedgerSchema)
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
		self.provider
			.raw_request::<Value, Value>(method.to_string().into(), params)
			.await
			.map_err(|e| match e.as_error_resp() {
				Some(payload) => LedgerError::Rpc {
					code: payload.code,
					message: payload.message.to_string(),
				},
				None => LedgerError::Network(format!("{} failed: {}", method, e)),
			})
	}
}

/// Factory function to create an HTTP ledger collaborator from configuration.
///
/// Configuration parameters:
/// - `rpc_url`: node endpoint, `http://` or `https://`
pub fn create_http_ledger(config: &toml::Value) -> Result<Box<dyn LedgerInterface>, LedgerError> {
	AlloyLedgerSchema::validate_config(config)
		.map_err(|e| LedgerError::Network(format!("Invalid configuration: {}", e)))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| LedgerError::Network("rpc_url is required".to_string()))?;

	Ok(Box::new(AlloyLedger::new(rpc_url)?))
}

/// Registry for the Alloy ledger collaborator.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "alloy";
	type Factory = LedgerFactory;

	fn factory() -> Self::Factory {
		create_http_ledger
	}
}

impl LedgerRegistry for Registry {}
