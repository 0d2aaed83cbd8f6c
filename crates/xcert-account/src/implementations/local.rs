//! Local private key signing.
//!
//! Signs with an in-process secp256k1 key held by alloy's `PrivateKeySigner`.
//! The key is read from configuration as a [`SecretString`] and never logged.

use crate::{AccountError, AccountFactory, AccountRegistry, SigningCapability};
use alloy_primitives::B256;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use xcert_types::{
	without_0x_prefix, AccountId, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	SecretString, SignMethod, ValidationError,
};

/// Signing capability backed by a local private key.
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Builds a wallet from a hex private key, with or without `0x`.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(|key| {
			without_0x_prefix(key.trim())
				.parse::<PrivateKeySigner>()
				.map_err(|e| AccountError::InvalidKey(e.to_string()))
		})?;
		Ok(Self { signer })
	}
}

/// Configuration schema for the local signing capability.
pub struct LocalWalletSchema;

impl LocalWalletSchema {
	pub fn validate_config(config: &toml::Value) -> Result<(), ValidationError> {
		Self.validate(config)
	}
}

impl ConfigSchema for LocalWalletSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("private_key", FieldType::String).with_validator(|value| {
				let key = value.as_str().unwrap_or_default();
				let digits = without_0x_prefix(key.trim());
				if digits.len() != 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
					return Err("private_key must be 64 hex characters".to_string());
				}
				Ok(())
			})],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl SigningCapability for LocalWallet {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalWalletSchema)
	}

	async fn address(&self) -> Result<AccountId, AccountError> {
		Ok(AccountId::from(self.signer.address()))
	}

	async fn sign_digest(
		&self,
		digest: &B256,
		method: SignMethod,
	) -> Result<Vec<u8>, AccountError> {
		let signature = match method {
			SignMethod::PersonalSign => self.signer.sign_message(digest.as_slice()).await,
			SignMethod::Direct => self.signer.sign_hash(digest).await,
		}
		.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(signature.as_bytes().to_vec())
	}
}

/// Factory function to create a local wallet from configuration.
///
/// Configuration parameters:
/// - `private_key`: hex private key, with or without `0x`
pub fn create_account(config: &toml::Value) -> Result<Box<dyn SigningCapability>, AccountError> {
	LocalWalletSchema::validate_config(config)
		.map_err(|e| AccountError::InvalidKey(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AccountError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalWallet::new(&private_key)?))
}

/// Registry for the local wallet implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
