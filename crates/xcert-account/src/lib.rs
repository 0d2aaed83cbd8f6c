//! Order signing for the Xcert gateway client.
//!
//! This module provides the abstraction over whatever holds the signing key
//! (a local private key, a wallet behind a provider, a test double) and the
//! [`OrderSigner`] that turns an order hash into a gateway [`Signature`].
//! The signing scheme is always chosen by the caller; it is never detected
//! from the capability.

use alloy_primitives::B256;
use async_trait::async_trait;
use thiserror::Error;
use xcert_types::{
	truncate_id, AccountId, ConfigSchema, ImplementationRegistry, SignMethod, Signature,
	SIGNATURE_LENGTH,
};

/// Re-export implementations
pub mod implementations {
	pub mod canned;
	pub mod local;
}

/// Errors that can occur during signing operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The capability failed or produced an unusable signature.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// A private key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The capability cannot be reached, for example a disconnected wallet.
	#[error("Signing capability unavailable: {0}")]
	Unavailable(String),
}

/// Something able to produce secp256k1 signatures for one account.
#[async_trait]
pub trait SigningCapability: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Account whose key signs.
	async fn address(&self) -> Result<AccountId, AccountError>;

	/// Signs a 32-byte digest with the given scheme and returns the raw
	/// `r || s || v` payload.
	///
	/// With [`SignMethod::PersonalSign`] the implementation applies the
	/// `"\x19Ethereum Signed Message:\n32"` prefix before signing; with
	/// [`SignMethod::Direct`] the digest is signed as is.
	async fn sign_digest(&self, digest: &B256, method: SignMethod)
		-> Result<Vec<u8>, AccountError>;
}

/// Type alias for signing capability factory functions.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn SigningCapability>, AccountError>;

/// Registry trait for signing capability implementations.
pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// Get all registered signing capability implementations.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Produces gateway signatures over order hashes.
pub struct OrderSigner;

impl OrderSigner {
	/// Signs an order hash with the given capability and scheme.
	///
	/// Fails with [`AccountError::SigningFailed`] when the capability rejects
	/// the request or returns a payload that is not 65 bytes long.
	pub async fn sign(
		order_hash: &B256,
		capability: &dyn SigningCapability,
		method: SignMethod,
	) -> Result<Signature, AccountError> {
		let payload = capability.sign_digest(order_hash, method).await?;
		if payload.len() != SIGNATURE_LENGTH {
			return Err(AccountError::SigningFailed(format!(
				"Expected {} signature bytes, got {}",
				SIGNATURE_LENGTH,
				payload.len()
			)));
		}
		tracing::debug!(
			order_hash = %truncate_id(&order_hash.to_string()),
			method = %method,
			"Signed order hash"
		);
		Ok(Signature::new(method, payload))
	}
}

/// Service that signs on behalf of one configured account.
///
/// Pairs a capability with the scheme configured for its provider, so callers
/// do not pass the scheme around.
pub struct AccountService {
	implementation: Box<dyn SigningCapability>,
	method: SignMethod,
}

impl AccountService {
	pub fn new(implementation: Box<dyn SigningCapability>, method: SignMethod) -> Self {
		Self {
			implementation,
			method,
		}
	}

	pub fn sign_method(&self) -> SignMethod {
		self.method
	}

	pub async fn get_address(&self) -> Result<AccountId, AccountError> {
		self.implementation.address().await
	}

	/// Signs an order hash with the configured scheme.
	pub async fn sign(&self, order_hash: &B256) -> Result<Signature, AccountError> {
		OrderSigner::sign(order_hash, self.implementation.as_ref(), self.method).await
	}
}

#[cfg(test)]
mod tests {
	use super::implementations::canned::CannedSigner;
	use super::*;

	fn signer_id() -> AccountId {
		AccountId::parse("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
	}

	#[tokio::test]
	async fn test_sign_wraps_payload_with_method() {
		let capability = CannedSigner::new(signer_id(), vec![7u8; SIGNATURE_LENGTH]);
		let sig = OrderSigner::sign(&B256::ZERO, &capability, SignMethod::Direct)
			.await
			.unwrap();
		assert_eq!(sig.method, SignMethod::Direct);
		assert_eq!(sig.payload, vec![7u8; SIGNATURE_LENGTH]);
	}

	#[tokio::test]
	async fn test_short_payload_is_signing_error() {
		let capability = CannedSigner::new(signer_id(), vec![1u8; 64]);
		let result = OrderSigner::sign(&B256::ZERO, &capability, SignMethod::PersonalSign).await;
		assert!(matches!(result, Err(AccountError::SigningFailed(_))));
	}

	#[tokio::test]
	async fn test_rejection_propagates() {
		let capability = CannedSigner::rejecting(signer_id(), "user denied");
		let service = AccountService::new(Box::new(capability), SignMethod::PersonalSign);
		assert!(matches!(
			service.sign(&B256::ZERO).await,
			Err(AccountError::SigningFailed(msg)) if msg.contains("user denied")
		));
		assert_eq!(service.get_address().await.unwrap(), signer_id());
	}
}
