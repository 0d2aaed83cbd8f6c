//! Signing capability returning preset answers.
//!
//! Used by tests of the gateway and session to simulate a wallet that signs
//! with a fixed payload or refuses to sign.

use crate::{AccountError, SigningCapability};
use alloy_primitives::B256;
use async_trait::async_trait;
use std::sync::Mutex;
use xcert_types::{AccountId, ConfigSchema, Schema, SignMethod, ValidationError};

/// Capability that answers every request with the same result.
pub struct CannedSigner {
	address: AccountId,
	response: Result<Vec<u8>, String>,
	requests: Mutex<Vec<(B256, SignMethod)>>,
}

impl CannedSigner {
	/// Returns `payload` for every digest.
	pub fn new(address: AccountId, payload: Vec<u8>) -> Self {
		Self {
			address,
			response: Ok(payload),
			requests: Mutex::new(Vec::new()),
		}
	}

	/// Refuses every request with `reason`.
	pub fn rejecting(address: AccountId, reason: &str) -> Self {
		Self {
			address,
			response: Err(reason.to_string()),
			requests: Mutex::new(Vec::new()),
		}
	}

	/// Digests and schemes requested so far.
	pub fn requests(&self) -> Vec<(B256, SignMethod)> {
		self.requests
			.lock()
			.map(|requests| requests.clone())
			.unwrap_or_default()
	}
}

struct CannedSchema;

impl ConfigSchema for CannedSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

#[async_trait]
impl SigningCapability for CannedSigner {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(CannedSchema)
	}

	async fn address(&self) -> Result<AccountId, AccountError> {
		Ok(self.address)
	}

	async fn sign_digest(
		&self,
		digest: &B256,
		method: SignMethod,
	) -> Result<Vec<u8>, AccountError> {
		if let Ok(mut requests) = self.requests.lock() {
			requests.push((*digest, method));
		}
		self.response
			.clone()
			.map_err(AccountError::SigningFailed)
	}
}
