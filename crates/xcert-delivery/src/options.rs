//! Provider options.
//!
//! Tuning knobs applied by [`LedgerService`](crate::LedgerService) to every
//! request, plus the signing scheme the gateway uses with this provider.

use serde::{Deserialize, Serialize};
use xcert_types::{
	AccountId, ConfigSchema, Field, FieldType, Schema, SignMethod, ValidationError,
};

/// Options shared by every provider implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
	/// Scheme used when signing claims. Wallet-style providers only support
	/// `personal_sign`.
	pub sign_method: SignMethod,
	/// Recipients that receive assets through `transferFrom` instead of
	/// `safeTransferFrom`.
	pub unsafe_recipient_ids: Vec<AccountId>,
	/// Blocks (including the inclusion block) before a mutation counts as
	/// complete.
	pub required_confirmations: u64,
	/// Milliseconds after which waiting for a mutation gives up.
	pub mutation_timeout_ms: u64,
	pub gas_price_multiplier: f64,
	pub retry_gas_price_multiplier: f64,
	/// Dry-run mutations instead of broadcasting them.
	pub sandbox: bool,
	/// Log every request and response at info level.
	pub verbose: bool,
	/// Poll interval of the provider watcher and confirmation loop.
	pub poll_interval_secs: u64,
}

impl Default for ProviderOptions {
	fn default() -> Self {
		Self {
			sign_method: SignMethod::PersonalSign,
			unsafe_recipient_ids: Vec::new(),
			required_confirmations: 1,
			mutation_timeout_ms: 3_600_000,
			gas_price_multiplier: 1.1,
			retry_gas_price_multiplier: 2.0,
			sandbox: false,
			verbose: false,
			poll_interval_secs: 1,
		}
	}
}

impl ProviderOptions {
	/// Whether assets sent to `id` must skip the receiver contract check.
	pub fn is_unsafe_recipient(&self, id: &AccountId) -> bool {
		self.unsafe_recipient_ids.contains(id)
	}
}

/// Configuration schema for provider options.
pub struct ProviderOptionsSchema;

impl ConfigSchema for ProviderOptionsSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("sign_method", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some("personal_sign") | Some("direct") => Ok(()),
						_ => Err("sign_method must be 'personal_sign' or 'direct'".to_string()),
					}
				}),
				Field::new(
					"unsafe_recipient_ids",
					FieldType::Array(Box::new(FieldType::Address)),
				),
				Field::new(
					"required_confirmations",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
				Field::new(
					"mutation_timeout_ms",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
				Field::new(
					"gas_price_multiplier",
					FieldType::Float {
						min: Some(0.0),
						max: None,
					},
				),
				Field::new(
					"retry_gas_price_multiplier",
					FieldType::Float {
						min: Some(0.0),
						max: None,
					},
				),
				Field::new("sandbox", FieldType::Boolean),
				Field::new("verbose", FieldType::Boolean),
				Field::new(
					"poll_interval_secs",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
		);
		schema.validate(config)
	}
}
