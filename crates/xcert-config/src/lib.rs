//! Configuration for the Xcert gateway client.
//!
//! Configuration is TOML with four sections: `provider` (JSON-RPC endpoint
//! and provider options), `gateway` (deployed gateway contracts),
//! `account` (signing implementations) and an optional `ledger`.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Included files may include further files, relative to their own directory
//! - Each top-level section must be unique across all files
//!
//! `${VAR}` and `${VAR:-default}` are replaced with environment variables
//! before parsing.

mod loader;

pub use loader::ConfigLoader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use xcert_codec::GatewayConfig;
use xcert_delivery::{ProviderOptions, ProviderOptionsSchema};
use xcert_types::{AccountId, ConfigSchema, Field, FieldType, Schema};

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// The message only; the default rendering repeats the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	pub provider: ProviderConfig,
	/// Gateway contract per order kind.
	pub gateway: GatewayConfig,
	pub account: AccountConfig,
	/// Default asset ledger for ledger commands.
	#[serde(default)]
	pub ledger: Option<LedgerConfig>,
}

/// JSON-RPC endpoint and the options applied to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
	/// Ledger collaborator implementation. Defaults to `alloy`.
	#[serde(default = "default_provider_implementation")]
	pub implementation: String,
	pub rpc_url: String,
	#[serde(flatten)]
	pub options: ProviderOptions,
}

fn default_provider_implementation() -> String {
	"alloy".to_string()
}

impl ProviderConfig {
	/// Table handed to the collaborator factory.
	pub fn implementation_config(&self) -> toml::Value {
		let mut table = toml::Table::new();
		table.insert("rpc_url".to_string(), toml::Value::String(self.rpc_url.clone()));
		toml::Value::Table(table)
	}
}

/// Configuration for account management.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of account implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl AccountConfig {
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
	pub asset_ledger_id: AccountId,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut last = 0;
	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					name.as_str()
				)))
			},
		};
		resolved.push_str(&input[last..full_match.start()]);
		resolved.push_str(&value);
		last = full_match.end();
	}
	resolved.push_str(&input[last..]);
	Ok(resolved)
}

fn validation_error(e: impl std::fmt::Display) -> ConfigError {
	ConfigError::Validation(e.to_string())
}

impl Config {
	/// Loads configuration from a file, following include directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Deserializes and validates an already resolved TOML table.
	pub(crate) fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
		let config: Config = toml::Value::Table(table).try_into()?;
		config.validate()?;
		Ok(config)
	}

	/// Checks the provider endpoint and options, that at least one gateway is
	/// configured, and that the primary account implementation exists.
	fn validate(&self) -> Result<(), ConfigError> {
		let provider = toml::Value::try_from(&self.provider)
			.map_err(|e| ConfigError::Parse(format!("Failed to serialize provider: {}", e)))?;
		Schema::new(vec![Field::new("rpc_url", FieldType::Url)], vec![])
			.validate(&provider)
			.map_err(|e| validation_error(format!("provider: {}", e)))?;
		ProviderOptionsSchema
			.validate(&provider)
			.map_err(|e| validation_error(format!("provider: {}", e)))?;

		let options = &self.provider.options;
		if options.required_confirmations == 0 {
			return Err(ConfigError::Validation(
				"required_confirmations must be at least 1".into(),
			));
		}
		if options.required_confirmations > 100 {
			return Err(ConfigError::Validation(
				"required_confirmations cannot exceed 100".into(),
			));
		}
		if options.gas_price_multiplier <= 0.0 || options.retry_gas_price_multiplier <= 0.0 {
			return Err(ConfigError::Validation(
				"Gas price multipliers must be positive".into(),
			));
		}

		let gateways = &self.gateway;
		if gateways.actions_order_id.is_none()
			&& gateways.asset_ledger_deploy_order_id.is_none()
			&& gateways.value_ledger_deploy_order_id.is_none()
		{
			return Err(ConfigError::Validation(
				"At least one gateway contract must be configured".into(),
			));
		}

		if self.account.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Account primary implementation cannot be empty".into(),
			));
		}
		if self.account.primary_config().is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary account '{}' not found in implementations",
				self.account.primary
			)));
		}

		Ok(())
	}
}

/// Parses a single TOML document, resolving environment variables and
/// validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let table: toml::Table = toml::from_str(&resolved)?;
		Config::from_table(table)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use xcert_types::SignMethod;

	pub(crate) const BASE_CONFIG: &str = r#"
[provider]
rpc_url = "http://localhost:8545"

[gateway]
asset_ledger_deploy_order_id = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512"

[account]
primary = "local"
[account.implementations.local]
private_key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("XCERT_TEST_HOST", "localhost");
		std::env::set_var("XCERT_TEST_PORT", "8545");

		let input = "rpc_url = \"http://${XCERT_TEST_HOST}:${XCERT_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "rpc_url = \"http://localhost:8545\"");

		std::env::remove_var("XCERT_TEST_HOST");
		std::env::remove_var("XCERT_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${XCERT_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${XCERT_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("XCERT_MISSING_VAR"));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = BASE_CONFIG.parse().unwrap();
		assert_eq!(config.provider.implementation, "alloy");
		assert_eq!(config.provider.options, ProviderOptions::default());
		assert!(config.gateway.actions_order_id.is_none());
		assert!(config.ledger.is_none());
		assert_eq!(
			config.provider.implementation_config()["rpc_url"].as_str(),
			Some("http://localhost:8545")
		);
	}

	#[test]
	fn test_provider_options_parsed() {
		let config_str = r#"
[provider]
rpc_url = "${XCERT_TEST_RPC:-https://rpc.example.org}"
sign_method = "direct"
required_confirmations = 3
gas_price_multiplier = 1.5
sandbox = true
unsafe_recipient_ids = ["0x70997970C51812dc3A010C7d01b50e0d17dc79C8"]

[gateway]
actions_order_id = "0x9fe46736679d2d9a65f0992f2272de9f3c7fa6e0"

[account]
primary = "local"
[account.implementations.local]
private_key = "${XCERT_TEST_KEY:-ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80}"

[ledger]
asset_ledger_id = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
"#;
		let config: Config = config_str.parse().unwrap();
		let options = &config.provider.options;
		assert_eq!(config.provider.rpc_url, "https://rpc.example.org");
		assert_eq!(options.sign_method, SignMethod::Direct);
		assert_eq!(options.required_confirmations, 3);
		assert_eq!(options.gas_price_multiplier, 1.5);
		assert!(options.sandbox);
		assert!(options.is_unsafe_recipient(
			&AccountId::parse("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap()
		));
		assert_eq!(
			config.ledger.unwrap().asset_ledger_id.to_string(),
			"0x5fbdb2315678afecb367f032d93f642f64180aa3"
		);
	}

	#[test]
	fn test_invalid_rpc_url_rejected() {
		let config_str = BASE_CONFIG.replace("http://localhost:8545", "localhost:8545");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("rpc_url")));
	}

	#[test]
	fn test_invalid_sign_method_rejected() {
		let config_str = BASE_CONFIG.replace(
			"rpc_url = \"http://localhost:8545\"",
			"rpc_url = \"http://localhost:8545\"\nsign_method = \"eth_sign\"",
		);
		assert!(config_str.parse::<Config>().is_err());
	}

	#[test]
	fn test_zero_confirmations_rejected() {
		let config_str = BASE_CONFIG.replace(
			"rpc_url = \"http://localhost:8545\"",
			"rpc_url = \"http://localhost:8545\"\nrequired_confirmations = 0",
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("required_confirmations"));
	}

	#[test]
	fn test_missing_gateway_rejected() {
		let config_str = BASE_CONFIG.replace(
			"asset_ledger_deploy_order_id = \"0xe7f1725e7734ce288f8367e1bb143e90bb3f0512\"",
			"",
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("gateway"));
	}

	#[test]
	fn test_unknown_primary_account_rejected() {
		let config_str = BASE_CONFIG.replace("primary = \"local\"", "primary = \"ledger\"");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("'ledger' not found"));
	}

	#[test]
	fn test_invalid_gateway_address_is_parse_error() {
		let config_str = BASE_CONFIG.replace("0xe7f1725e7734ce288f8367e1bb143e90bb3f0512", "0x1234");
		assert!(matches!(
			config_str.parse::<Config>(),
			Err(ConfigError::Parse(_))
		));
	}
}
