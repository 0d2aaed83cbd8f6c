//! Builds runtime components from configuration.
//!
//! Implementations are looked up by name in each crate's registry, so adding
//! an implementation only means listing it in its crate's
//! `get_all_implementations`.

use std::collections::HashMap;
use std::sync::Arc;
use xcert_account::{AccountFactory, AccountService};
use xcert_codec::OrderCodec;
use xcert_config::Config;
use xcert_delivery::{LedgerFactory, LedgerService};
use xcert_gateway::Gateway;
use xcert_ledger::AssetLedger;
use xcert_types::AccountId;

type BoxError = Box<dyn std::error::Error>;

/// Factories available to the binary, keyed by implementation name.
pub struct FactoryRegistry {
	pub account: HashMap<&'static str, AccountFactory>,
	pub ledger: HashMap<&'static str, LedgerFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self {
			account: xcert_account::get_all_implementations().into_iter().collect(),
			ledger: xcert_delivery::get_all_implementations().into_iter().collect(),
		}
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Everything a command may need, built once per invocation.
pub struct Components {
	pub ledger: Arc<LedgerService>,
	pub account: Arc<AccountService>,
	pub gateway: Gateway,
}

pub fn build_ledger(config: &Config, registry: &FactoryRegistry) -> Result<Arc<LedgerService>, BoxError> {
	let provider = &config.provider;
	let factory = registry
		.ledger
		.get(provider.implementation.as_str())
		.ok_or_else(|| format!("Unknown provider implementation '{}'", provider.implementation))?;
	let implementation = factory(&provider.implementation_config())?;
	tracing::info!(implementation = %provider.implementation, rpc_url = %provider.rpc_url, "Loaded provider");
	Ok(Arc::new(LedgerService::new(
		Arc::from(implementation),
		provider.options.clone(),
	)))
}

pub fn build_account(config: &Config, registry: &FactoryRegistry) -> Result<Arc<AccountService>, BoxError> {
	let name = config.account.primary.as_str();
	let factory = registry
		.account
		.get(name)
		.ok_or_else(|| format!("Unknown account implementation '{}'", name))?;
	let account_config = config
		.account
		.primary_config()
		.ok_or_else(|| format!("Account implementation '{}' is not configured", name))?;
	let capability = factory(account_config)?;
	Ok(Arc::new(AccountService::new(
		capability,
		config.provider.options.sign_method,
	)))
}

pub fn build_components(config: &Config) -> Result<Components, BoxError> {
	let registry = FactoryRegistry::new();
	let ledger = build_ledger(config, &registry)?;
	let account = build_account(config, &registry)?;
	let gateway = Gateway::new(
		OrderCodec::new(config.gateway.clone()),
		ledger.clone(),
		account.clone(),
	);
	Ok(Components {
		ledger,
		account,
		gateway,
	})
}

/// Asset ledger from the command line, falling back to `[ledger]`.
pub fn asset_ledger(
	config: &Config,
	ledger: Arc<LedgerService>,
	id: Option<&str>,
) -> Result<AssetLedger, BoxError> {
	let id = match id {
		Some(id) => AccountId::parse(id)?,
		None => {
			config
				.ledger
				.as_ref()
				.ok_or("No asset ledger given and none configured")?
				.asset_ledger_id
		},
	};
	Ok(AssetLedger::new(ledger, id))
}
