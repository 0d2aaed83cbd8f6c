//! Command line client for Xcert gateway orders.
//!
//! Hashes, signs and verifies orders offline, and performs, cancels or
//! inspects them through the configured JSON-RPC provider.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use xcert_codec::OrderCodec;
use xcert_config::Config;
use xcert_delivery::ProviderWatcher;
use xcert_types::{Order, Signature};

mod builder;

use builder::{asset_ledger, build_components};

/// Command-line arguments for the Xcert client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "XCERT_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the canonical hash of an order
	Hash {
		/// JSON order file
		order: PathBuf,
	},
	/// Sign an order with the configured account
	Sign { order: PathBuf },
	/// Check a signature claim against an order
	Verify {
		order: PathBuf,
		/// Claim in `<method>:0x<hex>` form
		#[arg(short, long)]
		signature: String,
		/// Expected signer, defaults to the maker
		#[arg(long)]
		signer: Option<String>,
	},
	/// Perform an order on its gateway contract
	Perform {
		order: PathBuf,
		/// Claims in required-signer order (maker first)
		#[arg(short, long = "signature", required = true)]
		signatures: Vec<String>,
		/// Wait for the configured number of confirmations
		#[arg(long)]
		wait: bool,
	},
	/// Cancel an order on its gateway contract
	Cancel {
		order: PathBuf,
		#[arg(long)]
		wait: bool,
	},
	/// Read an order's claim state from its gateway contract
	Status { order: PathBuf },
	/// Print the description of an asset ledger
	LedgerInfo {
		/// Asset ledger id, defaults to `[ledger].asset_ledger_id`
		#[arg(long)]
		ledger: Option<String>,
	},
	/// Print provider network and account changes until interrupted
	Watch,
}

async fn read_order(path: &Path) -> Result<Order, Box<dyn std::error::Error>> {
	let json = tokio::fs::read_to_string(path).await?;
	Ok(OrderCodec::decode_order(&json)?)
}

fn parse_claims(claims: &[String]) -> Result<Vec<Signature>, Box<dyn std::error::Error>> {
	claims
		.iter()
		.map(|claim| claim.parse::<Signature>().map_err(Into::into))
		.collect()
}

/// Main entry point for the Xcert client.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Runs the requested command
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid config path: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(config = %args.config.display(), "Loaded configuration");

	run(args.command, &config).await
}

async fn run(command: Command, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
	let codec = OrderCodec::new(config.gateway.clone());

	match command {
		Command::Hash { order } => {
			let order = read_order(&order).await?;
			println!("{}", codec.hash_order(&order)?);
		},
		Command::Verify {
			order,
			signature,
			signer,
		} => {
			let order = read_order(&order).await?;
			let claim: Signature = signature.parse()?;
			let signer = signer.unwrap_or_else(|| order.maker_id().to_string());
			println!("{}", xcert_gateway::verify(&codec, &order, &claim, &signer)?);
		},
		Command::Sign { order } => {
			let order = read_order(&order).await?;
			let components = build_components(config)?;
			println!("{}", components.gateway.sign(&order).await?);
		},
		Command::Perform {
			order,
			signatures,
			wait,
		} => {
			let order = read_order(&order).await?;
			let claims = parse_claims(&signatures)?;
			let components = build_components(config)?;
			let mutation = components.gateway.perform(&order, &claims).await?;
			println!("{}", mutation.hash);
			if wait {
				let receipt = components.ledger.wait_for_confirmation(&mutation.hash).await?;
				println!("confirmed in block {}", receipt.block_number);
			}
		},
		Command::Cancel { order, wait } => {
			let order = read_order(&order).await?;
			let components = build_components(config)?;
			let mutation = components.gateway.cancel(&order).await?;
			println!("{}", mutation.hash);
			if wait {
				let receipt = components.ledger.wait_for_confirmation(&mutation.hash).await?;
				println!("confirmed in block {}", receipt.block_number);
			}
		},
		Command::Status { order } => {
			let order = read_order(&order).await?;
			let components = build_components(config)?;
			let status = components.gateway.get_order_status(&order).await?;
			println!("{}", serde_json::to_string(&status)?);
		},
		Command::LedgerInfo { ledger } => {
			let components = build_components(config)?;
			let ledger = asset_ledger(config, components.ledger, ledger.as_deref())?;
			let info = ledger.get_info().await?;
			println!("{}", serde_json::to_string_pretty(&info)?);
		},
		Command::Watch => {
			let components = build_components(config)?;
			tracing::info!(address = %components.account.get_address().await?, "Watching provider");
			let poll_interval = Duration::from_secs(config.provider.options.poll_interval_secs.max(1));
			let handle = ProviderWatcher::spawn(components.ledger.clone(), poll_interval);
			let mut events = handle.subscribe();
			loop {
				tokio::select! {
					event = events.recv() => match event {
						Ok(event) => println!("{}", serde_json::to_string(&event)?),
						Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
							tracing::warn!(skipped, "Dropped provider events");
						},
						Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
					},
					_ = tokio::signal::ctrl_c() => {
						tracing::info!("Stopping watcher");
						break;
					}
				}
			}
			handle.stop().await;
		},
	}
	Ok(())
}
