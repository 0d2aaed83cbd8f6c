//! Common types module for the Xcert gateway client.
//!
//! This module defines the core data types shared by the codec, signer,
//! verifier and gateway crates. It provides a centralized location for the
//! order model so that maker and taker derive the same canonical values.

/// Ledger abilities and capabilities.
pub mod ability;
/// Account and contract identifiers.
pub mod account;
/// Transaction hashes and mutation records returned by the ledger.
pub mod delivery;
/// Provider event types.
pub mod events;
/// Asset ledger records returned by ledger queries.
pub mod ledger;
/// Float-tolerant numeric inputs.
pub mod numeric;
/// Exchange orders and their kind-specific payloads.
pub mod order;
/// Registry trait for pluggable implementations.
pub mod registry;
/// Zeroizing string wrapper for private keys.
pub mod secret_string;
/// Signature schemes and signature payloads.
pub mod signature;
/// Utility functions for common type conversions.
pub mod utils;
/// Configuration validation types.
pub mod validation;

pub use ability::*;
pub use account::*;
pub use delivery::*;
pub use events::*;
pub use ledger::*;
pub use numeric::*;
pub use order::*;
pub use registry::*;
pub use secret_string::SecretString;
pub use signature::*;
pub use utils::{
	current_timestamp, parse_bytes32, parse_uint256, sha, truncate_id, with_0x_prefix, ConversionError,
	without_0x_prefix,
};
pub use validation::*;
