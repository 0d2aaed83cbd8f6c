//! Transaction types returned by the ledger collaborator.
//!
//! This module defines the records a caller gets back after handing an
//! order or a ledger mutation to the remote ledger.

use crate::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blockchain transaction hash representation.
///
/// Stores transaction hashes as raw bytes; display is `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Parses a `0x`-prefixed hex hash as returned by JSON-RPC.
	pub fn from_hex(value: &str) -> Result<Self, hex::FromHexError> {
		hex::decode(crate::utils::without_0x_prefix(value)).map(Self)
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(&self.0))
	}
}

/// Transaction receipt containing execution details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// A state-changing transaction sent to a ledger or gateway contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
	/// Hash of the submitted transaction.
	pub hash: TransactionHash,
	/// Account the transaction was sent from.
	pub sender_id: AccountId,
	/// Contract the transaction was sent to.
	pub receiver_id: AccountId,
}
