//! Provider event types.
//!
//! Events are published by the provider watcher on a broadcast channel so
//! that any number of consumers can react to wallet changes.

use crate::AccountId;
use serde::{Deserialize, Serialize};

/// Change observed on the connected provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEvent {
	/// The provider switched to a different network.
	NetworkChange {
		new_network: String,
		old_network: Option<String>,
	},
	/// The active account of the provider changed.
	AccountChange {
		new_account: Option<AccountId>,
		old_account: Option<AccountId>,
	},
}
