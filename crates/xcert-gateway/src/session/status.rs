//! Session lifecycle states and the table of allowed moves between them.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Lifecycle of an order inside a gateway session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
	/// Waiting for one or more required signatures.
	Unsigned,
	/// Every required role has a verified signature.
	Signed,
	/// Handed to the gateway contract; the transaction hash is known.
	Submitted,
	Performed,
	Cancelled,
	/// Expiration passed before the ledger reported an outcome.
	Expired,
}

impl SessionStatus {
	/// Expiry is evaluated only for these states.
	pub fn can_expire(self) -> bool {
		matches!(
			self,
			SessionStatus::Unsigned | SessionStatus::Signed | SessionStatus::Submitted
		)
	}

	/// States no transition leaves.
	pub fn is_terminal(self) -> bool {
		matches!(self, SessionStatus::Performed | SessionStatus::Cancelled)
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SessionStatus::Unsigned => "unsigned",
			SessionStatus::Signed => "signed",
			SessionStatus::Submitted => "submitted",
			SessionStatus::Performed => "performed",
			SessionStatus::Cancelled => "cancelled",
			SessionStatus::Expired => "expired",
		};
		f.write_str(name)
	}
}

static TRANSITIONS: Lazy<HashMap<SessionStatus, HashSet<SessionStatus>>> = Lazy::new(|| {
	// Ledger outcomes are reachable from every non-terminal state.
	let outcomes = [SessionStatus::Performed, SessionStatus::Cancelled];
	let mut m = HashMap::new();
	m.insert(
		SessionStatus::Unsigned,
		HashSet::from([SessionStatus::Signed, SessionStatus::Expired]),
	);
	m.insert(
		SessionStatus::Signed,
		HashSet::from([SessionStatus::Submitted, SessionStatus::Expired]),
	);
	m.insert(SessionStatus::Submitted, HashSet::from([SessionStatus::Expired]));
	m.insert(SessionStatus::Expired, HashSet::new());
	for exits in m.values_mut() {
		exits.extend(outcomes);
	}
	m.insert(SessionStatus::Performed, HashSet::new()); // terminal
	m.insert(SessionStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Whether the session may move from `from` to `to`.
pub fn is_valid_transition(from: SessionStatus, to: SessionStatus) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|set| set.contains(&to))
}

#[cfg(test)]
mod tests {
	use super::*;

	const ALL: [SessionStatus; 6] = [
		SessionStatus::Unsigned,
		SessionStatus::Signed,
		SessionStatus::Submitted,
		SessionStatus::Performed,
		SessionStatus::Cancelled,
		SessionStatus::Expired,
	];

	#[test]
	fn test_every_expirable_state_can_expire() {
		for status in ALL {
			assert_eq!(
				is_valid_transition(status, SessionStatus::Expired),
				status.can_expire(),
				"{}",
				status
			);
		}
	}

	#[test]
	fn test_terminal_states_have_no_exits() {
		for from in [SessionStatus::Performed, SessionStatus::Cancelled] {
			assert!(from.is_terminal());
			assert!(ALL.iter().all(|to| !is_valid_transition(from, *to)));
		}
	}

	#[test]
	fn test_no_skipping_forward() {
		assert!(!is_valid_transition(
			SessionStatus::Unsigned,
			SessionStatus::Submitted
		));
		assert!(!is_valid_transition(
			SessionStatus::Expired,
			SessionStatus::Submitted
		));
		assert!(!is_valid_transition(
			SessionStatus::Expired,
			SessionStatus::Signed
		));
	}

	#[test]
	fn test_outcomes_reachable_from_every_open_state() {
		for from in ALL.iter().filter(|s| !s.is_terminal()) {
			assert!(is_valid_transition(*from, SessionStatus::Performed), "{}", from);
			assert!(is_valid_transition(*from, SessionStatus::Cancelled), "{}", from);
		}
		assert!(!is_valid_transition(
			SessionStatus::Performed,
			SessionStatus::Cancelled
		));
	}
}
