//! Gateway session state machine.
//!
//! A session follows one hashed order from signature collection to its
//! outcome on the gateway contract:
//! Unsigned -> Signed -> Submitted -> Performed | Cancelled, with any
//! non-terminal state moving to Expired once the clock passes the order's
//! expiration. The contract stays the source of truth; a ledger outcome
//! replaces whatever non-terminal state the session holds locally.
//!
//! Sessions hold no locks. Two parties attaching the same signature is a
//! no-op and a different one is a conflict, so concurrent attaches resolve
//! without coordination.

use alloy_primitives::B256;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use xcert_codec::{CodecError, OrderCodec};
use xcert_types::{
	current_timestamp, truncate_id, AccountId, LedgerOrderStatus, Order, SignerRole, Signature,
	TransactionHash,
};

use crate::verifier::{verify_hash, VerifyError};
use crate::GatewayError;

pub mod status;

pub use status::{is_valid_transition, SessionStatus};

/// Errors that can occur during session operations. A failed operation
/// leaves the session unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("A different signature is already attached for the {role}")]
	Conflict { role: SignerRole },
	#[error("Order has expired")]
	ExpiredOrder,
	#[error("Signature was not produced by the {role}")]
	InvalidSignature { role: SignerRole },
	#[error("The {role} does not sign this kind of order")]
	RoleNotRequired { role: SignerRole },
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition {
		from: SessionStatus,
		to: SessionStatus,
	},
	#[error("Submission failed: {0}")]
	Submission(String),
	#[error(transparent)]
	Codec(#[from] CodecError),
	#[error("Malformed signature: {0}")]
	MalformedSignature(String),
}

impl From<VerifyError> for SessionError {
	fn from(e: VerifyError) -> Self {
		match e {
			VerifyError::MalformedSignature(msg) => SessionError::MalformedSignature(msg),
			VerifyError::Codec(e) => SessionError::Codec(e),
		}
	}
}

/// An order together with its canonical hash.
///
/// Fields are private: an order cannot change once hashed, a new value has to
/// be built instead.
#[derive(Debug, Clone)]
pub struct HashedOrder {
	order: Order,
	hash: B256,
	expiration_secs: u64,
}

impl HashedOrder {
	pub fn new(codec: &OrderCodec, order: Order) -> Result<Self, CodecError> {
		let hash = codec.hash_order(&order)?;
		let expiration_secs = order.expiration().to_seconds()?;
		Ok(Self {
			order,
			hash,
			expiration_secs,
		})
	}

	pub fn order(&self) -> &Order {
		&self.order
	}

	pub fn hash(&self) -> &B256 {
		&self.hash
	}

	pub fn expiration_secs(&self) -> u64 {
		self.expiration_secs
	}
}

/// Hands a fully signed order to the gateway contract.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
	/// Submits the order with signatures in required-signer order and returns
	/// the transaction hash.
	async fn submit(
		&self,
		order: &HashedOrder,
		signatures: &[Signature],
	) -> Result<TransactionHash, GatewayError>;
}

/// Ephemeral signing and submission state of one order.
pub struct GatewaySession {
	order: HashedOrder,
	signatures: BTreeMap<SignerRole, Signature>,
	status: SessionStatus,
	tx_hash: Option<TransactionHash>,
	clock: fn() -> u64,
}

impl GatewaySession {
	pub fn new(order: HashedOrder) -> Self {
		Self {
			order,
			signatures: BTreeMap::new(),
			status: SessionStatus::Unsigned,
			tx_hash: None,
			clock: current_timestamp,
		}
	}

	/// Replaces the wall clock (unix seconds) used for expiry.
	pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
		self.clock = clock;
		self
	}

	pub fn order(&self) -> &HashedOrder {
		&self.order
	}

	pub fn status(&self) -> SessionStatus {
		self.status
	}

	pub fn signature(&self, role: SignerRole) -> Option<&Signature> {
		self.signatures.get(&role)
	}

	/// Hash of the submission transaction, once submitted.
	pub fn tx_hash(&self) -> Option<&TransactionHash> {
		self.tx_hash.as_ref()
	}

	fn order_hash(&self) -> String {
		truncate_id(&self.order.hash.to_string())
	}

	/// Re-evaluates expiry against the clock and returns the current status.
	pub fn refresh(&mut self) -> SessionStatus {
		if self.status.can_expire() && (self.clock)() > self.order.expiration_secs {
			tracing::info!(
				order_hash = %self.order_hash(),
				from = %self.status,
				"Order expired"
			);
			self.status = SessionStatus::Expired;
		}
		self.status
	}

	fn ensure_live(&mut self) -> Result<(), SessionError> {
		if self.refresh() == SessionStatus::Expired {
			return Err(SessionError::ExpiredOrder);
		}
		Ok(())
	}

	fn check_transition(&self, to: SessionStatus) -> Result<(), SessionError> {
		if !is_valid_transition(self.status, to) {
			return Err(SessionError::InvalidTransition {
				from: self.status,
				to,
			});
		}
		Ok(())
	}

	fn set_status(&mut self, to: SessionStatus) {
		tracing::info!(
			order_hash = %self.order_hash(),
			from = %self.status,
			status = %to,
			"Session transition"
		);
		self.status = to;
	}

	/// Attaches a verified signature for `role`.
	///
	/// Moves to [`SessionStatus::Signed`] once every role the order kind
	/// requires has signed. Attaching the signature already held for a role
	/// is a no-op.
	pub fn attach_signature(
		&mut self,
		role: SignerRole,
		signature: Signature,
	) -> Result<SessionStatus, SessionError> {
		self.ensure_live()?;

		let required = self.order.order.required_signers();
		if !required.contains(&role) {
			return Err(SessionError::RoleNotRequired { role });
		}

		if let Some(existing) = self.signatures.get(&role) {
			if *existing == signature {
				tracing::debug!(order_hash = %self.order_hash(), %role, "Signature already attached");
				return Ok(self.status);
			}
			tracing::warn!(order_hash = %self.order_hash(), %role, "Conflicting signature");
			return Err(SessionError::Conflict { role });
		}

		if self.status != SessionStatus::Unsigned {
			return Err(SessionError::InvalidTransition {
				from: self.status,
				to: SessionStatus::Signed,
			});
		}

		let signer = AccountId::parse(self.order.order.signer_id(role)).map_err(CodecError::from)?;
		if !verify_hash(&self.order.hash, &signature, &signer)? {
			tracing::warn!(order_hash = %self.order_hash(), %role, "Signature does not match signer");
			return Err(SessionError::InvalidSignature { role });
		}

		let complete = required
			.iter()
			.all(|r| *r == role || self.signatures.contains_key(r));
		self.signatures.insert(role, signature);
		tracing::info!(order_hash = %self.order_hash(), %role, "Signature attached");
		if complete {
			self.set_status(SessionStatus::Signed);
		}
		Ok(self.status)
	}

	/// Submits the signed order once. Failures are not retried and leave the
	/// session in [`SessionStatus::Signed`].
	pub async fn submit(
		&mut self,
		submitter: &dyn OrderSubmitter,
	) -> Result<TransactionHash, SessionError> {
		self.ensure_live()?;
		self.check_transition(SessionStatus::Submitted)?;

		let signatures: Vec<Signature> = self
			.order
			.order
			.required_signers()
			.iter()
			.filter_map(|role| self.signatures.get(role).cloned())
			.collect();

		let tx_hash = submitter
			.submit(&self.order, &signatures)
			.await
			.map_err(|e| {
				tracing::warn!(order_hash = %self.order_hash(), error = %e, "Submission failed");
				SessionError::Submission(e.to_string())
			})?;

		self.set_status(SessionStatus::Submitted);
		tracing::info!(order_hash = %self.order_hash(), tx_hash = %tx_hash, "Order submitted");
		self.tx_hash = Some(tx_hash.clone());
		Ok(tx_hash)
	}

	/// Applies the claim state reported by the gateway contract.
	///
	/// [`LedgerOrderStatus::Unknown`] changes nothing. An outcome moves any
	/// non-terminal session to that outcome, including one that was never
	/// submitted locally. A terminal session only accepts the outcome it
	/// already holds.
	pub fn apply_ledger_status(
		&mut self,
		status: LedgerOrderStatus,
	) -> Result<SessionStatus, SessionError> {
		let to = match status {
			LedgerOrderStatus::Unknown => return Ok(self.status),
			LedgerOrderStatus::Performed => SessionStatus::Performed,
			LedgerOrderStatus::Cancelled => SessionStatus::Cancelled,
		};
		if self.status == to {
			return Ok(to);
		}
		self.check_transition(to)?;
		self.set_status(to);
		Ok(to)
	}
}
