//! Order gateway for the Xcert client.
//!
//! This crate brings the codec, the signer and the ledger collaborator
//! together: it verifies claims, tracks an order through a
//! [`GatewaySession`], and talks to the gateway contracts that perform or
//! cancel orders on chain.

use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use xcert_account::{AccountError, AccountService};
use xcert_codec::{CodecError, OrderCodec};
use xcert_delivery::{LedgerError, LedgerService};
use xcert_types::{
	truncate_id, AccountId, LedgerOrderStatus, Mutation, Order, OrderKind, Signature,
	TransactionHash,
};

pub mod abi;
pub mod session;
pub mod verifier;

pub use session::{GatewaySession, HashedOrder, OrderSubmitter, SessionError, SessionStatus};
pub use verifier::{verify, VerifyError};

use abi::IOrderGateway;

/// Errors that can occur during gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
	#[error(transparent)]
	Codec(#[from] CodecError),
	#[error(transparent)]
	Verify(#[from] VerifyError),
	#[error(transparent)]
	Session(#[from] SessionError),
	#[error(transparent)]
	Signing(#[from] AccountError),
	#[error(transparent)]
	Ledger(#[from] LedgerError),
	#[error("Invalid claims: {0}")]
	InvalidClaims(String),
	#[error("Failed to decode gateway response: {0}")]
	Decode(String),
}

/// Client for the gateway contracts of one deployment.
///
/// Signs with the configured account and sends `perform` and `cancel`
/// transactions from it.
pub struct Gateway {
	codec: OrderCodec,
	ledger: Arc<LedgerService>,
	account: Arc<AccountService>,
}

impl Gateway {
	pub fn new(codec: OrderCodec, ledger: Arc<LedgerService>, account: Arc<AccountService>) -> Self {
		Self {
			codec,
			ledger,
			account,
		}
	}

	pub fn codec(&self) -> &OrderCodec {
		&self.codec
	}

	/// Hashes an order and opens a session for it.
	pub fn open_session(&self, order: Order) -> Result<GatewaySession, GatewayError> {
		Ok(GatewaySession::new(HashedOrder::new(&self.codec, order)?))
	}

	fn gateway_id(&self, kind: OrderKind) -> Result<AccountId, GatewayError> {
		self.codec.gateways().gateway_id(kind).ok_or_else(|| {
			GatewayError::Codec(CodecError::Encoding(format!(
				"No gateway contract configured for {}",
				kind
			)))
		})
	}

	/// Signs the order's canonical hash with the configured account and
	/// sign method.
	#[instrument(skip_all, fields(kind = %order.kind()))]
	pub async fn sign(&self, order: &Order) -> Result<Signature, GatewayError> {
		let hash = self.codec.hash_order(order)?;
		Ok(self.account.sign(&hash).await?)
	}

	/// Whether `claim` is the maker's signature over `order`.
	pub fn is_valid_signature(&self, order: &Order, claim: &Signature) -> Result<bool, GatewayError> {
		Ok(verify(&self.codec, order, claim, order.maker_id())?)
	}

	/// Performs the order on its gateway contract.
	///
	/// `claims` holds one signature per required signer, in required-signer
	/// order (maker first).
	#[instrument(skip_all, fields(kind = %order.kind()))]
	pub async fn perform(&self, order: &Order, claims: &[Signature]) -> Result<Mutation, GatewayError> {
		let required = order.required_signers().len();
		if claims.len() != required {
			return Err(GatewayError::InvalidClaims(format!(
				"{} requires {} signature(s), got {}",
				order.kind(),
				required,
				claims.len()
			)));
		}
		let signatures = claims
			.iter()
			.map(abi::signature_data)
			.collect::<Result<Vec<_>, _>>()?;
		let data = abi::perform_calldata(order, &signatures)?;
		self.mutate(order.kind(), &data).await
	}

	/// Cancels the order's claim on its gateway contract.
	#[instrument(skip_all, fields(kind = %order.kind()))]
	pub async fn cancel(&self, order: &Order) -> Result<Mutation, GatewayError> {
		let data = abi::cancel_calldata(order)?;
		self.mutate(order.kind(), &data).await
	}

	async fn mutate(&self, kind: OrderKind, data: &[u8]) -> Result<Mutation, GatewayError> {
		let gateway = self.gateway_id(kind)?;
		let sender = self.account.get_address().await?;
		let hash = self.ledger.send_transaction(&sender, &gateway, data).await?;
		Ok(Mutation {
			hash,
			sender_id: sender,
			receiver_id: gateway,
		})
	}

	/// Reads the claim state of an order from its gateway contract.
	#[instrument(skip_all, fields(kind = %order.kind()))]
	pub async fn get_order_status(&self, order: &Order) -> Result<LedgerOrderStatus, GatewayError> {
		let gateway = self.gateway_id(order.kind())?;
		let claim = self.codec.hash_order(order)?;

		let performed = self
			.query::<IOrderGateway::orderPerformedCall>(
				&gateway,
				IOrderGateway::orderPerformedCall { _claim: claim },
			)
			.await?;
		if performed._0 {
			return Ok(LedgerOrderStatus::Performed);
		}
		let cancelled = self
			.query::<IOrderGateway::orderCancelledCall>(
				&gateway,
				IOrderGateway::orderCancelledCall { _claim: claim },
			)
			.await?;
		Ok(if cancelled._0 {
			LedgerOrderStatus::Cancelled
		} else {
			LedgerOrderStatus::Unknown
		})
	}

	async fn query<C: SolCall>(&self, to: &AccountId, call: C) -> Result<C::Return, GatewayError> {
		let data = self.ledger.call_contract(to, &call.abi_encode()).await?;
		C::abi_decode_returns(&data, true).map_err(|e| GatewayError::Decode(e.to_string()))
	}

	/// Re-evaluates a session locally and, unless it has already reached an
	/// outcome, against the claim state on the gateway contract.
	#[instrument(skip_all, fields(order_hash = %truncate_id(&session.order().hash().to_string())))]
	pub async fn refresh(&self, session: &mut GatewaySession) -> Result<SessionStatus, GatewayError> {
		let local = session.refresh();
		if local.is_terminal() {
			return Ok(local);
		}
		let status = self.get_order_status(session.order().order()).await?;
		tracing::debug!(ledger_status = ?status, "Fetched order status");
		Ok(session.apply_ledger_status(status)?)
	}
}

#[async_trait]
impl OrderSubmitter for Gateway {
	async fn submit(
		&self,
		order: &HashedOrder,
		signatures: &[Signature],
	) -> Result<TransactionHash, GatewayError> {
		Ok(self.perform(order.order(), signatures).await?.hash)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{hex, Bytes};
	use alloy_sol_types::SolValue;
	use mockall::mock;
	use serde_json::{json, Value};
	use xcert_account::implementations::local::LocalWallet;
	use xcert_codec::GatewayConfig;
	use xcert_delivery::{LedgerInterface, ProviderOptions};
	use xcert_types::{
		ConfigSchema, Numeric, SecretString, SignMethod, SignerRole, TokenTransferData,
		ValueLedgerData, ValueLedgerDeployOrder,
	};

	mock! {
		pub Ledger {}

		#[async_trait]
		impl LedgerInterface for Ledger {
			fn config_schema(&self) -> Box<dyn ConfigSchema>;
			async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError>;
		}
	}

	const MAKER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const TAKER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const MAKER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
	const TAKER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
	const GATEWAY: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
	const TX: &str = "0x8f3c2e0b6a8d3a4e1f0b9c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f2a1b0c9d8e7f";

	fn codec() -> OrderCodec {
		OrderCodec::new(GatewayConfig {
			value_ledger_deploy_order_id: Some(AccountId::parse(GATEWAY).unwrap()),
			..Default::default()
		})
	}

	fn order() -> Order {
		Order::ValueLedgerDeploy(ValueLedgerDeployOrder {
			maker_id: MAKER.to_string(),
			taker_id: TAKER.to_string(),
			seed: Numeric::from(7u64),
			expiration: Numeric::from(u64::MAX / 2),
			value_ledger_data: ValueLedgerData {
				name: "Value".to_string(),
				symbol: "VAL".to_string(),
				supply: "1000000000000000000".to_string(),
				decimals: 18,
				owner_id: MAKER.to_string(),
			},
			token_transfer_data: TokenTransferData {
				ledger_id: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
				receiver_id: MAKER.to_string(),
				value: "100".to_string(),
			},
		})
	}

	fn gateway(key: &str, mock: MockLedger) -> Gateway {
		let wallet = LocalWallet::new(&SecretString::from(key)).unwrap();
		Gateway::new(
			codec(),
			Arc::new(LedgerService::new(Arc::new(mock), ProviderOptions::default())),
			Arc::new(AccountService::new(Box::new(wallet), SignMethod::PersonalSign)),
		)
	}

	fn selector_hex(selector: [u8; 4]) -> String {
		format!("0x{}", hex::encode(selector))
	}

	fn expect_send(mock: &mut MockLedger, selector: [u8; 4]) {
		let selector = selector_hex(selector);
		mock.expect_call()
			.withf(|method, _| method == "eth_gasPrice")
			.returning(|_, _| Ok(json!("0x3b9aca00")));
		mock.expect_call()
			.withf(move |method, params| {
				let tx = &params[0];
				method == "eth_sendTransaction"
					&& tx["from"] == TAKER
					&& tx["to"] == GATEWAY
					&& tx["gasPrice"] == "0x4190ab00"
					&& tx["data"].as_str().is_some_and(|d| d.starts_with(&selector))
			})
			.times(1)
			.returning(|_, _| Ok(json!(TX)));
	}

	fn expect_status(mock: &mut MockLedger, performed: bool, cancelled: bool) {
		let performed_selector = selector_hex(IOrderGateway::orderPerformedCall::SELECTOR);
		mock.expect_call()
			.withf(|method, _| method == "eth_call")
			.returning(move |_, params| {
				let data = params[0]["data"].as_str().unwrap_or_default();
				let answer = if data.starts_with(&performed_selector) {
					performed
				} else {
					cancelled
				};
				Ok(json!(Bytes::from(answer.abi_encode()).to_string()))
			});
	}

	#[tokio::test]
	async fn test_sign_produces_valid_maker_claim() {
		let maker = gateway(MAKER_KEY, MockLedger::new());
		let claim = maker.sign(&order()).await.unwrap();
		assert_eq!(claim.method, SignMethod::PersonalSign);
		assert!(maker.is_valid_signature(&order(), &claim).unwrap());

		let taker = gateway(TAKER_KEY, MockLedger::new());
		let forged = taker.sign(&order()).await.unwrap();
		assert!(!taker.is_valid_signature(&order(), &forged).unwrap());
	}

	#[tokio::test]
	async fn test_perform_sends_to_gateway() {
		let claim = gateway(MAKER_KEY, MockLedger::new())
			.sign(&order())
			.await
			.unwrap();

		let mut mock = MockLedger::new();
		expect_send(&mut mock, abi::IValueLedgerDeployGateway::performCall::SELECTOR);

		let taker = gateway(TAKER_KEY, mock);
		let mutation = taker.perform(&order(), &[claim]).await.unwrap();
		assert_eq!(mutation.hash.to_string(), TX);
		assert_eq!(mutation.sender_id.to_string(), TAKER);
		assert_eq!(mutation.receiver_id.to_string(), GATEWAY);
	}

	#[tokio::test]
	async fn test_perform_checks_claim_count() {
		let taker = gateway(TAKER_KEY, MockLedger::new());
		assert!(matches!(
			taker.perform(&order(), &[]).await,
			Err(GatewayError::InvalidClaims(_))
		));
	}

	#[tokio::test]
	async fn test_cancel_sends_to_gateway() {
		let mut mock = MockLedger::new();
		expect_send(&mut mock, abi::IValueLedgerDeployGateway::cancelCall::SELECTOR);
		let taker = gateway(TAKER_KEY, mock);
		let mutation = taker.cancel(&order()).await.unwrap();
		assert_eq!(mutation.receiver_id.to_string(), GATEWAY);
	}

	#[tokio::test]
	async fn test_order_status() {
		for (performed, cancelled, expected) in [
			(true, false, LedgerOrderStatus::Performed),
			(false, true, LedgerOrderStatus::Cancelled),
			(false, false, LedgerOrderStatus::Unknown),
		] {
			let mut mock = MockLedger::new();
			expect_status(&mut mock, performed, cancelled);
			let gw = gateway(TAKER_KEY, mock);
			assert_eq!(gw.get_order_status(&order()).await.unwrap(), expected);
		}
	}

	#[tokio::test]
	async fn test_invalid_identifier_is_codec_error() {
		let mut order = order();
		if let Order::ValueLedgerDeploy(o) = &mut order {
			o.maker_id = "not an address".to_string();
		}
		let gw = gateway(TAKER_KEY, MockLedger::new());
		assert!(matches!(
			gw.get_order_status(&order).await,
			Err(GatewayError::Codec(CodecError::InvalidIdentifier(_)))
		));
	}

	#[tokio::test]
	async fn test_session_through_gateway() {
		let maker = gateway(MAKER_KEY, MockLedger::new());
		let mut session = maker.open_session(order()).unwrap();
		let claim = maker.sign(&order()).await.unwrap();
		session.attach_signature(SignerRole::Maker, claim).unwrap();

		let mut mock = MockLedger::new();
		expect_send(&mut mock, abi::IValueLedgerDeployGateway::performCall::SELECTOR);
		expect_status(&mut mock, true, false);
		let taker = gateway(TAKER_KEY, mock);

		let tx = session.submit(&taker).await.unwrap();
		assert_eq!(tx.to_string(), TX);
		assert_eq!(
			taker.refresh(&mut session).await.unwrap(),
			SessionStatus::Performed
		);
	}

	#[tokio::test]
	async fn test_refresh_picks_up_cancel_before_submission() {
		let maker = gateway(MAKER_KEY, MockLedger::new());
		let mut session = maker.open_session(order()).unwrap();
		let claim = maker.sign(&order()).await.unwrap();
		session.attach_signature(SignerRole::Maker, claim).unwrap();
		assert_eq!(session.status(), SessionStatus::Signed);

		let mut mock = MockLedger::new();
		expect_status(&mut mock, false, true);
		let gw = gateway(MAKER_KEY, mock);
		assert_eq!(
			gw.refresh(&mut session).await.unwrap(),
			SessionStatus::Cancelled
		);
	}
}
