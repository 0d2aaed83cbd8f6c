//! In-memory ledger collaborator.
//!
//! Answers each JSON-RPC method from a queue of canned responses and records
//! every request. The last queued response of a method is repeated once the
//! queue drains to it.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use xcert_types::{ConfigSchema, Schema, ValidationError};

type Response = Result<Value, (i64, String)>;

#[derive(Default)]
pub struct MockLedger {
	responses: Mutex<HashMap<String, VecDeque<Response>>>,
	calls: Mutex<Vec<(String, Value)>>,
}

impl MockLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a successful result for `method`.
	pub fn with_response(self, method: &str, result: Value) -> Self {
		self.push(method, Ok(result));
		self
	}

	/// Queues a JSON-RPC error for `method`.
	pub fn with_error(self, method: &str, code: i64, message: &str) -> Self {
		self.push(method, Err((code, message.to_string())));
		self
	}

	/// Queues a result after construction, for example while a watcher runs.
	pub fn push_response(&self, method: &str, result: Value) {
		self.push(method, Ok(result));
	}

	fn push(&self, method: &str, response: Response) {
		if let Ok(mut responses) = self.responses.lock() {
			responses
				.entry(method.to_string())
				.or_default()
				.push_back(response);
		}
	}

	/// Requests received so far, in order.
	pub fn calls(&self) -> Vec<(String, Value)> {
		self.calls
			.lock()
			.map(|calls| calls.clone())
			.unwrap_or_default()
	}
}

struct MockLedgerSchema;

impl ConfigSchema for MockLedgerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

#[async_trait]
impl LedgerInterface for MockLedger {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockLedgerSchema)
	}

	async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
		if let Ok(mut calls) = self.calls.lock() {
			calls.push((method.to_string(), params));
		}
		let response = {
			let mut responses = self
				.responses
				.lock()
				.map_err(|_| LedgerError::Network("mock state poisoned".to_string()))?;
			match responses.get_mut(method) {
				Some(queue) if queue.len() > 1 => queue.pop_front(),
				Some(queue) => queue.front().cloned(),
				None => None,
			}
		};
		match response {
			Some(Ok(value)) => Ok(value),
			Some(Err((code, message))) => Err(LedgerError::Rpc { code, message }),
			None => Err(LedgerError::Rpc {
				code: -32601,
				message: format!("Method {} not found", method),
			}),
		}
	}
}
