//! Signature schemes and signature payloads.
//!
//! A signature travels as a `(method, payload)` pair. The method tells the
//! verifier how the order hash was turned into the signed digest; the payload
//! is the 65-byte `r || s || v` secp256k1 signature.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an `r || s || v` signature payload.
pub const SIGNATURE_LENGTH: usize = 65;

/// How the order hash is turned into the digest that gets signed.
///
/// Codes match the signature kinds understood by the gateway contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignMethod {
	/// The hash is wrapped in the `"\x19Ethereum Signed Message:\n32"` prefix
	/// before signing. Wallet-style providers only sign this way.
	#[default]
	PersonalSign,
	/// The raw 32-byte hash is signed.
	Direct,
}

impl SignMethod {
	pub fn code(self) -> u8 {
		match self {
			SignMethod::PersonalSign => 0,
			SignMethod::Direct => 2,
		}
	}

	pub fn from_code(code: u8) -> Option<Self> {
		match code {
			0 => Some(SignMethod::PersonalSign),
			2 => Some(SignMethod::Direct),
			_ => None,
		}
	}
}

impl fmt::Display for SignMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SignMethod::PersonalSign => write!(f, "personal_sign"),
			SignMethod::Direct => write!(f, "direct"),
		}
	}
}

/// Errors raised while parsing a signature from its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureParseError {
	#[error("Missing sign method separator")]
	MissingSeparator,
	#[error("Unknown sign method code: {0}")]
	UnknownMethod(String),
	#[error("Invalid signature hex: {0}")]
	InvalidHex(String),
}

/// A signature over an order hash together with the method that produced it.
///
/// The payload length is not enforced here: structural validation belongs to
/// verification, which reports malformed payloads separately from
/// non-matching ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
	pub method: SignMethod,
	pub payload: Vec<u8>,
}

impl Signature {
	pub fn new(method: SignMethod, payload: Vec<u8>) -> Self {
		Self { method, payload }
	}

	/// Payload as `0x`-prefixed hex.
	pub fn payload_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.payload))
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.method.code(), self.payload_hex())
	}
}

impl FromStr for Signature {
	type Err = SignatureParseError;

	/// Parses the `"<method code>:0x<hex>"` claim format.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (code, payload) = s
			.split_once(':')
			.ok_or(SignatureParseError::MissingSeparator)?;
		let method = code
			.trim()
			.parse::<u8>()
			.ok()
			.and_then(SignMethod::from_code)
			.ok_or_else(|| SignatureParseError::UnknownMethod(code.to_string()))?;
		let payload = hex::decode(crate::utils::without_0x_prefix(payload.trim()))
			.map_err(|e| SignatureParseError::InvalidHex(e.to_string()))?;
		Ok(Self { method, payload })
	}
}

impl Serialize for Signature {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Signature {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}
