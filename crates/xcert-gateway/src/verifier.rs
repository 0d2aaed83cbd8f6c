//! Signature verification by signer recovery.
//!
//! A claim is checked the way the gateway contract checks it: rebuild the
//! digest for the signature's scheme from the canonical order hash, recover
//! the signing account and compare it with the expected one.

use alloy_primitives::{eip191_hash_message, PrimitiveSignature, B256, U256};
use thiserror::Error;
use xcert_codec::{CodecError, OrderCodec};
use xcert_types::{AccountId, Order, SignMethod, Signature, SIGNATURE_LENGTH};

/// Errors that can occur during verification.
///
/// A well-formed signature by the wrong account is not an error; it verifies
/// as `false`.
#[derive(Debug, Error)]
pub enum VerifyError {
	#[error("Malformed signature: {0}")]
	MalformedSignature(String),
	#[error(transparent)]
	Codec(#[from] CodecError),
}

/// `keccak256("\x19Ethereum Signed Message:\n32" || hash)`.
pub fn personal_message_digest(hash: &B256) -> B256 {
	eip191_hash_message(hash)
}

/// Digest actually signed for an order hash under the given scheme.
pub fn signing_digest(hash: &B256, method: SignMethod) -> B256 {
	match method {
		SignMethod::PersonalSign => personal_message_digest(hash),
		SignMethod::Direct => *hash,
	}
}

/// Recovers the account that produced `signature` over `hash`.
///
/// Returns `Ok(None)` when the payload is well formed but no public key can
/// be recovered from it.
pub fn recover_signer(hash: &B256, signature: &Signature) -> Result<Option<AccountId>, VerifyError> {
	let payload = &signature.payload;
	if payload.len() != SIGNATURE_LENGTH {
		return Err(VerifyError::MalformedSignature(format!(
			"Expected {} bytes, got {}",
			SIGNATURE_LENGTH,
			payload.len()
		)));
	}
	let y_parity = match payload[64] {
		0 | 27 => false,
		1 | 28 => true,
		v => {
			return Err(VerifyError::MalformedSignature(format!(
				"Invalid recovery id {}",
				v
			)))
		},
	};
	let r = U256::from_be_slice(&payload[..32]);
	let s = U256::from_be_slice(&payload[32..64]);

	let digest = signing_digest(hash, signature.method);
	match PrimitiveSignature::new(r, s, y_parity).recover_address_from_prehash(&digest) {
		Ok(address) => Ok(Some(AccountId::from(address))),
		Err(e) => {
			tracing::debug!(error = %e, "Signer recovery failed");
			Ok(None)
		},
	}
}

/// Checks a signature over an already computed order hash.
pub fn verify_hash(
	hash: &B256,
	signature: &Signature,
	claimed_signer: &AccountId,
) -> Result<bool, VerifyError> {
	Ok(recover_signer(hash, signature)?.as_ref() == Some(claimed_signer))
}

/// Re-hashes `order` and checks that `signature` was produced by
/// `claimed_signer` under the signature's scheme.
pub fn verify(
	codec: &OrderCodec,
	order: &Order,
	signature: &Signature,
	claimed_signer: &str,
) -> Result<bool, VerifyError> {
	let claimed = AccountId::parse(claimed_signer).map_err(CodecError::from)?;
	let hash = codec.hash_order(order)?;
	verify_hash(&hash, signature, &claimed)
}
