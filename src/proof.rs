//! Proof codec for the hold-invoice and payment-proof flows: generates the
//! preimage/payment-hash commitment and verifies a candidate preimage
//! against a commitment or a full invoice.

use bitcoin::hashes::{sha256, Hash};
use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::{Error, Result};

/// A freshly generated hold-invoice commitment. The preimage stays local
/// until settlement, only the payment hash goes into the invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    /// 32 random bytes, lowercase hex.
    pub preimage: String,
    /// SHA-256 of the preimage bytes, lowercase hex.
    pub payment_hash: String,
}

/// Extraction/validation against a full BOLT-11 invoice string. Implemented
/// by the external invoice decoder, payment-hash parsing is not duplicated
/// here.
pub trait InvoiceValidator {
    fn payment_hash(&self, invoice: &str) -> Result<String>;
    fn validate_preimage(&self, invoice: &str, preimage: &str) -> bool;
}

/// Draws a fresh 32-byte secret from the OS entropy source and commits to
/// it with SHA-256.
pub fn generate_commitment() -> Result<Commitment> {
    let mut secret = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut secret)
        .map_err(|e| Error::External(format!("secure randomness unavailable: {}", e)))?;
    let payment_hash = sha256::Hash::hash(&secret);
    Ok(Commitment {
        preimage: hex::encode(secret),
        payment_hash: payment_hash.to_string(),
    })
}

/// True iff `SHA-256(preimage) == payment_hash`. Malformed hex or a secret
/// of the wrong length verifies as `false`, never an error.
pub fn verify_preimage(payment_hash: &str, preimage: &str) -> bool {
    let secret = match hex::decode(preimage) {
        Ok(s) if s.len() == 32 => s,
        _ => return false,
    };
    let expected = match payment_hash.parse::<sha256::Hash>() {
        Ok(h) => h,
        Err(_) => return false,
    };
    sha256::Hash::hash(&secret) == expected
}

/// Verifies a candidate preimage against either a bare 32-byte commitment
/// hash or a full invoice string, delegating the latter to the decoder.
pub fn verify(validator: &dyn InvoiceValidator, invoice_or_hash: &str, preimage: &str) -> bool {
    let target = invoice_or_hash.trim();
    if target.len() == 64 && target.bytes().all(|b| b.is_ascii_hexdigit()) {
        verify_preimage(target, preimage)
    } else {
        validator.validate_preimage(target, preimage)
    }
}
