//! Deterministic block digests over a canonical field encoding.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ChainError;

/// Canonical byte encoding of a payload: compact JSON with object keys in
/// lexicographic order. Equal logical values encode to equal bytes, so hash
/// equality is meaningful across reconstructions.
pub fn canonical_payload_bytes(payload: &Value) -> Result<Vec<u8>, ChainError> {
    Ok(serde_json::to_vec(payload)?)
}

/// SHA-256 over the block's identity fields, lowercase hex.
///
/// The preimage is `index || timestamp || payload || previous_hash || proof`
/// with every integer as little-endian u64 and every variable-width field
/// length-prefixed, so distinct field tuples never share a preimage.
pub fn block_digest(
    index: u64,
    timestamp: u64,
    payload: &Value,
    previous_hash: &str,
    proof: u64,
) -> Result<String, ChainError> {
    let payload_bytes = canonical_payload_bytes(payload)?;
    Ok(digest_with_payload_bytes(
        index,
        timestamp,
        &payload_bytes,
        previous_hash,
        proof,
    ))
}

/// Same digest as [`block_digest`], over pre-serialized payload bytes. A
/// proof search serializes the payload once and hashes many candidates.
pub fn digest_with_payload_bytes(
    index: u64,
    timestamp: u64,
    payload_bytes: &[u8],
    previous_hash: &str,
    proof: u64,
) -> String {
    let mut preimage = Vec::with_capacity(40 + payload_bytes.len() + previous_hash.len());
    preimage.extend_from_slice(&index.to_le_bytes());
    preimage.extend_from_slice(&timestamp.to_le_bytes());
    preimage.extend_from_slice(&(payload_bytes.len() as u64).to_le_bytes());
    preimage.extend_from_slice(payload_bytes);
    preimage.extend_from_slice(&(previous_hash.len() as u64).to_le_bytes());
    preimage.extend_from_slice(previous_hash.as_bytes());
    preimage.extend_from_slice(&proof.to_le_bytes());

    hex::encode(Sha256::digest(&preimage))
}
