//! The two proof-of-work searches and their dispatch tag.
//!
//! Both searches are pure functions of their inputs: the divisibility scan
//! gates on the previous block's proof, the hash-prefix scan gates on the
//! candidate block itself. Neither is a security mechanism; the cost is a
//! deliberate throttle on chain growth.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_MODULUS};
use crate::error::ChainError;
use crate::hash::{canonical_payload_bytes, digest_with_payload_bytes};
use crate::{Block, BlockTemplate};

/// Closed set of proof-of-work algorithms, selected by tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProofVariant {
    Divisibility,
    HashPrefix,
}

impl ProofVariant {
    /// Run the selected search for the successor of `tail`.
    pub fn search(
        self,
        tail: &Block,
        template: &BlockTemplate<'_>,
        params: &ProofParams,
    ) -> Result<u64, ChainError> {
        match self {
            ProofVariant::Divisibility => {
                divisibility_proof(tail.proof, params.modulus, params.max_iterations)
            }
            ProofVariant::HashPrefix => {
                hash_prefix_proof(template, params.difficulty, params.max_iterations)
            }
        }
    }
}

impl fmt::Display for ProofVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofVariant::Divisibility => f.write_str("divisibility"),
            ProofVariant::HashPrefix => f.write_str("hash-prefix"),
        }
    }
}

impl FromStr for ProofVariant {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "divisibility" => Ok(ProofVariant::Divisibility),
            "hash-prefix" | "hash_prefix" => Ok(ProofVariant::HashPrefix),
            other => Err(ChainError::UnknownProofVariant(other.to_string())),
        }
    }
}

/// Search knobs. `modulus` applies to the divisibility scan, `difficulty`
/// to the hash-prefix scan; `max_iterations` caps either one.
#[derive(Clone, Copy, Debug)]
pub struct ProofParams {
    pub modulus: u64,
    pub difficulty: usize,
    pub max_iterations: Option<u64>,
}

impl Default for ProofParams {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_MODULUS,
            difficulty: DEFAULT_DIFFICULTY,
            max_iterations: None,
        }
    }
}

/// Smallest `p > last_proof` divisible by both `modulus` and `last_proof`,
/// found by scanning upward from `last_proof + 1`.
///
/// A common multiple of the two always exists, so an uncapped scan always
/// terminates. `last_proof` and `modulus` must be positive; the scan
/// divides by both.
pub fn divisibility_proof(
    last_proof: u64,
    modulus: u64,
    max_iterations: Option<u64>,
) -> Result<u64, ChainError> {
    if last_proof == 0 || modulus == 0 {
        return Err(ChainError::InvalidProofParameters { last_proof, modulus });
    }

    let cap = max_iterations.unwrap_or(u64::MAX);
    let mut iterations = 0u64;
    let mut candidate = last_proof + 1;
    loop {
        if iterations >= cap {
            return Err(ChainError::ProofNotFound { iterations });
        }
        if candidate % modulus == 0 && candidate % last_proof == 0 {
            debug!(
                "divisibility proof {} found after {} candidates",
                candidate,
                iterations + 1
            );
            return Ok(candidate);
        }
        iterations += 1;
        candidate += 1;
    }
}

/// Smallest `p >= 0` whose candidate digest begins with `difficulty` zero
/// hex characters, found by scanning upward from 0.
///
/// Expected work is exponential in `difficulty`; callers that cannot
/// tolerate an open-ended search should set `max_iterations`.
pub fn hash_prefix_proof(
    template: &BlockTemplate<'_>,
    difficulty: usize,
    max_iterations: Option<u64>,
) -> Result<u64, ChainError> {
    let payload_bytes = canonical_payload_bytes(template.payload)?;
    let prefix = "0".repeat(difficulty);
    let cap = max_iterations.unwrap_or(u64::MAX);

    let mut proof = 0u64;
    loop {
        if proof >= cap {
            return Err(ChainError::ProofNotFound { iterations: proof });
        }
        let digest = digest_with_payload_bytes(
            template.index,
            template.timestamp,
            &payload_bytes,
            template.previous_hash,
            proof,
        );
        if digest.starts_with(&prefix) {
            debug!(
                "hash-prefix proof {} found for difficulty {}",
                proof, difficulty
            );
            return Ok(proof);
        }
        proof += 1;
    }
}

/// Parallel [`hash_prefix_proof`]: shards the candidate range across rayon
/// workers. `find_first` preserves candidate order, so the result is
/// exactly the proof the sequential scan returns.
pub fn hash_prefix_proof_parallel(
    template: &BlockTemplate<'_>,
    difficulty: usize,
    max_iterations: Option<u64>,
) -> Result<u64, ChainError> {
    let payload_bytes = canonical_payload_bytes(template.payload)?;
    let prefix = "0".repeat(difficulty);
    let cap = max_iterations.unwrap_or(u64::MAX);

    (0..cap)
        .into_par_iter()
        .find_first(|proof| {
            digest_with_payload_bytes(
                template.index,
                template.timestamp,
                &payload_bytes,
                template.previous_hash,
                *proof,
            )
            .starts_with(&prefix)
        })
        .ok_or(ChainError::ProofNotFound { iterations: cap })
}
