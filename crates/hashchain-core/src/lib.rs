//! Local, single-writer hash-linked ledger.
//!
//! A chain is an append-only sequence of immutable blocks, each sealed by a
//! SHA-256 digest over its canonical field encoding and bound to its
//! predecessor through that digest. Extending the chain is gated by one of
//! two pluggable proof-of-work searches; validation re-derives exactly what
//! construction produced.

pub mod builder;
pub mod clock;
pub mod constants;
pub mod error;
pub mod hash;
pub mod pow;
pub mod shared;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use builder::ChainBuilder;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ChainError;
pub use hash::block_digest;
pub use pow::{ProofParams, ProofVariant};
pub use shared::SharedChain;
pub use validate::{validate, Fault, ValidationReport};

/// Opaque block payload. The core never looks inside it; it only requires
/// canonical serialization for hashing.
pub type Payload = serde_json::Value;

/// One record in the chain. Sealed exactly once by [`ChainBuilder`] and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain; genesis is 1.
    pub index: u64,
    /// Seconds since the Unix epoch, captured at construction.
    pub timestamp: u64,
    pub payload: Payload,
    /// Hex digest of the predecessor, or `"0"` for genesis.
    pub previous_hash: String,
    /// Output of a proof-of-work search; genesis uses the constant 1.
    pub proof: u64,
    /// Lowercase hex SHA-256 over the identity fields, proof included.
    pub hash: String,
}

impl Block {
    /// Recompute the digest over the identity fields (everything except
    /// the stored hash itself).
    pub fn digest(&self) -> Result<String, ChainError> {
        hash::block_digest(
            self.index,
            self.timestamp,
            &self.payload,
            &self.previous_hash,
            self.proof,
        )
    }
}

/// Unsealed candidate block. A proof-of-work search varies only the proof
/// per attempt; sealing with the winning proof yields a [`Block`].
#[derive(Clone, Copy, Debug)]
pub struct BlockTemplate<'a> {
    pub index: u64,
    pub timestamp: u64,
    pub payload: &'a Payload,
    pub previous_hash: &'a str,
}

impl BlockTemplate<'_> {
    /// Digest of this candidate under the given proof.
    pub fn digest_with(&self, proof: u64) -> Result<String, ChainError> {
        hash::block_digest(
            self.index,
            self.timestamp,
            self.payload,
            self.previous_hash,
            proof,
        )
    }

    /// Seal the candidate into an immutable block.
    pub fn seal(&self, proof: u64) -> Result<Block, ChainError> {
        let hash = self.digest_with(proof)?;
        Ok(Block {
            index: self.index,
            timestamp: self.timestamp,
            payload: self.payload.clone(),
            previous_hash: self.previous_hash.to_string(),
            proof,
            hash,
        })
    }
}

/// Append-only sequence of blocks rooted at the genesis block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    pub(crate) fn from_genesis(genesis: Block) -> Self {
        Self {
            blocks: vec![genesis],
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable view of the blocks. Cannot grow or shrink the chain; meant
    /// for tamper-style tests and recovery tooling, not regular use.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The newest block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub(crate) fn splice(&mut self, staged: Vec<Block>) {
        self.blocks.extend(staged);
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
