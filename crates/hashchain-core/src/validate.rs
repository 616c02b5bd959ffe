//! Chain integrity checks: recompute every digest, verify the link
//! structure, report every violation found.

use thiserror::Error;

use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::ChainError;
use crate::Chain;

/// A single integrity violation, located by block index or pair boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block at position {position} has index {index}, expected {expected}")]
    SequenceMismatch {
        position: usize,
        index: u64,
        expected: u64,
    },

    #[error("genesis previous-hash is {previous_hash:?}, expected the sentinel")]
    GenesisLink { previous_hash: String },

    #[error("stored hash of block {index} does not match its recomputed digest")]
    HashMismatch { index: u64 },

    #[error("previous-hash of block {right} does not match the hash of block {left}")]
    LinkMismatch { left: u64, right: u64 },
}

/// Outcome of a validation walk: valid, or every fault found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    faults: Vec<Fault>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    pub fn first_fault(&self) -> Option<&Fault> {
        self.faults.first()
    }
}

/// Walk the whole chain and collect every invariant violation.
///
/// Every block and every adjacent pair is checked; a fault in one place
/// never hides a fault in another. The `Err` arm is reserved for a payload
/// that no longer serializes while its digest is recomputed; structural
/// problems are reported as faults, never as errors.
pub fn validate(chain: &Chain) -> Result<ValidationReport, ChainError> {
    let blocks = chain.blocks();
    let mut faults = Vec::new();

    if blocks.is_empty() {
        faults.push(Fault::EmptyChain);
        return Ok(ValidationReport { faults });
    }

    for (position, block) in blocks.iter().enumerate() {
        let expected = position as u64 + 1;
        if block.index != expected {
            faults.push(Fault::SequenceMismatch {
                position,
                index: block.index,
                expected,
            });
        }
    }

    if blocks[0].previous_hash != GENESIS_PREVIOUS_HASH {
        faults.push(Fault::GenesisLink {
            previous_hash: blocks[0].previous_hash.clone(),
        });
    }

    for block in blocks {
        if block.digest()? != block.hash {
            faults.push(Fault::HashMismatch { index: block.index });
        }
    }

    for pair in blocks.windows(2) {
        if pair[1].previous_hash != pair[0].hash {
            faults.push(Fault::LinkMismatch {
                left: pair[0].index,
                right: pair[1].index,
            });
        }
    }

    Ok(ValidationReport { faults })
}
