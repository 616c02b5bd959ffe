//! Chain construction: genesis, single extension, batch append.

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::ChainError;
use crate::pow::{ProofParams, ProofVariant};
use crate::{Block, BlockTemplate, Chain, Payload};

/// Creates and extends chains. Carries the clock so construction is the
/// only place a timestamp is captured.
#[derive(Clone, Debug)]
pub struct ChainBuilder<C: Clock = SystemClock> {
    clock: C,
}

impl ChainBuilder<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for ChainBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ChainBuilder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// First block of a chain: index 1, sentinel previous-hash, fixed
    /// proof. There is no predecessor to gate against, so no search runs.
    pub fn genesis(&self, payload: Payload) -> Result<Block, ChainError> {
        let template = BlockTemplate {
            index: GENESIS_INDEX,
            timestamp: self.clock.now(),
            payload: &payload,
            previous_hash: GENESIS_PREVIOUS_HASH,
        };
        let block = template.seal(GENESIS_PROOF)?;
        info!("sealed genesis block with hash {}", block.hash);
        Ok(block)
    }

    /// Produce the successor of `tail`: run the selected proof-of-work
    /// search against the candidate, then seal it.
    pub fn extend(
        &self,
        tail: &Block,
        payload: Payload,
        variant: ProofVariant,
        params: &ProofParams,
    ) -> Result<Block, ChainError> {
        let template = BlockTemplate {
            index: tail.index + 1,
            timestamp: self.clock.now(),
            payload: &payload,
            previous_hash: &tail.hash,
        };
        let proof = variant.search(tail, &template, params)?;
        let block = template.seal(proof)?;
        info!(
            "sealed block {} with proof {} and hash {}",
            block.index, block.proof, block.hash
        );
        Ok(block)
    }

    /// Append `count` blocks, consuming `payloads` in order. New blocks are
    /// staged and only spliced onto the chain once every extension has
    /// succeeded; on any failure the chain is left exactly as it was.
    pub fn append_many(
        &self,
        chain: &mut Chain,
        count: usize,
        payloads: &[Payload],
        variant: ProofVariant,
        params: &ProofParams,
    ) -> Result<(), ChainError> {
        if count > payloads.len() {
            return Err(ChainError::ArityMismatch {
                requested: count,
                supplied: payloads.len(),
            });
        }
        let mut tail = match chain.tip() {
            Some(tip) => tip.clone(),
            None => return Err(ChainError::EmptyChain),
        };

        let mut staged = Vec::with_capacity(count);
        for payload in payloads.iter().take(count) {
            let block = self.extend(&tail, payload.clone(), variant, params)?;
            tail = block.clone();
            staged.push(block);
        }
        chain.splice(staged);
        Ok(())
    }

    /// Build a whole chain: genesis from the first payload, one extension
    /// per remaining payload.
    pub fn build_chain(
        &self,
        payloads: Vec<Payload>,
        variant: ProofVariant,
        params: &ProofParams,
    ) -> Result<Chain, ChainError> {
        let mut payloads = payloads.into_iter();
        let first = payloads.next().ok_or(ChainError::EmptyPayloadList)?;
        let mut chain = Chain::from_genesis(self.genesis(first)?);
        let rest: Vec<Payload> = payloads.collect();
        self.append_many(&mut chain, rest.len(), &rest, variant, params)?;
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use serde_json::json;

    const TS: u64 = 1_600_000_000;

    fn builder() -> ChainBuilder<FixedClock> {
        ChainBuilder::with_clock(FixedClock(TS))
    }

    #[test]
    fn genesis_example() {
        let genesis = builder().genesis(json!("genesis")).unwrap();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.timestamp, TS);
        assert_eq!(genesis.previous_hash, "0");
        assert_eq!(genesis.proof, 1);
        let expected_hex = "095c899a0f4ee0677942fcdd865fa3bc0cfec70add4047900e6237257f2bdc43";
        assert_eq!(genesis.hash, expected_hex);
    }

    #[test]
    fn genesis_sealing_is_idempotent() {
        // Same clock value, same payload: equal inputs give equal hashes.
        let a = builder().genesis(json!("genesis")).unwrap();
        let b = builder().genesis(json!("genesis")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn extend_with_divisibility_threads_proofs() {
        let builder = builder();
        let genesis = builder.genesis(json!("genesis")).unwrap();
        let params = ProofParams::default();

        let second = builder
            .extend(&genesis, json!("alpha"), ProofVariant::Divisibility, &params)
            .unwrap();
        assert_eq!(second.index, 2);
        assert_eq!(second.previous_hash, genesis.hash);
        assert_eq!(second.proof, 99);
        assert_eq!(
            second.hash,
            "c875c3f65d4ae110825de896ab6f41333af8c9a2d3a0ca15d6182d1893fa165c"
        );

        let third = builder
            .extend(&second, json!("beta"), ProofVariant::Divisibility, &params)
            .unwrap();
        assert_eq!(third.proof, 198);
        assert_eq!(
            third.hash,
            "c03a8b594052adf5ab97e1975997474f0ee440c4477a659d9fb7ccea23777654"
        );
    }

    #[test]
    fn extend_with_hash_prefix_certifies_difficulty() {
        let builder = builder();
        let genesis = builder.genesis(json!("genesis")).unwrap();
        let block = builder
            .extend(&genesis, json!("alpha"), ProofVariant::HashPrefix, &ProofParams::default())
            .unwrap();
        // The sealed hash is the digest the search found.
        assert_eq!(block.proof, 34);
        assert!(block.hash.starts_with('0'));
        assert_eq!(block.digest().unwrap(), block.hash);
    }

    #[test]
    fn build_chain_rejects_empty_payloads() {
        let err = builder()
            .build_chain(vec![], ProofVariant::Divisibility, &ProofParams::default())
            .unwrap_err();
        assert!(matches!(err, ChainError::EmptyPayloadList));
    }

    #[test]
    fn append_many_rejects_short_payload_list() {
        let builder = builder();
        let mut chain = builder
            .build_chain(
                vec![json!("genesis")],
                ProofVariant::Divisibility,
                &ProofParams::default(),
            )
            .unwrap();
        let err = builder
            .append_many(
                &mut chain,
                3,
                &[json!("a"), json!("b")],
                ProofVariant::Divisibility,
                &ProofParams::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::ArityMismatch {
                requested: 3,
                supplied: 2
            }
        ));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn append_many_rejects_chain_without_tip() {
        let mut chain = Chain::default();
        let err = builder()
            .append_many(
                &mut chain,
                1,
                &[json!("a")],
                ProofVariant::Divisibility,
                &ProofParams::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ChainError::EmptyChain));
    }

    #[test]
    fn failed_append_leaves_chain_untouched() {
        let builder = builder();
        let mut chain = builder
            .build_chain(
                vec![json!("genesis")],
                ProofVariant::HashPrefix,
                &ProofParams::default(),
            )
            .unwrap();
        let before = chain.clone();

        // The first payload's search succeeds at proof 34; the second needs
        // 66 candidates and exhausts the cap, so nothing may be appended.
        let params = ProofParams {
            max_iterations: Some(40),
            ..ProofParams::default()
        };
        let err = builder
            .append_many(
                &mut chain,
                2,
                &[json!("alpha"), json!("kappa")],
                ProofVariant::HashPrefix,
                &params,
            )
            .unwrap_err();
        assert!(matches!(err, ChainError::ProofNotFound { iterations: 40 }));
        assert_eq!(chain, before);
    }
}
