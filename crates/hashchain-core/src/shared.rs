//! Single-writer, atomic-publish wrapper around a chain.

use std::sync::{Arc, RwLock};

use crate::builder::ChainBuilder;
use crate::clock::Clock;
use crate::error::ChainError;
use crate::pow::{ProofParams, ProofVariant};
use crate::{Block, Chain, Payload};

/// Shares one chain between a single writer and any number of readers.
///
/// Appends run under the write lock, so a reader observes either the
/// pre-append or the post-append chain, never a half-constructed block.
#[derive(Clone, Debug)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Clone of the current chain, taken under the read lock.
    pub fn snapshot(&self) -> Chain {
        self.inner.read().expect("chain lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("chain lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current tip, cloned out of the lock.
    pub fn tip(&self) -> Option<Block> {
        self.inner.read().expect("chain lock poisoned").tip().cloned()
    }

    /// Append one block. The proof-of-work search and the push both happen
    /// under the write lock; on failure the chain is untouched.
    pub fn extend<C: Clock>(
        &self,
        builder: &ChainBuilder<C>,
        payload: Payload,
        variant: ProofVariant,
        params: &ProofParams,
    ) -> Result<Block, ChainError> {
        let mut chain = self.inner.write().expect("chain lock poisoned");
        builder.append_many(&mut chain, 1, &[payload], variant, params)?;
        let tip = chain.tip().cloned();
        drop(chain);
        tip.ok_or(ChainError::EmptyChain)
    }
}
