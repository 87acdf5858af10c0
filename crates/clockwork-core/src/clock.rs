//! Ledger clock: block height plus a hash chain of sealed blocks.
//!
//! Every processed operation seals exactly one block, whether it committed
//! or reverted, so the height only moves forward. The host may also seal
//! empty blocks with [`BlockClock::advance`].

use serde::{Deserialize, Serialize};

use crate::constants::GENESIS_TAG;
use crate::crypto::{block_entropy, block_hash};
use crate::traits::{Clock, EntropySource};
use crate::types::Hash256;

/// Height counter and hash chain for the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockClock {
    /// Height of the block currently being built.
    height: u64,
    /// Hash of the last sealed block (the genesis hash before any seal).
    tip: Hash256,
}

impl Default for BlockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockClock {
    /// Start at height 0 on top of the genesis hash.
    pub fn new() -> Self {
        Self {
            height: 0,
            tip: Hash256(*blake3::hash(GENESIS_TAG).as_bytes()),
        }
    }

    /// Start at an arbitrary height (host bootstrap and tests).
    pub fn at_height(height: u64) -> Self {
        Self { height, ..Self::new() }
    }

    /// Hash of the last sealed block.
    pub fn tip(&self) -> Hash256 {
        self.tip
    }

    /// Seal the current block carrying `digest` and move to the next height.
    ///
    /// Returns the hash of the sealed block.
    pub fn seal(&mut self, digest: &[u8]) -> Hash256 {
        self.tip = block_hash(&self.tip, self.height, digest);
        self.height = self.height.saturating_add(1);
        self.tip
    }

    /// Seal `blocks` empty blocks.
    pub fn advance(&mut self, blocks: u64) {
        for _ in 0..blocks {
            self.seal(&[]);
        }
    }
}

impl Clock for BlockClock {
    fn now(&self) -> u64 {
        self.height
    }
}

impl EntropySource for BlockClock {
    fn entropy(&self) -> Hash256 {
        block_entropy(&self.tip, self.height)
    }
}

/// Fixed entropy, for replaying a recorded draw or pinning one in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedEntropy(pub Hash256);

impl EntropySource for FixedEntropy {
    fn entropy(&self) -> Hash256 {
        self.0
    }
}
