//! In-memory asset registry.
//!
//! Stands in for the external ownership registry: it mints opaque asset ids
//! to an owner and moves custody between identities. It carries no
//! generation or approval logic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::traits::AssetRegistry;
use crate::types::{AssetId, Identity};

/// In-memory custody table.
///
/// Stores everything in a `BTreeMap` so iteration order, and therefore any
/// serialized state, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegistry {
    /// Asset id → current holder.
    owners: BTreeMap<AssetId, Identity>,
    /// Next id handed out by [`mint`](Self::mint). Ids start at 1.
    next_id: u64,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { owners: BTreeMap::new(), next_id: 1 }
    }

    /// Mint a fresh asset to `owner` and return its id.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Exhausted`] if the id space is used up
    pub fn mint(&mut self, owner: Identity) -> Result<AssetId, RegistryError> {
        let id = AssetId(self.next_id.max(1));
        self.next_id = id.0.checked_add(1).ok_or(RegistryError::Exhausted)?;
        self.owners.insert(id, owner);
        Ok(id)
    }

    /// Number of minted assets.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no asset has been minted.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Assets currently held by `who`, in id order.
    pub fn assets_of(&self, who: &Identity) -> Vec<AssetId> {
        self.owners
            .iter()
            .filter(|(_, owner)| *owner == who)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl AssetRegistry for MemoryRegistry {
    fn owner_of(&self, asset: AssetId) -> Result<Identity, RegistryError> {
        self.owners.get(&asset).copied().ok_or(RegistryError::UnknownAsset(asset))
    }

    fn transfer_custody(
        &mut self,
        asset: AssetId,
        from: &Identity,
        to: &Identity,
    ) -> Result<(), RegistryError> {
        let slot = self.owners.get_mut(&asset).ok_or(RegistryError::UnknownAsset(asset))?;
        if slot != from {
            return Err(RegistryError::NotHolder { asset, expected: *from, actual: *slot });
        }
        *slot = *to;
        Ok(())
    }
}
