//! Common types for the AvaSim environment abstraction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle to an object living in the scene graph.
///
/// Ids are unique within the scene that minted them. `InMemoryScene` mints
/// sequence ids ([`ObjectId::from_seq`]) so headless runs are reproducible;
/// [`ObjectId::new`] gives a random v4 id for handles minted elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Creates a new random ObjectId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic ObjectId from a sequence number (for headless runs).
    pub fn from_seq(seq: u64) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..8].copy_from_slice(&seq.to_le_bytes());
        bytes[8..16].copy_from_slice(&seq.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
        Self(Uuid::from_bytes(bytes))
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 chars for readability
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seq_is_deterministic() {
        assert_eq!(ObjectId::from_seq(7), ObjectId::from_seq(7));
        assert_ne!(ObjectId::from_seq(7), ObjectId::from_seq(8));
    }

    #[test]
    fn test_display_is_short() {
        assert_eq!(ObjectId::new().to_string().len(), 8);
    }
}
