use serde::{Deserialize, Serialize};

use crate::error::{ListError, ListResult};

/// Node capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 16;

/// Smallest capacity that still lets a split make progress.
pub const MIN_CAPACITY: usize = 2;

/// Configuration for a merkle list.
///
/// The capacity bounds the number of entries in a leaf and the number of
/// children in an internal node. A tree should always be reopened with the
/// capacity it was built with; a smaller capacity is tolerated by inserts
/// (oversized nodes are split on their next rewrite) but reported by
/// [`MerkleList::verify`](crate::MerkleList::verify).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Maximum items per node.
    pub capacity: usize,
}

impl ListConfig {
    /// A configuration with the given capacity, validated.
    pub fn with_capacity(capacity: usize) -> ListResult<Self> {
        let config = Self { capacity };
        config.validate()?;
        Ok(config)
    }

    /// Reject capacities that cannot hold a split.
    pub fn validate(&self) -> ListResult<()> {
        if self.capacity < MIN_CAPACITY {
            return Err(ListError::InvalidConfig(format!(
                "capacity must be at least {MIN_CAPACITY}, got {}",
                self.capacity
            )));
        }
        Ok(())
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}
