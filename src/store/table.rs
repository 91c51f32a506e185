//! Table implementation
//!
//! Arena of partitions indexed by routing key.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::key::RoutingKey;
use super::Partition;

/// All partitions of one table
///
/// Partitions are created on first write and never torn down here; an
/// emptied partition stays valid.
pub struct Table {
    partitions: RwLock<HashMap<RoutingKey, Arc<Partition>>>,
}

impl Table {
    /// Create a new table with no partitions
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
        }
    }

    /// Look up an existing partition
    pub fn partition(&self, routing_key: &RoutingKey) -> Option<Arc<Partition>> {
        self.partitions.read().get(routing_key).cloned()
    }

    /// Look up a partition, creating it if this is the first write
    pub fn partition_or_create(&self, routing_key: &RoutingKey) -> Arc<Partition> {
        if let Some(partition) = self.partition(routing_key) {
            return partition;
        }

        let mut partitions = self.partitions.write();
        Arc::clone(partitions.entry(routing_key.clone()).or_insert_with(|| {
            tracing::debug!("Creating partition for {:?}", routing_key);
            Arc::new(Partition::new())
        }))
    }

    /// Number of partitions created so far
    pub fn partition_count(&self) -> usize {
        self.partitions.read().len()
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
