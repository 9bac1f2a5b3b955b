//! Power cable.

use std::collections::BTreeSet;

use fluxgrid_core::id::NetworkId;
use fluxgrid_core::node::{Capability, Conduit, PowerNode};
use fluxgrid_core::pos::BlockPos;
use fluxgrid_core::record::NodeRecord;

/// Carries power between adjacent blocks. Lossless, unlimited throughput.
///
/// The cable records which neighbors it has latched onto; only
/// face-adjacent positions are accepted.
pub struct Cable {
    pos: BlockPos,
    net: Option<NetworkId>,
    connections: BTreeSet<BlockPos>,
}

impl Cable {
    pub fn new(pos: BlockPos) -> Self {
        Self {
            pos,
            net: None,
            connections: BTreeSet::new(),
        }
    }

    /// Latch onto a neighbor. Non-adjacent positions are ignored.
    pub fn connect(&mut self, other: BlockPos) -> bool {
        if self.pos.is_adjacent(&other) {
            self.connections.insert(other)
        } else {
            false
        }
    }

    pub fn disconnect(&mut self, other: BlockPos) -> bool {
        self.connections.remove(&other)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl PowerNode for Cable {
    fn capability(&self) -> Capability {
        Capability::Conduit
    }

    fn position(&self) -> BlockPos {
        self.pos
    }

    fn network_id(&self) -> Option<NetworkId> {
        self.net
    }

    fn set_network_id(&mut self, id: Option<NetworkId>) {
        self.net = id;
    }

    fn display_name(&self) -> &'static str {
        "cable"
    }

    fn as_conduit(&self) -> Option<&dyn Conduit> {
        Some(self)
    }

    fn save(&self) -> NodeRecord {
        let mut record = NodeRecord::new("cable", self.pos);
        record.active = !self.connections.is_empty();
        record
    }

    // Connections are rediscovered on placement, not persisted.
}

impl Conduit for Cable {
    fn connected_positions(&self) -> &BTreeSet<BlockPos> {
        &self.connections
    }
}
