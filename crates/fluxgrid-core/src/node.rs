//! The node capability model.
//!
//! Every grid participant implements [`PowerNode`]. What a node can do is
//! discovered through the `as_*` accessor methods, which downcast to the
//! capability traits [`Producer`], [`Consumer`], [`Storage`], and
//! [`Conduit`]. The engine never matches on concrete machine types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;
use crate::id::NetworkId;
use crate::pos::BlockPos;
use crate::record::NodeRecord;

/// The primary role a node plays on a network. Informational; the engine
/// keys its behavior off the `as_*` accessors, not this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Producer,
    Consumer,
    Storage,
    Conduit,
    None,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Capability::Producer => "producer",
            Capability::Consumer => "consumer",
            Capability::Storage => "storage",
            Capability::Conduit => "conduit",
            Capability::None => "none",
        };
        f.write_str(s)
    }
}

/// A participant in the power grid.
///
/// Nodes are owned by the network manager and addressed by position. The
/// manager sets `network_id` when the node joins or leaves a network; node
/// implementations only store it.
pub trait PowerNode: Send {
    /// The node's primary role, for display and event reporting.
    fn capability(&self) -> Capability;

    /// Where the node sits in the world. Immutable for the node's lifetime.
    fn position(&self) -> BlockPos;

    fn network_id(&self) -> Option<NetworkId>;
    fn set_network_id(&mut self, id: Option<NetworkId>);

    fn display_name(&self) -> &'static str;

    /// Called once per tick for every network member, before any energy
    /// moves. Machines burn fuel, advance work, and update their demand
    /// here.
    fn on_power_tick(&mut self) {}

    /// Whether this node accepts a network link toward `_other`. Both ends
    /// must agree for the link to exist.
    fn can_connect_to(&self, _other: BlockPos) -> bool {
        true
    }

    // --- capability accessors ---

    fn as_producer(&self) -> Option<&dyn Producer> {
        None
    }
    fn as_producer_mut(&mut self) -> Option<&mut dyn Producer> {
        None
    }
    fn as_consumer(&self) -> Option<&dyn Consumer> {
        None
    }
    fn as_consumer_mut(&mut self) -> Option<&mut dyn Consumer> {
        None
    }
    fn as_storage(&self) -> Option<&dyn Storage> {
        None
    }
    fn as_storage_mut(&mut self) -> Option<&mut dyn Storage> {
        None
    }
    fn as_conduit(&self) -> Option<&dyn Conduit> {
        None
    }

    // --- persistence ---

    /// Reduce the node to a flat record. The default captures only the
    /// type tag and position; stateful nodes override.
    fn save(&self) -> NodeRecord {
        NodeRecord::new(self.display_name(), self.position())
    }

    /// Restore node state from a record. The default is a no-op for
    /// stateless nodes.
    fn load(&mut self, _record: &NodeRecord) {}
}

/// A node that injects energy into its network.
pub trait Producer: PowerNode {
    /// Nameplate rate in watts.
    fn max_rate(&self) -> Fixed64;

    /// The rate in watts the node is currently willing to produce at.
    /// Zero when idle (e.g. no fuel).
    fn current_rate(&self) -> Fixed64;

    /// Produce up to `max_joules` this tick, returning the amount actually
    /// produced. Must not exceed `max_joules` or the node's own per-tick
    /// budget.
    fn produce(&mut self, max_joules: Fixed64) -> Fixed64;

    fn is_producing(&self) -> bool {
        self.current_rate() > Fixed64::ZERO
    }

    /// Remaining fuel as a fraction in [0, 1]. Fuel-less producers report 1.
    fn fuel_level(&self) -> Fixed64 {
        Fixed64::ONE
    }
}

/// A node that draws energy from its network.
pub trait Consumer: PowerNode {
    /// Demand in watts while operating. Zero when the node has nothing
    /// to do.
    fn consumption_rate(&self) -> Fixed64;

    /// Whether the node would make progress if powered this tick.
    /// Read-only; must not mutate observable state.
    fn can_operate(&self) -> bool;

    /// Accept up to `available` joules this tick, returning the amount
    /// actually consumed.
    fn consume(&mut self, available: Fixed64) -> Fixed64;

    /// Energy banked toward the current operation, if the node buffers.
    fn energy_buffer(&self) -> Fixed64 {
        Fixed64::ZERO
    }

    fn max_energy_buffer(&self) -> Fixed64 {
        Fixed64::ZERO
    }
}

/// A node that banks surplus energy and covers deficits.
pub trait Storage: PowerNode {
    fn stored_energy(&self) -> Fixed64;
    fn max_capacity(&self) -> Fixed64;

    /// Maximum charge rate in watts.
    fn max_charge_rate(&self) -> Fixed64;

    /// Maximum discharge rate in watts.
    fn max_discharge_rate(&self) -> Fixed64;

    /// Accept `joules`, returning the overflow that did not fit. The
    /// caller is expected to respect `max_charge_rate`; capacity is
    /// enforced here.
    fn charge(&mut self, joules: Fixed64) -> Fixed64;

    /// Release up to `joules`, returning the amount actually released.
    fn discharge(&mut self, joules: Fixed64) -> Fixed64;

    fn charge_fraction(&self) -> Fixed64 {
        let cap = self.max_capacity();
        if cap > Fixed64::ZERO {
            self.stored_energy() / cap
        } else {
            Fixed64::ZERO
        }
    }

    fn is_full(&self) -> bool {
        self.stored_energy() >= self.max_capacity()
    }

    fn is_empty(&self) -> bool {
        self.stored_energy() <= Fixed64::ZERO
    }
}

/// A node that carries energy and may bridge non-adjacent positions.
pub trait Conduit: PowerNode {
    /// Throughput cap in watts. Unlimited by default.
    fn max_throughput(&self) -> Fixed64 {
        Fixed64::MAX
    }

    /// Positions this conduit is explicitly linked to, beyond face
    /// adjacency. Connectivity walks honor these links in both the
    /// forward and reverse direction.
    fn connected_positions(&self) -> &BTreeSet<BlockPos>;

    /// Whether the conduit links toward `pos`.
    fn can_connect_to_pos(&self, pos: BlockPos) -> bool {
        self.position().is_adjacent(&pos) || self.connected_positions().contains(&pos)
    }
}
