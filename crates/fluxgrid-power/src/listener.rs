//! Observer hooks for topology and distribution events.

use fluxgrid_core::id::NetworkId;
use fluxgrid_core::node::Capability;
use fluxgrid_core::pos::BlockPos;

use crate::snapshot::{NetworkSnapshot, TickStats};

/// Handle returned by `add_listener`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Receives notifications from the network manager.
///
/// All hooks default to no-ops so implementors subscribe only to what
/// they care about. Callbacks run synchronously on the manager's thread,
/// while its lock is held: return quickly and never call back into the
/// manager.
pub trait NetworkListener: Send {
    /// A brand-new network was formed for an isolated node.
    fn on_network_created(&mut self, _network: &NetworkSnapshot) {}

    /// `source` was absorbed into `target`. The source id is dead after
    /// this call.
    fn on_network_merged(&mut self, _source: NetworkId, _target: NetworkId) {}

    /// `original` broke into `fragments`. The original id is dead; every
    /// fragment id is fresh.
    fn on_network_split(&mut self, _original: NetworkId, _fragments: &[NetworkId]) {}

    fn on_node_added(&mut self, _pos: BlockPos, _capability: Capability, _network: NetworkId) {}

    fn on_node_removed(&mut self, _pos: BlockPos, _capability: Capability, _network: NetworkId) {}

    /// Distribution finished for one network this tick.
    fn on_network_tick(&mut self, _network: NetworkId, _stats: &TickStats) {}
}
