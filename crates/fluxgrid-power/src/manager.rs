//! Owns every node and every network, and keeps the partition correct
//! as nodes come and go.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};

use fluxgrid_core::fixed::Fixed64;
use fluxgrid_core::id::{NetworkId, NetworkIdAllocator};
use fluxgrid_core::node::PowerNode;
use fluxgrid_core::pos::BlockPos;
use fluxgrid_core::record::NodeRecord;

use crate::listener::{ListenerId, NetworkListener};
use crate::network::{NodeMap, PowerNetwork};
use crate::snapshot::{NetworkSnapshot, TickStats};

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// The single owner of the power world.
///
/// Holds all nodes keyed by position and all networks keyed by id, and
/// maintains two invariants across every operation:
///
/// - each registered node belongs to exactly one network, and its stored
///   network id matches;
/// - every network's members form one connected component.
///
/// Placement merges, removal splits, and `tick_all` distributes. Networks
/// are kept in a `BTreeMap` so ticks process them in ascending id order.
pub struct PowerNetworkManager {
    nodes: NodeMap,
    networks: BTreeMap<NetworkId, PowerNetwork>,
    ids: NetworkIdAllocator,
    listeners: Vec<(ListenerId, Box<dyn NetworkListener>)>,
    next_listener_id: u64,
}

impl Default for PowerNetworkManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerNetworkManager {
    pub fn new() -> Self {
        Self {
            nodes: NodeMap::new(),
            networks: BTreeMap::new(),
            ids: NetworkIdAllocator::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    fn emit<F: FnMut(&mut dyn NetworkListener)>(&mut self, mut f: F) {
        for (_, listener) in &mut self.listeners {
            f(listener.as_mut());
        }
    }

    // -----------------------------------------------------------------------
    // Placement and removal
    // -----------------------------------------------------------------------

    /// Place a node into the world.
    ///
    /// The six face neighbors decide which networks the node touches:
    /// none makes a fresh network, one joins it, several merge into the
    /// one with the smallest (oldest) id, in ascending id order.
    ///
    /// Fails if the position is already occupied, handing the node back.
    pub fn register(&mut self, node: Box<dyn PowerNode>) -> Result<(), Box<dyn PowerNode>> {
        let pos = node.position();
        if self.nodes.contains_key(&pos) {
            return Err(node);
        }
        let capability = node.capability();
        self.nodes.insert(pos, node);

        let neighbor_ids: BTreeSet<NetworkId> = pos
            .adjacent()
            .iter()
            .filter_map(|p| self.nodes.get(p).and_then(|n| n.network_id()))
            .collect();

        let target_id = match neighbor_ids.iter().next().copied() {
            None => {
                // Isolated: fresh single-node network.
                let id = self.ids.allocate();
                let mut network = PowerNetwork::new(id);
                if let Some(node) = self.nodes.get_mut(&pos) {
                    network.add_member(node.as_mut());
                }
                let snapshot = network.snapshot(&self.nodes);
                self.networks.insert(id, network);
                self.emit(|l| l.on_network_created(&snapshot));
                id
            }
            Some(target_id) => {
                if let Some(network) = self.networks.get_mut(&target_id) {
                    if let Some(node) = self.nodes.get_mut(&pos) {
                        network.add_member(node.as_mut());
                    }
                }
                // Absorb the remaining touched networks, oldest first.
                for source_id in neighbor_ids.iter().skip(1).copied() {
                    if let Some(mut source) = self.networks.remove(&source_id) {
                        if let Some(target) = self.networks.get_mut(&target_id) {
                            target.merge(&mut source, &mut self.nodes);
                        }
                        self.emit(|l| l.on_network_merged(source_id, target_id));
                    }
                }
                target_id
            }
        };

        self.emit(|l| l.on_node_added(pos, capability, target_id));
        Ok(())
    }

    /// Remove the node at `pos`, handing it back to the caller.
    ///
    /// If the node was the last member its network is discarded; if its
    /// removal disconnected the network, the remainder is split into
    /// fresh-id fragments and a single split event fires.
    pub fn unregister(&mut self, pos: BlockPos) -> Option<Box<dyn PowerNode>> {
        let mut node = self.nodes.remove(&pos)?;
        let Some(net_id) = node.network_id() else {
            return Some(node);
        };
        let capability = node.capability();
        if let Some(network) = self.networks.get_mut(&net_id) {
            network.remove_member(node.as_mut());
        }
        self.emit(|l| l.on_node_removed(pos, capability, net_id));

        let needs = self
            .networks
            .get(&net_id)
            .map(|n| (n.is_empty(), n.is_connected(&self.nodes)));
        match needs {
            Some((true, _)) => {
                self.networks.remove(&net_id);
            }
            Some((false, false)) => {
                if let Some(network) = self.networks.remove(&net_id) {
                    let fragments = network.split_into_components(&mut self.nodes, &mut self.ids);
                    let fragment_ids: Vec<NetworkId> =
                        fragments.iter().map(|f| f.id()).collect();
                    for fragment in fragments {
                        self.networks.insert(fragment.id(), fragment);
                    }
                    self.emit(|l| l.on_network_split(net_id, &fragment_ids));
                }
            }
            _ => {}
        }
        Some(node)
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Run one distribution tick over every network, ascending id order.
    ///
    /// A panic inside one network's tick is caught and logged; the other
    /// networks still run.
    pub fn tick_all(&mut self) {
        let ids: Vec<NetworkId> = self.networks.keys().copied().collect();
        for id in ids {
            let Some(network) = self.networks.get_mut(&id) else {
                continue;
            };
            let nodes = &mut self.nodes;
            match catch_unwind(AssertUnwindSafe(|| network.tick(nodes))) {
                Ok(stats) => {
                    self.emit(|l| l.on_network_tick(id, &stats));
                }
                Err(_) => {
                    log::error!("power network {id} panicked during tick, skipping");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn network(&self, id: NetworkId) -> Option<&PowerNetwork> {
        self.networks.get(&id)
    }

    /// The network id of the node at `pos`, if any.
    pub fn network_at(&self, pos: BlockPos) -> Option<NetworkId> {
        self.nodes.get(&pos).and_then(|n| n.network_id())
    }

    pub fn all_networks(&self) -> impl Iterator<Item = &PowerNetwork> {
        self.networks.values()
    }

    pub fn node_at(&self, pos: BlockPos) -> Option<&dyn PowerNode> {
        self.nodes.get(&pos).map(|n| n.as_ref())
    }

    pub fn node_at_mut(&mut self, pos: BlockPos) -> Option<&mut dyn PowerNode> {
        self.nodes.get_mut(&pos).map(|n| n.as_mut() as &mut dyn PowerNode)
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn network_snapshot(&self, id: NetworkId) -> Option<NetworkSnapshot> {
        self.networks.get(&id).map(|n| n.snapshot(&self.nodes))
    }

    /// Distribution results from the network's most recent tick.
    pub fn network_stats(&self, id: NetworkId) -> Option<TickStats> {
        self.networks.get(&id).map(|n| n.last_tick_stats())
    }

    /// Current production rate of a network in watts. Zero for unknown ids.
    pub fn network_production(&self, id: NetworkId) -> Fixed64 {
        self.network_snapshot(id)
            .map(|s| s.total_production_rate)
            .unwrap_or(Fixed64::ZERO)
    }

    /// Current operable demand of a network in watts. Zero for unknown ids.
    pub fn network_consumption(&self, id: NetworkId) -> Fixed64 {
        self.network_snapshot(id)
            .map(|s| s.total_consumption_rate)
            .unwrap_or(Fixed64::ZERO)
    }

    /// Total joules banked across a network's storage. Zero for unknown ids.
    pub fn network_storage(&self, id: NetworkId) -> Fixed64 {
        self.network_snapshot(id)
            .map(|s| s.total_stored_energy)
            .unwrap_or(Fixed64::ZERO)
    }

    /// Total storage capacity of a network in joules. Zero for unknown ids.
    pub fn network_capacity(&self, id: NetworkId) -> Fixed64 {
        self.network_snapshot(id)
            .map(|s| s.total_storage_capacity)
            .unwrap_or(Fixed64::ZERO)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save every node, in position order. Network membership is not
    /// recorded; re-registering the nodes rebuilds it.
    pub fn save_all(&self) -> Vec<NodeRecord> {
        let mut positions: Vec<BlockPos> = self.nodes.keys().copied().collect();
        positions.sort();
        positions
            .into_iter()
            .filter_map(|p| self.nodes.get(&p).map(|n| n.save()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    pub fn add_listener(&mut self, listener: Box<dyn NetworkListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }
}

// ===========================================================================
// Tests
// ===========================================================================
