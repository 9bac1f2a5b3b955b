//! A single power network: member roster, connectivity, and the per-tick
//! distribution pass.

use std::collections::{BTreeSet, HashMap, VecDeque};

use fluxgrid_core::fixed::{watts_to_joules_per_tick, Fixed64};
use fluxgrid_core::id::{NetworkId, NetworkIdAllocator};
use fluxgrid_core::node::PowerNode;
use fluxgrid_core::pos::BlockPos;

use crate::snapshot::{NetworkSnapshot, TickStats};

/// The node store. Owned by the manager; networks borrow it per call.
pub type NodeMap = HashMap<BlockPos, Box<dyn PowerNode>>;

// ---------------------------------------------------------------------------
// Power network
// ---------------------------------------------------------------------------

/// One connected group of power nodes.
///
/// The network holds member *positions*, never the nodes themselves; every
/// operation that needs node state borrows the manager's [`NodeMap`]. The
/// capability index vectors preserve insertion order, which fixes the
/// order storage is charged and discharged in.
#[derive(Debug)]
pub struct PowerNetwork {
    id: NetworkId,
    /// All member positions, sorted.
    members: BTreeSet<BlockPos>,
    /// Capability indexes, in insertion order.
    producers: Vec<BlockPos>,
    consumers: Vec<BlockPos>,
    storages: Vec<BlockPos>,
    conduits: Vec<BlockPos>,
    last_tick_stats: TickStats,
}

impl PowerNetwork {
    /// Create a new empty power network.
    pub fn new(id: NetworkId) -> Self {
        Self {
            id,
            members: BTreeSet::new(),
            producers: Vec::new(),
            consumers: Vec::new(),
            storages: Vec::new(),
            conduits: Vec::new(),
            last_tick_stats: TickStats::default(),
        }
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, pos: BlockPos) -> bool {
        self.members.contains(&pos)
    }

    pub fn members(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.members.iter().copied()
    }

    /// Distribution results from the most recent tick.
    pub fn last_tick_stats(&self) -> TickStats {
        self.last_tick_stats
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add a node to this network and tag it with the network id.
    /// Capability indexes are driven by the node's accessors, so a node
    /// can appear in more than one index.
    pub fn add_member(&mut self, node: &mut dyn PowerNode) {
        let pos = node.position();
        if !self.members.insert(pos) {
            return;
        }
        node.set_network_id(Some(self.id));
        if node.as_producer().is_some() {
            self.producers.push(pos);
        }
        if node.as_consumer().is_some() {
            self.consumers.push(pos);
        }
        if node.as_storage().is_some() {
            self.storages.push(pos);
        }
        if node.as_conduit().is_some() {
            self.conduits.push(pos);
        }
    }

    /// Remove a node from this network and clear its network id.
    pub fn remove_member(&mut self, node: &mut dyn PowerNode) {
        let pos = node.position();
        if !self.members.remove(&pos) {
            return;
        }
        node.set_network_id(None);
        self.producers.retain(|p| *p != pos);
        self.consumers.retain(|p| *p != pos);
        self.storages.retain(|p| *p != pos);
        self.conduits.retain(|p| *p != pos);
    }

    /// Absorb every member of `other` into this network. `other` is left
    /// empty; its id is dead afterwards.
    pub fn merge(&mut self, other: &mut PowerNetwork, nodes: &mut NodeMap) {
        let moved = std::mem::take(&mut other.members);
        other.producers.clear();
        other.consumers.clear();
        other.storages.clear();
        other.conduits.clear();
        for pos in moved {
            if let Some(node) = nodes.get_mut(&pos) {
                self.add_member(node.as_mut());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Connectivity
    // -----------------------------------------------------------------------

    /// Conduit links between members, made symmetric. One recorded end is
    /// enough for the link to count.
    fn extra_links(&self, nodes: &NodeMap) -> HashMap<BlockPos, Vec<BlockPos>> {
        let mut links: HashMap<BlockPos, Vec<BlockPos>> = HashMap::new();
        for pos in &self.conduits {
            let Some(conduit) = nodes.get(pos).and_then(|n| n.as_conduit()) else {
                continue;
            };
            for linked in conduit.connected_positions() {
                if self.members.contains(linked) {
                    links.entry(*pos).or_default().push(*linked);
                    links.entry(*linked).or_default().push(*pos);
                }
            }
        }
        links
    }

    /// Breadth-first walk over `members` from `start`, following face
    /// adjacency and conduit links.
    fn reachable_from(
        start: BlockPos,
        members: &BTreeSet<BlockPos>,
        links: &HashMap<BlockPos, Vec<BlockPos>>,
    ) -> BTreeSet<BlockPos> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(pos) = queue.pop_front() {
            for next in pos.adjacent() {
                if members.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
            if let Some(linked) = links.get(&pos) {
                for next in linked {
                    if seen.insert(*next) {
                        queue.push_back(*next);
                    }
                }
            }
        }
        seen
    }

    /// Whether all members form one connected component. An empty network
    /// is trivially connected.
    pub fn is_connected(&self, nodes: &NodeMap) -> bool {
        let Some(start) = self.members.iter().next().copied() else {
            return true;
        };
        let links = self.extra_links(nodes);
        Self::reachable_from(start, &self.members, &links).len() == self.members.len()
    }

    /// Partition the members into connected components, each under a fresh
    /// network id. Consumes this network's roster; the old id is dead.
    pub fn split_into_components(
        self,
        nodes: &mut NodeMap,
        ids: &mut NetworkIdAllocator,
    ) -> Vec<PowerNetwork> {
        let links = self.extra_links(nodes);
        let mut components: Vec<BTreeSet<BlockPos>> = Vec::new();
        let mut remaining = self.members;
        while let Some(start) = remaining.iter().next().copied() {
            let component = Self::reachable_from(start, &remaining, &links);
            remaining.retain(|p| !component.contains(p));
            components.push(component);
        }

        let mut fragments = Vec::with_capacity(components.len());
        for component in components {
            let mut fragment = PowerNetwork::new(ids.allocate());
            for pos in component {
                if let Some(node) = nodes.get_mut(&pos) {
                    fragment.add_member(node.as_mut());
                }
            }
            fragments.push(fragment);
        }
        fragments
    }

    // -----------------------------------------------------------------------
    // Distribution
    // -----------------------------------------------------------------------

    /// Advance this network by one tick.
    ///
    /// 1. Run every member's `on_power_tick` in roster order.
    /// 2. Survey demand from operable consumers and energy available from
    ///    storage at its discharge rate.
    /// 3. Let every producer produce its per-tick budget.
    /// 4. Satisfaction = min(1, (produced + available) / demand).
    /// 5. Offer each operable consumer its demand scaled by satisfaction.
    /// 6. Settle: bank surplus into storage in index order (the remainder
    ///    is wasted), or cover the shortfall by discharging in index order.
    ///
    /// Every step uses fixed-point arithmetic and a stable order, so the
    /// same inputs always yield the same [`TickStats`].
    pub fn tick(&mut self, nodes: &mut NodeMap) -> TickStats {
        let zero = Fixed64::ZERO;
        let one = Fixed64::ONE;

        // Step 1: member pre-tick, roster order.
        for pos in &self.members {
            if let Some(node) = nodes.get_mut(pos) {
                node.on_power_tick();
            }
        }

        // Step 2: survey.
        let mut demand = zero;
        for pos in &self.consumers {
            if let Some(c) = nodes.get(pos).and_then(|n| n.as_consumer()) {
                if c.can_operate() {
                    demand += watts_to_joules_per_tick(c.consumption_rate());
                }
            }
        }
        let mut available_from_storage = zero;
        for pos in &self.storages {
            if let Some(s) = nodes.get(pos).and_then(|n| n.as_storage()) {
                let rate = watts_to_joules_per_tick(s.max_discharge_rate());
                available_from_storage += s.stored_energy().min(rate);
            }
        }

        // Step 3: produce. Producers run flat out; unused energy is dealt
        // with in the settle step.
        let mut produced = zero;
        for pos in &self.producers {
            if let Some(p) = nodes.get_mut(pos).and_then(|n| n.as_producer_mut()) {
                let budget = watts_to_joules_per_tick(p.current_rate());
                if budget > zero {
                    produced += p.produce(budget);
                }
            }
        }

        // Step 4: satisfaction ratio.
        let satisfaction = if demand > zero {
            one.min((produced + available_from_storage) / demand)
        } else {
            one
        };

        // Step 5: consume, proportionally.
        let mut consumed = zero;
        for pos in &self.consumers {
            let Some(node) = nodes.get_mut(pos) else {
                continue;
            };
            let Some(c) = node.as_consumer_mut() else {
                continue;
            };
            if !c.can_operate() {
                continue;
            }
            let need = watts_to_joules_per_tick(c.consumption_rate());
            let offered = need * satisfaction;
            if offered > zero {
                consumed += c.consume(offered);
            }
        }

        // Step 6: settle against storage.
        let mut charged = zero;
        let mut discharged = zero;
        let mut wasted = zero;
        if produced > consumed {
            let mut to_charge = produced - consumed;
            for pos in &self.storages {
                if to_charge <= zero {
                    break;
                }
                if let Some(s) = nodes.get_mut(pos).and_then(|n| n.as_storage_mut()) {
                    let rate = watts_to_joules_per_tick(s.max_charge_rate());
                    let offered = to_charge.min(rate);
                    if offered > zero {
                        let overflow = s.charge(offered);
                        let accepted = offered - overflow;
                        charged += accepted;
                        to_charge -= accepted;
                    }
                }
            }
            // Whatever storage could not take is gone. No carry-over.
            wasted = to_charge;
        } else if consumed > produced {
            let mut shortfall = consumed - produced;
            for pos in &self.storages {
                if shortfall <= zero {
                    break;
                }
                if let Some(s) = nodes.get_mut(pos).and_then(|n| n.as_storage_mut()) {
                    let rate = watts_to_joules_per_tick(s.max_discharge_rate());
                    let pull = shortfall.min(rate);
                    if pull > zero {
                        let got = s.discharge(pull);
                        discharged += got;
                        shortfall -= got;
                    }
                }
            }
        }

        let stats = TickStats {
            produced,
            consumed,
            charged,
            discharged,
            wasted,
            satisfaction,
        };
        self.last_tick_stats = stats;
        stats
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Summarize current rates and storage levels for observers.
    pub fn snapshot(&self, nodes: &NodeMap) -> NetworkSnapshot {
        let mut total_production_rate = Fixed64::ZERO;
        for pos in &self.producers {
            if let Some(p) = nodes.get(pos).and_then(|n| n.as_producer()) {
                total_production_rate += p.current_rate();
            }
        }
        let mut total_consumption_rate = Fixed64::ZERO;
        for pos in &self.consumers {
            if let Some(c) = nodes.get(pos).and_then(|n| n.as_consumer()) {
                if c.can_operate() {
                    total_consumption_rate += c.consumption_rate();
                }
            }
        }
        let mut total_stored_energy = Fixed64::ZERO;
        let mut total_storage_capacity = Fixed64::ZERO;
        for pos in &self.storages {
            if let Some(s) = nodes.get(pos).and_then(|n| n.as_storage()) {
                total_stored_energy += s.stored_energy();
                total_storage_capacity += s.max_capacity();
            }
        }
        NetworkSnapshot {
            id: self.id,
            member_positions: self.members.iter().copied().collect(),
            producer_count: self.producers.len(),
            consumer_count: self.consumers.len(),
            storage_count: self.storages.len(),
            conduit_count: self.conduits.len(),
            total_production_rate,
            total_consumption_rate,
            total_stored_energy,
            total_storage_capacity,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
