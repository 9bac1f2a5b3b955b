//! Canned node implementations and a recording listener for tests.
//!
//! Gated behind the `test-utils` feature so downstream crates can drive
//! the engine without pulling in real machines.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use fluxgrid_core::fixed::Fixed64;
use fluxgrid_core::id::NetworkId;
use fluxgrid_core::node::{Capability, Conduit, Consumer, PowerNode, Producer, Storage};
use fluxgrid_core::pos::BlockPos;

use crate::listener::NetworkListener;
use crate::snapshot::{NetworkSnapshot, TickStats};

// ---------------------------------------------------------------------------
// Fixed-rate producer
// ---------------------------------------------------------------------------

/// Produces at a constant rate, no fuel, never idles.
pub struct FixedProducer {
    pos: BlockPos,
    net: Option<NetworkId>,
    rate: Fixed64,
    pub total_produced: Fixed64,
}

impl FixedProducer {
    pub fn new(pos: BlockPos, rate_watts: Fixed64) -> Self {
        Self {
            pos,
            net: None,
            rate: rate_watts,
            total_produced: Fixed64::ZERO,
        }
    }
}

impl PowerNode for FixedProducer {
    fn capability(&self) -> Capability {
        Capability::Producer
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
        "fixed_producer"
    }
    fn as_producer(&self) -> Option<&dyn Producer> {
        Some(self)
    }
    fn as_producer_mut(&mut self) -> Option<&mut dyn Producer> {
        Some(self)
    }
}

impl Producer for FixedProducer {
    fn max_rate(&self) -> Fixed64 {
        self.rate
    }
    fn current_rate(&self) -> Fixed64 {
        self.rate
    }
    fn produce(&mut self, max_joules: Fixed64) -> Fixed64 {
        self.total_produced += max_joules;
        max_joules
    }
}

// ---------------------------------------------------------------------------
// Fixed-rate consumer
// ---------------------------------------------------------------------------

/// Demands at a constant rate and accepts whatever it is offered.
pub struct FixedConsumer {
    pos: BlockPos,
    net: Option<NetworkId>,
    rate: Fixed64,
    operable: bool,
    pub total_consumed: Fixed64,
}

impl FixedConsumer {
    pub fn new(pos: BlockPos, rate_watts: Fixed64) -> Self {
        Self {
            pos,
            net: None,
            rate: rate_watts,
            operable: true,
            total_consumed: Fixed64::ZERO,
        }
    }

    pub fn set_operable(&mut self, operable: bool) {
        self.operable = operable;
    }
}

impl PowerNode for FixedConsumer {
    fn capability(&self) -> Capability {
        Capability::Consumer
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
        "fixed_consumer"
    }
    fn as_consumer(&self) -> Option<&dyn Consumer> {
        Some(self)
    }
    fn as_consumer_mut(&mut self) -> Option<&mut dyn Consumer> {
        Some(self)
    }
}

impl Consumer for FixedConsumer {
    fn consumption_rate(&self) -> Fixed64 {
        self.rate
    }
    fn can_operate(&self) -> bool {
        self.operable
    }
    fn consume(&mut self, available: Fixed64) -> Fixed64 {
        self.total_consumed += available;
        available
    }
}

// ---------------------------------------------------------------------------
// Fixed storage
// ---------------------------------------------------------------------------

/// Symmetric-rate storage with a settable charge level.
pub struct FixedStorage {
    pos: BlockPos,
    net: Option<NetworkId>,
    capacity: Fixed64,
    rate: Fixed64,
    stored: Fixed64,
}

impl FixedStorage {
    pub fn new(pos: BlockPos, capacity_joules: Fixed64, rate_watts: Fixed64) -> Self {
        Self {
            pos,
            net: None,
            capacity: capacity_joules,
            rate: rate_watts,
            stored: Fixed64::ZERO,
        }
    }

    pub fn set_stored(&mut self, joules: Fixed64) {
        self.stored = joules.min(self.capacity);
    }
}

impl PowerNode for FixedStorage {
    fn capability(&self) -> Capability {
        Capability::Storage
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
        "fixed_storage"
    }
    fn as_storage(&self) -> Option<&dyn Storage> {
        Some(self)
    }
    fn as_storage_mut(&mut self) -> Option<&mut dyn Storage> {
        Some(self)
    }
}

impl Storage for FixedStorage {
    fn stored_energy(&self) -> Fixed64 {
        self.stored
    }
    fn max_capacity(&self) -> Fixed64 {
        self.capacity
    }
    fn max_charge_rate(&self) -> Fixed64 {
        self.rate
    }
    fn max_discharge_rate(&self) -> Fixed64 {
        self.rate
    }
    fn charge(&mut self, joules: Fixed64) -> Fixed64 {
        let headroom = self.capacity - self.stored;
        let accepted = joules.min(headroom);
        self.stored += accepted;
        joules - accepted
    }
    fn discharge(&mut self, joules: Fixed64) -> Fixed64 {
        let released = joules.min(self.stored);
        self.stored -= released;
        released
    }
}

// ---------------------------------------------------------------------------
// Link conduit
// ---------------------------------------------------------------------------

/// Conduit with explicit links to arbitrary positions.
pub struct LinkConduit {
    pos: BlockPos,
    net: Option<NetworkId>,
    links: BTreeSet<BlockPos>,
}

impl LinkConduit {
    pub fn new(pos: BlockPos) -> Self {
        Self {
            pos,
            net: None,
            links: BTreeSet::new(),
        }
    }

    pub fn connect(&mut self, other: BlockPos) {
        self.links.insert(other);
    }
}

impl PowerNode for LinkConduit {
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
        "link_conduit"
    }
    fn as_conduit(&self) -> Option<&dyn Conduit> {
        Some(self)
    }
}

impl Conduit for LinkConduit {
    fn connected_positions(&self) -> &BTreeSet<BlockPos> {
        &self.links
    }
}

// ---------------------------------------------------------------------------
// Recording listener
// ---------------------------------------------------------------------------

/// Everything a [`RecordingListener`] can observe, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Created(NetworkId),
    Merged { source: NetworkId, target: NetworkId },
    Split { original: NetworkId, fragments: Vec<NetworkId> },
    NodeAdded(BlockPos, NetworkId),
    NodeRemoved(BlockPos, NetworkId),
    Tick(NetworkId, TickStats),
}

/// Listener that appends every event to a shared log.
pub struct RecordingListener {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingListener {
    pub fn new() -> (Self, Arc<Mutex<Vec<RecordedEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
            },
            events,
        )
    }

    fn push(&self, event: RecordedEvent) {
        if let Ok(mut log) = self.events.lock() {
            log.push(event);
        }
    }
}

impl NetworkListener for RecordingListener {
    fn on_network_created(&mut self, network: &NetworkSnapshot) {
        self.push(RecordedEvent::Created(network.id));
    }
    fn on_network_merged(&mut self, source: NetworkId, target: NetworkId) {
        self.push(RecordedEvent::Merged { source, target });
    }
    fn on_network_split(&mut self, original: NetworkId, fragments: &[NetworkId]) {
        self.push(RecordedEvent::Split {
            original,
            fragments: fragments.to_vec(),
        });
    }
    fn on_node_added(&mut self, pos: BlockPos, _capability: Capability, network: NetworkId) {
        self.push(RecordedEvent::NodeAdded(pos, network));
    }
    fn on_node_removed(&mut self, pos: BlockPos, _capability: Capability, network: NetworkId) {
        self.push(RecordedEvent::NodeRemoved(pos, network));
    }
    fn on_network_tick(&mut self, network: NetworkId, stats: &TickStats) {
        self.push(RecordedEvent::Tick(network, *stats));
    }
}
