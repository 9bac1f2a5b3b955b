//! Battery block.

use fluxgrid_core::fixed::Fixed64;
use fluxgrid_core::id::NetworkId;
use fluxgrid_core::node::{Capability, PowerNode, Storage};
use fluxgrid_core::pos::BlockPos;
use fluxgrid_core::record::NodeRecord;

/// Capacity in joules (100 kJ).
pub const MAX_CAPACITY: f64 = 100_000.0;
/// Charge rate in watts (32 J/tick).
pub const MAX_CHARGE_RATE: f64 = 640.0;
/// Discharge rate in watts (32 J/tick).
pub const MAX_DISCHARGE_RATE: f64 = 640.0;

/// Banks surplus network energy and covers deficits, symmetric rates.
pub struct Battery {
    pos: BlockPos,
    net: Option<NetworkId>,
    stored: Fixed64,
}

impl Battery {
    pub fn new(pos: BlockPos) -> Self {
        Self {
            pos,
            net: None,
            stored: Fixed64::ZERO,
        }
    }

    fn capacity() -> Fixed64 {
        Fixed64::from_num(MAX_CAPACITY)
    }

    /// Set the charge level directly, clamped to capacity.
    pub fn set_stored(&mut self, joules: Fixed64) {
        self.stored = joules.max(Fixed64::ZERO).min(Self::capacity());
    }
}

impl PowerNode for Battery {
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
        "battery"
    }

    fn as_storage(&self) -> Option<&dyn Storage> {
        Some(self)
    }

    fn as_storage_mut(&mut self) -> Option<&mut dyn Storage> {
        Some(self)
    }

    fn save(&self) -> NodeRecord {
        let mut record = NodeRecord::new("battery", self.pos);
        record.active = self.stored > Fixed64::ZERO;
        record.set_fixed("stored", self.stored);
        record
    }

    fn load(&mut self, record: &NodeRecord) {
        self.set_stored(record.get_fixed("stored", Fixed64::ZERO));
    }
}

impl Storage for Battery {
    fn stored_energy(&self) -> Fixed64 {
        self.stored
    }

    fn max_capacity(&self) -> Fixed64 {
        Self::capacity()
    }

    fn max_charge_rate(&self) -> Fixed64 {
        Fixed64::from_num(MAX_CHARGE_RATE)
    }

    fn max_discharge_rate(&self) -> Fixed64 {
        Fixed64::from_num(MAX_DISCHARGE_RATE)
    }

    fn charge(&mut self, joules: Fixed64) -> Fixed64 {
        if joules <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        let headroom = Self::capacity() - self.stored;
        let accepted = joules.min(headroom);
        self.stored += accepted;
        joules - accepted
    }

    fn discharge(&mut self, joules: Fixed64) -> Fixed64 {
        if joules <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        let released = joules.min(self.stored);
        self.stored -= released;
        released
    }
}
