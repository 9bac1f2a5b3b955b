//! Solid fuel generator.

use std::sync::Arc;

use fluxgrid_core::fixed::{watts_to_joules_per_tick, Fixed64};
use fluxgrid_core::id::NetworkId;
use fluxgrid_core::node::{Capability, PowerNode, Producer};
use fluxgrid_core::pos::BlockPos;
use fluxgrid_core::record::NodeRecord;

use crate::fuel::FuelTable;
use crate::item::ItemStack;

/// Power output in watts (20 J/tick).
pub const POWER_OUTPUT: f64 = 400.0;
/// Internal buffer in joules.
pub const INTERNAL_BUFFER: f64 = 1_000.0;

/// Burns solid fuel into an internal buffer and feeds the buffer to the
/// network.
///
/// Each tick the burner moves at most one tick's worth of output from the
/// current fuel item into the buffer; a new item is lit only when the
/// current one is spent and the buffer has room. `produce` then drains
/// the buffer on the network's behalf.
pub struct Generator {
    pos: BlockPos,
    net: Option<NetworkId>,
    fuel_table: Arc<FuelTable>,
    fuel_slot: ItemStack,
    buffer: Fixed64,
    /// Joules left in the item currently burning.
    burn_remaining: Fixed64,
    /// Total joules of the item currently burning, for progress display.
    burn_total: Fixed64,
    current_fuel: String,
}

impl Generator {
    pub fn new(pos: BlockPos, fuel_table: Arc<FuelTable>) -> Self {
        Self {
            pos,
            net: None,
            fuel_table,
            fuel_slot: ItemStack::empty(),
            buffer: Fixed64::ZERO,
            burn_remaining: Fixed64::ZERO,
            burn_total: Fixed64::ZERO,
            current_fuel: String::new(),
        }
    }

    fn power_output() -> Fixed64 {
        Fixed64::from_num(POWER_OUTPUT)
    }

    fn buffer_capacity() -> Fixed64 {
        Fixed64::from_num(INTERNAL_BUFFER)
    }

    fn can_start_burning(&self) -> bool {
        !self.fuel_slot.is_empty() && self.fuel_table.is_fuel(self.fuel_slot.item_id())
    }

    fn try_start_burning(&mut self) {
        if self.fuel_slot.is_empty() {
            self.current_fuel.clear();
            return;
        }
        if let Some(value) = self.fuel_table.value(self.fuel_slot.item_id()) {
            self.current_fuel = self.fuel_slot.item_id().to_string();
            self.fuel_slot.remove(1);
            self.burn_remaining = value;
            self.burn_total = value;
        }
    }

    /// Offer fuel to the slot, returning whatever was rejected or did not
    /// fit. Non-fuel items come straight back.
    pub fn insert_fuel(&mut self, stack: ItemStack) -> ItemStack {
        if !self.fuel_table.is_fuel(stack.item_id()) {
            return stack;
        }
        self.fuel_slot.add(stack)
    }

    pub fn fuel_slot(&self) -> &ItemStack {
        &self.fuel_slot
    }

    pub fn buffered_energy(&self) -> Fixed64 {
        self.buffer
    }

    /// How far through the current fuel item the burn is, 0..1.
    pub fn burn_progress(&self) -> Fixed64 {
        if self.burn_total > Fixed64::ZERO {
            Fixed64::ONE - self.burn_remaining / self.burn_total
        } else {
            Fixed64::ZERO
        }
    }

    pub fn current_fuel(&self) -> &str {
        &self.current_fuel
    }
}

impl PowerNode for Generator {
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
        "generator"
    }

    fn on_power_tick(&mut self) {
        if self.buffer >= Self::buffer_capacity() {
            return;
        }
        if self.burn_remaining > Fixed64::ZERO {
            let headroom = Self::buffer_capacity() - self.buffer;
            let to_burn = headroom
                .min(watts_to_joules_per_tick(Self::power_output()))
                .min(self.burn_remaining);
            self.buffer += to_burn;
            self.burn_remaining -= to_burn;
        }
        if self.burn_remaining <= Fixed64::ZERO && self.buffer < Self::buffer_capacity() {
            self.try_start_burning();
        }
    }

    fn as_producer(&self) -> Option<&dyn Producer> {
        Some(self)
    }

    fn as_producer_mut(&mut self) -> Option<&mut dyn Producer> {
        Some(self)
    }

    fn save(&self) -> NodeRecord {
        let mut record = NodeRecord::new("generator", self.pos);
        record.active = self.is_producing();
        record.set_text("fuel_item", self.fuel_slot.item_id());
        record.set_int("fuel_count", i64::from(self.fuel_slot.count()));
        record.set_fixed("buffer", self.buffer);
        record.set_fixed("burn_remaining", self.burn_remaining);
        record.set_fixed("burn_total", self.burn_total);
        record.set_text("current_fuel", &self.current_fuel);
        record
    }

    fn load(&mut self, record: &NodeRecord) {
        let item = record.get_text("fuel_item").unwrap_or_default();
        let count = record.get_int("fuel_count", 0).max(0) as u32;
        self.fuel_slot = ItemStack::of(item, count);
        self.buffer = record.get_fixed("buffer", Fixed64::ZERO);
        self.burn_remaining = record.get_fixed("burn_remaining", Fixed64::ZERO);
        self.burn_total = record.get_fixed("burn_total", Fixed64::ZERO);
        self.current_fuel = record.get_text("current_fuel").unwrap_or_default().to_string();
    }
}

impl Producer for Generator {
    fn max_rate(&self) -> Fixed64 {
        Self::power_output()
    }

    fn current_rate(&self) -> Fixed64 {
        if self.is_producing() {
            Self::power_output()
        } else {
            Fixed64::ZERO
        }
    }

    fn produce(&mut self, max_joules: Fixed64) -> Fixed64 {
        let transferred = max_joules.min(self.buffer);
        self.buffer -= transferred;
        transferred
    }

    fn is_producing(&self) -> bool {
        self.buffer > Fixed64::ZERO
            || self.burn_remaining > Fixed64::ZERO
            || self.can_start_burning()
    }

    fn fuel_level(&self) -> Fixed64 {
        if self.burn_total > Fixed64::ZERO {
            self.burn_remaining / self.burn_total
        } else if self.fuel_slot.is_empty() {
            Fixed64::ZERO
        } else {
            Fixed64::ONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(v: f64) -> Fixed64 {
        Fixed64::from_num(v)
    }

    fn generator() -> Generator {
        Generator::new(BlockPos::new(0, 0, 0), Arc::new(FuelTable::standard()))
    }

    // -----------------------------------------------------------------------
    // Test 1: No fuel means no production
    // -----------------------------------------------------------------------
    #[test]
    fn idle_without_fuel() {
        let mut r#gen = generator();
        assert!(!r#gen.is_producing());
        assert_eq!(r#gen.current_rate(), Fixed64::ZERO);
        r#gen.on_power_tick();
        assert_eq!(r#gen.produce(fixed(20.0)), Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Test 2: Non-fuel items are rejected at the slot
    // -----------------------------------------------------------------------
    #[test]
    fn rejects_non_fuel() {
        let mut r#gen = generator();
        let rejected = r#gen.insert_fuel(ItemStack::of("Iron_Ore", 4));
        assert_eq!(rejected, ItemStack::of("Iron_Ore", 4));
        assert!(r#gen.fuel_slot().is_empty());
    }

    // -----------------------------------------------------------------------
    // Test 3: Burning fills the buffer at one tick of output per tick
    // -----------------------------------------------------------------------
    #[test]
    fn burn_fills_buffer_at_output_rate() {
        let mut r#gen = generator();
        assert!(r#gen.insert_fuel(ItemStack::of("Coal", 1)).is_empty());

        // Tick 1 lights the coal but burns nothing yet.
        r#gen.on_power_tick();
        assert_eq!(r#gen.fuel_slot().count(), 0);
        assert_eq!(r#gen.current_fuel(), "Coal");
        assert_eq!(r#gen.buffered_energy(), Fixed64::ZERO);

        // Tick 2 moves 20 J into the buffer.
        r#gen.on_power_tick();
        assert_eq!(r#gen.buffered_energy(), fixed(20.0));
        assert!(r#gen.is_producing());
        assert_eq!(r#gen.current_rate(), fixed(400.0));
    }

    // -----------------------------------------------------------------------
    // Test 4: produce drains the buffer, capped by the request
    // -----------------------------------------------------------------------
    #[test]
    fn produce_drains_buffer() {
        let mut r#gen = generator();
        r#gen.insert_fuel(ItemStack::of("Coal", 1));
        r#gen.on_power_tick();
        r#gen.on_power_tick();

        assert_eq!(r#gen.produce(fixed(8.0)), fixed(8.0));
        assert_eq!(r#gen.buffered_energy(), fixed(12.0));
        assert_eq!(r#gen.produce(fixed(20.0)), fixed(12.0));
        assert_eq!(r#gen.buffered_energy(), Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Test 5: Fuel level tracks the burn
    // -----------------------------------------------------------------------
    #[test]
    fn fuel_level_tracks_burn() {
        let mut r#gen = generator();
        assert_eq!(r#gen.fuel_level(), Fixed64::ZERO);
        r#gen.insert_fuel(ItemStack::of("Planks", 2));
        assert_eq!(r#gen.fuel_level(), Fixed64::ONE);

        r#gen.on_power_tick(); // light
        r#gen.on_power_tick(); // burn 20 J of 3000
        assert_eq!(r#gen.fuel_level(), fixed(2980.0) / fixed(3000.0));
        assert_eq!(r#gen.burn_progress(), Fixed64::ONE - fixed(2980.0) / fixed(3000.0));
    }

    // -----------------------------------------------------------------------
    // Test 6: Save and load round-trip the burn state
    // -----------------------------------------------------------------------
    #[test]
    fn save_load_round_trip() {
        let mut r#gen = generator();
        r#gen.insert_fuel(ItemStack::of("Coal", 5));
        for _ in 0..10 {
            r#gen.on_power_tick();
        }
        r#gen.produce(fixed(50.0));

        let record = r#gen.save();
        assert_eq!(record.node_type, "generator");
        assert!(record.active);

        let mut restored = generator();
        restored.load(&record);
        assert_eq!(restored.fuel_slot(), r#gen.fuel_slot());
        assert_eq!(restored.buffered_energy(), r#gen.buffered_energy());
        assert_eq!(restored.fuel_level(), r#gen.fuel_level());
        assert_eq!(restored.current_fuel(), r#gen.current_fuel());
    }
}
