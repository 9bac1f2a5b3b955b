//! Recipe-driven processing machines (macerator, electric furnace).

use std::sync::Arc;

use fluxgrid_core::fixed::{watts_to_joules_per_tick, Fixed64};
use fluxgrid_core::id::NetworkId;
use fluxgrid_core::node::{Capability, Consumer, PowerNode};
use fluxgrid_core::pos::BlockPos;
use fluxgrid_core::record::NodeRecord;

use crate::item::{ItemStack, MAX_STACK_SIZE};
use crate::recipe::{Recipe, RecipeBook};

/// Draw of the stock processing machines, in watts (8 J/tick).
pub const PROCESSING_POWER: f64 = 160.0;

/// A machine that turns input items into output items by banking energy.
///
/// The machine demands power whenever its input matches a recipe and the
/// output slot can take the result. Energy accepted through `consume`
/// accumulates toward the recipe's requirement; the operation completes
/// the tick the bank is full. Interrupted power pauses progress, it does
/// not reset it, but removing the input does.
pub struct ProcessingMachine {
    pos: BlockPos,
    net: Option<NetworkId>,
    machine_type: &'static str,
    power: Fixed64,
    book: Arc<RecipeBook>,
    input_slot: ItemStack,
    output_slot: ItemStack,
    energy_buffer: Fixed64,
    progress_ticks: u64,
}

impl ProcessingMachine {
    pub fn new(
        pos: BlockPos,
        machine_type: &'static str,
        power_watts: Fixed64,
        book: Arc<RecipeBook>,
    ) -> Self {
        Self {
            pos,
            net: None,
            machine_type,
            power: power_watts,
            book,
            input_slot: ItemStack::empty(),
            output_slot: ItemStack::empty(),
            energy_buffer: Fixed64::ZERO,
            progress_ticks: 0,
        }
    }

    /// Ore-doubling macerator.
    pub fn macerator(pos: BlockPos, book: Arc<RecipeBook>) -> Self {
        Self::new(pos, "macerator", Fixed64::from_num(PROCESSING_POWER), book)
    }

    /// Dust and ore smelter.
    pub fn electric_furnace(pos: BlockPos, book: Arc<RecipeBook>) -> Self {
        Self::new(
            pos,
            "electric_furnace",
            Fixed64::from_num(PROCESSING_POWER),
            book,
        )
    }

    /// The recipe the current input would run, if the output has room.
    fn matched_recipe(&self) -> Option<&Recipe> {
        if self.input_slot.is_empty() {
            return None;
        }
        let recipe = self.book.find(self.machine_type, self.input_slot.item_id())?;
        if self.input_slot.count() < recipe.input_count {
            return None;
        }
        if self.accepts_output(&recipe.output_item, recipe.output_count) {
            Some(recipe)
        } else {
            None
        }
    }

    fn accepts_output(&self, item_id: &str, count: u32) -> bool {
        if self.output_slot.is_empty() {
            return true;
        }
        self.output_slot.item_id() == item_id
            && self.output_slot.count() + count <= MAX_STACK_SIZE
    }

    fn complete_operation(&mut self, recipe: Recipe) {
        self.input_slot.remove(recipe.input_count);
        self.output_slot
            .add(ItemStack::of(&recipe.output_item, recipe.output_count));
        self.energy_buffer = Fixed64::ZERO;
        self.progress_ticks = 0;
    }

    /// Offer items to the input slot, returning the overflow.
    pub fn insert_input(&mut self, stack: ItemStack) -> ItemStack {
        self.input_slot.add(stack)
    }

    /// Take up to `max_amount` items out of the output slot.
    pub fn extract_output(&mut self, max_amount: u32) -> ItemStack {
        self.output_slot.remove(max_amount)
    }

    pub fn input_slot(&self) -> &ItemStack {
        &self.input_slot
    }

    pub fn output_slot(&self) -> &ItemStack {
        &self.output_slot
    }

    pub fn progress_ticks(&self) -> u64 {
        self.progress_ticks
    }

    /// Fraction of the current operation's energy banked, 0..1.
    pub fn progress(&self) -> Fixed64 {
        match self.matched_recipe() {
            Some(recipe) if recipe.energy_required > Fixed64::ZERO => {
                Fixed64::ONE.min(self.energy_buffer / recipe.energy_required)
            }
            _ => Fixed64::ZERO,
        }
    }
}

impl PowerNode for ProcessingMachine {
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
        self.machine_type
    }

    fn on_power_tick(&mut self) {
        // Banked energy survives power loss, but not losing the recipe.
        if self.matched_recipe().is_none() {
            self.energy_buffer = Fixed64::ZERO;
            self.progress_ticks = 0;
        }
    }

    fn as_consumer(&self) -> Option<&dyn Consumer> {
        Some(self)
    }

    fn as_consumer_mut(&mut self) -> Option<&mut dyn Consumer> {
        Some(self)
    }

    fn save(&self) -> NodeRecord {
        let mut record = NodeRecord::new(self.machine_type, self.pos);
        record.active = self.can_operate() && self.energy_buffer > Fixed64::ZERO;
        record.set_text("input_item", self.input_slot.item_id());
        record.set_int("input_count", i64::from(self.input_slot.count()));
        record.set_text("output_item", self.output_slot.item_id());
        record.set_int("output_count", i64::from(self.output_slot.count()));
        record.set_fixed("energy_buffer", self.energy_buffer);
        record.set_int("progress_ticks", self.progress_ticks as i64);
        record
    }

    fn load(&mut self, record: &NodeRecord) {
        let input = record.get_text("input_item").unwrap_or_default();
        let input_count = record.get_int("input_count", 0).max(0) as u32;
        self.input_slot = ItemStack::of(input, input_count);
        let output = record.get_text("output_item").unwrap_or_default();
        let output_count = record.get_int("output_count", 0).max(0) as u32;
        self.output_slot = ItemStack::of(output, output_count);
        self.energy_buffer = record.get_fixed("energy_buffer", Fixed64::ZERO);
        self.progress_ticks = record.get_int("progress_ticks", 0).max(0) as u64;
    }
}

impl Consumer for ProcessingMachine {
    fn consumption_rate(&self) -> Fixed64 {
        self.power
    }

    fn can_operate(&self) -> bool {
        self.matched_recipe().is_some()
    }

    fn consume(&mut self, available: Fixed64) -> Fixed64 {
        let Some(recipe) = self.matched_recipe().cloned() else {
            return Fixed64::ZERO;
        };
        let needed = watts_to_joules_per_tick(self.power);
        let consumed = available.min(needed);
        self.energy_buffer += consumed;
        self.progress_ticks += 1;
        if self.energy_buffer >= recipe.energy_required {
            self.complete_operation(recipe);
        }
        consumed
    }

    fn energy_buffer(&self) -> Fixed64 {
        self.energy_buffer
    }

    fn max_energy_buffer(&self) -> Fixed64 {
        self.matched_recipe()
            .map(|r| r.energy_required)
            .unwrap_or(Fixed64::ZERO)
    }
}
