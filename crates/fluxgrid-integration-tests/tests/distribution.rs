//! End-to-end distribution: fueled generators driving real machines
//! through the manager, tick by tick.

use std::sync::Arc;

use fluxgrid_core::fixed::Fixed64;
use fluxgrid_core::pos::BlockPos;
use fluxgrid_machines::battery::Battery;
use fluxgrid_machines::cable::Cable;
use fluxgrid_machines::fuel::FuelTable;
use fluxgrid_machines::generator::Generator;
use fluxgrid_machines::item::ItemStack;
use fluxgrid_machines::processing::ProcessingMachine;
use fluxgrid_machines::recipe::RecipeBook;
use fluxgrid_power::manager::PowerNetworkManager;

fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

fn pos(x: i32) -> BlockPos {
    BlockPos::new(x, 0, 0)
}

/// generator(coal) - cable - macerator(iron ore), plus the manager.
fn ore_line() -> PowerNetworkManager {
    let fuel = Arc::new(FuelTable::standard());
    let book = Arc::new(RecipeBook::standard());
    let mut manager = PowerNetworkManager::new();

    let mut generator = Generator::new(pos(0), fuel);
    assert!(generator.insert_fuel(ItemStack::of("Coal", 8)).is_empty());
    manager.register(Box::new(generator)).ok().unwrap();

    manager.register(Box::new(Cable::new(pos(1)))).ok().unwrap();

    let mut macerator = ProcessingMachine::macerator(pos(2), book);
    assert!(macerator.insert_input(ItemStack::of("Iron_Ore", 4)).is_empty());
    manager.register(Box::new(macerator)).ok().unwrap();

    assert_eq!(manager.network_count(), 1);
    manager
}

#[test]
fn steady_state_surplus_numbers() {
    let mut manager = ore_line();
    let id = manager.network_at(pos(0)).unwrap();

    // Tick 1 lights the coal; nothing is buffered yet, so nothing flows.
    manager.tick_all();
    // From tick 2 the generator sustains 20 J/tick against 8 J of demand.
    manager.tick_all();

    let stats = manager.network_stats(id).unwrap();
    assert_eq!(stats.produced, fixed(20.0));
    assert_eq!(stats.consumed, fixed(8.0));
    assert_eq!(stats.wasted, fixed(12.0));
    assert_eq!(stats.charged, Fixed64::ZERO);
    assert_eq!(stats.satisfaction, Fixed64::ONE);
}

#[test]
fn macerator_doubles_ore_after_two_hundred_powered_ticks() {
    let mut manager = ore_line();

    // One operation needs 1600 J at 8 J/tick: 200 powered ticks, plus
    // the light-up tick before any power flowed.
    for _ in 0..201 {
        manager.tick_all();
    }

    let node = manager.node_at(pos(2)).unwrap();
    let consumer = node.as_consumer().unwrap();
    // The operation just completed: bank is empty again.
    assert_eq!(consumer.energy_buffer(), Fixed64::ZERO);

    // Downcast through save: the output slot holds doubled dust.
    let record = node.save();
    assert_eq!(record.get_text("output_item"), Some("Iron_Dust"));
    assert_eq!(record.get_int("output_count", 0), 2);
    assert_eq!(record.get_int("input_count", 0), 3);
}

#[test]
fn battery_covers_half_the_demand() {
    let book = Arc::new(RecipeBook::standard());
    let mut manager = PowerNetworkManager::new();

    // No producer at all: a half-charged-enough battery and a macerator.
    let mut battery = Battery::new(pos(0));
    battery.set_stored(fixed(4.0));
    manager.register(Box::new(battery)).ok().unwrap();

    let mut macerator = ProcessingMachine::macerator(pos(1), book);
    macerator.insert_input(ItemStack::of("Iron_Ore", 1));
    manager.register(Box::new(macerator)).ok().unwrap();
    let id = manager.network_at(pos(0)).unwrap();

    manager.tick_all();

    // Demand 8 J, 4 J available: half satisfied, storage fully drained.
    let stats = manager.network_stats(id).unwrap();
    assert_eq!(stats.satisfaction, fixed(0.5));
    assert_eq!(stats.consumed, fixed(4.0));
    assert_eq!(stats.discharged, fixed(4.0));
    assert_eq!(manager.network_storage(id), Fixed64::ZERO);

    // Next tick there is nothing left at all.
    manager.tick_all();
    let stats = manager.network_stats(id).unwrap();
    assert_eq!(stats.satisfaction, Fixed64::ZERO);
    assert_eq!(stats.consumed, Fixed64::ZERO);
}

#[test]
fn battery_banks_surplus_then_bridges_an_outage() {
    let fuel = Arc::new(FuelTable::standard());
    let book = Arc::new(RecipeBook::standard());
    let mut manager = PowerNetworkManager::new();

    // Just one plank: 3000 J of fuel, then the generator goes dark.
    let mut generator = Generator::new(pos(0), fuel);
    generator.insert_fuel(ItemStack::of("Planks", 1));
    manager.register(Box::new(generator)).ok().unwrap();
    manager.register(Box::new(Battery::new(pos(1)))).ok().unwrap();

    let mut furnace = ProcessingMachine::electric_furnace(pos(2), book);
    furnace.insert_input(ItemStack::of("Iron_Dust", 8));
    manager.register(Box::new(furnace)).ok().unwrap();
    let id = manager.network_at(pos(0)).unwrap();

    // Run well past the fuel's 150 productive ticks.
    for _ in 0..160 {
        manager.tick_all();
    }

    // The battery banked the 12 J/tick surplus while the fuel lasted and
    // is now paying it back out.
    assert!(manager.network_storage(id) > Fixed64::ZERO);
    let stats = manager.network_stats(id).unwrap();
    assert_eq!(stats.satisfaction, Fixed64::ONE);
    assert_eq!(stats.produced, Fixed64::ZERO);
    assert_eq!(stats.discharged, fixed(8.0));

    // Eventually the bank runs dry and the furnace browns out.
    for _ in 0..400 {
        manager.tick_all();
    }
    let stats = manager.network_stats(id).unwrap();
    assert!(stats.satisfaction < Fixed64::ONE);
}

#[test]
fn two_consumers_share_a_shortfall_proportionally() {
    let book = Arc::new(RecipeBook::standard());
    let mut manager = PowerNetworkManager::new();

    // 8 J/tick of storage output against 16 J/tick of demand.
    let mut battery = Battery::new(pos(0));
    battery.set_stored(fixed(8.0));
    manager.register(Box::new(battery)).ok().unwrap();

    for x in [1, 2] {
        let mut macerator = ProcessingMachine::macerator(pos(x), Arc::clone(&book));
        macerator.insert_input(ItemStack::of("Copper_Ore", 1));
        manager.register(Box::new(macerator)).ok().unwrap();
    }
    let id = manager.network_at(pos(0)).unwrap();

    manager.tick_all();

    let stats = manager.network_stats(id).unwrap();
    assert_eq!(stats.satisfaction, fixed(0.5));
    assert_eq!(stats.consumed, fixed(8.0));

    // Each machine banked exactly half its per-tick need.
    for x in [1, 2] {
        let record = manager.node_at(pos(x)).unwrap().save();
        assert_eq!(record.get_fixed("energy_buffer", Fixed64::ZERO), fixed(4.0));
    }
}
