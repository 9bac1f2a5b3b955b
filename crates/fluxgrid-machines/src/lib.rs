//! Machines Module for the Fluxgrid engine.
//!
//! Concrete power nodes built on the `fluxgrid-core` capability model:
//!
//! - [`generator::Generator`] -- burns solid fuel into power (producer).
//! - [`battery::Battery`] -- banks energy for later (storage).
//! - [`cable::Cable`] -- joins blocks into one network (conduit).
//! - [`processing::ProcessingMachine`] -- recipe-driven consumers; the
//!   stock kinds are the macerator and the electric furnace.
//!
//! Machines share immutable [`fuel::FuelTable`] and [`recipe::RecipeBook`]
//! lookups through `Arc` handles, and rebuild from persisted records via
//! [`node_from_record`].

use std::sync::Arc;

use fluxgrid_core::node::PowerNode;
use fluxgrid_core::record::NodeRecord;

pub mod battery;
pub mod cable;
pub mod fuel;
pub mod generator;
pub mod item;
pub mod processing;
pub mod recipe;

use battery::Battery;
use cable::Cable;
use fuel::FuelTable;
use generator::Generator;
use processing::ProcessingMachine;
use recipe::RecipeBook;

/// Rebuild a machine from its persisted record.
///
/// Returns `None` for unknown type tags; the host decides whether that
/// is an error or a record to carry along untouched.
pub fn node_from_record(
    record: &NodeRecord,
    book: &Arc<RecipeBook>,
    fuel: &Arc<FuelTable>,
) -> Option<Box<dyn PowerNode>> {
    let mut node: Box<dyn PowerNode> = match record.node_type.as_str() {
        "generator" => Box::new(Generator::new(record.position, Arc::clone(fuel))),
        "battery" => Box::new(Battery::new(record.position)),
        "cable" => Box::new(Cable::new(record.position)),
        "macerator" => Box::new(ProcessingMachine::macerator(
            record.position,
            Arc::clone(book),
        )),
        "electric_furnace" => Box::new(ProcessingMachine::electric_furnace(
            record.position,
            Arc::clone(book),
        )),
        _ => return None,
    };
    node.load(record);
    Some(node)
}
