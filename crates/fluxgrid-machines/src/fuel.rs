//! Solid fuel energy values.

use std::collections::BTreeMap;

use fluxgrid_core::fixed::Fixed64;

/// Maps fuel item ids to the joules one item releases when burned.
///
/// Generators hold a shared handle to one table; hosts may build their
/// own or start from [`FuelTable::standard`].
#[derive(Debug, Clone, Default)]
pub struct FuelTable {
    values: BTreeMap<String, Fixed64>,
}

impl FuelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock fuel set.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register("Coal", Fixed64::from_num(32_000));
        table.register("Charcoal", Fixed64::from_num(16_000));
        table.register("Wood", Fixed64::from_num(6_000));
        table.register("Oak_Log", Fixed64::from_num(6_000));
        table.register("Birch_Log", Fixed64::from_num(6_000));
        table.register("Spruce_Log", Fixed64::from_num(6_000));
        table.register("Planks", Fixed64::from_num(3_000));
        table
    }

    pub fn register(&mut self, item_id: &str, joules: Fixed64) {
        self.values.insert(item_id.to_string(), joules);
    }

    pub fn is_fuel(&self, item_id: &str) -> bool {
        self.values.contains_key(item_id)
    }

    /// Joules released by burning one item, if it is fuel at all.
    pub fn value(&self, item_id: &str) -> Option<Fixed64> {
        self.values.get(item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Test 1: Standard table carries the stock fuels
    // -----------------------------------------------------------------------
    #[test]
    fn standard_table_values() {
        let table = FuelTable::standard();
        assert_eq!(table.value("Coal"), Some(Fixed64::from_num(32_000)));
        assert_eq!(table.value("Charcoal"), Some(Fixed64::from_num(16_000)));
        assert_eq!(table.value("Planks"), Some(Fixed64::from_num(3_000)));
        assert!(table.is_fuel("Oak_Log"));
        assert!(!table.is_fuel("Iron_Ore"));
        assert_eq!(table.value("Iron_Ore"), None);
    }

    // -----------------------------------------------------------------------
    // Test 2: Registration replaces prior values
    // -----------------------------------------------------------------------
    #[test]
    fn register_replaces() {
        let mut table = FuelTable::new();
        table.register("Coal", Fixed64::from_num(100));
        table.register("Coal", Fixed64::from_num(200));
        assert_eq!(table.value("Coal"), Some(Fixed64::from_num(200)));
        assert_eq!(table.len(), 1);
    }
}
