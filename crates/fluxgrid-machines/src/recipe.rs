//! Machine recipes and the lookup book.

use std::collections::BTreeMap;

use fluxgrid_core::fixed::Fixed64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building or loading a recipe book.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("recipe already registered: {0}")]
    Duplicate(String),
    #[cfg(feature = "recipe-io")]
    #[error("invalid recipe definition: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One conversion a machine type can perform: input items plus energy
/// become output items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    /// Which machine type runs this recipe, e.g. `"macerator"`.
    pub machine_type: String,
    pub input_item: String,
    pub input_count: u32,
    pub output_item: String,
    pub output_count: u32,
    /// Joules a machine must bank to complete one operation.
    pub energy_required: Fixed64,
}

impl Recipe {
    pub fn new(
        id: &str,
        machine_type: &str,
        input_item: &str,
        input_count: u32,
        output_item: &str,
        output_count: u32,
        energy_required: Fixed64,
    ) -> Self {
        Self {
            id: id.to_string(),
            machine_type: machine_type.to_string(),
            input_item: input_item.to_string(),
            input_count,
            output_item: output_item.to_string(),
            output_count,
            energy_required,
        }
    }

    /// Seconds one operation takes at the given draw, for display.
    pub fn duration_secs(&self, power_watts: Fixed64) -> Fixed64 {
        if power_watts > Fixed64::ZERO {
            self.energy_required / power_watts
        } else {
            Fixed64::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe book
// ---------------------------------------------------------------------------

/// All known recipes, indexed by id and by (machine type, input item).
/// Machines hold a shared handle to one book.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    by_id: BTreeMap<String, Recipe>,
    by_machine_and_input: BTreeMap<(String, String), String>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock recipe set: ore doubling in the macerator, dust and ore
    /// smelting in the electric furnace.
    pub fn standard() -> Self {
        let mut book = Self::new();
        let e = Fixed64::from_num(1_600);
        for ore in ["Iron", "Copper", "Tin"] {
            let id = format!("macerator_{}_ore", ore.to_lowercase());
            let recipe = Recipe::new(
                &id,
                "macerator",
                &format!("{ore}_Ore"),
                1,
                &format!("{ore}_Dust"),
                2,
                e,
            );
            // Ids are generated, so duplicates cannot occur here.
            let _ = book.register(recipe);
        }
        let e = Fixed64::from_num(1_280);
        for ore in ["Iron", "Copper", "Tin"] {
            let dust = Recipe::new(
                &format!("furnace_{}_dust", ore.to_lowercase()),
                "electric_furnace",
                &format!("{ore}_Dust"),
                1,
                &format!("{ore}_Ingot"),
                1,
                e,
            );
            let _ = book.register(dust);
            // Direct ore smelting, no doubling bonus.
            let direct = Recipe::new(
                &format!("furnace_{}_ore", ore.to_lowercase()),
                "electric_furnace",
                &format!("{ore}_Ore"),
                1,
                &format!("{ore}_Ingot"),
                1,
                e,
            );
            let _ = book.register(direct);
        }
        book
    }

    pub fn register(&mut self, recipe: Recipe) -> Result<(), RecipeError> {
        if self.by_id.contains_key(&recipe.id) {
            return Err(RecipeError::Duplicate(recipe.id));
        }
        self.by_machine_and_input.insert(
            (recipe.machine_type.clone(), recipe.input_item.clone()),
            recipe.id.clone(),
        );
        self.by_id.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    pub fn by_id(&self, id: &str) -> Option<&Recipe> {
        self.by_id.get(id)
    }

    /// The recipe a machine of `machine_type` runs on `input_item`.
    pub fn find(&self, machine_type: &str, input_item: &str) -> Option<&Recipe> {
        let id = self
            .by_machine_and_input
            .get(&(machine_type.to_string(), input_item.to_string()))?;
        self.by_id.get(id)
    }

    pub fn recipes_for(&self, machine_type: &str) -> Vec<&Recipe> {
        self.by_id
            .values()
            .filter(|r| r.machine_type == machine_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Load recipes from a JSON array of recipe definitions and register
    /// them all.
    #[cfg(feature = "recipe-io")]
    pub fn load_json(&mut self, json: &str) -> Result<usize, RecipeError> {
        #[derive(Deserialize)]
        struct RecipeDef {
            id: String,
            machine_type: String,
            input_item: String,
            #[serde(default = "one")]
            input_count: u32,
            output_item: String,
            #[serde(default = "one")]
            output_count: u32,
            energy_required: f64,
        }
        fn one() -> u32 {
            1
        }

        let defs: Vec<RecipeDef> = serde_json::from_str(json)?;
        let count = defs.len();
        for def in defs {
            self.register(Recipe::new(
                &def.id,
                &def.machine_type,
                &def.input_item,
                def.input_count,
                &def.output_item,
                def.output_count,
                Fixed64::from_num(def.energy_required),
            ))?;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Test 1: Standard book covers macerating and smelting
    // -----------------------------------------------------------------------
    #[test]
    fn standard_book_lookups() {
        let book = RecipeBook::standard();
        assert_eq!(book.len(), 9);

        let doubling = book.find("macerator", "Iron_Ore").unwrap();
        assert_eq!(doubling.output_item, "Iron_Dust");
        assert_eq!(doubling.output_count, 2);
        assert_eq!(doubling.energy_required, Fixed64::from_num(1_600));

        let smelt = book.find("electric_furnace", "Iron_Dust").unwrap();
        assert_eq!(smelt.output_item, "Iron_Ingot");
        assert_eq!(smelt.output_count, 1);

        // Direct ore smelting exists but does not double.
        let direct = book.find("electric_furnace", "Tin_Ore").unwrap();
        assert_eq!(direct.output_count, 1);

        assert!(book.find("macerator", "Iron_Dust").is_none());
    }

    // -----------------------------------------------------------------------
    // Test 2: Duplicate ids are rejected
    // -----------------------------------------------------------------------
    #[test]
    fn duplicate_ids_rejected() {
        let mut book = RecipeBook::new();
        let recipe = Recipe::new("r1", "macerator", "A", 1, "B", 1, Fixed64::from_num(10));
        book.register(recipe.clone()).unwrap();
        let err = book.register(recipe).unwrap_err();
        assert!(matches!(err, RecipeError::Duplicate(id) if id == "r1"));
    }

    // -----------------------------------------------------------------------
    // Test 3: Duration scales with power draw
    // -----------------------------------------------------------------------
    #[test]
    fn duration_from_power() {
        let recipe = Recipe::new("r", "m", "A", 1, "B", 1, Fixed64::from_num(1_600));
        // 1600 J at 160 W is 10 seconds.
        assert_eq!(
            recipe.duration_secs(Fixed64::from_num(160)),
            Fixed64::from_num(10)
        );
        assert_eq!(recipe.duration_secs(Fixed64::ZERO), Fixed64::ZERO);
    }

    // -----------------------------------------------------------------------
    // Test 4: JSON loading registers definitions
    // -----------------------------------------------------------------------
    #[cfg(feature = "recipe-io")]
    #[test]
    fn json_loading() {
        let mut book = RecipeBook::new();
        let json = r#"[{
            "id": "macerator_gold_ore",
            "machine_type": "macerator",
            "input_item": "Gold_Ore",
            "input_count": 1,
            "output_item": "Gold_Dust",
            "output_count": 2,
            "energy_required": 1600.0
        }]"#;
        assert_eq!(book.load_json(json).unwrap(), 1);
        assert!(book.find("macerator", "Gold_Ore").is_some());
    }
}
