//! Item stacks for machine inventories.

use serde::{Deserialize, Serialize};

/// Largest count a single stack can hold.
pub const MAX_STACK_SIZE: u32 = 64;

/// A stack of identical items. An empty stack has no item id and a count
/// of zero; the two are kept in lockstep.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemStack {
    item_id: String,
    count: u32,
}

impl ItemStack {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A stack of `count` items. Zero counts and empty ids collapse to
    /// the empty stack.
    pub fn of(item_id: &str, count: u32) -> Self {
        if item_id.is_empty() || count == 0 {
            return Self::empty();
        }
        Self {
            item_id: item_id.to_string(),
            count,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item_id.is_empty()
    }

    /// Add another stack into this one, returning the overflow that did
    /// not fit. Stacks of different items do not mix.
    pub fn add(&mut self, to_add: ItemStack) -> ItemStack {
        if to_add.is_empty() {
            return ItemStack::empty();
        }
        if self.is_empty() {
            let taken = to_add.count.min(MAX_STACK_SIZE);
            self.item_id = to_add.item_id.clone();
            self.count = taken;
            return ItemStack::of(&to_add.item_id, to_add.count - taken);
        }
        if self.item_id != to_add.item_id {
            return to_add;
        }
        let space = MAX_STACK_SIZE - self.count;
        let taken = to_add.count.min(space);
        self.count += taken;
        ItemStack::of(&to_add.item_id, to_add.count - taken)
    }

    /// Take up to `amount` items out of this stack.
    pub fn remove(&mut self, amount: u32) -> ItemStack {
        if self.is_empty() || amount == 0 {
            return ItemStack::empty();
        }
        let taken = amount.min(self.count);
        let removed = ItemStack::of(&self.item_id, taken);
        self.count -= taken;
        if self.count == 0 {
            self.item_id.clear();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.item_id.clear();
        self.count = 0;
    }
}

impl std::fmt::Display for ItemStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "empty")
        } else {
            write!(f, "{} x{}", self.item_id, self.count)
        }
    }
}
