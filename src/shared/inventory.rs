//! Hotbar + backpack inventory with stacking, moving and merging.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::observer::ObserverRegistry;
use super::{ItemId, DEFAULT_BACKPACK_SIZE, DEFAULT_HOTBAR_SIZE, DEFAULT_MAX_STACK};

/// A non-empty stack. Empty slots are `None`, so `amount` is always >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: ItemId,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotContainer {
    Hotbar,
    Backpack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub container: SlotContainer,
    pub index: usize,
}

impl SlotRef {
    pub fn hotbar(index: usize) -> Self {
        Self { container: SlotContainer::Hotbar, index }
    }

    pub fn backpack(index: usize) -> Self {
        Self { container: SlotContainer::Backpack, index }
    }
}

/// Sent to inventory observers after a mutation completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryChange {
    Added { item_id: ItemId, amount: u32 },
    Removed { item_id: ItemId, amount: u32 },
    Moved { from: SlotRef, to: SlotRef },
    Reallocated,
    /// Slots were put back from a snapshot after a failed operation.
    Restored,
}

/// Exact slot layout captured by [`Inventory::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySnapshot {
    hotbar: Vec<Option<ItemStack>>,
    backpack: Vec<Option<ItemStack>>,
}

#[derive(Resource, Debug)]
pub struct Inventory {
    hotbar: Vec<Option<ItemStack>>,
    backpack: Vec<Option<ItemStack>>,
    selected_slot: usize,
    max_stack: u32,
    pub observers: ObserverRegistry<InventoryChange>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HOTBAR_SIZE, DEFAULT_BACKPACK_SIZE, DEFAULT_MAX_STACK)
    }
}

impl Inventory {
    /// Sizes below 1 are raised to 1.
    pub fn with_capacity(hotbar_size: usize, backpack_size: usize, max_stack: u32) -> Self {
        Self {
            hotbar: vec![None; hotbar_size.max(1)],
            backpack: vec![None; backpack_size.max(1)],
            selected_slot: 0,
            max_stack: max_stack.max(1),
            observers: ObserverRegistry::default(),
        }
    }

    /// Applies new sizes. A container whose length changes is reallocated
    /// empty; surviving stacks are clamped to the new max stack size.
    pub fn reconfigure(&mut self, hotbar_size: usize, backpack_size: usize, max_stack: u32) {
        let hotbar_size = hotbar_size.max(1);
        let backpack_size = backpack_size.max(1);
        let mut reallocated = false;

        if self.hotbar.len() != hotbar_size {
            self.hotbar = vec![None; hotbar_size];
            reallocated = true;
        }
        if self.backpack.len() != backpack_size {
            self.backpack = vec![None; backpack_size];
            reallocated = true;
        }

        self.max_stack = max_stack.max(1);
        let cap = self.max_stack;
        for stack in self.hotbar.iter_mut().chain(self.backpack.iter_mut()).flatten() {
            stack.amount = stack.amount.min(cap);
        }
        self.selected_slot = self.selected_slot.min(self.hotbar.len() - 1);

        if reallocated {
            self.observers.notify(&InventoryChange::Reallocated);
        }
    }

    pub fn max_stack(&self) -> u32 {
        self.max_stack
    }

    pub fn hotbar_len(&self) -> usize {
        self.hotbar.len()
    }

    pub fn backpack_len(&self) -> usize {
        self.backpack.len()
    }

    pub fn hotbar(&self) -> &[Option<ItemStack>] {
        &self.hotbar
    }

    pub fn backpack(&self) -> &[Option<ItemStack>] {
        &self.backpack
    }

    /// Outer `None` = index out of range; inner `None` = empty slot.
    pub fn get(&self, at: SlotRef) -> Option<Option<&ItemStack>> {
        self.container(at.container).get(at.index).map(Option::as_ref)
    }

    fn container(&self, which: SlotContainer) -> &Vec<Option<ItemStack>> {
        match which {
            SlotContainer::Hotbar => &self.hotbar,
            SlotContainer::Backpack => &self.backpack,
        }
    }

    fn container_mut(&mut self, which: SlotContainer) -> &mut Vec<Option<ItemStack>> {
        match which {
            SlotContainer::Hotbar => &mut self.hotbar,
            SlotContainer::Backpack => &mut self.backpack,
        }
    }

    // ── Add / remove ──────────────────────────────────────────────────────

    /// Try to add an item. Returns the quantity that couldn't fit.
    /// Whatever did fit stays in the inventory.
    pub fn try_add(&mut self, item_id: &str, quantity: u32) -> u32 {
        if item_id.is_empty() || quantity == 0 {
            return 0;
        }
        let max_stack = self.max_stack;
        let mut remaining = quantity;

        // First pass: top up existing stacks, hotbar before backpack.
        for stack in self.hotbar.iter_mut().chain(self.backpack.iter_mut()).flatten() {
            if remaining == 0 {
                break;
            }
            if stack.item_id == item_id && stack.amount < max_stack {
                let add = remaining.min(max_stack - stack.amount);
                stack.amount += add;
                remaining -= add;
            }
        }

        // Second pass: fill empty slots.
        for slot in self.hotbar.iter_mut().chain(self.backpack.iter_mut()) {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add = remaining.min(max_stack);
                *slot = Some(ItemStack {
                    item_id: item_id.to_string(),
                    amount: add,
                });
                remaining -= add;
            }
        }

        let added = quantity - remaining;
        if added > 0 {
            self.observers.notify(&InventoryChange::Added {
                item_id: item_id.to_string(),
                amount: added,
            });
        }
        remaining
    }

    /// Returns true if every unit was added. A false result still leaves the
    /// units that fit in the inventory; check [`Inventory::room_for`] first
    /// when all-or-nothing is needed.
    pub fn add(&mut self, item_id: &str, quantity: u32) -> bool {
        self.try_add(item_id, quantity) == 0
    }

    /// How many units of `item_id` would fit right now.
    pub fn room_for(&self, item_id: &str) -> u32 {
        if item_id.is_empty() {
            return 0;
        }
        self.hotbar
            .iter()
            .chain(self.backpack.iter())
            .map(|slot| match slot {
                None => self.max_stack,
                Some(s) if s.item_id == item_id => self.max_stack.saturating_sub(s.amount),
                Some(_) => 0,
            })
            .fold(0u32, |acc, n| acc.saturating_add(n))
    }

    /// Remove quantity of an item. Returns how many were actually removed.
    pub fn try_remove(&mut self, item_id: &str, quantity: u32) -> u32 {
        if item_id.is_empty() || quantity == 0 {
            return 0;
        }
        let mut remaining = quantity;
        for slot in self.hotbar.iter_mut().chain(self.backpack.iter_mut()) {
            if remaining == 0 {
                break;
            }
            if let Some(ref mut s) = slot {
                if s.item_id == item_id {
                    let remove = remaining.min(s.amount);
                    s.amount -= remove;
                    remaining -= remove;
                    if s.amount == 0 {
                        *slot = None;
                    }
                }
            }
        }

        let removed = quantity - remaining;
        if removed > 0 {
            self.observers.notify(&InventoryChange::Removed {
                item_id: item_id.to_string(),
                amount: removed,
            });
        }
        removed
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.hotbar
            .iter()
            .chain(self.backpack.iter())
            .flatten()
            .filter(|s| s.item_id == item_id)
            .fold(0u32, |acc, s| acc.saturating_add(s.amount))
    }

    pub fn has(&self, item_id: &str, quantity: u32) -> bool {
        self.count(item_id) >= quantity
    }

    // ── Snapshot / restore ────────────────────────────────────────────────

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            hotbar: self.hotbar.clone(),
            backpack: self.backpack.clone(),
        }
    }

    /// Puts every slot back exactly as captured. Refused (returns false) when
    /// the container sizes changed since the snapshot was taken.
    pub fn restore(&mut self, snapshot: InventorySnapshot) -> bool {
        if snapshot.hotbar.len() != self.hotbar.len()
            || snapshot.backpack.len() != self.backpack.len()
        {
            return false;
        }
        if self.hotbar != snapshot.hotbar || self.backpack != snapshot.backpack {
            self.hotbar = snapshot.hotbar;
            self.backpack = snapshot.backpack;
            self.observers.notify(&InventoryChange::Restored);
        }
        true
    }

    // ── Hotbar selection ──────────────────────────────────────────────────

    pub fn select_hotbar(&mut self, index: usize) {
        self.selected_slot = index.min(self.hotbar.len() - 1);
    }

    pub fn selected_index(&self) -> usize {
        self.selected_slot
    }

    pub fn selected_stack(&self) -> Option<&ItemStack> {
        self.hotbar.get(self.selected_slot).and_then(Option::as_ref)
    }

    /// Uses up one unit from the selected hotbar slot.
    pub fn consume_selected(&mut self) -> Option<ItemId> {
        let slot = self.hotbar.get_mut(self.selected_slot)?;
        let stack = slot.as_mut()?;
        let item_id = stack.item_id.clone();
        stack.amount -= 1;
        if stack.amount == 0 {
            *slot = None;
        }
        self.observers.notify(&InventoryChange::Removed {
            item_id: item_id.clone(),
            amount: 1,
        });
        Some(item_id)
    }

    // ── Move / merge / swap ───────────────────────────────────────────────

    /// Moves the stack at `from` onto `to`:
    /// empty target takes the whole stack, same item merges up to the max
    /// stack size (leftover stays at `from`), a different item swaps places.
    ///
    /// Returns false when either index is out of range, the source is empty,
    /// or nothing could move (target already full). `from == to` is a no-op
    /// that reports true.
    pub fn move_or_merge(&mut self, from: SlotRef, to: SlotRef) -> bool {
        if self.get(from).is_none() || self.get(to).is_none() {
            return false;
        }
        if from == to {
            return true;
        }
        let max_stack = self.max_stack;

        let Some(mut src) = self.container_mut(from.container)[from.index].take() else {
            return false;
        };

        let target = &mut self.container_mut(to.container)[to.index];
        let (changed, leftover) = match target.take() {
            None => {
                *target = Some(src);
                (true, None)
            }
            Some(mut dst) if dst.item_id == src.item_id => {
                let moved = max_stack.saturating_sub(dst.amount).min(src.amount);
                dst.amount += moved;
                src.amount -= moved;
                *target = Some(dst);
                (moved > 0, (src.amount > 0).then_some(src))
            }
            Some(dst) => {
                *target = Some(src);
                (true, Some(dst))
            }
        };

        self.container_mut(from.container)[from.index] = leftover;

        if changed {
            self.observers.notify(&InventoryChange::Moved { from, to });
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_inventory() -> Inventory {
        Inventory::with_capacity(2, 2, 10)
    }

    fn stack(id: &str, amount: u32) -> Option<ItemStack> {
        Some(ItemStack { item_id: id.to_string(), amount })
    }

    #[test]
    fn test_add_merges_then_fills_hotbar_first() {
        let mut inv = small_inventory();
        assert!(inv.add("slime_gel", 4));
        assert!(inv.add("slime_gel", 9));

        assert_eq!(inv.hotbar()[0], stack("slime_gel", 10));
        assert_eq!(inv.hotbar()[1], stack("slime_gel", 3));
        assert_eq!(inv.backpack()[0], None);
        assert_eq!(inv.count("slime_gel"), 13);
    }

    #[test]
    fn test_add_overflow_keeps_partial() {
        let mut inv = small_inventory();
        let remaining = inv.try_add("stone", 45);
        assert_eq!(remaining, 5);
        assert_eq!(inv.count("stone"), 40);
        assert!(!inv.add("stone", 1));
    }

    #[test]
    fn test_add_zero_or_empty_id_is_noop_success() {
        let mut inv = small_inventory();
        assert!(inv.add("", 5));
        assert!(inv.add("stone", 0));
        assert!(inv.hotbar().iter().all(Option::is_none));
    }

    #[test]
    fn test_no_slot_exceeds_max_stack() {
        let mut inv = small_inventory();
        for n in [3, 17, 1, 9, 30] {
            inv.try_add("herb", n);
            for slot in inv.hotbar().iter().chain(inv.backpack().iter()).flatten() {
                assert!(slot.amount <= inv.max_stack());
            }
        }
    }

    #[test]
    fn test_remove_hotbar_first_and_clears_slots() {
        let mut inv = small_inventory();
        inv.try_add("herb", 15);
        let removed = inv.try_remove("herb", 12);
        assert_eq!(removed, 12);
        assert_eq!(inv.hotbar()[0], None);
        assert_eq!(inv.hotbar()[1], stack("herb", 3));
    }

    #[test]
    fn test_restore_puts_stacks_back_in_their_slots() {
        let mut inv = small_inventory();
        inv.add("herb", 10);
        inv.add("ore", 4);
        let before = inv.snapshot();

        inv.try_remove("herb", 10);
        inv.add("stone", 1);
        inv.try_add("herb", 10);
        assert_eq!(inv.backpack()[0], stack("herb", 10));
        assert_ne!(inv.snapshot(), before);

        assert!(inv.restore(before.clone()));
        assert_eq!(inv.snapshot(), before);
        assert_eq!(inv.hotbar()[0], stack("herb", 10));
        assert_eq!(inv.hotbar()[1], stack("ore", 4));
    }

    #[test]
    fn test_restore_refused_after_resize() {
        let mut inv = small_inventory();
        inv.add("herb", 3);
        let before = inv.snapshot();
        inv.reconfigure(3, 2, 10);
        assert!(!inv.restore(before));
        assert_eq!(inv.count("herb"), 0);
    }

    #[test]
    fn test_count_saturates_with_huge_stacks() {
        let mut inv = Inventory::with_capacity(1, 1, u32::MAX);
        inv.add("ore", u32::MAX);
        inv.add("ore", u32::MAX);
        assert_eq!(inv.count("ore"), u32::MAX);
    }

    #[test]
    fn test_remove_never_exceeds_available() {
        let mut inv = small_inventory();
        inv.add("herb", 4);
        assert_eq!(inv.try_remove("herb", 10), 4);
        assert_eq!(inv.count("herb"), 0);
        assert_eq!(inv.try_remove("herb", 1), 0);
    }

    #[test]
    fn test_count_tracks_add_remove_arithmetic() {
        let mut inv = small_inventory();
        let capacity = 4 * inv.max_stack();
        let mut expected: u32 = 0;
        let ops: [(bool, u32); 6] = [(true, 7), (true, 22), (false, 5), (true, 30), (false, 100), (true, 3)];
        for (is_add, n) in ops {
            if is_add {
                inv.try_add("ore", n);
                expected = (expected + n).min(capacity);
            } else {
                inv.try_remove("ore", n);
                expected = expected.saturating_sub(n);
            }
            assert_eq!(inv.count("ore"), expected);
        }
    }

    #[test]
    fn test_room_for_matches_actual_capacity() {
        let mut inv = small_inventory();
        inv.add("herb", 7);
        inv.add("ore", 10);
        // hotbar[0]=herb 7, hotbar[1]=ore 10, two empty backpack slots
        assert_eq!(inv.room_for("herb"), 3 + 20);
        assert_eq!(inv.room_for("ore"), 20);
        assert_eq!(inv.try_add("herb", 23), 0);
        assert_eq!(inv.room_for("herb"), 0);
    }

    #[test]
    fn test_select_hotbar_clamps() {
        let mut inv = Inventory::default();
        inv.select_hotbar(4);
        assert_eq!(inv.selected_index(), 4);
        inv.select_hotbar(100);
        assert_eq!(inv.selected_index(), DEFAULT_HOTBAR_SIZE - 1);
    }

    #[test]
    fn test_consume_selected() {
        let mut inv = small_inventory();
        inv.add("seed_slime", 1);
        assert_eq!(inv.consume_selected().as_deref(), Some("seed_slime"));
        assert_eq!(inv.consume_selected(), None);
    }

    #[test]
    fn test_get_distinguishes_empty_from_out_of_range() {
        let mut inv = small_inventory();
        inv.add("herb", 2);
        assert_eq!(inv.get(SlotRef::hotbar(0)), Some(Some(&ItemStack { item_id: "herb".into(), amount: 2 })));
        assert_eq!(inv.get(SlotRef::backpack(1)), Some(None));
        assert_eq!(inv.get(SlotRef::backpack(2)), None);
    }

    #[test]
    fn test_move_into_empty_slot_transfers_whole_stack() {
        let mut inv = small_inventory();
        inv.add("herb", 6);
        assert!(inv.move_or_merge(SlotRef::hotbar(0), SlotRef::backpack(1)));
        assert_eq!(inv.hotbar()[0], None);
        assert_eq!(inv.backpack()[1], stack("herb", 6));
    }

    #[test]
    fn test_merge_leaves_remainder_in_source() {
        let mut inv = small_inventory();
        inv.add("herb", 16); // hotbar[0]=10, hotbar[1]=6
        inv.move_or_merge(SlotRef::hotbar(1), SlotRef::backpack(0));
        inv.add("herb", 4); // hotbar[0] is full, so backpack[0] goes 6 -> 10
        assert_eq!(inv.backpack()[0], stack("herb", 10));

        inv.try_remove("herb", 7); // hotbar[0] 10 -> 3
        assert_eq!(inv.hotbar()[0], stack("herb", 3));

        assert!(inv.move_or_merge(SlotRef::backpack(0), SlotRef::hotbar(0)));
        assert_eq!(inv.hotbar()[0], stack("herb", 10));
        assert_eq!(inv.backpack()[0], stack("herb", 3));
    }

    #[test]
    fn test_merge_into_full_stack_reports_no_change() {
        let mut inv = small_inventory();
        inv.add("herb", 15);
        assert!(!inv.move_or_merge(SlotRef::hotbar(1), SlotRef::hotbar(0)));
        assert_eq!(inv.hotbar()[0], stack("herb", 10));
        assert_eq!(inv.hotbar()[1], stack("herb", 5));
    }

    #[test]
    fn test_swap_is_self_inverse_across_containers() {
        let mut inv = small_inventory();
        inv.add("herb", 5);
        inv.add("ore", 3);
        inv.move_or_merge(SlotRef::hotbar(1), SlotRef::backpack(0));

        let a = SlotRef::hotbar(0);
        let b = SlotRef::backpack(0);
        assert!(inv.move_or_merge(a, b));
        assert_eq!(inv.hotbar()[0], stack("ore", 3));
        assert_eq!(inv.backpack()[0], stack("herb", 5));

        assert!(inv.move_or_merge(b, a));
        assert_eq!(inv.hotbar()[0], stack("herb", 5));
        assert_eq!(inv.backpack()[0], stack("ore", 3));
    }

    #[test]
    fn test_move_same_slot_is_noop() {
        let mut inv = small_inventory();
        inv.add("herb", 5);
        assert!(inv.move_or_merge(SlotRef::hotbar(0), SlotRef::hotbar(0)));
        assert_eq!(inv.hotbar()[0], stack("herb", 5));
    }

    #[test]
    fn test_move_out_of_range_or_empty_source_fails() {
        let mut inv = small_inventory();
        inv.add("herb", 5);
        assert!(!inv.move_or_merge(SlotRef::hotbar(0), SlotRef::backpack(9)));
        assert!(!inv.move_or_merge(SlotRef::hotbar(7), SlotRef::hotbar(0)));
        assert!(!inv.move_or_merge(SlotRef::backpack(0), SlotRef::hotbar(0)));
        assert_eq!(inv.hotbar()[0], stack("herb", 5));
    }

    #[test]
    fn test_reconfigure_reallocates_only_resized_containers() {
        let mut inv = Inventory::with_capacity(2, 2, 50);
        inv.add("herb", 80); // hotbar 50 + 30
        inv.reconfigure(2, 4, 40);
        assert_eq!(inv.hotbar()[0], stack("herb", 40));
        assert_eq!(inv.backpack_len(), 4);

        inv.reconfigure(3, 4, 40);
        assert_eq!(inv.count("herb"), 0);
    }

    #[test]
    fn test_observers_see_each_mutation() {
        use std::sync::{Arc, Mutex};
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut inv = small_inventory();
        let sink = Arc::clone(&log);
        inv.observers.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        inv.add("herb", 3);
        inv.try_remove("herb", 1);
        inv.try_remove("missing", 1);

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                InventoryChange::Added { item_id: "herb".into(), amount: 3 },
                InventoryChange::Removed { item_id: "herb".into(), amount: 1 },
            ]
        );
    }
}
