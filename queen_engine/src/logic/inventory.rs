use super::Logic;
use crate::frontend::Frontend;

impl<F: Frontend> Logic<F> {
    pub(super) fn inventory_setup(&mut self) {
        self.inventory = self.config.starting_inventory;
        self.log_event(format!("inventory.setup {:?}", self.inventory));
    }

    fn num_items(&self) -> i16 {
        self.items.len().saturating_sub(1) as i16
    }

    fn is_held(&self, item: i16) -> bool {
        item > 0 && self.items.get(item as usize).is_some_and(|data| data.name > 0)
    }

    /// Item shown in panel slot `slot` (0..4), 0 when empty.
    pub fn find_inventory_item(&self, slot: usize) -> i16 {
        self.inventory.get(slot).copied().unwrap_or(0)
    }

    /// Next held item after `first`, wrapping around; 0 when nothing else
    /// is held.
    pub fn next_inventory_item(&self, first: i16) -> i16 {
        let count = self.num_items();
        (first + 1..=count)
            .chain(1..first)
            .find(|&item| self.is_held(item))
            .unwrap_or(0)
    }

    pub fn previous_inventory_item(&self, first: i16) -> i16 {
        let count = self.num_items();
        (1..first)
            .rev()
            .chain((first + 1..=count).rev())
            .find(|&item| self.is_held(item))
            .unwrap_or(0)
    }

    pub fn num_items_held(&self) -> usize {
        (1..=self.num_items()).filter(|&item| self.is_held(item)).count()
    }

    fn remove_duplicate_items(&mut self) {
        for i in 0..4 {
            for j in i + 1..4 {
                if self.inventory[i] == self.inventory[j] {
                    self.inventory[j] = 0;
                }
            }
        }
    }

    /// Marks `item` as held and shows it in the first slot, followed by the
    /// next held items.
    pub fn inventory_insert_item(&mut self, item: i16) {
        let Some(data) = self.items.get_mut(item.max(0) as usize) else {
            return;
        };
        data.name = data.name.abs();
        self.inventory[0] = item;
        let mut current = item;
        for slot in 1..4 {
            current = self.next_inventory_item(current);
            self.inventory[slot] = current;
            self.remove_duplicate_items();
        }
        self.log_event(format!("inventory.insert {item}"));
    }

    /// Marks `item` as no longer held and refills the slots from the items
    /// after it.
    pub fn inventory_delete_item(&mut self, item: i16) {
        let Some(data) = self.items.get_mut(item.max(0) as usize) else {
            return;
        };
        data.name = -data.name.abs();
        let mut current = item;
        for slot in 0..4 {
            current = self.next_inventory_item(current);
            self.inventory[slot] = current;
            self.remove_duplicate_items();
        }
        self.log_event(format!("inventory.delete {item}"));
    }

    /// Scrolls the panel by `count` items; only when more than four are held.
    pub fn inventory_scroll(&mut self, count: u16, up: bool) {
        if self.num_items_held() <= 4 {
            return;
        }
        for _ in 0..count {
            if up {
                self.inventory.copy_within(0..3, 1);
                self.inventory[0] = self.previous_inventory_item(self.inventory[0]);
            } else {
                self.inventory.copy_within(1..4, 0);
                self.inventory[3] = self.next_inventory_item(self.inventory[3]);
            }
        }
        self.log_event(format!("inventory.scroll {:?}", self.inventory));
    }
}
