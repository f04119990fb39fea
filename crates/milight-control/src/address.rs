//! Group selection state
//!
//! The receiver applies hue, brightness and mode commands to whichever group of
//! a family was switched on last. [`AddressBook`] remembers that group per
//! family so a select ("on") command is only sent when the target changes.

use std::collections::HashMap;

use crate::codec::{self, Command};
use crate::target::{Family, Group};

/// Last addressed group per family for one receiver
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    active: HashMap<Family, Group>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select command needed before a group-scoped command, if any.
    ///
    /// Returns `power_on(family, group)` and records the group when the family
    /// currently has a different (or no) group selected. Families without
    /// groups never need selecting.
    pub fn ensure_addressed(&mut self, family: Family, group: Group) -> Option<Command> {
        if !family.has_groups() || self.active.get(&family) == Some(&group) {
            return None;
        }
        self.active.insert(family, group);
        Some(codec::power_on(family, group))
    }

    /// Record that `group` was just selected by an explicit command.
    pub fn record(&mut self, family: Family, group: Group) {
        if family.has_groups() {
            self.active.insert(family, group);
        }
    }

    /// Put back a previous selection, e.g. when a select command never left.
    pub fn restore(&mut self, family: Family, previous: Option<Group>) {
        match previous {
            Some(group) => self.record(family, group),
            None => {
                self.active.remove(&family);
            }
        }
    }

    /// Currently selected group for a family, if known
    pub fn active(&self, family: Family) -> Option<Group> {
        self.active.get(&family).copied()
    }

    /// Forget every selection, e.g. after the receiver was power cycled.
    pub fn reset(&mut self) {
        self.active.clear();
    }
}
