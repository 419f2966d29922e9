//! Resource wells.

use crate::game::constants::WELL_CAPACITY;
use crate::game::geometry::Location;
use crate::game::robot::Inventory;
use crate::game::team::ResourceKind;

/// A fixed-kind resource node with a bounded stock.
///
/// Wells exist only on tiles tagged with a resource kind at construction;
/// their location and kind never change.
#[derive(Debug, Clone, Copy)]
pub struct Well {
    location: Location,
    kind: ResourceKind,
    inventory: Inventory,
}

impl Well {
    /// Create a well with a full stock of its resource.
    #[must_use]
    pub fn new(location: Location, kind: ResourceKind) -> Self {
        let mut inventory = Inventory::new(Some(WELL_CAPACITY));
        inventory.add(kind, WELL_CAPACITY);
        Self {
            location,
            kind,
            inventory,
        }
    }

    /// The well's tile.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// The resource this well yields.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Units of the well's resource still in stock.
    #[must_use]
    pub const fn stock(&self) -> u32 {
        self.inventory.amount(self.kind)
    }

    /// Draw units from the stock. Returns `false` if the stock is short.
    pub const fn try_draw(&mut self, amount: u32) -> bool {
        self.inventory.try_remove(self.kind, amount)
    }
}
