//! Ship classes and placed ships.

use crate::common::{BattlefieldError, Coordinates, Orientation};

/// Class of a warship: name and length in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipClass {
    Corvette,
    Frigate,
    Destroyer,
    Cruiser,
    Battleship,
}

impl ShipClass {
    pub const ALL: [ShipClass; 5] = [
        ShipClass::Corvette,
        ShipClass::Frigate,
        ShipClass::Destroyer,
        ShipClass::Cruiser,
        ShipClass::Battleship,
    ];

    /// Ship's name.
    pub fn name(self) -> &'static str {
        match self {
            ShipClass::Corvette => "Corvette",
            ShipClass::Frigate => "Frigate",
            ShipClass::Destroyer => "Destroyer",
            ShipClass::Cruiser => "Cruiser",
            ShipClass::Battleship => "Battleship",
        }
    }

    /// Ship's length.
    pub const fn length(self) -> usize {
        match self {
            ShipClass::Corvette => 2,
            ShipClass::Frigate => 3,
            ShipClass::Destroyer => 3,
            ShipClass::Cruiser => 4,
            ShipClass::Battleship => 5,
        }
    }

    /// Parse a class from its name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.name().eq_ignore_ascii_case(name))
    }
}

/// Public view of a deployed ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipStatus {
    pub class: ShipClass,
    pub origin: Coordinates,
    pub orientation: Orientation,
    pub hits: usize,
    pub destroyed: bool,
}

/// A ship placed on an N×N board, with its hit cells tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    class: ShipClass,
    origin: Coordinates,
    orientation: Orientation,
    cells: Vec<Coordinates>,
    hit: Vec<bool>,
}

impl Ship {
    /// Place a ship at `origin` with `orientation` on a board of `size` cells a side.
    pub fn new(
        class: ShipClass,
        origin: Coordinates,
        orientation: Orientation,
        size: usize,
    ) -> Result<Self, BattlefieldError> {
        let len = class.length();
        let fits = match orientation {
            Orientation::Horizontal => origin.x + len <= size && origin.y < size,
            Orientation::Vertical => origin.y + len <= size && origin.x < size,
        };
        if !fits {
            return Err(BattlefieldError::ShipOutOfBounds);
        }

        let cells = (0..len)
            .map(|i| match orientation {
                Orientation::Horizontal => Coordinates::new(origin.x + i, origin.y),
                Orientation::Vertical => Coordinates::new(origin.x, origin.y + i),
            })
            .collect();
        Ok(Ship {
            class,
            origin,
            orientation,
            cells,
            hit: vec![false; len],
        })
    }

    /// Register a shot at `at`. Returns `true` if it struck this ship.
    pub fn strike(&mut self, at: Coordinates) -> bool {
        match self.cells.iter().position(|cell| *cell == at) {
            Some(i) => {
                self.hit[i] = true;
                true
            }
            None => false,
        }
    }

    pub fn occupies(&self, at: Coordinates) -> bool {
        self.cells.contains(&at)
    }

    /// Whether any cell is shared with `other`.
    pub fn overlaps(&self, other: &Ship) -> bool {
        self.cells.iter().any(|cell| other.occupies(*cell))
    }

    /// Check if the ship is destroyed (all segments hit).
    pub fn is_destroyed(&self) -> bool {
        self.hit.iter().all(|h| *h)
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn cells(&self) -> &[Coordinates] {
        &self.cells
    }

    pub fn status(&self) -> ShipStatus {
        ShipStatus {
            class: self.class,
            origin: self.origin,
            orientation: self.orientation,
            hits: self.hit.iter().filter(|h| **h).count(),
            destroyed: self.is_destroyed(),
        }
    }
}
