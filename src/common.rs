//! Common types for the arena: coordinates, shot results and battlefield errors.

use core::fmt;

use crate::ship::ShipClass;

/// A cell on a battlefield, `x` is the column and `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    pub x: usize,
    pub y: usize,
}

impl Coordinates {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Result of a shot fired at a battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub enum Shot {
    /// Shot missed all ships.
    Miss,
    /// Shot hit an undestroyed ship segment.
    Hit,
    /// Shot destroyed a ship, carrying its class.
    Sunk(ShipClass),
}

impl Shot {
    /// Whether the shot landed on a ship.
    pub fn is_hit(&self) -> bool {
        !matches!(self, Shot::Miss)
    }
}

/// Errors returned by battlefield operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattlefieldError {
    /// Cell lies outside the board.
    OutOfBounds(Coordinates),
    /// Ship would not fit on the board from this origin.
    ShipOutOfBounds,
    /// Ship placement overlaps another ship.
    ShipOverlaps,
    /// The level does not allow another ship of this class.
    ShipNotAvailable(ShipClass),
    /// Fleet is locked once the owner confirmed readiness.
    AlreadyReady,
    /// Cell was already shot at.
    AlreadyHit(Coordinates),
    /// Random placement gave up.
    UnableToPlaceShip(ShipClass),
}

impl fmt::Display for BattlefieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattlefieldError::OutOfBounds(at) => write!(f, "Cell {} is out of bounds", at),
            BattlefieldError::ShipOutOfBounds => write!(f, "Ship placement is out of bounds"),
            BattlefieldError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BattlefieldError::ShipNotAvailable(class) => {
                write!(f, "No {} left to deploy at this level", class.name())
            }
            BattlefieldError::AlreadyReady => write!(f, "Fleet is already confirmed as ready"),
            BattlefieldError::AlreadyHit(at) => write!(f, "Cell {} was already shot at", at),
            BattlefieldError::UnableToPlaceShip(class) => {
                write!(f, "Unable to place {}", class.name())
            }
        }
    }
}

impl std::error::Error for BattlefieldError {}
