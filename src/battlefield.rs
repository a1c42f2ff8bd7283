//! Capability contract of a player's board.
//!
//! A match only talks to battlefields through [`Battlefield`]; the grid
//! geometry behind it is up to the implementation (see
//! [`GridBattlefield`](crate::board::GridBattlefield)).

use std::sync::Arc;

use crate::common::{BattlefieldError, Coordinates, Orientation, Shot};
use crate::config::Level;
use crate::event::EventSource;
use crate::player::Player;
use crate::ship::{ShipClass, ShipStatus};

pub trait Battlefield: Send + Sync {
    /// Owner of the board, absent until assigned.
    fn owner(&self) -> Option<Player>;

    /// Assign the owner. Returns `false` if the board is already owned.
    fn set_owner(&self, owner: Player) -> bool;

    fn is_ready(&self) -> bool;

    /// Change the readiness flag. Returns `true` only if the flag changed, in
    /// which case the new value is published on [`Battlefield::readiness`].
    fn set_ready(&self, ready: bool) -> bool;

    /// Status of every deployed ship.
    fn ships(&self) -> Vec<ShipStatus>;

    /// Whether at least one deployed ship is still afloat.
    fn has_surviving_ships(&self) -> bool {
        self.ships().iter().any(|ship| !ship.destroyed)
    }

    /// Board side length in cells.
    fn size(&self) -> usize;

    fn can_place_ship(&self, class: ShipClass, origin: Coordinates, orientation: Orientation)
        -> bool;

    fn place_ship(
        &self,
        class: ShipClass,
        origin: Coordinates,
        orientation: Orientation,
    ) -> Result<(), BattlefieldError>;

    /// Whether a shot at `at` would be accepted.
    fn can_be_hit(&self, at: Coordinates) -> bool;

    /// Fire at `at`. Hits are published on [`Battlefield::hits`]; the stream
    /// completes right after the hit that destroys the last ship.
    fn hit(&self, at: Coordinates) -> Result<Shot, BattlefieldError>;

    fn hits(&self) -> &EventSource<Coordinates>;

    fn readiness(&self) -> &EventSource<bool>;
}

/// Builds fresh battlefields sized for a level.
pub trait BattlefieldFactory: Send + Sync {
    fn create(&self, level: &Level) -> Arc<dyn Battlefield>;
}
