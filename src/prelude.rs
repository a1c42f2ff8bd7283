//! Commonly used types and utilities for ease of import.

pub use crate::{
    ActivePlayers, Battlefield, BattlefieldFactory, Coordinates, DefaultMatchFactory, GameEvent,
    GameInterface, GridBattlefield, GridBattlefieldFactory, Level, LevelsRepository, Match,
    MatchFactory, Orientation, Player, PlayersRegistry, SessionDirectory, SessionRegistry,
    ShipClass, Shot,
};

#[cfg(feature = "runtime")]
pub use crate::notify::{dispatch, ChannelInterface, NotificationHandler};
#[cfg(feature = "runtime")]
pub use crate::simulation::{simulate, SimulationReport};
