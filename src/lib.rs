//! Orchestration core of a two-player naval combat game: active players,
//! invitations, match lifecycle, turn order and win detection.

mod battlefield;
mod board;
mod common;
mod config;
pub mod event;
pub mod gunner;
#[cfg(feature = "runtime")]
mod logging;
pub mod notify;
mod player;
pub mod players;
pub mod prelude;
mod roster;
pub mod session;
pub mod sessions;
mod ship;
#[cfg(feature = "runtime")]
pub mod simulation;

pub use battlefield::*;
pub use board::*;
pub use common::*;
pub use config::*;
pub use event::{EventSource, SubscriptionId};
pub use gunner::Gunner;
#[cfg(feature = "runtime")]
pub use logging::{init_logging, parse_level, LOG_ENV};
pub use notify::{GameEvent, GameInterface};
pub use player::*;
pub use players::PlayersRegistry;
pub use roster::ActivePlayers;
pub use session::{DefaultMatchFactory, Match, MatchFactory, MatchId, MatchPhase};
pub use sessions::{SessionDirectory, SessionRegistry};
pub use ship::*;
