//! Notification sink for game progress.
//!
//! The core reports every client-visible transition through [`GameInterface`].
//! Calls are fire-and-forget: an implementation must not block and its
//! failures never roll back the state change that triggered them.

use crate::common::Coordinates;
use crate::player::{Player, PlayerId};
use crate::session::{Match, MatchId};

pub trait GameInterface: Send + Sync {
    /// Tell `target_id` that `sender` invited them.
    fn send_invite(&self, target_id: &str, sender: &Player);

    /// Both players joined; ships can be deployed.
    fn start_deployment(&self, session: &Match);

    /// Both players confirmed their fleets.
    fn finish_deployment(&self, session: &Match);

    fn start_game(&self, session: &Match);

    /// `hit_player`'s battlefield took a hit at `at`.
    fn got_hit(&self, session: &Match, hit_player: &Player, at: Coordinates);

    fn end_game(&self, session: &Match);
}

/// Owned record of one [`GameInterface`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "runtime", serde(tag = "event", rename_all = "snake_case"))]
pub enum GameEvent {
    Invite {
        target: PlayerId,
        sender: Player,
    },
    DeploymentStarted {
        session: MatchId,
        players: Vec<PlayerId>,
        level: u32,
        battlefield_size: usize,
    },
    DeploymentFinished {
        session: MatchId,
    },
    GameStarted {
        session: MatchId,
        first: Option<PlayerId>,
    },
    GotHit {
        session: MatchId,
        player: PlayerId,
        at: Coordinates,
    },
    GameEnded {
        session: MatchId,
        winner: Option<PlayerId>,
    },
}

impl GameEvent {
    /// Match the event belongs to; invites are not tied to one yet.
    pub fn session(&self) -> Option<MatchId> {
        match self {
            GameEvent::Invite { .. } => None,
            GameEvent::DeploymentStarted { session, .. }
            | GameEvent::DeploymentFinished { session }
            | GameEvent::GameStarted { session, .. }
            | GameEvent::GotHit { session, .. }
            | GameEvent::GameEnded { session, .. } => Some(*session),
        }
    }

    pub fn deployment_started(session: &Match) -> Self {
        let mut players = vec![session.creator().id().to_string()];
        if let Some(opponent) = session.opponent() {
            players.push(opponent.id().to_string());
        }
        GameEvent::DeploymentStarted {
            session: session.id(),
            players,
            level: session.level().id,
            battlefield_size: session.battlefield_size(),
        }
    }

    pub fn game_started(session: &Match) -> Self {
        GameEvent::GameStarted {
            session: session.id(),
            first: session.next().map(|p| p.id().to_string()),
        }
    }

    pub fn game_ended(session: &Match) -> Self {
        GameEvent::GameEnded {
            session: session.id(),
            winner: session.winner().map(|p| p.id().to_string()),
        }
    }
}

#[cfg(feature = "runtime")]
pub use channel::{dispatch, ChannelInterface, NotificationHandler};

#[cfg(feature = "runtime")]
mod channel {
    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

    use super::{GameEvent, GameInterface};
    use crate::common::Coordinates;
    use crate::player::Player;
    use crate::session::Match;

    /// [`GameInterface`] that queues [`GameEvent`]s on an unbounded channel.
    #[derive(Debug, Clone)]
    pub struct ChannelInterface {
        tx: UnboundedSender<GameEvent>,
    }

    impl ChannelInterface {
        pub fn new() -> (Self, UnboundedReceiver<GameEvent>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx }, rx)
        }

        fn emit(&self, event: GameEvent) {
            if let Err(err) = self.tx.send(event) {
                log::warn!("notification dropped, receiver closed: {:?}", err.0);
            }
        }
    }

    impl GameInterface for ChannelInterface {
        fn send_invite(&self, target_id: &str, sender: &Player) {
            self.emit(GameEvent::Invite {
                target: target_id.to_string(),
                sender: sender.clone(),
            });
        }

        fn start_deployment(&self, session: &Match) {
            self.emit(GameEvent::deployment_started(session));
        }

        fn finish_deployment(&self, session: &Match) {
            self.emit(GameEvent::DeploymentFinished {
                session: session.id(),
            });
        }

        fn start_game(&self, session: &Match) {
            self.emit(GameEvent::game_started(session));
        }

        fn got_hit(&self, session: &Match, hit_player: &Player, at: Coordinates) {
            self.emit(GameEvent::GotHit {
                session: session.id(),
                player: hit_player.id().to_string(),
                at,
            });
        }

        fn end_game(&self, session: &Match) {
            self.emit(GameEvent::game_ended(session));
        }
    }

    /// Consumer of queued notifications, e.g. a connection hub.
    #[async_trait::async_trait]
    pub trait NotificationHandler: Send {
        async fn handle(&mut self, event: GameEvent) -> anyhow::Result<()>;
    }

    /// Drain `rx` into `handler` until every sender is dropped. Handler
    /// failures are logged and skipped. Returns the number of events handled
    /// successfully.
    pub async fn dispatch<H: NotificationHandler>(
        mut rx: UnboundedReceiver<GameEvent>,
        handler: &mut H,
    ) -> usize {
        let mut delivered = 0;
        while let Some(event) = rx.recv().await {
            match handler.handle(event).await {
                Ok(()) => delivered += 1,
                Err(e) => log::warn!("notification handler failed: {}", e),
            }
        }
        delivered
    }
}
