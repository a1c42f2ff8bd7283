//! Self-playing match between two AI gunners, driven through the registries.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Context};
use rand::{rngs::SmallRng, SeedableRng};

use crate::battlefield::{Battlefield, BattlefieldFactory};
use crate::board::{deploy_fleet, GridBattlefield};
use crate::config::Level;
use crate::gunner::Gunner;
use crate::notify::{dispatch, ChannelInterface, GameEvent, GameInterface, NotificationHandler};
use crate::player::{Player, PlayerId};
use crate::players::PlayersRegistry;
use crate::roster::ActivePlayers;
use crate::session::{DefaultMatchFactory, MatchId};
use crate::sessions::{SessionDirectory, SessionRegistry};

/// Outcome of [`simulate`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct SimulationReport {
    pub session: MatchId,
    pub level: u32,
    pub winner: Option<PlayerId>,
    /// Shots fired by both sides, misses included.
    pub shots: usize,
    /// Notifications the handler accepted.
    pub events: usize,
    /// Final boards, creator first, ships revealed.
    pub boards: Vec<String>,
}

/// Handler that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct CollectingHandler {
    pub events: Vec<GameEvent>,
}

#[async_trait::async_trait]
impl NotificationHandler for CollectingHandler {
    async fn handle(&mut self, event: GameEvent) -> anyhow::Result<()> {
        self.events.push(event);
        Ok(())
    }
}

/// Grid factory that remembers what it built so boards can be drawn later.
#[derive(Default)]
struct RecordingFactory {
    built: Mutex<Vec<Arc<GridBattlefield>>>,
}

impl RecordingFactory {
    fn render_all(&self) -> Vec<String> {
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|bf| bf.render(true))
            .collect()
    }
}

impl BattlefieldFactory for RecordingFactory {
    fn create(&self, level: &Level) -> Arc<dyn Battlefield> {
        let battlefield = Arc::new(GridBattlefield::new(level));
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(battlefield.clone());
        battlefield
    }
}

/// Play one match on `level` between two AI players and feed every
/// notification to `handler`. The same seed always yields the same game.
pub async fn simulate<H>(
    level: &Level,
    seed: u64,
    mut handler: H,
) -> anyhow::Result<(SimulationReport, H)>
where
    H: NotificationHandler + 'static,
{
    let (channel, rx) = ChannelInterface::new();
    let notifier = tokio::spawn(async move {
        let delivered = dispatch(rx, &mut handler).await;
        (delivered, handler)
    });

    let boards = Arc::new(RecordingFactory::default());
    let (session_id, winner, shots) = {
        let interface: Arc<dyn GameInterface> = Arc::new(channel);
        let roster = Arc::new(ActivePlayers::new());
        let sessions = SessionRegistry::new(
            Arc::new(DefaultMatchFactory::new(boards.clone(), interface.clone())),
            roster.clone(),
        );
        let directory: Arc<dyn SessionDirectory> = sessions.clone();
        let players = PlayersRegistry::new(roster, directory, interface);

        let alpha = Player::new("alpha", "Alpha");
        let bravo = Player::new("bravo", "Bravo");
        players.add_as_active(alpha.clone());
        players.add_as_active(bravo.clone());

        let session = sessions
            .create_session(alpha.id(), level)
            .ok_or_else(|| anyhow!("could not create a match at level {}", level.id))?;
        if !players.invite_player(bravo.id(), alpha.id()) {
            return Err(anyhow!("invite rejected"));
        }
        players
            .accept_invite(bravo.id(), alpha.id())
            .ok_or_else(|| anyhow!("invite could not be accepted"))?;

        let mut rng = SmallRng::seed_from_u64(seed);
        for battlefield in session.battlefields().iter().flatten() {
            deploy_fleet(battlefield.as_ref(), level, &mut rng).context("fleet deployment")?;
        }
        for player in [&alpha, &bravo] {
            if !players.confirm_ready(player.id()) {
                return Err(anyhow!("{} could not confirm readiness", player.id()));
            }
        }

        let mut gunners = [Gunner::new(level), Gunner::new(level)];
        let max_shots = 2 * level.battlefield_size * level.battlefield_size;
        let mut shots = 0;
        while !session.is_completed() {
            if shots >= max_shots {
                return Err(anyhow!("match {} did not finish", session.id()));
            }
            let attacker = session
                .next()
                .ok_or_else(|| anyhow!("match {} has no player to move", session.id()))?;
            let gunner = &mut gunners[usize::from(attacker.id() != alpha.id())];
            let at = gunner
                .select_target(&mut rng)
                .ok_or_else(|| anyhow!("{} has no cell left to shoot", attacker.id()))?;
            let shot = session
                .fire(attacker.id(), at)
                .ok_or_else(|| anyhow!("shot by {} at {} rejected", attacker.id(), at))?;
            log::debug!("{} fires at {}: {:?}", attacker.id(), at, shot);
            gunner.record(at, shot);
            shots += 1;
        }

        let winner = session.winner().map(|p| p.id().to_string());
        (session.id(), winner, shots)
    };

    // every sender is gone once the registries are dropped
    let (events, handler) = notifier.await.context("notification task")?;

    let report = SimulationReport {
        session: session_id,
        level: level.id,
        winner,
        shots,
        events,
        boards: boards.render_all(),
    };
    Ok((report, handler))
}
