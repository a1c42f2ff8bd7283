#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use battleship_arena::{
    ActivePlayers, Battlefield, BattlefieldError, BattlefieldFactory, Coordinates,
    DefaultMatchFactory, EventSource, GameEvent, GameInterface, Level, Match, Orientation, Player,
    PlayersRegistry, SessionDirectory, SessionRegistry, ShipClass, ShipStatus, Shot,
};

/// Game interface that keeps every call as a [`GameEvent`].
#[derive(Default)]
pub struct RecordingInterface {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingInterface {
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    pub fn invites(&self) -> usize {
        self.count(|e| matches!(e, GameEvent::Invite { .. }))
    }

    pub fn started(&self) -> usize {
        self.count(|e| matches!(e, GameEvent::GameStarted { .. }))
    }

    pub fn ended(&self) -> usize {
        self.count(|e| matches!(e, GameEvent::GameEnded { .. }))
    }

    fn push(&self, event: GameEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl GameInterface for RecordingInterface {
    fn send_invite(&self, target_id: &str, sender: &Player) {
        self.push(GameEvent::Invite {
            target: target_id.to_string(),
            sender: sender.clone(),
        });
    }

    fn start_deployment(&self, session: &Match) {
        self.push(GameEvent::deployment_started(session));
    }

    fn finish_deployment(&self, session: &Match) {
        self.push(GameEvent::DeploymentFinished {
            session: session.id(),
        });
    }

    fn start_game(&self, session: &Match) {
        self.push(GameEvent::game_started(session));
    }

    fn got_hit(&self, session: &Match, hit_player: &Player, at: Coordinates) {
        self.push(GameEvent::GotHit {
            session: session.id(),
            player: hit_player.id().to_string(),
            at,
        });
    }

    fn end_game(&self, session: &Match) {
        self.push(GameEvent::game_ended(session));
    }
}

/// Battlefield whose state is driven directly by the test.
pub struct FakeBattlefield {
    size: usize,
    owner: OnceLock<Player>,
    ready: AtomicBool,
    afloat: AtomicBool,
    shots: AtomicUsize,
    hits: EventSource<Coordinates>,
    readiness: EventSource<bool>,
}

impl FakeBattlefield {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            owner: OnceLock::new(),
            ready: AtomicBool::new(false),
            afloat: AtomicBool::new(true),
            shots: AtomicUsize::new(0),
            hits: EventSource::new(),
            readiness: EventSource::new(),
        }
    }

    /// Publish a hit without touching the fleet.
    pub fn strike(&self, at: Coordinates) {
        self.hits.publish(&at);
    }

    /// Destroy the fleet: one last hit, then the hit stream completes.
    pub fn destroy(&self, at: Coordinates) {
        self.afloat.store(false, Ordering::SeqCst);
        self.hits.publish(&at);
        self.hits.complete();
    }

    /// Publish a readiness value again without changing the flag.
    pub fn repeat_readiness(&self) {
        let ready = self.ready.load(Ordering::SeqCst);
        self.readiness.publish(&ready);
    }

    pub fn shots(&self) -> usize {
        self.shots.load(Ordering::SeqCst)
    }
}

impl Battlefield for FakeBattlefield {
    fn owner(&self) -> Option<Player> {
        self.owner.get().cloned()
    }

    fn set_owner(&self, owner: Player) -> bool {
        self.owner.set(owner).is_ok()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn set_ready(&self, ready: bool) -> bool {
        if self.ready.swap(ready, Ordering::SeqCst) == ready {
            return false;
        }
        self.readiness.publish(&ready);
        true
    }

    fn ships(&self) -> Vec<ShipStatus> {
        vec![ShipStatus {
            class: ShipClass::Corvette,
            origin: Coordinates::new(0, 0),
            orientation: Orientation::Horizontal,
            hits: 0,
            destroyed: !self.afloat.load(Ordering::SeqCst),
        }]
    }

    fn size(&self) -> usize {
        self.size
    }

    fn can_place_ship(&self, _: ShipClass, _: Coordinates, _: Orientation) -> bool {
        true
    }

    fn place_ship(&self, _: ShipClass, _: Coordinates, _: Orientation) -> Result<(), BattlefieldError> {
        Ok(())
    }

    fn can_be_hit(&self, at: Coordinates) -> bool {
        at.x < self.size && at.y < self.size && self.afloat.load(Ordering::SeqCst)
    }

    fn hit(&self, at: Coordinates) -> Result<Shot, BattlefieldError> {
        if at.x >= self.size || at.y >= self.size {
            return Err(BattlefieldError::OutOfBounds(at));
        }
        self.shots.fetch_add(1, Ordering::SeqCst);
        self.hits.publish(&at);
        Ok(Shot::Hit)
    }

    fn hits(&self) -> &EventSource<Coordinates> {
        &self.hits
    }

    fn readiness(&self) -> &EventSource<bool> {
        &self.readiness
    }
}

/// Builds [`FakeBattlefield`]s and keeps them, in creation order.
#[derive(Default)]
pub struct FakeFactory {
    built: Mutex<Vec<Arc<FakeBattlefield>>>,
}

impl FakeFactory {
    pub fn built(&self) -> Vec<Arc<FakeBattlefield>> {
        self.built.lock().unwrap().clone()
    }

    pub fn get(&self, idx: usize) -> Arc<FakeBattlefield> {
        self.built()[idx].clone()
    }
}

impl BattlefieldFactory for FakeFactory {
    fn create(&self, level: &Level) -> Arc<dyn Battlefield> {
        let battlefield = Arc::new(FakeBattlefield::new(level.battlefield_size));
        self.built.lock().unwrap().push(battlefield.clone());
        battlefield
    }
}

/// Session directory that serves one fixed match and records teardown and
/// join calls. With `roster` set, each teardown also notes whether the creator
/// was still active at that point.
#[derive(Default)]
pub struct FakeSessions {
    pub session: Mutex<Option<Arc<Match>>>,
    pub ended: Mutex<Vec<String>>,
    pub joined: Mutex<Vec<(String, String)>>,
    pub roster: OnceLock<Arc<ActivePlayers>>,
    pub active_at_end: Mutex<Vec<bool>>,
}

impl SessionDirectory for FakeSessions {
    fn find_session(&self, participant_id: &str) -> Option<Arc<Match>> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .filter(|s| s.get_battlefield(participant_id).is_some())
    }

    fn end_sessions(&self, creator_id: &str) -> usize {
        self.ended.lock().unwrap().push(creator_id.to_string());
        if let Some(roster) = self.roster.get() {
            self.active_at_end
                .lock()
                .unwrap()
                .push(roster.contains(creator_id));
        }
        0
    }

    fn join_session(&self, player_id: &str, sender_id: &str) -> Option<Arc<dyn Battlefield>> {
        self.joined
            .lock()
            .unwrap()
            .push((player_id.to_string(), sender_id.to_string()));
        let session = self.session.lock().unwrap().clone()?;
        session.add_opponent(player(player_id))
    }
}

pub fn level() -> Level {
    Level::new(1, 8, vec![(ShipClass::Corvette, 1)])
}

pub fn player(id: &str) -> Player {
    Player::new(id, id.to_uppercase())
}

/// Fully wired registries over fake battlefields.
pub struct Arena {
    pub roster: Arc<ActivePlayers>,
    pub sessions: Arc<SessionRegistry>,
    pub players: PlayersRegistry,
    pub interface: Arc<RecordingInterface>,
    pub boards: Arc<FakeFactory>,
}

impl Arena {
    pub fn new() -> Self {
        let interface = Arc::new(RecordingInterface::default());
        let boards = Arc::new(FakeFactory::default());
        let roster = Arc::new(ActivePlayers::new());
        let sessions = SessionRegistry::new(
            Arc::new(DefaultMatchFactory::new(boards.clone(), interface.clone())),
            roster.clone(),
        );
        let players = PlayersRegistry::new(roster.clone(), sessions.clone(), interface.clone());
        Self {
            roster,
            sessions,
            players,
            interface,
            boards,
        }
    }

    /// Activate every id in `ids`.
    pub fn with_players(ids: &[&str]) -> Self {
        let arena = Self::new();
        for id in ids {
            arena.players.add_as_active(player(id));
        }
        arena
    }

    /// Create a match for `creator` and bring `opponent` in through an invite.
    pub fn join(&self, creator: &str, opponent: &str) -> Arc<Match> {
        let session = self.sessions.create_session(creator, &level()).unwrap();
        assert!(self.players.invite_player(opponent, creator));
        assert!(self.players.accept_invite(opponent, creator).is_some());
        session
    }
}
