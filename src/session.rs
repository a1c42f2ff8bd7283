//! A single two-player match, from creation through completion.
//!
//! The match owns two battlefield slots (creator first, opponent second) and
//! listens to their event streams:
//!
//! ```text
//!  AwaitingOpponent ──add_opponent──▶ Deploying ──both ready──▶ Active
//!                                                                 │
//!                                    hit stream completes ◀───────┘
//!                                             │
//!                                             ▼
//!                                         Completed
//! ```
//!
//! The phase is derived from the fields on every query and never stored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::battlefield::{Battlefield, BattlefieldFactory};
use crate::common::{Coordinates, Shot};
use crate::config::Level;
use crate::event::EventSource;
use crate::notify::GameInterface;
use crate::player::{Player, PlayerId};

pub type MatchId = u64;

static NEXT_MATCH_ID: AtomicU64 = AtomicU64::new(1);

const CREATOR: usize = 0;
const OPPONENT: usize = 1;

/// Derived lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchPhase {
    AwaitingOpponent,
    Deploying,
    Active,
    Completed,
}

struct MatchState {
    opponent: Option<Player>,
    battlefields: [Option<Arc<dyn Battlefield>>; 2],
    invited: Vec<PlayerId>,
    next: Option<Player>,
    started: bool,
}

pub struct Match {
    id: MatchId,
    creator: Player,
    level: Level,
    battlefield_factory: Arc<dyn BattlefieldFactory>,
    interface: Arc<dyn GameInterface>,
    state: Mutex<MatchState>,
    completed: EventSource<MatchId>,
    me: Weak<Match>,
}

impl Match {
    /// Create a match for `creator` and build the creator's battlefield.
    pub fn new(
        creator: Player,
        level: Level,
        battlefield_factory: Arc<dyn BattlefieldFactory>,
        interface: Arc<dyn GameInterface>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Match>| {
            let battlefield = battlefield_factory.create(&level);
            battlefield.set_owner(creator.clone());
            wire(me, creator.clone(), &battlefield);

            Match {
                id: NEXT_MATCH_ID.fetch_add(1, Ordering::Relaxed),
                creator,
                level,
                battlefield_factory,
                interface,
                state: Mutex::new(MatchState {
                    opponent: None,
                    battlefields: [Some(battlefield), None],
                    invited: Vec::new(),
                    next: None,
                    started: false,
                }),
                completed: EventSource::new(),
                me: me.clone(),
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, MatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn creator(&self) -> &Player {
        &self.creator
    }

    pub fn opponent(&self) -> Option<Player> {
        self.lock().opponent.clone()
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn battlefield_size(&self) -> usize {
        self.level.battlefield_size
    }

    /// Both slots, creator first. The opponent slot is empty until someone joins.
    pub fn battlefields(&self) -> [Option<Arc<dyn Battlefield>>; 2] {
        self.lock().battlefields.clone()
    }

    /// Player expected to act next.
    pub fn next(&self) -> Option<Player> {
        self.lock().next.clone()
    }

    /// Fires once with the match id when one side's fleet is destroyed.
    pub fn completed(&self) -> &EventSource<MatchId> {
        &self.completed
    }

    pub fn is_completed(&self) -> bool {
        self.completed.is_completed()
    }

    /// Opponent present, both fleets ready, and both still afloat.
    pub fn is_active(&self) -> bool {
        let state = self.lock();
        state.opponent.is_some()
            && state.battlefields.iter().all(|slot| {
                slot.as_ref()
                    .is_some_and(|bf| bf.is_ready() && bf.has_surviving_ships())
            })
    }

    pub fn phase(&self) -> MatchPhase {
        if self.is_completed() {
            MatchPhase::Completed
        } else if self.is_active() {
            MatchPhase::Active
        } else if self.lock().opponent.is_some() {
            MatchPhase::Deploying
        } else {
            MatchPhase::AwaitingOpponent
        }
    }

    /// Whether `player_id` is the creator or the opponent.
    pub fn participates(&self, player_id: &str) -> bool {
        self.creator.id() == player_id
            || self
                .lock()
                .opponent
                .as_ref()
                .is_some_and(|p| p.id() == player_id)
    }

    /// Add `player_id` to the invite list. Returns `false` if already there.
    pub fn invite(&self, player_id: &str) -> bool {
        let mut state = self.lock();
        if state.invited.iter().any(|id| id == player_id) {
            return false;
        }
        state.invited.push(player_id.to_string());
        true
    }

    pub fn is_invited(&self, player_id: &str) -> bool {
        self.lock().invited.iter().any(|id| id == player_id)
    }

    pub fn invited_players(&self) -> Vec<PlayerId> {
        self.lock().invited.clone()
    }

    /// Seat `opponent` and build their battlefield.
    ///
    /// No-op while an opponent is already seated, once the match completed,
    /// or when `opponent` is the creator.
    pub fn add_opponent(&self, opponent: Player) -> Option<Arc<dyn Battlefield>> {
        let battlefield = self.seat_opponent(opponent)?;
        self.announce_deployment();
        Some(battlefield)
    }

    /// Seating half of [`add_opponent`](Self::add_opponent); sends nothing.
    pub(crate) fn seat_opponent(&self, opponent: Player) -> Option<Arc<dyn Battlefield>> {
        let mut state = self.lock();
        if state.opponent.is_some() || self.is_completed() || opponent.id() == self.creator.id() {
            log::debug!("match {}: rejected opponent {}", self.id, opponent.id());
            return None;
        }
        let battlefield = self.battlefield_factory.create(&self.level);
        battlefield.set_owner(opponent.clone());
        wire(&self.me, opponent.clone(), &battlefield);
        state.battlefields[OPPONENT] = Some(battlefield.clone());
        state.opponent = Some(opponent);
        Some(battlefield)
    }

    pub(crate) fn announce_deployment(&self) {
        log::info!("match {}: deployment started", self.id);
        self.interface.start_deployment(self);
    }

    /// Battlefield owned by `player_id`.
    pub fn get_battlefield(&self, player_id: &str) -> Option<Arc<dyn Battlefield>> {
        self.lock()
            .battlefields
            .iter()
            .flatten()
            .find(|bf| bf.owner().is_some_and(|o| o.id() == player_id))
            .cloned()
    }

    /// Battlefield of `player_id`'s adversary. `None` for anyone who is not
    /// the creator or the current opponent.
    pub fn get_opponent_battlefield(&self, player_id: &str) -> Option<Arc<dyn Battlefield>> {
        let state = self.lock();
        if self.creator.id() == player_id {
            state.battlefields[OPPONENT].clone()
        } else if state.opponent.as_ref().is_some_and(|p| p.id() == player_id) {
            state.battlefields[CREATOR].clone()
        } else {
            None
        }
    }

    /// Whether `attacker_id` may currently shoot at `at`.
    pub fn can_be_hit(&self, attacker_id: &str, at: Coordinates) -> bool {
        self.target_for(attacker_id)
            .is_some_and(|target| target.can_be_hit(at))
    }

    /// Shoot at the attacker's adversary. Only the player holding the turn of
    /// an active match may fire; anything else, including an invalid cell,
    /// yields `None`.
    pub fn fire(&self, attacker_id: &str, at: Coordinates) -> Option<Shot> {
        let target = self.target_for(attacker_id)?;
        match target.hit(at) {
            Ok(shot) => Some(shot),
            Err(e) => {
                log::debug!("match {}: shot by {} rejected: {}", self.id, attacker_id, e);
                None
            }
        }
    }

    fn target_for(&self, attacker_id: &str) -> Option<Arc<dyn Battlefield>> {
        if !self.is_active() {
            return None;
        }
        let holds_turn = self.lock().next.as_ref().is_some_and(|p| p.id() == attacker_id);
        if !holds_turn {
            return None;
        }
        self.get_opponent_battlefield(attacker_id)
    }

    /// Owner of the only battlefield with ships left, once the other fleet is gone.
    pub fn winner(&self) -> Option<Player> {
        let state = self.lock();
        let [Some(first), Some(second)] = &state.battlefields else {
            return None;
        };
        match (first.has_surviving_ships(), second.has_surviving_ships()) {
            (true, false) => first.owner(),
            (false, true) => second.owner(),
            _ => None,
        }
    }

    fn on_readiness_changed(&self) {
        let start = {
            let mut state = self.lock();
            let both_ready = state
                .battlefields
                .iter()
                .all(|slot| slot.as_ref().is_some_and(|bf| bf.is_ready()));
            if state.started || state.opponent.is_none() || !both_ready {
                false
            } else {
                state.started = true;
                state.next = Some(self.creator.clone());
                true
            }
        };
        if start {
            log::info!("match {}: game started", self.id);
            self.interface.finish_deployment(self);
            self.interface.start_game(self);
        }
    }

    fn on_hit(&self, owner: &Player, at: Coordinates) {
        // turns are over once the match completed
        if self.is_completed() {
            return;
        }
        self.lock().next = Some(owner.clone());
        log::debug!("match {}: {} hit at {}", self.id, owner.id(), at);
        self.interface.got_hit(self, owner, at);
    }

    fn on_exhausted(&self) {
        if !self.completed.publish_once(&self.id) {
            return;
        }
        self.lock().next = None;
        log::info!("match {}: game ended", self.id);
        self.interface.end_game(self);
    }
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("id", &self.id)
            .field("creator", &self.creator)
            .field("opponent", &self.opponent())
            .field("level", &self.level.id)
            .field("phase", &self.phase())
            .finish()
    }
}

/// Route a battlefield's streams into the match behind `me`.
fn wire(me: &Weak<Match>, owner: Player, battlefield: &Arc<dyn Battlefield>) {
    let on_hit = me.clone();
    let on_exhausted = me.clone();
    battlefield.hits().subscribe_with(
        move |at: &Coordinates| {
            if let Some(session) = on_hit.upgrade() {
                session.on_hit(&owner, *at);
            }
        },
        move || {
            if let Some(session) = on_exhausted.upgrade() {
                session.on_exhausted();
            }
        },
    );

    let on_ready = me.clone();
    battlefield.readiness().subscribe(move |_: &bool| {
        if let Some(session) = on_ready.upgrade() {
            session.on_readiness_changed();
        }
    });
}

/// Builds matches for the session registry.
pub trait MatchFactory: Send + Sync {
    fn create(&self, creator: Player, level: &Level) -> Arc<Match>;
}

/// Creates [`Match`]es backed by a battlefield factory and a game interface.
#[derive(Clone)]
pub struct DefaultMatchFactory {
    battlefields: Arc<dyn BattlefieldFactory>,
    interface: Arc<dyn GameInterface>,
}

impl DefaultMatchFactory {
    pub fn new(
        battlefields: Arc<dyn BattlefieldFactory>,
        interface: Arc<dyn GameInterface>,
    ) -> Self {
        Self {
            battlefields,
            interface,
        }
    }
}

impl MatchFactory for DefaultMatchFactory {
    fn create(&self, creator: Player, level: &Level) -> Arc<Match> {
        Match::new(
            creator,
            level.clone(),
            self.battlefields.clone(),
            self.interface.clone(),
        )
    }
}
