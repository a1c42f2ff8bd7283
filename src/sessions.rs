//! Registry of live matches.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::battlefield::Battlefield;
use crate::config::Level;
use crate::roster::ActivePlayers;
use crate::session::{Match, MatchFactory, MatchId};

/// Lookup and teardown of matches by participant.
pub trait SessionDirectory: Send + Sync {
    /// First live match in which `participant_id` owns a battlefield.
    fn find_session(&self, participant_id: &str) -> Option<Arc<Match>>;

    /// Drop every live match created by `creator_id`. Returns how many went.
    fn end_sessions(&self, creator_id: &str) -> usize;

    /// Seat `player_id` as the opponent in the match `sender_id` created.
    /// Returns the joining player's battlefield.
    fn join_session(&self, player_id: &str, sender_id: &str) -> Option<Arc<dyn Battlefield>>;
}

pub struct SessionRegistry {
    factory: Arc<dyn MatchFactory>,
    roster: Arc<ActivePlayers>,
    sessions: RwLock<Vec<Arc<Match>>>,
    me: Weak<SessionRegistry>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn MatchFactory>, roster: Arc<ActivePlayers>) -> Arc<Self> {
        Arc::new_cyclic(|me| SessionRegistry {
            factory,
            roster,
            sessions: RwLock::new(Vec::new()),
            me: me.clone(),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Match>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Match>>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a match for an active player who is not already playing.
    ///
    /// The registry drops the match on its own once it completes.
    pub fn create_session(&self, creator_id: &str, level: &Level) -> Option<Arc<Match>> {
        let session = {
            let mut sessions = self.write();
            // resolved under the write lock so a concurrent removal cannot
            // leave a match behind for an inactive creator
            let Some(creator) = self.roster.get(creator_id) else {
                log::debug!("create_session: {} is not active", creator_id);
                return None;
            };
            if sessions.iter().any(|s| s.participates(creator_id)) {
                log::debug!("create_session: {} already in a match", creator_id);
                return None;
            }
            let session = self.factory.create(creator, level);
            sessions.push(session.clone());
            session
        };

        let registry = self.me.clone();
        session.completed().subscribe(move |id: &MatchId| {
            if let Some(registry) = registry.upgrade() {
                registry.retire(*id);
            }
        });

        log::info!(
            "match {} created by {} at level {}",
            session.id(),
            creator_id,
            level.id
        );
        Some(session)
    }

    /// Remove the match with `id`. Absent ids are ignored.
    pub fn retire(&self, id: MatchId) -> bool {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|s| s.id() != id);
        let removed = sessions.len() != before;
        if removed {
            log::info!("match {} retired", id);
        }
        removed
    }

    pub fn sessions(&self) -> Vec<Arc<Match>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl SessionDirectory for SessionRegistry {
    fn find_session(&self, participant_id: &str) -> Option<Arc<Match>> {
        self.read()
            .iter()
            .find(|s| {
                s.battlefields()
                    .iter()
                    .flatten()
                    .any(|bf| bf.owner().is_some_and(|o| o.id() == participant_id))
            })
            .cloned()
    }

    fn end_sessions(&self, creator_id: &str) -> usize {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|s| s.creator().id() != creator_id);
        let removed = before - sessions.len();
        if removed > 0 {
            log::info!("ended {} match(es) created by {}", removed, creator_id);
        }
        removed
    }

    fn join_session(&self, player_id: &str, sender_id: &str) -> Option<Arc<dyn Battlefield>> {
        let (session, battlefield) = {
            let sessions = self.write();
            if !self.roster.contains(sender_id) {
                log::debug!("join: sender {} is not active", sender_id);
                return None;
            }
            let Some(player) = self.roster.get(player_id) else {
                log::debug!("join: player {} is not active", player_id);
                return None;
            };
            if let Some(current) = sessions.iter().find(|s| s.participates(player_id)) {
                log::debug!("join: {} already in match {}", player_id, current.id());
                return None;
            }
            let Some(session) = sessions.iter().find(|s| s.creator().id() == sender_id) else {
                log::debug!("join: sender {} has no match", sender_id);
                return None;
            };
            if !session.is_invited(player_id) {
                log::debug!("join: {} not invited to match {}", player_id, session.id());
                return None;
            }
            let battlefield = session.seat_opponent(player)?;
            (session.clone(), battlefield)
        };

        session.announce_deployment();
        Some(battlefield)
    }
}
