//! Registry of active players: activation, invitations and readiness.
//!
//! Every request-driven failure degrades to `false` or `None`; the reason is
//! logged at `debug` level.

use std::sync::Arc;

use crate::battlefield::Battlefield;
use crate::notify::GameInterface;
use crate::player::Player;
use crate::roster::ActivePlayers;
use crate::sessions::SessionDirectory;

pub struct PlayersRegistry {
    roster: Arc<ActivePlayers>,
    sessions: Arc<dyn SessionDirectory>,
    interface: Arc<dyn GameInterface>,
}

impl PlayersRegistry {
    pub fn new(
        roster: Arc<ActivePlayers>,
        sessions: Arc<dyn SessionDirectory>,
        interface: Arc<dyn GameInterface>,
    ) -> Self {
        Self {
            roster,
            sessions,
            interface,
        }
    }

    /// Mark `player` as active. Re-adding a known id changes nothing.
    pub fn add_as_active(&self, player: Player) -> bool {
        let id = player.id().to_string();
        let inserted = self.roster.insert(player);
        if inserted {
            log::info!("player {} is active", id);
        }
        inserted
    }

    /// Drop the player, then end every match they created.
    pub fn remove_from_active(&self, player_id: &str) -> bool {
        // out of the roster first so no new match can be opened for them
        let removed = self.roster.remove(player_id).is_some();
        self.sessions.end_sessions(player_id);
        if removed {
            log::info!("player {} left", player_id);
        }
        removed
    }

    pub fn is_player_active(&self, player_id: &str) -> bool {
        self.roster.contains(player_id)
    }

    pub fn get_player(&self, player_id: &str) -> Option<Player> {
        self.roster.get(player_id)
    }

    /// Snapshot of every active player in activation order.
    pub fn active_players(&self) -> Vec<Player> {
        self.roster.snapshot()
    }

    /// Lobby listing for `player_id`: everyone active but the caller.
    pub fn active_players_except(&self, player_id: &str) -> Vec<Player> {
        self.roster
            .snapshot()
            .into_iter()
            .filter(|p| p.id() != player_id)
            .collect()
    }

    /// Invite `target_id` into the match `sender_id` created.
    pub fn invite_player(&self, target_id: &str, sender_id: &str) -> bool {
        if !self.roster.contains(target_id) {
            log::debug!("invite: target {} is not active", target_id);
            return false;
        }
        let Some(sender) = self.roster.get(sender_id) else {
            log::debug!("invite: sender {} is not active", sender_id);
            return false;
        };
        let Some(session) = self.sessions.find_session(sender_id) else {
            log::debug!("invite: sender {} has no match", sender_id);
            return false;
        };
        if session.creator().id() != sender_id {
            log::debug!("invite: {} did not create match {}", sender_id, session.id());
            return false;
        }

        session.invite(target_id);
        self.interface.send_invite(target_id, &sender);
        true
    }

    /// [`invite_player`](Self::invite_player) with the target given by display name.
    pub fn invite_player_by_name(&self, target_name: &str, sender_id: &str) -> bool {
        match self.roster.find_by_name(target_name) {
            Some(target) => self.invite_player(target.id(), sender_id),
            None => {
                log::debug!("invite: no active player named {}", target_name);
                false
            }
        }
    }

    /// Join the match `sender_id` created. Returns the battlefield of the
    /// joining player.
    ///
    /// The guards and the seating run inside the session directory, under
    /// the same exclusion as match creation.
    pub fn accept_invite(&self, player_id: &str, sender_id: &str) -> Option<Arc<dyn Battlefield>> {
        self.sessions.join_session(player_id, sender_id)
    }

    /// [`accept_invite`](Self::accept_invite) with the sender given by display name.
    pub fn accept_invite_by_name(
        &self,
        player_id: &str,
        sender_name: &str,
    ) -> Option<Arc<dyn Battlefield>> {
        let Some(sender) = self.roster.find_by_name(sender_name) else {
            log::debug!("accept: no active player named {}", sender_name);
            return None;
        };
        self.accept_invite(player_id, sender.id())
    }

    /// Declare `player_id`'s fleet deployed. Returns whether the readiness
    /// flag actually flipped.
    pub fn confirm_ready(&self, player_id: &str) -> bool {
        let Some(session) = self.sessions.find_session(player_id) else {
            log::debug!("ready: {} has no match", player_id);
            return false;
        };
        let Some(battlefield) = session.get_battlefield(player_id) else {
            return false;
        };
        battlefield.set_ready(true)
    }
}
