//! The shared set of active players.
//!
//! Both registries read it: the session registry resolves creator ids through
//! it while the players registry is the one that writes to it.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::player::Player;

#[derive(Debug, Default)]
pub struct ActivePlayers {
    players: RwLock<Vec<Player>>,
}

impl ActivePlayers {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Player>> {
        self.players.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Player>> {
        self.players.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `player` unless its id is already present.
    pub fn insert(&self, player: Player) -> bool {
        let mut players = self.write();
        if players.iter().any(|p| p.id() == player.id()) {
            return false;
        }
        players.push(player);
        true
    }

    pub fn remove(&self, id: &str) -> Option<Player> {
        let mut players = self.write();
        let idx = players.iter().position(|p| p.id() == id)?;
        Some(players.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<Player> {
        self.read().iter().find(|p| p.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().iter().any(|p| p.id() == id)
    }

    /// First active player with the given display name.
    pub fn find_by_name(&self, name: &str) -> Option<Player> {
        self.read().iter().find(|p| p.name() == name).cloned()
    }

    pub fn snapshot(&self) -> Vec<Player> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
