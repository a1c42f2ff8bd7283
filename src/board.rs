//! Grid battlefield: ship placements, shots and hit resolution on an N×N board.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use rand::Rng;

use crate::battlefield::{Battlefield, BattlefieldFactory};
use crate::common::{BattlefieldError, Coordinates, Orientation, Shot};
use crate::config::Level;
use crate::event::EventSource;
use crate::player::Player;
use crate::ship::{Ship, ShipClass, ShipStatus};

/// Attempts per ship before random placement gives up.
const PLACEMENT_ATTEMPTS: usize = 100;

/// Column labels for [`GridBattlefield::render`]; wider boards fall back to `?`.
const COLUMNS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

struct Grid {
    ships: Vec<Ship>,
    shots: Vec<bool>,
    ready: bool,
}

/// Main board state: ship placements, shots, readiness and event streams.
pub struct GridBattlefield {
    size: usize,
    level: Level,
    owner: OnceLock<Player>,
    grid: Mutex<Grid>,
    hits: EventSource<Coordinates>,
    readiness: EventSource<bool>,
}

impl GridBattlefield {
    /// Create an empty board sized and provisioned for `level`.
    pub fn new(level: &Level) -> Self {
        let size = level.battlefield_size;
        Self {
            size,
            level: level.clone(),
            owner: OnceLock::new(),
            grid: Mutex::new(Grid {
                ships: Vec::new(),
                shots: vec![false; size * size],
                ready: false,
            }),
            hits: EventSource::new(),
            readiness: EventSource::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index(&self, at: Coordinates) -> Result<usize, BattlefieldError> {
        if at.x >= self.size || at.y >= self.size {
            return Err(BattlefieldError::OutOfBounds(at));
        }
        Ok(at.y * self.size + at.x)
    }

    fn check_placement(
        &self,
        grid: &Grid,
        class: ShipClass,
        origin: Coordinates,
        orientation: Orientation,
    ) -> Result<Ship, BattlefieldError> {
        if grid.ready {
            return Err(BattlefieldError::AlreadyReady);
        }
        let deployed = grid.ships.iter().filter(|s| s.class() == class).count();
        if deployed >= self.level.allowance(class) {
            return Err(BattlefieldError::ShipNotAvailable(class));
        }
        let ship = Ship::new(class, origin, orientation, self.size)?;
        if grid.ships.iter().any(|other| other.overlaps(&ship)) {
            return Err(BattlefieldError::ShipOverlaps);
        }
        Ok(ship)
    }

    /// Draw the board. Ships are only drawn when `reveal` is set.
    ///
    /// `~` water, `O` ship, `X` hit, `.` miss.
    pub fn render(&self, reveal: bool) -> String {
        let grid = self.lock();
        let mut out = String::from("   ");
        for c in 0..self.size {
            out.push(' ');
            out.push(COLUMNS.get(c).map_or('?', |&b| char::from(b)));
        }
        out.push('\n');
        for y in 0..self.size {
            let _ = write!(out, "{:2} ", y + 1);
            for x in 0..self.size {
                let at = Coordinates::new(x, y);
                let shot = grid.shots[y * self.size + x];
                let ship = grid.ships.iter().any(|s| s.occupies(at));
                let ch = match (shot, ship) {
                    (true, true) => 'X',
                    (true, false) => '.',
                    (false, true) if reveal => 'O',
                    _ => '~',
                };
                out.push(' ');
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    /// Number of cells shot at so far.
    pub fn shots_taken(&self) -> usize {
        self.lock().shots.iter().filter(|s| **s).count()
    }
}

impl Battlefield for GridBattlefield {
    fn owner(&self) -> Option<Player> {
        self.owner.get().cloned()
    }

    fn set_owner(&self, owner: Player) -> bool {
        self.owner.set(owner).is_ok()
    }

    fn is_ready(&self) -> bool {
        self.lock().ready
    }

    fn set_ready(&self, ready: bool) -> bool {
        {
            let mut grid = self.lock();
            if grid.ready == ready {
                return false;
            }
            // an empty fleet cannot be declared ready
            if ready && grid.ships.is_empty() {
                return false;
            }
            grid.ready = ready;
        }
        self.readiness.publish(&ready);
        true
    }

    fn ships(&self) -> Vec<ShipStatus> {
        self.lock().ships.iter().map(Ship::status).collect()
    }

    fn has_surviving_ships(&self) -> bool {
        self.lock().ships.iter().any(|s| !s.is_destroyed())
    }

    fn size(&self) -> usize {
        self.size
    }

    fn can_place_ship(
        &self,
        class: ShipClass,
        origin: Coordinates,
        orientation: Orientation,
    ) -> bool {
        let grid = self.lock();
        self.check_placement(&grid, class, origin, orientation).is_ok()
    }

    fn place_ship(
        &self,
        class: ShipClass,
        origin: Coordinates,
        orientation: Orientation,
    ) -> Result<(), BattlefieldError> {
        let mut grid = self.lock();
        let ship = self.check_placement(&grid, class, origin, orientation)?;
        grid.ships.push(ship);
        Ok(())
    }

    fn can_be_hit(&self, at: Coordinates) -> bool {
        let Ok(idx) = self.index(at) else {
            return false;
        };
        let grid = self.lock();
        !grid.shots[idx] && grid.ships.iter().any(|s| !s.is_destroyed())
    }

    fn hit(&self, at: Coordinates) -> Result<Shot, BattlefieldError> {
        let idx = self.index(at)?;
        let (shot, exhausted) = {
            let mut grid = self.lock();
            if grid.shots[idx] {
                return Err(BattlefieldError::AlreadyHit(at));
            }
            grid.shots[idx] = true;
            let shot = match grid.ships.iter_mut().find(|s| s.occupies(at)) {
                Some(ship) => {
                    ship.strike(at);
                    if ship.is_destroyed() {
                        Shot::Sunk(ship.class())
                    } else {
                        Shot::Hit
                    }
                }
                None => Shot::Miss,
            };
            let exhausted =
                shot.is_hit() && grid.ships.iter().all(|s| s.is_destroyed());
            (shot, exhausted)
        };

        // the hit must reach subscribers before the stream completes
        if shot.is_hit() {
            self.hits.publish(&at);
        }
        if exhausted {
            self.hits.complete();
        }
        Ok(shot)
    }

    fn hits(&self) -> &EventSource<Coordinates> {
        &self.hits
    }

    fn readiness(&self) -> &EventSource<bool> {
        &self.readiness
    }
}

/// Builds [`GridBattlefield`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBattlefieldFactory;

impl BattlefieldFactory for GridBattlefieldFactory {
    fn create(&self, level: &Level) -> Arc<dyn Battlefield> {
        Arc::new(GridBattlefield::new(level))
    }
}

/// Returns a random non‐overlapping (origin, orientation) for `class`.
pub fn random_placement<R: Rng>(
    battlefield: &dyn Battlefield,
    class: ShipClass,
    rng: &mut R,
) -> Result<(Coordinates, Orientation), BattlefieldError> {
    let size = battlefield.size();
    if class.length() > size {
        return Err(BattlefieldError::UnableToPlaceShip(class));
    }
    for _ in 0..PLACEMENT_ATTEMPTS {
        let orientation = if rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (max_x, max_y) = match orientation {
            Orientation::Horizontal => (size - class.length(), size - 1),
            Orientation::Vertical => (size - 1, size - class.length()),
        };
        let origin = Coordinates::new(rng.random_range(0..=max_x), rng.random_range(0..=max_y));
        if battlefield.can_place_ship(class, origin, orientation) {
            return Ok((origin, orientation));
        }
    }
    Err(BattlefieldError::UnableToPlaceShip(class))
}

/// Place the whole fleet of `level` at random.
pub fn deploy_fleet<R: Rng>(
    battlefield: &dyn Battlefield,
    level: &Level,
    rng: &mut R,
) -> Result<(), BattlefieldError> {
    for &(class, count) in &level.fleet {
        for _ in 0..count {
            let (origin, orientation) = random_placement(battlefield, class, rng)?;
            battlefield.place_ship(class, origin, orientation)?;
        }
    }
    Ok(())
}
