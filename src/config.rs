use crate::ship::ShipClass;

/// Smallest board a level may use.
pub const MIN_BATTLEFIELD_SIZE: usize = 5;
/// Largest board a level may use; the CLI renders columns as letters.
pub const MAX_BATTLEFIELD_SIZE: usize = 26;

/// A playable level: board size and the fleet each player may deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "runtime", derive(serde::Serialize, serde::Deserialize))]
pub struct Level {
    pub id: u32,
    pub battlefield_size: usize,
    pub fleet: Vec<(ShipClass, usize)>,
}

impl Level {
    pub fn new(id: u32, battlefield_size: usize, fleet: Vec<(ShipClass, usize)>) -> Self {
        Self {
            id,
            battlefield_size,
            fleet,
        }
    }

    /// How many ships of `class` may be deployed.
    pub fn allowance(&self, class: ShipClass) -> usize {
        self.fleet
            .iter()
            .filter(|(c, _)| *c == class)
            .map(|(_, n)| *n)
            .sum()
    }

    /// Total number of ships in the fleet.
    pub fn fleet_size(&self) -> usize {
        self.fleet.iter().map(|(_, n)| *n).sum()
    }

    /// Total number of ship segments in the fleet.
    pub fn fleet_cells(&self) -> usize {
        self.fleet.iter().map(|(c, n)| c.length() * n).sum()
    }
}

/// The standard level catalogue.
pub fn standard_levels() -> Vec<Level> {
    vec![
        Level::new(1, 8, vec![(ShipClass::Corvette, 4), (ShipClass::Frigate, 1)]),
        Level::new(2, 10, vec![(ShipClass::Corvette, 4), (ShipClass::Frigate, 2)]),
        Level::new(
            3,
            12,
            vec![
                (ShipClass::Corvette, 4),
                (ShipClass::Frigate, 2),
                (ShipClass::Destroyer, 1),
            ],
        ),
    ]
}

/// Read-only catalogue of levels offered to players.
#[derive(Debug, Clone)]
pub struct LevelsRepository {
    levels: Vec<Level>,
}

impl LevelsRepository {
    pub fn new() -> Self {
        Self::with_levels(standard_levels())
    }

    /// Build a catalogue from custom levels. Levels with a board outside
    /// `MIN_BATTLEFIELD_SIZE..=MAX_BATTLEFIELD_SIZE` are skipped.
    pub fn with_levels(levels: Vec<Level>) -> Self {
        let levels = levels
            .into_iter()
            .filter(|level| {
                let ok = (MIN_BATTLEFIELD_SIZE..=MAX_BATTLEFIELD_SIZE)
                    .contains(&level.battlefield_size);
                if !ok {
                    log::warn!(
                        "skipping level {} with unsupported board size {}",
                        level.id,
                        level.battlefield_size
                    );
                }
                ok
            })
            .collect();
        Self { levels }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }
}

impl Default for LevelsRepository {
    fn default() -> Self {
        Self::new()
    }
}
