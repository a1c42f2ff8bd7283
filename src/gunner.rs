// Probability-based targeting against an opponent battlefield of any size.

use rand::Rng;

use crate::common::{Coordinates, Orientation, Shot};
use crate::config::Level;

/// Weight multiplier per observed hit a placement covers.
const HIT_BIAS: f64 = 10.0;

/// Sampling temperature; below 1 favours the most likely cells.
const TEMPERATURE: f64 = 0.5;

/// Compute a probability density over all unguessed cells of a `size`×`size`
/// grid given the known hits and misses (row-major, `y * size + x`) and the
/// lengths of the ships still afloat. Each entry sums the relative likelihood
/// of a ship segment occupying that cell; the result is normalized.
pub fn calc_pdf(size: usize, hits: &[bool], misses: &[bool], remaining: &[usize]) -> Vec<f64> {
    let mut matrix = vec![0.0f64; size * size];

    for &len in remaining {
        if len == 0 || len > size {
            continue;
        }
        for orient in [Orientation::Horizontal, Orientation::Vertical] {
            let (max_x, max_y) = match orient {
                Orientation::Horizontal => (size - len + 1, size),
                Orientation::Vertical => (size, size - len + 1),
            };
            for y in 0..max_y {
                for x in 0..max_x {
                    let cells = (0..len).map(|k| match orient {
                        Orientation::Horizontal => y * size + x + k,
                        Orientation::Vertical => (y + k) * size + x,
                    });
                    if cells.clone().any(|i| misses[i]) {
                        continue;
                    }
                    let n_hits = cells.clone().filter(|&i| hits[i]).count();
                    let weight = HIT_BIAS.powi(n_hits as i32);
                    for i in cells.filter(|&i| !hits[i]) {
                        matrix[i] += weight;
                    }
                }
            }
        }
    }

    normalize(matrix)
}

fn normalize(mut matrix: Vec<f64>) -> Vec<f64> {
    let total: f64 = matrix.iter().sum();
    if total == 0.0 {
        let uniform = 1.0 / matrix.len().max(1) as f64;
        matrix.iter_mut().for_each(|v| *v = uniform);
        return matrix;
    }
    matrix.iter_mut().for_each(|v| *v /= total);
    matrix
}

/// Sample a cell index from a probability vector using a temperature parameter.
/// Returns `None` only when every weight is zero.
pub fn sample_pdf<R: Rng>(pdf: &[f64], temperature: f64, rng: &mut R) -> Option<usize> {
    let adjusted: Vec<f64> = pdf.iter().map(|v| v.powf(1.0 / temperature)).collect();
    let total: f64 = adjusted.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, v) in adjusted.iter().enumerate() {
        cumulative += v;
        if threshold < cumulative {
            return Some(i);
        }
    }
    adjusted.iter().rposition(|v| *v > 0.0)
}

/// Keeps track of one side's shots and picks the next target.
#[derive(Debug, Clone)]
pub struct Gunner {
    size: usize,
    hits: Vec<bool>,
    misses: Vec<bool>,
    remaining: Vec<usize>,
}

impl Gunner {
    /// Gunner facing the fleet of `level`.
    pub fn new(level: &Level) -> Self {
        let size = level.battlefield_size;
        let remaining = level
            .fleet
            .iter()
            .flat_map(|&(class, count)| std::iter::repeat(class.length()).take(count))
            .collect();
        Self {
            size,
            hits: vec![false; size * size],
            misses: vec![false; size * size],
            remaining,
        }
    }

    /// Lengths of the enemy ships not yet sunk.
    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    pub fn is_shot(&self, at: Coordinates) -> bool {
        let i = at.y * self.size + at.x;
        self.hits[i] || self.misses[i]
    }

    /// Next cell to fire at, or `None` once every cell was shot.
    pub fn select_target<R: Rng>(&self, rng: &mut R) -> Option<Coordinates> {
        let pdf = calc_pdf(self.size, &self.hits, &self.misses, &self.remaining);
        let pick = sample_pdf(&pdf, TEMPERATURE, rng)
            .filter(|&i| !self.hits[i] && !self.misses[i])
            .or_else(|| (0..self.size * self.size).find(|&i| !self.hits[i] && !self.misses[i]))?;
        Some(Coordinates::new(pick % self.size, pick / self.size))
    }

    /// Record the outcome of a shot.
    pub fn record(&mut self, at: Coordinates, shot: Shot) {
        let i = at.y * self.size + at.x;
        if i >= self.hits.len() {
            return;
        }
        match shot {
            Shot::Miss => self.misses[i] = true,
            Shot::Hit => self.hits[i] = true,
            Shot::Sunk(class) => {
                self.hits[i] = true;
                if let Some(pos) = self.remaining.iter().position(|&l| l == class.length()) {
                    self.remaining.remove(pos);
                }
            }
        }
    }
}
