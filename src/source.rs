//! Piece sources for the driver
//!
//! The engine never picks pieces itself. A driver owns a [`PieceSource`] and
//! hands each drawn piece to [`Engine::spawn_from`](crate::engine::Engine::spawn_from).

use crate::shape::Shape;
use crate::tetromino::{PieceKind, Rotation};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Supplies the next piece kind and its spawn shape
pub trait PieceSource {
    fn next(&mut self) -> (PieceKind, Shape);

    /// Up to `count` kinds that the following calls to `next` will return
    fn preview(&self, _count: usize) -> Vec<PieceKind> {
        Vec::new()
    }
}

/// How many upcoming kinds the uniform source commits to ahead of time
pub const UPCOMING: usize = 3;

fn spawn_shape(kind: PieceKind) -> (PieceKind, Shape) {
    (kind, kind.shape(Rotation::North))
}

/// Independent uniform choice over the 7 kinds
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: ChaCha8Rng,
    /// Kinds already drawn but not yet dealt
    upcoming: VecDeque<PieceKind>,
}

impl Default for UniformSource {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSource {
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Reproducible sequence for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        let mut source = Self {
            rng,
            upcoming: VecDeque::with_capacity(UPCOMING + 1),
        };
        source.top_up();
        source
    }

    fn top_up(&mut self) {
        while self.upcoming.len() <= UPCOMING {
            let kind = PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())];
            self.upcoming.push_back(kind);
        }
    }
}

impl PieceSource for UniformSource {
    fn next(&mut self) -> (PieceKind, Shape) {
        self.top_up();
        let kind = self.upcoming.pop_front().unwrap_or(PieceKind::I);
        self.top_up();
        spawn_shape(kind)
    }

    /// At most [`UPCOMING`] kinds are known ahead
    fn preview(&self, count: usize) -> Vec<PieceKind> {
        self.upcoming.iter().copied().take(count.min(UPCOMING)).collect()
    }
}

/// The 7-bag randomizer
///
/// All 7 pieces are shuffled, then dealt out before reshuffling. This
/// prevents long droughts.
#[derive(Debug, Clone)]
pub struct BagSource {
    rng: ChaCha8Rng,
    /// Preview queue for upcoming pieces
    queue: VecDeque<PieceKind>,
}

impl Default for BagSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BagSource {
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        let mut bag = Self {
            rng,
            queue: VecDeque::with_capacity(14),
        };
        // Keep at least one full bag visible for previews
        bag.refill();
        bag.refill();
        bag
    }

    /// Refill the queue with a new shuffled bag
    fn refill(&mut self) {
        let mut new_bag = PieceKind::ALL;
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}

impl PieceSource for BagSource {
    fn next(&mut self) -> (PieceKind, Shape) {
        if self.queue.len() <= PieceKind::ALL.len() {
            self.refill();
        }
        let kind = self.queue.pop_front().unwrap_or(PieceKind::I);
        spawn_shape(kind)
    }

    /// Preview the next N pieces without removing them, up to a full bag
    fn preview(&self, count: usize) -> Vec<PieceKind> {
        self.queue.iter().copied().take(count.min(PieceKind::ALL.len())).collect()
    }
}

/// Cycles through a fixed list of kinds
#[derive(Debug, Clone)]
pub struct SequenceSource {
    kinds: Vec<PieceKind>,
    position: usize,
}

impl SequenceSource {
    /// Returns `None` for an empty list
    pub fn new(kinds: Vec<PieceKind>) -> Option<Self> {
        if kinds.is_empty() {
            return None;
        }
        Some(Self { kinds, position: 0 })
    }
}

impl PieceSource for SequenceSource {
    fn next(&mut self) -> (PieceKind, Shape) {
        let kind = self.kinds[self.position];
        self.position = (self.position + 1) % self.kinds.len();
        spawn_shape(kind)
    }

    fn preview(&self, count: usize) -> Vec<PieceKind> {
        self.kinds
            .iter()
            .copied()
            .cycle()
            .skip(self.position)
            .take(count)
            .collect()
    }
}
