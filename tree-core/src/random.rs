//! Sources of random unit directions used when growing branches.

use glam::Vec3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f32::consts::TAU;

/// Produces the random unit vectors that perturb child directions.
pub trait DirectionSource {
    fn random_unit_vector(&mut self) -> Vec3;
}

/// Draws a vector uniformly distributed on the unit sphere.
///
/// Samples `z` uniformly in `[-1, 1]` and an azimuth in `[0, 2π)`, which is
/// area-preserving on the sphere (Archimedes' hat-box theorem).
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let theta: f32 = rng.random_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// [`DirectionSource`] backed by any [`rand`] generator.
#[derive(Debug, Clone)]
pub struct RngDirections<R> {
    rng: R,
}

impl<R: Rng> RngDirections<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDirections<StdRng> {
    /// Reproducible generator: the same seed yields the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is given, otherwise seeded from the OS.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(StdRng::from_os_rng()),
        }
    }
}

impl<R: Rng> DirectionSource for RngDirections<R> {
    fn random_unit_vector(&mut self) -> Vec3 {
        random_unit_vector(&mut self.rng)
    }
}

/// Replays a fixed list of vectors, wrapping around at the end.
///
/// Vectors are returned exactly as given. An empty list yields
/// `Vec3::ZERO`, which leaves child directions equal to their parent's.
#[derive(Debug, Clone, Default)]
pub struct SequenceDirections {
    dirs: Vec<Vec3>,
    next: usize,
}

impl SequenceDirections {
    pub fn new(dirs: Vec<Vec3>) -> Self {
        Self { dirs, next: 0 }
    }

    /// Restarts the sequence from its first vector.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

impl DirectionSource for SequenceDirections {
    fn random_unit_vector(&mut self) -> Vec3 {
        if self.dirs.is_empty() {
            return Vec3::ZERO;
        }
        let v = self.dirs[self.next % self.dirs.len()];
        self.next = (self.next + 1) % self.dirs.len();
        v
    }
}
