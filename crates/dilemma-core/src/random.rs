//! Seeded pseudo-random number generator
//!
//! Every stochastic draw in a tournament (round counts, noise flips, shock
//! triggers, randomized strategies, topology sampling) comes from a
//! `SeededRng`. A generator is identified by a tournament seed plus a stream
//! id, so a match can rebuild its own stream from its pairing alone.

/// Stream reserved for topology sampling.
pub const TOPOLOGY_STREAM: u64 = u64::MAX;

/// Seeded random number generator (xorshift64*)
///
/// Deterministic: same seed + stream = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a tournament seed and a stream id
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut state = seed ^ 0x6a09e667f3bcc909;
        state ^= stream.wrapping_add(1).wrapping_mul(0x517cc1b727220a95);
        // xorshift must never sit at zero
        if state == 0 {
            state = 0x9e3779b97f4a7c15;
        }

        let mut rng = Self { state };
        for _ in 0..8 {
            rng.next_u64();
        }

        rng
    }

    /// Derive an independent child stream (used per player per round)
    pub fn fork(&self, lane: u64) -> Self {
        let mut new_state = self.state;
        new_state ^= lane.wrapping_add(1).wrapping_mul(0x9e3779b97f4a7c15);
        if new_state == 0 {
            new_state = 0x2545f4914f6cdd1d;
        }

        let mut rng = Self { state: new_state };
        rng.next_u64();
        rng
    }

    /// Generate next u64
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }

    /// Generate next u32
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a value 0-99 (for percentage checks)
    pub fn next_percent(&mut self) -> u8 {
        (self.next_u32() % 100) as u8
    }

    /// Generate a value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Uniform value in the inclusive range [min, max]
    pub fn next_between(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max as u64 - min as u64 + 1)) as u32
    }

    /// Bernoulli draw. Probabilities at or above 1.0 always succeed.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}
