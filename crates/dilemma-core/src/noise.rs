//! Execution noise and shock windows

use crate::random::SeededRng;
use crate::strategy::Move;

/// Flip `intended` with probability `noise`.
///
/// Each call is an independent draw, so both seats of a round get their own.
pub fn apply_noise(intended: Move, noise: f64, rng: &mut SeededRng) -> Move {
    if rng.chance(noise) {
        intended.flip()
    } else {
        intended
    }
}

/// Per-match shock state
///
/// While a window is open the effective noise is doubled. A window lasts
/// exactly `duration` rounds; no trigger draw happens inside one.
#[derive(Clone, Debug)]
pub struct ShockController {
    frequency: f64,
    duration: u32,
    remaining: u32,
}

impl ShockController {
    pub fn new(frequency: f64, duration: u32) -> Self {
        Self { frequency, duration, remaining: 0 }
    }

    /// Advance one round. Returns whether the shock is active this round.
    pub fn advance(&mut self, rng: &mut SeededRng) -> bool {
        if self.remaining == 0 {
            if self.duration > 0 && rng.chance(self.frequency) {
                self.remaining = self.duration;
                log::info!("Shock event triggered, noise doubled for {} rounds", self.duration);
            } else {
                return false;
            }
        }
        self.remaining -= 1;
        true
    }

    /// Advance one round and return the effective noise for it
    pub fn effective_noise(&mut self, base_noise: f64, rng: &mut SeededRng) -> (f64, bool) {
        let active = self.advance(rng);
        let noise = if active { base_noise * 2.0 } else { base_noise };
        (noise, active)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_rng() -> SeededRng {
        SeededRng::new(42, 0)
    }

    #[test]
    fn test_zero_noise_never_flips() {
        let mut rng = make_rng();
        for _ in 0..500 {
            assert_eq!(apply_noise(Move::Cooperate, 0.0, &mut rng), Move::Cooperate);
            assert_eq!(apply_noise(Move::Defect, 0.0, &mut rng), Move::Defect);
        }
    }

    #[test]
    fn test_full_noise_always_flips() {
        let mut rng = make_rng();
        for _ in 0..500 {
            assert_eq!(apply_noise(Move::Cooperate, 1.0, &mut rng), Move::Defect);
            assert_eq!(apply_noise(Move::Defect, 1.0, &mut rng), Move::Cooperate);
        }
    }

    #[test]
    fn test_noise_rate_statistical() {
        let mut rng = make_rng();
        let flips = (0..10_000)
            .filter(|_| apply_noise(Move::Cooperate, 0.2, &mut rng) == Move::Defect)
            .count();
        assert!(flips > 1700 && flips < 2300, "flips = {}", flips);
    }

    #[test]
    fn test_shock_never_triggers_at_zero_frequency() {
        let mut rng = make_rng();
        let mut shock = ShockController::new(0.0, 5);
        for _ in 0..200 {
            let (noise, active) = shock.effective_noise(0.1, &mut rng);
            assert!(!active);
            assert_eq!(noise, 0.1);
        }
    }

    #[test]
    fn test_shock_window_lasts_exact_duration() {
        let mut rng = make_rng();
        let mut shock = ShockController::new(1.0, 3);

        // frequency 1.0 re-triggers right after each window closes
        let flags: Vec<bool> = (0..9).map(|_| shock.advance(&mut rng)).collect();
        assert!(flags.iter().all(|f| *f));

        let mut shock = ShockController::new(1.0, 3);
        shock.advance(&mut rng);
        assert_eq!(shock.remaining(), 2);
        shock.advance(&mut rng);
        assert_eq!(shock.remaining(), 1);
        shock.advance(&mut rng);
        assert_eq!(shock.remaining(), 0);
    }

    #[test]
    fn test_shock_doubles_noise_exactly() {
        let mut rng = make_rng();
        let mut shock = ShockController::new(1.0, 2);
        let (noise, active) = shock.effective_noise(0.15, &mut rng);
        assert!(active);
        assert_eq!(noise, 0.3);
    }

    #[test]
    fn test_zero_duration_never_activates() {
        let mut rng = make_rng();
        let mut shock = ShockController::new(1.0, 0);
        for _ in 0..20 {
            assert!(!shock.advance(&mut rng));
        }
    }

    #[test]
    fn test_no_draw_inside_window() {
        // A window in progress must not consume randomness
        let mut shock = ShockController::new(1.0, 4);
        let mut rng = make_rng();
        shock.advance(&mut rng);

        let mut twin = rng.clone();
        for _ in 0..3 {
            assert!(shock.advance(&mut rng));
        }
        assert_eq!(rng.next_u64(), twin.next_u64());
    }

    proptest! {
        #[test]
        fn prop_shock_windows_are_whole(
            seed in any::<u64>(),
            frequency in 0.0f64..=1.0,
            duration in 1u32..8,
            base in 0.0f64..=0.5,
        ) {
            let mut rng = SeededRng::new(seed, 0);
            let mut shock = ShockController::new(frequency, duration);
            let mut run = 0u32;
            for _ in 0..200 {
                let (noise, active) = shock.effective_noise(base, &mut rng);
                if active {
                    prop_assert_eq!(noise, base * 2.0);
                    run += 1;
                } else {
                    prop_assert_eq!(noise, base);
                    // back-to-back windows merge into one run
                    prop_assert_eq!(run % duration, 0);
                    run = 0;
                }
            }
        }
    }
}
