use std::f64::consts::TAU;

/// Oscillator position within one cycle, in radians, always in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Phase(f64);

impl Phase {
    pub const ZERO: Phase = Phase(0.0);

    pub fn new(radians: f64) -> Self {
        Self(wrap(radians))
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    /// Block-level advance. Uses a true modulo so any increment is safe.
    pub fn advance(&mut self, delta: f64) {
        self.0 = wrap(self.0 + delta);
    }

    /// Per-sample step. A single subtraction of 2π covers audio-rate steps;
    /// steps of a full cycle or more fall through to the modulo.
    pub fn step(&mut self, delta: f64) {
        self.0 += delta;
        if self.0 >= TAU {
            self.0 -= TAU;
            if self.0 >= TAU {
                self.0 = wrap(self.0);
            }
        }
    }
}

/// Radians advanced per sample for `frequency` Hz at `sample_rate` Hz.
pub fn phase_increment(frequency: f64, sample_rate: u32) -> f64 {
    TAU * frequency / sample_rate as f64
}

fn wrap(radians: f64) -> f64 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wraps_into_range() {
        assert_eq!(Phase::new(TAU).radians(), 0.0);
        assert!((Phase::new(TAU + 1.0).radians() - 1.0).abs() < 1e-12);
        assert!((Phase::new(-1.0).radians() - (TAU - 1.0)).abs() < 1e-12);
        assert_eq!(Phase::new(-1e-300).radians(), 0.0);
    }

    #[test]
    fn test_advance_handles_many_cycles() {
        let mut phase = Phase::ZERO;
        phase.advance(10.0 * TAU + 0.5);
        assert!((phase.radians() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_step_single_subtraction() {
        let mut phase = Phase::new(TAU - 0.1);
        phase.step(0.2);
        assert!((phase.radians() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_step_larger_than_cycle() {
        let mut phase = Phase::ZERO;
        phase.step(3.5 * TAU);
        assert!(phase.radians() < TAU);
        assert!((phase.radians() - 0.5 * TAU).abs() < 1e-9);
    }

    #[test]
    fn test_phase_increment() {
        let step = phase_increment(480.0, 48_000);
        assert!((step - TAU / 100.0).abs() < 1e-15);
    }
}
