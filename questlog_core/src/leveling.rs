//! Leveling curve mapping cumulative experience to levels.
//!
//! Each level costs twice as much as the previous one:
//! `threshold_exp(level) = 2^level * 100 - 100`, so levels start at
//! 0, 100, 300, 700, 1500, ... exp. Existing persisted exp values depend on
//! this exact curve.

/// Level and in-level progress derived from cumulative exp
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelInfo {
    pub level: u32,
    /// Fraction of the way from this level to the next, in `[0, 1)`
    pub progress: f64,
    pub exp_into_level: u64,
    /// Exp span between this level's threshold and the next one
    pub exp_for_next_level: u64,
}

impl LevelInfo {
    /// Progress as a percentage in `[0, 100)`
    pub fn percent(&self) -> f64 {
        self.progress * 100.0
    }
}

/// Cumulative exp required to reach `level`
///
/// Computed in `u128` so every level reachable from a `u64` exp total (and
/// the one after it) is representable.
pub fn threshold_exp(level: u32) -> u128 {
    (1u128 << level) * 100 - 100
}

/// Map cumulative exp to its level and progress within that level
///
/// Equivalent to `floor(log2(exp / 100 + 1))`, evaluated in integer
/// arithmetic: `floor(log2(x)) == floor(log2(floor(x)))` for `x >= 1`.
pub fn level_of(exp: u64) -> LevelInfo {
    let level = ((u128::from(exp) + 100) / 100).ilog2();
    let floor = threshold_exp(level);
    let span = threshold_exp(level + 1) - floor;
    let into = u128::from(exp) - floor;

    LevelInfo {
        level,
        progress: into as f64 / span as f64,
        exp_into_level: into as u64,
        exp_for_next_level: span as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(threshold_exp(0), 0);
        assert_eq!(threshold_exp(1), 100);
        assert_eq!(threshold_exp(2), 300);
        assert_eq!(threshold_exp(3), 700);
        assert_eq!(threshold_exp(4), 1500);
    }

    #[test]
    fn test_zero_exp() {
        let info = level_of(0);
        assert_eq!(info.level, 0);
        assert_eq!(info.progress, 0.0);
        assert_eq!(info.exp_into_level, 0);
        assert_eq!(info.exp_for_next_level, 100);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_of(99).level, 0);

        let at_100 = level_of(100);
        assert_eq!(at_100.level, 1);
        assert_eq!(at_100.progress, 0.0);

        let at_299 = level_of(299);
        assert_eq!(at_299.level, 1);
        assert!(at_299.progress > 0.99 && at_299.progress < 1.0);
        assert_eq!(at_299.exp_into_level, 199);
        assert_eq!(at_299.exp_for_next_level, 200);

        let at_300 = level_of(300);
        assert_eq!(at_300.level, 2);
        assert_eq!(at_300.progress, 0.0);

        assert_eq!(level_of(699).level, 2);
        assert_eq!(level_of(700).level, 3);
    }

    #[test]
    fn test_progress_midway() {
        let info = level_of(200);
        assert_eq!(info.level, 1);
        assert!((info.progress - 0.5).abs() < f64::EPSILON);
        assert!((info.percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = level_of(0).level;
        for exp in (0..20_000u64).step_by(7) {
            let level = level_of(exp).level;
            assert!(level >= previous, "level dropped at exp {}", exp);
            previous = level;
        }
    }

    #[test]
    fn test_matches_log_formula() {
        for exp in [0u64, 1, 50, 100, 150, 299, 300, 1234, 99_999, 1_000_000] {
            let expected = ((exp as f64) / 100.0 + 1.0).log2().floor() as u32;
            assert_eq!(level_of(exp).level, expected, "exp {}", exp);
        }
    }

    #[test]
    fn test_total_over_u64() {
        let info = level_of(u64::MAX);
        assert!(info.level >= 57);
        assert!(info.progress >= 0.0 && info.progress < 1.0);
    }
}
