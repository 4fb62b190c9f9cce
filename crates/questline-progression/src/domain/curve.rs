//! Leveling curves.
//!
//! A curve maps a level to the number of points that must accumulate on that
//! level before the counter advances. Both curves grow by [`GROWTH_FACTOR`].

/// Base experience points per level step.
pub const BASE_EXPERIENCE_POINTS: i64 = 100;

/// Growth constant shared by the experience and reputation curves.
pub const GROWTH_FACTOR: i64 = 10;

/// Base reputation points per level step.
pub const BASE_REPUTATION_POINTS: i64 = 100;

/// Reputation-specific growth constant. Not referenced by [`ReputationCurve`],
/// which grows by [`GROWTH_FACTOR`].
pub const REPUTATION_GROWTH_FACTOR: i64 = 3;

/// Highest reputation level (`legendary`).
pub const MAX_REPUTATION_LEVEL: i32 = 6;

/// A threshold function over levels.
pub trait LevelingCurve {
    /// Points required on `level` before advancing to `level + 1`.
    fn threshold_for(&self, level: i32) -> i64;

    /// Level past which the counter never advances, if any.
    fn max_level(&self) -> Option<i32> {
        None
    }
}

/// Player experience curve: `100 * floor(ln(level + 1)) * 10`.
///
/// `threshold_for(1)` is zero, so a fresh counter levels on its first award.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelCurve;

impl LevelingCurve for LevelCurve {
    #[allow(clippy::cast_possible_truncation)]
    fn threshold_for(&self, level: i32) -> i64 {
        let steps = (f64::from(level) + 1.0).ln().floor() as i64;
        BASE_EXPERIENCE_POINTS * steps * GROWTH_FACTOR
    }
}

/// Zone reputation curve: `100 * 10^level`, capped at level 6.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReputationCurve;

impl LevelingCurve for ReputationCurve {
    fn threshold_for(&self, level: i32) -> i64 {
        let exponent = u32::try_from(level).unwrap_or(0);
        GROWTH_FACTOR
            .checked_pow(exponent)
            .map_or(i64::MAX, |growth| growth.saturating_mul(BASE_REPUTATION_POINTS))
    }

    fn max_level(&self) -> Option<i32> {
        Some(MAX_REPUTATION_LEVEL)
    }
}
