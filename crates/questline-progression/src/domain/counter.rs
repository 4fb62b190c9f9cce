//! Progression counters.

use serde::{Deserialize, Serialize};

use super::curve::LevelingCurve;

/// Level, lifetime points and points banked on the current level.
///
/// Used for both the per-user experience level and the per-(user, zone)
/// reputation. Counters start at level 1 with no points and only change
/// through [`ProgressionCounter::add_points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionCounter {
    /// Current level, starting at 1.
    pub level: i32,
    /// Lifetime points.
    pub total_points: i64,
    /// Points counted toward the next level. Can go negative right after a
    /// level-up because it is recomputed from the lifetime total.
    pub points_on_level: i64,
    /// Levels gained by the most recent `add_points` call (0 or 1).
    pub levels_gained: i32,
}

impl Default for ProgressionCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionCounter {
    /// A fresh counter: level 1, zero points.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: 1,
            total_points: 0,
            points_on_level: 0,
            levels_gained: 0,
        }
    }

    /// Restores a persisted counter. `levels_gained` is transient and starts
    /// at zero.
    #[must_use]
    pub const fn restore(level: i32, total_points: i64, points_on_level: i64) -> Self {
        Self {
            level,
            total_points,
            points_on_level,
            levels_gained: 0,
        }
    }

    /// Adds `points` and advances at most one level.
    ///
    /// When the points banked on the current level reach the curve's
    /// threshold, the level increments once and the banked points are reset
    /// to `total_points - threshold_for(new_level)`, however many thresholds
    /// the award would have crossed. Capped curves keep accumulating points
    /// at the cap without advancing.
    #[must_use]
    pub fn add_points(self, curve: &impl LevelingCurve, points: i64) -> Self {
        let mut next = Self {
            levels_gained: 0,
            ..self
        };
        next.points_on_level += points;
        next.total_points += points;

        let below_cap = curve.max_level().is_none_or(|max| next.level < max);
        if below_cap && next.points_on_level >= curve.threshold_for(next.level) {
            next.level += 1;
            next.levels_gained = 1;
            next.points_on_level = next.total_points - curve.threshold_for(next.level);
        }

        next
    }

    /// Whether the most recent award advanced the level.
    #[must_use]
    pub const fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }

    /// Points still missing before the next level, or `None` at the cap.
    #[must_use]
    pub fn points_to_next_level(&self, curve: &impl LevelingCurve) -> Option<i64> {
        if curve.max_level().is_some_and(|max| self.level >= max) {
            return None;
        }
        Some((curve.threshold_for(self.level) - self.points_on_level).max(0))
    }
}
