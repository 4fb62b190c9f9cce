//! Tunables for submission processing.

/// Knobs that change how correct answers are rewarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Stat points credited to the stat pool for every level gained.
    pub stat_points_per_level: i32,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            stat_points_per_level: 3,
        }
    }
}
