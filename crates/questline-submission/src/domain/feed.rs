//! Activity feed wording.
//!
//! Teams and locations are written as `{Kind|id}` placeholders; the chat
//! client swaps them for display names when rendering.

use questline_quest::domain::submission::Submitter;
use uuid::Uuid;

const NUMERALS: [(i32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Tier label: a roman numeral for 1 through 3999, `Tier n` otherwise.
#[must_use]
pub fn tier_label(tier: i32) -> String {
    if !(1..4000).contains(&tier) {
        return format!("Tier {tier}");
    }
    let mut remaining = tier;
    let mut label = String::new();
    for (value, numeral) in NUMERALS {
        while remaining >= value {
            label.push_str(numeral);
            remaining -= value;
        }
    }
    label
}

/// How the feed names whoever submitted.
#[must_use]
pub fn submitter_label(submitter: Submitter) -> String {
    match submitter {
        Submitter::UserId(_) => "You".to_owned(),
        Submitter::TeamId(team_id) => format!("{{Team|{team_id}}}"),
    }
}

/// Placeholder for a point of interest.
#[must_use]
pub fn point_of_interest_label(point_of_interest_id: Uuid) -> String {
    format!("{{PointOfInterest|{point_of_interest_id}}}")
}

/// Line written for every correct answer.
#[must_use]
pub fn capture_message(submitter: Submitter, point_of_interest_id: Uuid, tier: i32) -> String {
    format!(
        "{} captured {} at tier {}.",
        submitter_label(submitter),
        point_of_interest_label(point_of_interest_id),
        tier_label(tier)
    )
}

/// Line written when a correct answer finishes the quest.
#[must_use]
pub fn quest_completed_message(submitter: Submitter, quest_name: &str) -> String {
    format!("{} completed a quest: {quest_name}.", submitter_label(submitter))
}
