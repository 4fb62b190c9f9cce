//! Tag filtering for the quest log.

use std::collections::HashMap;

use questline_quest::domain::graph::QuestGraph;
use questline_quest::domain::location::PointOfInterest;
use uuid::Uuid;

/// Whether a quest should be shown for the requested tags.
///
/// With no tags requested every quest matches. Otherwise the quest matches
/// when one of its points of interest carries a requested tag, or when none
/// of its points of interest carries any tag at all.
#[must_use]
pub fn quest_matches_tags(
    graph: &QuestGraph,
    points_of_interest: &HashMap<Uuid, PointOfInterest>,
    tags: &[String],
) -> bool {
    if tags.is_empty() {
        return true;
    }

    let points: Vec<&PointOfInterest> = graph
        .nodes
        .iter()
        .filter_map(|node| points_of_interest.get(&node.point_of_interest_id))
        .collect();

    let tagged = points
        .iter()
        .any(|point| tags.iter().any(|tag| point.has_tag(tag)));

    tagged || points.iter().all(|point| point.tags.is_empty())
}
