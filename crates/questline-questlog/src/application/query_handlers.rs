//! Query handlers for the Quest Log context.

use std::collections::{HashMap, HashSet};

use questline_core::error::DomainError;
use questline_quest::domain::location::PointOfInterest;
use questline_quest::domain::submission::Submission;
use questline_quest::repository::QuestGraphStore;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::filter::quest_matches_tags;
use crate::domain::tree::{TaskIndex, TreeBuilder};
use crate::domain::views::QuestLog;

/// Radius around the player searched for quests.
pub const NEARBY_RADIUS_METERS: f64 = 51_900.0;

/// Parameters of a quest log request.
#[derive(Debug, Clone)]
pub struct QuestLogQuery {
    /// Player the log is built for.
    pub user_id: Uuid,
    /// Player latitude.
    pub lat: f64,
    /// Player longitude.
    pub lng: f64,
    /// Tags to filter by; empty means no filtering.
    pub tags: Vec<String>,
}

/// Builds the player's quest log: quests near them plus quests they have
/// already started, each as a tree with per-objective completion.
///
/// Quests whose graph has no root, or whose root location is unknown, are
/// left out with a warning.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
#[instrument(skip_all, fields(user_id = %query.user_id, tags = query.tags.len()))]
pub async fn get_quest_log(
    query: &QuestLogQuery,
    store: &dyn QuestGraphStore,
) -> Result<QuestLog, DomainError> {
    let nearby = store
        .find_quest_ids_near(query.lat, query.lng, NEARBY_RADIUS_METERS)
        .await?;
    let started = store.find_quest_ids_started_by_user(query.user_id).await?;

    let mut seen = HashSet::new();
    let quest_ids: Vec<Uuid> = nearby
        .into_iter()
        .chain(started)
        .filter(|id| seen.insert(*id))
        .collect();
    debug!(quests = quest_ids.len(), "collected candidate quests");

    let mut submissions: HashMap<Uuid, Vec<Submission>> = HashMap::new();
    for submission in store.find_submissions_by_user(query.user_id).await? {
        submissions
            .entry(submission.challenge_id)
            .or_default()
            .push(submission);
    }

    let mut log = QuestLog::default();
    let mut tasks = TaskIndex::default();
    let mut points_of_interest: HashMap<Uuid, PointOfInterest> = HashMap::new();

    for quest_id in quest_ids {
        let Some(graph) = store.load_quest_graph(quest_id).await? else {
            warn!(%quest_id, "quest disappeared while building quest log");
            continue;
        };

        for node in &graph.nodes {
            let point_id = node.point_of_interest_id;
            if points_of_interest.contains_key(&point_id) {
                continue;
            }
            if let Some(point) = store.find_point_of_interest(point_id).await? {
                points_of_interest.insert(point_id, point);
            }
        }

        if !quest_matches_tags(&graph, &points_of_interest, &query.tags) {
            continue;
        }

        match TreeBuilder::new(&graph, &points_of_interest, &submissions).build(&mut tasks) {
            Some(view) => log.quests.push(view),
            None => warn!(%quest_id, "quest has no buildable root; skipping"),
        }
    }

    log.pending_tasks = tasks.pending;
    log.completed_tasks = tasks.completed;
    Ok(log)
}
