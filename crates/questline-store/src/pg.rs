//! `PostgreSQL` implementation of the quest store.
//!
//! Tables are created by the workspace `migrations/` directory. Quest claims
//! use `SELECT ... FOR UPDATE`, and the partial unique indexes on
//! `quest_submissions` turn a racing duplicate correct submission into
//! `DomainError::AlreadyCompleted`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use questline_core::error::DomainError;
use questline_progression::ProgressionCounter;
use questline_quest::domain::audit::AuditEntry;
use questline_quest::domain::character::{ActionType, CharacterAction, DialogueMessage};
use questline_quest::domain::graph::{
    Challenge, ChallengeEdge, Node, Quest, QuestGraph, QuestItemReward, RecurrenceSchedule,
};
use questline_quest::domain::location::PointOfInterest;
use questline_quest::domain::submission::{Submission, Submitter};
use questline_quest::repository::{QuestGraphStore, QuestTransaction};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::geo::EARTH_RADIUS_METERS;

fn infrastructure(error: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(error.to_string())
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
}

const QUEST_COLUMNS: &str = "id, name, description, acceptance_dialogue, image_url, zone_id, \
     quest_archetype_id, quest_giver_character_id, gold, recurrence_frequency, \
     next_recurrence_at, recurring_quest_id, created_at, updated_at";

const CHALLENGE_COLUMNS: &str = "id, quest_id, node_id, tier, question, reward, \
     inventory_item_id, difficulty, stat_tags, proficiency";

#[derive(sqlx::FromRow)]
struct QuestRow {
    id: Uuid,
    name: String,
    description: String,
    acceptance_dialogue: Json<Vec<String>>,
    image_url: String,
    zone_id: Option<Uuid>,
    quest_archetype_id: Option<Uuid>,
    quest_giver_character_id: Option<Uuid>,
    gold: i32,
    recurrence_frequency: Option<String>,
    next_recurrence_at: Option<DateTime<Utc>>,
    recurring_quest_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuestRow {
    fn into_quest(self, item_rewards: Vec<QuestItemReward>) -> Quest {
        // A frequency without a next occurrence is never due.
        let schedule = match (self.recurrence_frequency, self.next_recurrence_at) {
            (Some(frequency), Some(next_occurrence_at)) => Some(RecurrenceSchedule {
                frequency,
                next_occurrence_at,
            }),
            _ => None,
        };
        Quest {
            id: self.id,
            name: self.name,
            description: self.description,
            acceptance_dialogue: self.acceptance_dialogue.0,
            image_url: self.image_url,
            zone_id: self.zone_id,
            quest_archetype_id: self.quest_archetype_id,
            quest_giver_character_id: self.quest_giver_character_id,
            gold: self.gold,
            item_rewards,
            schedule,
            recurring_group_id: self.recurring_quest_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RewardRow {
    id: Uuid,
    inventory_item_id: Option<i32>,
    quantity: i32,
}

impl From<RewardRow> for QuestItemReward {
    fn from(row: RewardRow) -> Self {
        Self {
            id: row.id,
            inventory_item_id: row.inventory_item_id,
            quantity: row.quantity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: Uuid,
    quest_id: Uuid,
    order_index: i32,
    point_of_interest_id: Uuid,
    submission_type: String,
}

impl TryFrom<NodeRow> for Node {
    type Error = DomainError;

    fn try_from(row: NodeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            quest_id: row.quest_id,
            order_index: row.order_index,
            point_of_interest_id: row.point_of_interest_id,
            submission_type: row.submission_type.parse()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChallengeRow {
    id: Uuid,
    quest_id: Uuid,
    node_id: Uuid,
    tier: i32,
    question: String,
    reward: i32,
    inventory_item_id: Option<i32>,
    difficulty: i32,
    stat_tags: Vec<String>,
    proficiency: Option<String>,
}

impl From<ChallengeRow> for Challenge {
    fn from(row: ChallengeRow) -> Self {
        Self {
            id: row.id,
            quest_id: row.quest_id,
            node_id: row.node_id,
            tier: row.tier,
            question: row.question,
            reward: row.reward,
            inventory_item_id: row.inventory_item_id,
            difficulty: row.difficulty,
            stat_tags: row.stat_tags,
            proficiency: row.proficiency,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EdgeRow {
    id: Uuid,
    node_id: Uuid,
    challenge_id: Option<Uuid>,
    next_node_id: Uuid,
}

impl From<EdgeRow> for ChallengeEdge {
    fn from(row: EdgeRow) -> Self {
        Self {
            id: row.id,
            node_id: row.node_id,
            challenge_id: row.challenge_id,
            next_node_id: row.next_node_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PointOfInterestRow {
    id: Uuid,
    name: String,
    description: String,
    image_url: String,
    lat: f64,
    lng: f64,
    tags: Vec<String>,
}

impl From<PointOfInterestRow> for PointOfInterest {
    fn from(row: PointOfInterestRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            lat: row.lat,
            lng: row.lng,
            tags: row.tags,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    challenge_id: Uuid,
    user_id: Option<Uuid>,
    team_id: Option<Uuid>,
    image_url: Option<String>,
    text: Option<String>,
    is_correct: bool,
    reason: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = DomainError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            challenge_id: row.challenge_id,
            submitter: Submitter::from_ids(row.user_id, row.team_id)?,
            image_url: row.image_url,
            text: row.text,
            is_correct: row.is_correct,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CounterRow {
    level: i32,
    total_points: i64,
    points_on_level: i64,
}

impl From<CounterRow> for ProgressionCounter {
    fn from(row: CounterRow) -> Self {
        Self::restore(row.level, row.total_points, row.points_on_level)
    }
}

#[derive(sqlx::FromRow)]
struct ActionRow {
    id: Uuid,
    character_id: Uuid,
    action_type: String,
    dialogue: Json<Vec<DialogueMessage>>,
    metadata: Json<Map<String, Value>>,
}

impl TryFrom<ActionRow> for CharacterAction {
    type Error = DomainError;

    fn try_from(row: ActionRow) -> Result<Self, Self::Error> {
        let action_type = ActionType::parse(&row.action_type).ok_or_else(|| {
            DomainError::Validation(format!("unknown action type {:?}", row.action_type))
        })?;
        Ok(Self {
            id: row.id,
            character_id: row.character_id,
            action_type,
            dialogue: row.dialogue.0,
            metadata: row.metadata.0,
        })
    }
}

async fn load_graph(
    conn: &mut PgConnection,
    quest_id: Uuid,
    lock: bool,
) -> Result<Option<QuestGraph>, DomainError> {
    let sql = if lock {
        format!("SELECT {QUEST_COLUMNS} FROM quests WHERE id = $1 FOR UPDATE")
    } else {
        format!("SELECT {QUEST_COLUMNS} FROM quests WHERE id = $1")
    };
    let Some(quest_row) = sqlx::query_as::<_, QuestRow>(&sql)
        .bind(quest_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(infrastructure)?
    else {
        return Ok(None);
    };

    let item_rewards = sqlx::query_as::<_, RewardRow>(
        "SELECT id, inventory_item_id, quantity FROM quest_item_rewards \
         WHERE quest_id = $1 ORDER BY id",
    )
    .bind(quest_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(infrastructure)?
    .into_iter()
    .map(QuestItemReward::from)
    .collect();

    let nodes = sqlx::query_as::<_, NodeRow>(
        "SELECT id, quest_id, order_index, point_of_interest_id, submission_type \
         FROM quest_nodes WHERE quest_id = $1 ORDER BY order_index, id",
    )
    .bind(quest_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(infrastructure)?
    .into_iter()
    .map(Node::try_from)
    .collect::<Result<Vec<_>, _>>()?;

    let challenges = sqlx::query_as::<_, ChallengeRow>(&format!(
        "SELECT {CHALLENGE_COLUMNS} FROM quest_node_challenges \
         WHERE node_id IN (SELECT id FROM quest_nodes WHERE quest_id = $1) \
         ORDER BY tier, id"
    ))
    .bind(quest_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(infrastructure)?
    .into_iter()
    .map(Challenge::from)
    .collect();

    let edges = sqlx::query_as::<_, EdgeRow>(
        "SELECT id, node_id, challenge_id, next_node_id FROM quest_node_children \
         WHERE node_id IN (SELECT id FROM quest_nodes WHERE quest_id = $1) \
         ORDER BY id",
    )
    .bind(quest_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(infrastructure)?
    .into_iter()
    .map(ChallengeEdge::from)
    .collect();

    Ok(Some(QuestGraph {
        quest: quest_row.into_quest(item_rewards),
        nodes,
        challenges,
        edges,
    }))
}

/// PostgreSQL-backed quest store.
#[derive(Debug, Clone)]
pub struct PgQuestStore {
    pool: PgPool,
}

impl PgQuestStore {
    /// Creates a new `PgQuestStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QuestGraphStore for PgQuestStore {
    async fn find_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>, DomainError> {
        let row = sqlx::query_as::<_, ChallengeRow>(&format!(
            "SELECT {CHALLENGE_COLUMNS} FROM quest_node_challenges WHERE id = $1"
        ))
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(Challenge::from))
    }

    async fn load_quest_graph(&self, quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(infrastructure)?;
        load_graph(&mut conn, quest_id, false).await
    }

    async fn find_point_of_interest(
        &self,
        point_of_interest_id: Uuid,
    ) -> Result<Option<PointOfInterest>, DomainError> {
        let row = sqlx::query_as::<_, PointOfInterestRow>(
            "SELECT id, name, description, image_url, lat, lng, tags \
             FROM points_of_interest WHERE id = $1",
        )
        .bind(point_of_interest_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(PointOfInterest::from))
    }

    async fn find_zone_for_point_of_interest(
        &self,
        point_of_interest_id: Uuid,
    ) -> Result<Option<Uuid>, DomainError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT zone_id FROM zone_points_of_interest \
             WHERE point_of_interest_id = $1 ORDER BY zone_id LIMIT 1",
        )
        .bind(point_of_interest_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)
    }

    async fn find_quest_ids_near(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: f64,
    ) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT q.id FROM quests q WHERE EXISTS ( \
                 SELECT 1 FROM quest_nodes n \
                 JOIN points_of_interest p ON p.id = n.point_of_interest_id \
                 WHERE n.quest_id = q.id \
                 AND 2 * $4 * asin(sqrt(least(1.0, \
                     power(sin(radians(p.lat - $1) / 2), 2) \
                     + cos(radians($1)) * cos(radians(p.lat)) \
                     * power(sin(radians(p.lng - $2) / 2), 2)))) <= $3 \
             ) ORDER BY q.created_at, q.id",
        )
        .bind(lat)
        .bind(lng)
        .bind(radius_meters)
        .bind(EARTH_RADIUS_METERS)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)
    }

    async fn find_quest_ids_started_by_user(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT c.quest_id FROM quest_submissions s \
             JOIN quest_node_challenges c ON c.id = s.challenge_id \
             WHERE s.user_id = $1 \
             GROUP BY c.quest_id ORDER BY MIN(s.created_at), c.quest_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)
    }

    async fn find_submissions_by_user(&self, user_id: Uuid) -> Result<Vec<Submission>, DomainError> {
        sqlx::query_as::<_, SubmissionRow>(
            "SELECT id, challenge_id, user_id, team_id, image_url, text, is_correct, reason, \
             created_at FROM quest_submissions WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?
        .into_iter()
        .map(Submission::try_from)
        .collect()
    }

    async fn has_correct_submission(
        &self,
        challenge_id: Uuid,
        submitter: Submitter,
    ) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM quest_submissions \
                 WHERE challenge_id = $1 AND is_correct \
                 AND (user_id = $2 OR team_id = $3) \
             )",
        )
        .bind(challenge_id)
        .bind(submitter.user_id())
        .bind(submitter.team_id())
        .fetch_one(&self.pool)
        .await
        .map_err(infrastructure)
    }

    async fn find_due_recurring_quest_ids(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Uuid>, DomainError> {
        let limit = i64::try_from(limit)
            .map_err(|_| DomainError::Validation("limit exceeds i64 range".to_owned()))?;
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM quests \
             WHERE recurrence_frequency IS NOT NULL \
             AND next_recurrence_at IS NOT NULL AND next_recurrence_at <= $1 \
             ORDER BY next_recurrence_at, id LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)
    }

    async fn begin(&self) -> Result<Box<dyn QuestTransaction>, DomainError> {
        let tx = self.pool.begin().await.map_err(infrastructure)?;
        Ok(Box::new(PgQuestTransaction { tx }))
    }
}

/// A transaction over [`PgQuestStore`]. Rolled back when dropped uncommitted.
pub struct PgQuestTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgQuestTransaction {
    async fn insert_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        let schedule = quest.schedule.as_ref();
        sqlx::query(
            "INSERT INTO quests ( \
                 id, name, description, acceptance_dialogue, image_url, zone_id, \
                 quest_archetype_id, quest_giver_character_id, gold, recurrence_frequency, \
                 next_recurrence_at, recurring_quest_id, created_at, updated_at \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(quest.id)
        .bind(&quest.name)
        .bind(&quest.description)
        .bind(Json(&quest.acceptance_dialogue))
        .bind(&quest.image_url)
        .bind(quest.zone_id)
        .bind(quest.quest_archetype_id)
        .bind(quest.quest_giver_character_id)
        .bind(quest.gold)
        .bind(schedule.map(|s| s.frequency.as_str()))
        .bind(schedule.map(|s| s.next_occurrence_at))
        .bind(quest.recurring_group_id)
        .bind(quest.created_at)
        .bind(quest.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(infrastructure)?;

        for reward in &quest.item_rewards {
            sqlx::query(
                "INSERT INTO quest_item_rewards (id, quest_id, inventory_item_id, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(reward.id)
            .bind(quest.id)
            .bind(reward.inventory_item_id)
            .bind(reward.quantity)
            .execute(&mut *self.tx)
            .await
            .map_err(infrastructure)?;
        }
        Ok(())
    }

    async fn save_counter(
        &mut self,
        sql: &str,
        user_id: Uuid,
        zone_id: Option<Uuid>,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError> {
        let mut query = sqlx::query(sql).bind(user_id);
        if let Some(zone_id) = zone_id {
            query = query.bind(zone_id);
        }
        query
            .bind(counter.level)
            .bind(counter.total_points)
            .bind(counter.points_on_level)
            .execute(&mut *self.tx)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}

#[async_trait]
impl QuestTransaction for PgQuestTransaction {
    async fn claim_quest(&mut self, quest_id: Uuid) -> Result<Option<QuestGraph>, DomainError> {
        load_graph(&mut self.tx, quest_id, true).await
    }

    async fn insert_quest_graph(&mut self, graph: &QuestGraph) -> Result<(), DomainError> {
        graph.validate()?;
        self.insert_quest(&graph.quest).await?;

        for node in &graph.nodes {
            sqlx::query(
                "INSERT INTO quest_nodes (id, quest_id, order_index, point_of_interest_id, \
                 submission_type) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(node.id)
            .bind(node.quest_id)
            .bind(node.order_index)
            .bind(node.point_of_interest_id)
            .bind(node.submission_type.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(infrastructure)?;
        }

        for challenge in &graph.challenges {
            sqlx::query(&format!(
                "INSERT INTO quest_node_challenges ({CHALLENGE_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
            ))
            .bind(challenge.id)
            .bind(challenge.quest_id)
            .bind(challenge.node_id)
            .bind(challenge.tier)
            .bind(&challenge.question)
            .bind(challenge.reward)
            .bind(challenge.inventory_item_id)
            .bind(challenge.difficulty)
            .bind(&challenge.stat_tags)
            .bind(&challenge.proficiency)
            .execute(&mut *self.tx)
            .await
            .map_err(infrastructure)?;
        }

        for edge in &graph.edges {
            sqlx::query(
                "INSERT INTO quest_node_children (id, node_id, challenge_id, next_node_id) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(edge.id)
            .bind(edge.node_id)
            .bind(edge.challenge_id)
            .bind(edge.next_node_id)
            .execute(&mut *self.tx)
            .await
            .map_err(infrastructure)?;
        }

        debug!(
            quest_id = %graph.quest.id,
            nodes = graph.nodes.len(),
            challenges = graph.challenges.len(),
            edges = graph.edges.len(),
            "inserted quest graph"
        );
        Ok(())
    }

    async fn update_quest(&mut self, quest: &Quest) -> Result<(), DomainError> {
        let schedule = quest.schedule.as_ref();
        let result = sqlx::query(
            "UPDATE quests SET name = $2, description = $3, acceptance_dialogue = $4, \
             image_url = $5, zone_id = $6, quest_archetype_id = $7, \
             quest_giver_character_id = $8, gold = $9, recurrence_frequency = $10, \
             next_recurrence_at = $11, recurring_quest_id = $12, updated_at = $13 \
             WHERE id = $1",
        )
        .bind(quest.id)
        .bind(&quest.name)
        .bind(&quest.description)
        .bind(Json(&quest.acceptance_dialogue))
        .bind(&quest.image_url)
        .bind(quest.zone_id)
        .bind(quest.quest_archetype_id)
        .bind(quest.quest_giver_character_id)
        .bind(quest.gold)
        .bind(schedule.map(|s| s.frequency.as_str()))
        .bind(schedule.map(|s| s.next_occurrence_at))
        .bind(quest.recurring_group_id)
        .bind(quest.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(infrastructure)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("quest", quest.id));
        }
        Ok(())
    }

    async fn find_character_actions(
        &mut self,
        character_id: Uuid,
    ) -> Result<Vec<CharacterAction>, DomainError> {
        sqlx::query_as::<_, ActionRow>(
            "SELECT id, character_id, action_type, dialogue, metadata \
             FROM character_actions WHERE character_id = $1 ORDER BY id",
        )
        .bind(character_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(infrastructure)?
        .into_iter()
        .map(CharacterAction::try_from)
        .collect()
    }

    async fn insert_character_action(&mut self, action: &CharacterAction) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO character_actions (id, character_id, action_type, dialogue, metadata) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(action.id)
        .bind(action.character_id)
        .bind(action.action_type.as_str())
        .bind(Json(&action.dialogue))
        .bind(Json(&action.metadata))
        .execute(&mut *self.tx)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn delete_character_action(&mut self, action_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM character_actions WHERE id = $1")
            .bind(action_id)
            .execute(&mut *self.tx)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn record_submission(&mut self, submission: &Submission) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO quest_submissions (id, challenge_id, user_id, team_id, image_url, \
             text, is_correct, reason, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(submission.id)
        .bind(submission.challenge_id)
        .bind(submission.submitter.user_id())
        .bind(submission.submitter.team_id())
        .bind(&submission.image_url)
        .bind(&submission.text)
        .bind(submission.is_correct)
        .bind(&submission.reason)
        .bind(submission.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyCompleted {
                    challenge_id: submission.challenge_id,
                }
            } else {
                infrastructure(e)
            }
        })?;
        Ok(())
    }

    async fn load_user_level(
        &mut self,
        user_id: Uuid,
    ) -> Result<Option<ProgressionCounter>, DomainError> {
        let row = sqlx::query_as::<_, CounterRow>(
            "SELECT level, total_points, points_on_level FROM user_levels WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(ProgressionCounter::from))
    }

    async fn save_user_level(
        &mut self,
        user_id: Uuid,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError> {
        self.save_counter(
            "INSERT INTO user_levels (user_id, level, total_points, points_on_level) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 level = EXCLUDED.level, \
                 total_points = EXCLUDED.total_points, \
                 points_on_level = EXCLUDED.points_on_level",
            user_id,
            None,
            counter,
        )
        .await
    }

    async fn load_zone_reputation(
        &mut self,
        user_id: Uuid,
        zone_id: Uuid,
    ) -> Result<Option<ProgressionCounter>, DomainError> {
        let row = sqlx::query_as::<_, CounterRow>(
            "SELECT level, total_points, points_on_level FROM user_zone_reputations \
             WHERE user_id = $1 AND zone_id = $2",
        )
        .bind(user_id)
        .bind(zone_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(infrastructure)?;
        Ok(row.map(ProgressionCounter::from))
    }

    async fn save_zone_reputation(
        &mut self,
        user_id: Uuid,
        zone_id: Uuid,
        counter: &ProgressionCounter,
    ) -> Result<(), DomainError> {
        self.save_counter(
            "INSERT INTO user_zone_reputations \
                 (user_id, zone_id, level, total_points, points_on_level) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, zone_id) DO UPDATE SET \
                 level = EXCLUDED.level, \
                 total_points = EXCLUDED.total_points, \
                 points_on_level = EXCLUDED.points_on_level",
            user_id,
            Some(zone_id),
            counter,
        )
        .await
    }

    async fn append_audit_entry(&mut self, entry: &AuditEntry) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO audit_items (id, user_id, team_id, message, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.team_id)
        .bind(&entry.message)
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx } = *self;
        tx.commit().await.map_err(infrastructure)
    }
}
