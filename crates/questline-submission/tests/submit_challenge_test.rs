//! Integration tests for `handle_submit_challenge`.

mod common;

use common::{Harness, seed_campaign, team_submits, user_submits};
use questline_core::error::DomainError;
use questline_core::rng::DeterministicRng;
use questline_progression::ProgressionCounter;
use questline_quest::domain::submission::Submitter;
use questline_submission::application::command_handlers::{
    SubmissionServices, handle_submit_challenge,
};
use questline_submission::domain::results::Verdict;
use questline_submission::domain::settings::SubmissionSettings;
use questline_test_support::{
    Allocation, FailingAllocator, FailingJudge, FailingQuestStore, FailingStatPool,
    RecordingAllocator, ScriptedJudge, SequenceRng,
};
use uuid::Uuid;

// --- accepted submissions ---

#[tokio::test]
async fn test_user_finishing_quest_earns_completion_items_and_progression() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let command = user_submits(campaign.finale, user_id);

    // Act
    let result = handle_submit_challenge(&command, &SubmissionSettings::default(), harness.services())
        .await
        .unwrap();

    // Assert
    assert!(result.successful);
    assert_eq!(result.reason, "looks right");
    assert!(result.quest_completed);
    assert_eq!(result.experience_awarded, 350);
    assert_eq!(result.reputation_awarded, 350);
    assert_eq!(result.zone_id, Some(campaign.zone_id));
    assert!(result.level_up);
    assert!(!result.reputation_up);
    let item_ids: Vec<i32> = result.items_awarded.iter().map(|item| item.id).collect();
    assert_eq!(item_ids, [42, 9_001]);

    let level = harness.store.user_level(user_id).unwrap();
    assert_eq!(level.level, 2);
    assert_eq!(level.total_points, 350);
    let reputation = harness
        .store
        .zone_reputation(user_id, campaign.zone_id)
        .unwrap();
    assert_eq!(reputation.level, 1);
    assert_eq!(reputation.total_points, 350);
    assert_eq!(harness.stat_pool.credits(), vec![(user_id, 3)]);
}

#[tokio::test]
async fn test_accepted_submission_writes_feed_lines() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();

    // Act
    handle_submit_challenge(
        &user_submits(campaign.finale, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    let feed: Vec<String> = harness
        .store
        .audit_entries()
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    assert_eq!(
        feed,
        vec![
            format!(
                "You captured {{PointOfInterest|{}}} at tier II.",
                campaign.leaf_point.id
            ),
            "You completed a quest: Harbour Lights.".to_owned(),
        ]
    );
    assert!(
        harness
            .store
            .audit_entries()
            .iter()
            .all(|entry| entry.user_id == Some(user_id) && entry.team_id.is_none())
    );
}

#[tokio::test]
async fn test_non_terminal_capture_awards_base_points_only() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();

    // Act
    let result = handle_submit_challenge(
        &user_submits(campaign.gate, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    assert!(result.successful);
    assert!(!result.quest_completed);
    assert_eq!(result.experience_awarded, 100);
    assert_eq!(result.reputation_awarded, 100);
    assert_eq!(harness.store.audit_entries().len(), 1);
    assert_eq!(
        harness.allocator.allocations(),
        vec![Allocation::Random(Submitter::UserId(user_id))]
    );
    assert_eq!(result.items_awarded[0].id, 9_001);
}

#[tokio::test]
async fn test_second_capture_does_not_level_again() {
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let settings = SubmissionSettings::default();

    let first = handle_submit_challenge(&user_submits(campaign.gate, user_id), &settings, harness.services())
        .await
        .unwrap();
    let second =
        handle_submit_challenge(&user_submits(campaign.finale, user_id), &settings, harness.services())
            .await
            .unwrap();

    assert!(first.level_up);
    assert!(!second.level_up);
    assert_eq!(harness.store.user_level(user_id).unwrap().total_points, 450);
    assert_eq!(harness.stat_pool.credits().len(), 1);
}

#[tokio::test]
async fn test_team_submission_completes_without_progression() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let team_id = Uuid::new_v4();

    // Act
    let result = handle_submit_challenge(
        &team_submits(campaign.finale, team_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    assert!(result.successful);
    assert!(result.quest_completed);
    assert_eq!(result.experience_awarded, 0);
    assert_eq!(result.reputation_awarded, 0);
    assert!(!result.level_up);
    assert_eq!(
        harness.allocator.allocations(),
        vec![
            Allocation::Specific(Submitter::TeamId(team_id), 42),
            Allocation::Random(Submitter::TeamId(team_id))
        ]
    );
    assert!(harness.stat_pool.credits().is_empty());

    let feed = harness.store.audit_entries();
    assert_eq!(feed.len(), 2);
    assert!(feed[0].message.starts_with(&format!("{{Team|{team_id}}} captured")));
    assert!(feed.iter().all(|entry| entry.team_id == Some(team_id)));
}

#[tokio::test]
async fn test_team_submission_without_zone_is_accepted() {
    let harness = Harness::accepting();
    let mut builder = questline_test_support::QuestGraphBuilder::new("Nowhere");
    let node = builder.node(0);
    let challenge = builder.challenge(node, 1);
    harness.store.seed_quest_graph(builder.build());

    let result = handle_submit_challenge(
        &team_submits(challenge, Uuid::new_v4()),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    assert!(result.successful);
    assert_eq!(result.zone_id, None);
}

#[tokio::test]
async fn test_named_item_challenge_also_gets_random_drop() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();

    // Act
    let result = handle_submit_challenge(
        &user_submits(campaign.finale, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    let submitter = Submitter::UserId(user_id);
    assert_eq!(
        harness.allocator.allocations(),
        vec![
            Allocation::Specific(submitter, 42),
            Allocation::Random(submitter)
        ]
    );
    assert_eq!(result.items_awarded.len(), 2);
}

#[tokio::test]
async fn test_stat_points_scale_with_setting() {
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let settings = SubmissionSettings {
        stat_points_per_level: 5,
    };

    handle_submit_challenge(&user_submits(campaign.gate, user_id), &settings, harness.services())
        .await
        .unwrap();

    assert_eq!(harness.stat_pool.credits(), vec![(user_id, 5)]);
}

#[tokio::test]
async fn test_existing_progress_levels_up_at_threshold() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    harness
        .store
        .seed_user_level(user_id, ProgressionCounter::restore(2, 1_000, 950));

    // Act
    let result = handle_submit_challenge(
        &user_submits(campaign.gate, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    assert!(result.level_up);
    let level = harness.store.user_level(user_id).unwrap();
    assert_eq!(level.level, 3);
    assert_eq!(level.total_points, 1_100);
    assert_eq!(level.points_on_level, 100);
}

#[tokio::test]
async fn test_ids_are_drawn_from_injected_rng() {
    // Arrange
    let values: Vec<u32> = (1..=12).collect();
    let harness = Harness::accepting().with_rng(SequenceRng::new(values.clone()));
    let campaign = seed_campaign(&harness.store);
    let mut expected = SequenceRng::new(values);
    let submission_id = expected.next_uuid();
    let capture_id = expected.next_uuid();
    let completion_id = expected.next_uuid();

    // Act
    handle_submit_challenge(
        &user_submits(campaign.finale, Uuid::new_v4()),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(harness.store.submissions()[0].id, submission_id);
    let feed_ids: Vec<Uuid> = harness
        .store
        .audit_entries()
        .iter()
        .map(|entry| entry.id)
        .collect();
    assert_eq!(feed_ids, vec![capture_id, completion_id]);
}

// --- rejected and repeated submissions ---

#[tokio::test]
async fn test_rejected_submission_changes_nothing() {
    // Arrange
    let harness = Harness::with(
        ScriptedJudge::rejecting("that is a different lighthouse"),
        RecordingAllocator::new(),
    );
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();

    // Act
    let result = handle_submit_challenge(
        &user_submits(campaign.finale, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    // Assert
    assert!(!result.successful);
    assert_eq!(result.reason, "that is a different lighthouse");
    assert!(!result.quest_completed);
    assert!(result.items_awarded.is_empty());
    assert!(harness.store.submissions().is_empty());
    assert!(harness.store.audit_entries().is_empty());
    assert!(harness.store.user_level(user_id).is_none());
    assert!(harness.allocator.allocations().is_empty());
    assert_eq!(harness.judge.judged(), vec![campaign.finale]);
}

#[tokio::test]
async fn test_retry_after_rejection_can_succeed() {
    let harness = Harness::with(
        ScriptedJudge::scripted(vec![
            Verdict {
                successful: false,
                reason: "too blurry".to_owned(),
            },
            Verdict {
                successful: true,
                reason: "clear shot".to_owned(),
            },
        ]),
        RecordingAllocator::new(),
    );
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let settings = SubmissionSettings::default();

    let first = handle_submit_challenge(&user_submits(campaign.gate, user_id), &settings, harness.services())
        .await
        .unwrap();
    let second = handle_submit_challenge(&user_submits(campaign.gate, user_id), &settings, harness.services())
        .await
        .unwrap();

    assert!(!first.successful);
    assert!(second.successful);
    assert_eq!(second.reason, "clear shot");
    assert_eq!(harness.store.submissions().len(), 1);
}

#[tokio::test]
async fn test_second_correct_submission_is_already_completed() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let settings = SubmissionSettings::default();
    handle_submit_challenge(&user_submits(campaign.finale, user_id), &settings, harness.services())
        .await
        .unwrap();

    // Act
    let result =
        handle_submit_challenge(&user_submits(campaign.finale, user_id), &settings, harness.services())
            .await;

    // Assert
    assert!(matches!(
        result,
        Err(DomainError::AlreadyCompleted { challenge_id }) if challenge_id == campaign.finale
    ));
    assert_eq!(harness.store.user_level(user_id).unwrap().total_points, 350);
    assert_eq!(harness.store.audit_entries().len(), 2);
    assert_eq!(harness.allocator.allocations().len(), 2);
    assert_eq!(harness.judge.judged().len(), 1);
}

#[tokio::test]
async fn test_teammate_and_user_complete_independently() {
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let settings = SubmissionSettings::default();

    let user = handle_submit_challenge(
        &user_submits(campaign.finale, Uuid::new_v4()),
        &settings,
        harness.services(),
    )
    .await
    .unwrap();
    let team = handle_submit_challenge(
        &team_submits(campaign.finale, Uuid::new_v4()),
        &settings,
        harness.services(),
    )
    .await
    .unwrap();

    assert!(user.successful);
    assert!(team.successful);
    assert_eq!(harness.store.submissions().len(), 2);
}

// --- invalid commands and missing records ---

#[tokio::test]
async fn test_submission_needs_exactly_one_submitter() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let mut both = user_submits(campaign.gate, Uuid::new_v4());
    both.team_id = Some(Uuid::new_v4());
    let mut neither = user_submits(campaign.gate, Uuid::new_v4());
    neither.user_id = None;
    let settings = SubmissionSettings::default();

    // Act
    let both = handle_submit_challenge(&both, &settings, harness.services()).await;
    let neither = handle_submit_challenge(&neither, &settings, harness.services()).await;

    // Assert
    assert!(matches!(both, Err(DomainError::Validation(_))));
    assert!(matches!(neither, Err(DomainError::Validation(_))));
    assert!(harness.judge.judged().is_empty());
}

#[tokio::test]
async fn test_unknown_challenge_is_not_found() {
    let harness = Harness::accepting();
    let challenge_id = Uuid::new_v4();

    let result = handle_submit_challenge(
        &user_submits(challenge_id, Uuid::new_v4()),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound { entity: "challenge", id }) if id == challenge_id
    ));
}

#[tokio::test]
async fn test_user_submission_without_zone_is_not_found() {
    // Arrange
    let harness = Harness::accepting();
    let mut builder = questline_test_support::QuestGraphBuilder::new("Nowhere");
    let node = builder.node(0);
    let challenge = builder.challenge(node, 1);
    harness.store.seed_quest_graph(builder.build());

    // Act
    let result = handle_submit_challenge(
        &user_submits(challenge, Uuid::new_v4()),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await;

    // Assert
    assert!(matches!(result, Err(DomainError::NotFound { entity: "zone", .. })));
    assert!(harness.store.submissions().is_empty());
}

#[tokio::test]
async fn test_quest_zone_is_used_when_point_has_none() {
    let harness = Harness::accepting();
    let zone_id = Uuid::new_v4();
    let mut builder = questline_test_support::QuestGraphBuilder::new("Zoned");
    builder.quest_mut().zone_id = Some(zone_id);
    let node = builder.node(0);
    let challenge = builder.challenge(node, 1);
    harness.store.seed_quest_graph(builder.build());
    let user_id = Uuid::new_v4();

    let result = handle_submit_challenge(
        &user_submits(challenge, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await
    .unwrap();

    assert_eq!(result.zone_id, Some(zone_id));
    assert!(harness.store.zone_reputation(user_id, zone_id).is_some());
}

// --- collaborator failures ---

#[tokio::test]
async fn test_judge_failure_is_external_service_error() {
    let harness = Harness::with(FailingJudge, RecordingAllocator::new());
    let campaign = seed_campaign(&harness.store);

    let result = handle_submit_challenge(
        &user_submits(campaign.finale, Uuid::new_v4()),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await;

    assert!(matches!(
        result,
        Err(DomainError::ExternalService { service: "judge", .. })
    ));
    assert!(harness.store.submissions().is_empty());
}

#[tokio::test]
async fn test_allocator_failure_records_nothing() {
    // Arrange
    let harness = Harness::with(ScriptedJudge::accepting(), FailingAllocator);
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();

    // Act
    let result = handle_submit_challenge(
        &user_submits(campaign.finale, user_id),
        &SubmissionSettings::default(),
        harness.services(),
    )
    .await;

    // Assert
    assert!(matches!(
        result,
        Err(DomainError::ExternalService { service: "quartermaster", .. })
    ));
    assert!(harness.store.submissions().is_empty());
    assert!(harness.store.user_level(user_id).is_none());
    assert!(harness.store.zone_reputation(user_id, campaign.zone_id).is_none());
    assert!(harness.store.audit_entries().is_empty());
    assert!(harness.stat_pool.credits().is_empty());
}

#[tokio::test]
async fn test_retry_after_allocator_failure_awards_everything() {
    // Arrange
    let harness = Harness::with(ScriptedJudge::accepting(), FailingAllocator);
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let command = user_submits(campaign.finale, user_id);
    let settings = SubmissionSettings::default();
    handle_submit_challenge(&command, &settings, harness.services())
        .await
        .unwrap_err();
    let allocator = RecordingAllocator::new();
    let services = SubmissionServices {
        allocator: &allocator,
        ..harness.services()
    };

    // Act
    let result = handle_submit_challenge(&command, &settings, services)
        .await
        .unwrap();

    // Assert
    assert!(result.successful);
    assert_eq!(result.items_awarded.len(), 2);
    assert_eq!(result.experience_awarded, 350);
    assert_eq!(harness.store.user_level(user_id).unwrap().total_points, 350);
    assert_eq!(harness.store.submissions().len(), 1);
}

#[tokio::test]
async fn test_stat_pool_failure_records_nothing() {
    // Arrange
    let harness = Harness::accepting();
    let campaign = seed_campaign(&harness.store);
    let user_id = Uuid::new_v4();
    let stat_pool = FailingStatPool;
    let services = SubmissionServices {
        stat_pool: &stat_pool,
        ..harness.services()
    };

    // Act
    let result = handle_submit_challenge(
        &user_submits(campaign.finale, user_id),
        &SubmissionSettings::default(),
        services,
    )
    .await;

    // Assert
    assert!(matches!(
        result,
        Err(DomainError::ExternalService { service: "stat pool", .. })
    ));
    assert!(harness.store.submissions().is_empty());
    assert!(harness.store.user_level(user_id).is_none());
}

#[tokio::test]
async fn test_store_failure_is_infrastructure_error() {
    // Arrange
    let harness = Harness::accepting();
    let store = FailingQuestStore;
    let services = SubmissionServices {
        store: &store,
        ..harness.services()
    };

    // Act
    let result = handle_submit_challenge(
        &user_submits(Uuid::new_v4(), Uuid::new_v4()),
        &SubmissionSettings::default(),
        services,
    )
    .await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}
