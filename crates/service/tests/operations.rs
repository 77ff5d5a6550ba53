//! End-to-end tests for the service operation surface, running against the
//! in-memory collaborators and the default memory/local backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uplevel_cache::CacheStore;
use uplevel_catalog::{
    CatalogStore, DevelopmentPlan, Difficulty, Feedback, MemoryCatalog, MemoryRecords, PlanId,
    PlanResource, PlanStatus, RecordStore, StoreError, StoreResult, UserId, UserSkillProfile,
};
use uplevel_service::{
    App, Config, FeedbackRequest, SimilarSkillsRequest, SuggestionRequest, TargetSkillInput,
};
use uplevel_test_utils::{plan, profile, resource, resource_aged, skill, OfflineRecords};

fn seeded_stores() -> (Arc<MemoryCatalog>, Arc<MemoryRecords>) {
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.insert_skill(skill("rust", "Rust", "backend"));
    catalog.insert_skill(skill("go", "Go", "backend"));
    catalog.insert_skill(skill("sql", "SQL", "data"));
    catalog.insert_resource(resource("res-exact", "rust", Some(Difficulty::Intermediate)));
    catalog.insert_resource(resource_aged(
        "res-basics",
        "rust",
        Some(Difficulty::Beginner),
        2,
    ));
    catalog.insert_resource(resource("res-sql", "sql", Some(Difficulty::Advanced)));

    let records = Arc::new(MemoryRecords::new());
    records.insert_profile(profile("alice", &[("rust", 3), ("sql", 2)]));
    records.insert_profile(profile("bob", &[("rust", 3), ("sql", 2)]));
    records.insert_plan(plan(
        "plan-bob",
        "bob",
        PlanStatus::Completed,
        &[("rust", Some(7))],
        &["res-exact"],
    ));
    (catalog, records)
}

fn build_app(catalog: Arc<MemoryCatalog>, records: Arc<MemoryRecords>) -> App {
    App::new(
        &Config::default(),
        catalog as Arc<dyn CatalogStore>,
        records as Arc<dyn RecordStore>,
    )
}

fn suggestion_request(targets: &[(&str, Option<u8>)]) -> SuggestionRequest {
    SuggestionRequest {
        target_skills: targets
            .iter()
            .map(|(id, level)| TargetSkillInput {
                skill_id: id.to_string(),
                target_level: *level,
            })
            .collect(),
    }
}

#[tokio::test]
async fn suggestions_rank_and_score_matching_resources() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let response = app
        .suggestions("alice", suggestion_request(&[("rust", Some(5))]))
        .await
        .unwrap();

    assert_eq!(response.recommendations.len(), 2);
    let first = &response.recommendations[0];
    assert_eq!(first.resource_id.as_str(), "res-exact");
    // Exact gap match plus full peer popularity from bob's completed plan.
    assert!((first.score_breakdown.skill_gap - 1.0).abs() < 1e-9);
    assert_eq!(first.score_breakdown.peer_boost, Some(1.0));
    assert!((first.score - 1.0).abs() < 1e-9);

    let second = &response.recommendations[1];
    assert_eq!(second.resource_id.as_str(), "res-basics");
    // gap 4 → base 0.6, blended with zero popularity: 0.8 × 0.6 = 0.48.
    assert!((second.score_breakdown.skill_gap - 0.6).abs() < 1e-9);
    assert!((second.score - 0.48).abs() < 1e-9);

    app.shutdown();
}

#[tokio::test]
async fn suggestions_without_peers_report_no_boost() {
    let catalog = Arc::new(MemoryCatalog::new());
    catalog.insert_skill(skill("rust", "Rust", "backend"));
    catalog.insert_resource(resource("res-basics", "rust", Some(Difficulty::Beginner)));
    let records = Arc::new(MemoryRecords::new());
    records.insert_profile(profile("alice", &[("rust", 3)]));

    let app = build_app(catalog, records);
    let response = app
        .suggestions("alice", suggestion_request(&[("rust", Some(9))]))
        .await
        .unwrap();

    assert_eq!(response.recommendations.len(), 1);
    let only = &response.recommendations[0];
    assert!((only.score - 0.2).abs() < 1e-9);
    assert!(only.score_breakdown.peer_boost.is_none());
}

#[tokio::test]
async fn suggestions_memoize_catalog_and_peer_aggregates() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    app.suggestions("alice", suggestion_request(&[("rust", None)]))
        .await
        .unwrap();

    assert!(app.cache().get("catalog:snapshot").await.is_some());
    assert!(app.cache().get("peers:alice").await.is_some());
}

#[tokio::test]
async fn empty_target_skills_are_rejected_before_the_engine() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .suggestions("alice", suggestion_request(&[]))
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 400);
}

#[tokio::test]
async fn malformed_skill_id_is_rejected() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .suggestions("alice", suggestion_request(&[("two words", None)]))
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 400);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .suggestions("nobody", suggestion_request(&[("rust", None)]))
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 404);
}

#[tokio::test]
async fn unknown_target_skill_is_not_found() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .suggestions("alice", suggestion_request(&[("cobol", None)]))
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 404);
}

#[tokio::test]
async fn unreachable_record_store_surfaces_as_service_unavailable() {
    let (catalog, _records) = seeded_stores();
    let app = App::new(
        &Config::default(),
        catalog as Arc<dyn CatalogStore>,
        Arc::new(OfflineRecords),
    );

    let err = app
        .suggestions("alice", suggestion_request(&[("rust", None)]))
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 503);
}

#[tokio::test]
async fn feedback_is_recorded_and_acknowledged() {
    let (catalog, records) = seeded_stores();
    let app = build_app(Arc::clone(&catalog), Arc::clone(&records));

    let ack = app
        .record_feedback(
            "alice",
            FeedbackRequest {
                resource_id: "res-exact".into(),
                action: "like".into(),
            },
        )
        .await
        .unwrap();
    assert!(ack.recorded);

    let log = records.feedback_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].resource_id.as_str(), "res-exact");
}

#[tokio::test]
async fn feedback_for_unknown_resource_is_not_found() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .record_feedback(
            "alice",
            FeedbackRequest {
                resource_id: "res-ghost".into(),
                action: "like".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 404);
}

#[tokio::test]
async fn feedback_with_unknown_action_is_rejected() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .record_feedback(
            "alice",
            FeedbackRequest {
                resource_id: "res-exact".into(),
                action: "superlike".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 400);
}

/// Record store whose feedback append always fails; everything else
/// delegates to the in-memory store.
struct FlakyFeedbackRecords {
    inner: Arc<MemoryRecords>,
}

#[async_trait]
impl RecordStore for FlakyFeedbackRecords {
    async fn profile(&self, user: &UserId) -> StoreResult<Option<UserSkillProfile>> {
        self.inner.profile(user).await
    }

    async fn profiles(&self) -> StoreResult<Vec<UserSkillProfile>> {
        self.inner.profiles().await
    }

    async fn plan(&self, id: &PlanId) -> StoreResult<Option<DevelopmentPlan>> {
        self.inner.plan(id).await
    }

    async fn plans_with_status(
        &self,
        statuses: &[PlanStatus],
    ) -> StoreResult<Vec<DevelopmentPlan>> {
        self.inner.plans_with_status(statuses).await
    }

    async fn update_plan_outcome(
        &self,
        id: &PlanId,
        resources: Vec<PlanResource>,
        status: PlanStatus,
    ) -> StoreResult<()> {
        self.inner.update_plan_outcome(id, resources, status).await
    }

    async fn append_feedback(&self, _feedback: Feedback) -> StoreResult<()> {
        Err(StoreError::Unavailable("feedback log down".to_string()))
    }
}

#[tokio::test]
async fn feedback_append_failure_never_fails_the_request() {
    let (catalog, records) = seeded_stores();
    let app = App::new(
        &Config::default(),
        catalog as Arc<dyn CatalogStore>,
        Arc::new(FlakyFeedbackRecords { inner: records }),
    );

    let ack = app
        .record_feedback(
            "alice",
            FeedbackRequest {
                resource_id: "res-exact".into(),
                action: "dismiss".into(),
            },
        )
        .await
        .unwrap();
    assert!(!ack.recorded);
}

#[tokio::test]
async fn similar_skills_stay_within_the_category() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let response = app
        .similar_skills(SimilarSkillsRequest {
            skill_id: "rust".into(),
        })
        .await
        .unwrap();

    let ids: Vec<&str> = response
        .similar_skills
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["go"]);
    assert_eq!(response.similar_skills[0].category, "backend");
}

#[tokio::test]
async fn similar_skills_for_unknown_skill_is_not_found() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app
        .similar_skills(SimilarSkillsRequest {
            skill_id: "cobol".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_class(), 404);
}

#[tokio::test]
async fn plan_refresh_runs_out_of_band_and_activates_the_plan() {
    let (catalog, records) = seeded_stores();
    records.insert_plan(plan(
        "plan-alice",
        "alice",
        PlanStatus::Approved,
        &[("rust", Some(5))],
        &["res-previous"],
    ));
    let app = build_app(catalog, Arc::clone(&records));

    app.trigger_plan_refresh("alice", "plan-alice").await.unwrap();

    let id = PlanId::parse("plan-alice").unwrap();
    let mut activated = false;
    for _ in 0..100 {
        let current = records.plan(&id).await.unwrap().unwrap();
        if current.status == PlanStatus::Active {
            assert!(!current.recommended_resources.is_empty());
            assert!(current
                .recommended_resources
                .iter()
                .all(|r| r.resource_id.as_str() != "res-previous"));
            activated = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(activated, "plan never transitioned to active");
}

#[tokio::test]
async fn plan_refresh_is_accepted_even_when_records_are_unreachable() {
    /*
    GIVEN a record store that refuses every call
    WHEN a plan refresh is triggered
    THEN the trigger still reports accepted and the failure stays out of band
    */
    let (catalog, _records) = seeded_stores();
    let app = App::new(
        &Config::default(),
        catalog as Arc<dyn CatalogStore>,
        Arc::new(OfflineRecords),
    );

    let accepted = app.trigger_plan_refresh("alice", "plan-alice").await;
    assert!(accepted.is_ok());
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.shutdown();
}

#[tokio::test]
async fn plan_refresh_rejects_malformed_ids() {
    let (catalog, records) = seeded_stores();
    let app = build_app(catalog, records);

    let err = app.trigger_plan_refresh("alice", "").await.unwrap_err();
    assert_eq!(err.status_class(), 400);
}
