//! Integration test: the full brainstorm → review → generate flow over real HTTP.
//!
//! Starts the in-memory fake backend, drives a `BulkPipeline` through libcurl,
//! and checks both what the client observed and what the server received.

mod common;

use bulkgen_core::api::ApiError;
use bulkgen_core::config::{BulkgenConfig, Credentials, PollConfig, RetryConfig};
use bulkgen_core::listing::JobQuery;
use bulkgen_core::pipeline::{BrainstormRequest, ContentParams, DirectRequest};
use bulkgen_core::{BulkError, BulkPipeline, JobStatus, Phase};
use serde_json::json;

fn config_for(base_url: &str) -> BulkgenConfig {
    BulkgenConfig {
        base_url: base_url.to_string(),
        credentials: Credentials {
            username: common::api_server::USERNAME.to_string(),
            password: common::api_server::PASSWORD.to_string(),
        },
        poll: Some(PollConfig {
            interval_ms: 10,
            error_backoff_ms: 20,
        }),
        retry: Some(RetryConfig {
            max_attempts: 2,
            base_delay_secs: 0.01,
            max_delay_secs: 1,
        }),
        ..BulkgenConfig::default()
    }
}

#[tokio::test]
async fn brainstorm_review_generate_completes() {
    let server = common::api_server::start();
    let mut pipeline = BulkPipeline::from_config(&config_for(&server.base_url)).unwrap();

    let request = BrainstormRequest::new("Home Coffee Brewing", 3)
        .with_category("lifestyle")
        .with_content(ContentParams {
            target_length: Some("1500".to_string()),
            brand_voice: Some("friendly expert".to_string()),
            ..ContentParams::default()
        });
    let job = pipeline.start_brainstorm(request).await.expect("brainstorm");
    let job_id = job.job_id.clone();
    assert_eq!(job.ideas.len(), 3);
    assert_eq!(job.status, JobStatus::PendingReview);

    let roster = pipeline.roster_mut().expect("roster after brainstorm");
    let rejected_id = roster.entries()[1].idea.idea_id.clone();
    roster.toggle(1, false).unwrap();
    roster
        .set_custom_guidance(0, Some("Mention grind size".to_string()))
        .unwrap();

    let submission = pipeline.submit_review().await.expect("review");
    assert_eq!(submission.approved_ideas.len(), 2);
    assert_eq!(submission.rejected_idea_ids, vec![rejected_id.clone()]);

    let received = server.last_review().expect("server saw the review");
    assert_eq!(received["rejected_idea_ids"], json!([rejected_id]));
    assert_eq!(received["approved_ideas"][0]["guidance"], "Mention grind size");
    assert_eq!(
        received["approved_ideas"][0]["keywords"],
        json!(["home coffee brewing 1", "beginner", "equipment"])
    );

    pipeline.start_generation().await.expect("generation");
    assert_eq!(pipeline.phase(), Phase::Generating);

    let first = pipeline.next_update().await.expect("first progress update");
    assert_eq!(first.status, JobStatus::Generating);
    assert!((first.progress_percent - 33.0).abs() < 1e-9);

    let last = pipeline.next_update().await.expect("terminal update");
    assert_eq!(last.status, JobStatus::Completed);
    assert!((last.progress_percent - 100.0).abs() < 1e-9);
    assert_eq!(last.completed_articles, 2);
    assert_eq!(last.total_articles, 2);
    assert_eq!(pipeline.phase(), Phase::Completed);
    assert!(pipeline.next_update().await.is_none());

    let path = format!("GET /bulk/jobs/{}", job_id);
    assert_eq!(server.count(&path), 2, "no poll after the terminal status");

    let err = pipeline.cancel_job(&job_id).await.unwrap_err();
    assert!(matches!(err, BulkError::JobTerminated { .. }));
}

#[tokio::test]
async fn cancel_and_delete_refresh_the_listing() {
    let server = common::api_server::start();
    let mut pipeline = BulkPipeline::from_config(&config_for(&server.base_url)).unwrap();

    pipeline
        .start_brainstorm(BrainstormRequest::new("Sourdough", 2))
        .await
        .unwrap();
    let pending = pipeline.active_job().unwrap().job_id.clone();
    let direct = pipeline
        .start_direct(DirectRequest::new("Kombucha", 1).with_category("drinks"))
        .await
        .unwrap()
        .job_id
        .clone();
    pipeline.stop_monitoring();

    let listing = pipeline.list_jobs(&JobQuery::default()).await.unwrap();
    assert_eq!(listing.total(), 2);
    assert_eq!(listing.pending_review.len(), 1);
    assert_eq!(listing.pending_review[0].job_id, pending);

    let listing = pipeline.cancel_job(&pending).await.unwrap().unwrap();
    let cancelled = listing.iter().find(|j| j.job_id == pending).unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert!(listing.pending_review.is_empty());

    let listing = pipeline.delete_job(&pending).await.unwrap().unwrap();
    assert_eq!(listing.total(), 1);
    assert_eq!(listing.others[0].job_id, direct);
    assert_eq!(pipeline.active_job().unwrap().job_id, direct);
}

#[tokio::test]
async fn wrong_credentials_are_an_auth_error() {
    let server = common::api_server::start();
    let mut cfg = config_for(&server.base_url);
    cfg.credentials.password = "wrong".to_string();
    let mut pipeline = BulkPipeline::from_config(&cfg).unwrap();

    let err = pipeline
        .start_brainstorm(BrainstormRequest::new("Tea", 1))
        .await
        .unwrap_err();
    match err.api_error() {
        Some(ApiError::Auth { message }) => assert_eq!(message, "Not authenticated"),
        other => panic!("expected Auth error, got {:?}", other),
    }
    // 401 is not retried.
    assert_eq!(server.count("POST /bulk/brainstorm"), 1);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let server = common::api_server::start();
    let mut pipeline = BulkPipeline::from_config(&config_for(&server.base_url)).unwrap();
    let err = pipeline
        .open_job(&"does-not-exist".into())
        .await
        .unwrap_err();
    assert!(matches!(err.api_error(), Some(ApiError::NotFound { .. })));
    assert_eq!(pipeline.phase(), Phase::New);
}
