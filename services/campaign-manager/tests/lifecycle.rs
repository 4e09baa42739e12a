mod common;

use campaign_manager::error::ProvisionError;
use campaign_manager::lifecycle::{CampaignLifecycle, PauseOutcome, RetireOutcome};
use campaign_manager::orchestrator::Stage;
use common::{CallKind, FakeAds};
use serde_json::json;
use shared::dto::{AdsService, Status};

fn lifecycle(fake: &std::sync::Arc<FakeAds>) -> CampaignLifecycle {
    CampaignLifecycle::new(fake.clone())
}

#[tokio::test]
async fn retire_attempts_budget_removal_after_status_error() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"budget": {"budgetId": 77}})]);
    fake.fail_on(AdsService::CampaignService, 1);

    let outcome = lifecycle(&fake).retire(5).await.unwrap();

    let RetireOutcome::Attempted {
        status_removal,
        budget_removal,
    } = outcome
    else {
        panic!("campaign should have been found");
    };
    assert!(status_removal.is_err());
    assert!(budget_removal.is_ok());
    let mutates = fake.mutates();
    assert_eq!(mutates.len(), 2);
    assert_eq!(mutates[0].request[0]["operand"]["status"], "REMOVED");
    assert_eq!(mutates[1].service, AdsService::BudgetService);
    assert_eq!(
        mutates[1].request[0],
        json!({"operator": "REMOVE", "operand": {"budgetId": 77}})
    );
}

#[tokio::test]
async fn retire_reports_both_failures() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"budget": {"budgetId": 77}})]);
    fake.fail_on(AdsService::CampaignService, 1);
    fake.fail_on(AdsService::BudgetService, 1);

    let outcome = lifecycle(&fake).retire(5).await.unwrap();

    assert!(!outcome.is_complete());
    match outcome {
        RetireOutcome::Attempted {
            status_removal: Err(_),
            budget_removal: Err(_),
        } => {}
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fake.mutates().len(), 2);
}

#[tokio::test]
async fn retire_of_healthy_campaign_is_complete() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"budget": {"budgetId": 77}})]);

    let outcome = lifecycle(&fake).retire(5).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(fake.mutates()[0].request[0]["operand"]["id"], 5);
}

#[tokio::test]
async fn retire_without_budget_reference_skips_the_budget_call() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"id": 5})]);

    let outcome = lifecycle(&fake).retire(5).await.unwrap();

    match outcome {
        RetireOutcome::Attempted {
            status_removal: Ok(()),
            budget_removal:
                Err(ProvisionError::MissingReference {
                    stage: Stage::Budget,
                }),
        } => {}
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fake.mutated_services(), vec![AdsService::CampaignService]);
}

#[tokio::test]
async fn retire_of_unknown_campaign_mutates_nothing() {
    let fake = FakeAds::new();

    let outcome = lifecycle(&fake).retire(5).await.unwrap();

    assert!(matches!(outcome, RetireOutcome::NotFound));
    assert!(fake.mutates().is_empty());
    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::Get);
    assert_eq!(calls[0].request["predicates"][0]["values"][0], "5");
}

#[tokio::test]
async fn pause_only_touches_campaign_status() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"budget": {"budgetId": 77}})]);

    let outcome = lifecycle(&fake).pause(5).await.unwrap();

    assert_eq!(outcome, PauseOutcome::Paused);
    let mutates = fake.mutates();
    assert_eq!(mutates.len(), 1);
    assert_eq!(mutates[0].service, AdsService::CampaignService);
    assert_eq!(
        mutates[0].request[0],
        json!({"operator": "SET", "operand": {"id": 5, "status": "PAUSED"}})
    );
}

#[tokio::test]
async fn pause_of_unknown_campaign_mutates_nothing() {
    let fake = FakeAds::new();

    let outcome = lifecycle(&fake).pause(5).await.unwrap();

    assert_eq!(outcome, PauseOutcome::NotFound);
    assert!(fake.mutates().is_empty());
}

#[tokio::test]
async fn pause_error_is_forwarded() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"id": 5})]);
    fake.fail_on(AdsService::CampaignService, 1);

    let err = lifecycle(&fake).pause(5).await.unwrap_err();

    assert_eq!(err.remote().and_then(|r| r.status()), Some(400));
}

#[tokio::test]
async fn lookup_error_aborts_before_any_mutate() {
    let fake = FakeAds::new();
    fake.fail_gets();

    assert!(lifecycle(&fake).retire(5).await.is_err());
    assert!(fake.mutates().is_empty());
}

#[tokio::test]
async fn list_returns_entries_and_total() {
    let fake = FakeAds::new();
    fake.with_entries(vec![
        json!({"id": 1, "name": "Alpha", "status": "ENABLED"}),
        json!({"id": 2, "name": "Beta", "status": "PAUSED"}),
    ]);

    let list = lifecycle(&fake).list().await.unwrap();

    assert_eq!(list.total, 2);
    assert_eq!(list.campaigns[1].name.as_deref(), Some("Beta"));
    let request = &fake.calls()[0].request;
    assert_eq!(request["fields"], json!(["Id", "Name", "Status"]));
    assert_eq!(request["ordering"][0]["field"], "Name");
}

#[tokio::test]
async fn list_keeps_campaigns_with_unmodelled_status() {
    let fake = FakeAds::new();
    fake.with_entries(vec![
        json!({"id": "1", "name": "Alpha", "status": "ENABLED"}),
        json!({"id": "2", "name": "Beta", "status": "SOME_NEW_STATUS"}),
    ]);

    let list = lifecycle(&fake).list().await.unwrap();

    assert_eq!(list.campaigns.len(), 2);
    assert_eq!(list.campaigns[0].id, Some(1));
    assert_eq!(list.campaigns[1].status, Some(Status::Unknown));
}

#[tokio::test]
async fn retire_accepts_budget_id_as_string() {
    let fake = FakeAds::new();
    fake.with_entries(vec![json!({"budget": {"budgetId": "77"}})]);

    let outcome = lifecycle(&fake).retire(5).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(fake.mutates()[1].request[0]["operand"]["budgetId"], 77);
}
