//! Full scenario runs against the in-memory fake cluster.
//!
//! These tests exercise the exact sequence used against live clusters:
//! create per site, verify everywhere, update plus federated link, verify
//! everywhere, delete, verify absence everywhere.

mod common;

use common::FakeCluster;
use idm_crosscheck::scenario::{ReplicationScenario, ScenarioOptions, StepAction};
use idm_crosscheck::{ScenarioError, Site};

#[tokio::test]
async fn healthy_three_site_cluster_passes() {
    let cluster = FakeCluster::replicated(&Site::ALL);
    let probe = cluster[0].1.clone();
    let scenario = ReplicationScenario::new(cluster, ScenarioOptions::default());

    let report = scenario.run().await.expect("replicated run should pass");

    // 3 owners, each phase verified on all 3 sites.
    assert_eq!(report.count(StepAction::Created), 3);
    assert_eq!(report.count(StepAction::VerifiedCreated), 9);
    assert_eq!(report.count(StepAction::Updated), 3);
    assert_eq!(report.count(StepAction::VerifiedUpdated), 9);
    assert_eq!(report.count(StepAction::Deleted), 3);
    assert_eq!(report.count(StepAction::VerifiedDeleted), 9);
    assert!(report.finished_at >= report.started_at);

    // Scenario cleans up after itself.
    assert_eq!(probe.user_count().await, 0);
}

#[tokio::test]
async fn single_site_run_only_touches_that_site() {
    let cluster = FakeCluster::replicated(&[Site::Azr]);
    let scenario = ReplicationScenario::new(cluster, ScenarioOptions::default());

    let report = scenario.run().await.expect("single-site run should pass");

    assert_eq!(report.count(StepAction::Created), 1);
    assert_eq!(report.count(StepAction::VerifiedCreated), 1);
    assert_eq!(report.count(StepAction::VerifiedDeleted), 1);
    assert!(report.steps.iter().all(|step| step.site == Site::Azr));
    assert!(
        report
            .steps
            .iter()
            .all(|step| step.email == "test-azr@example.com")
    );
}

#[tokio::test]
async fn two_site_run_cross_checks_both() {
    let cluster = FakeCluster::replicated(&[Site::Aws, Site::Gce]);
    let scenario = ReplicationScenario::new(cluster, ScenarioOptions::default());

    let report = scenario.run().await.expect("two-site run should pass");

    assert_eq!(report.count(StepAction::Created), 2);
    // Each of the 2 users verified on both sites, three verify phases.
    assert_eq!(report.count(StepAction::VerifiedCreated), 4);
    assert_eq!(report.count(StepAction::VerifiedUpdated), 4);
    assert_eq!(report.count(StepAction::VerifiedDeleted), 4);
}

#[tokio::test]
async fn partitioned_cluster_is_reported_as_mismatch() {
    let cluster = FakeCluster::partitioned(&Site::ALL);
    let scenario = ReplicationScenario::new(cluster, ScenarioOptions::default());

    let err = scenario.run().await.expect_err("partition must fail the run");

    // The aws-owned user is checked on azr first among the other sites.
    match err {
        ScenarioError::Mismatch { site, email, detail } => {
            assert_eq!(site, Site::Azr);
            assert_eq!(email, "test-aws@example.com");
            assert!(detail.contains("not found"), "unexpected detail: {detail}");
        }
        other => panic!("expected a mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn leftover_user_from_earlier_run_is_replaced() {
    let cluster = FakeCluster::replicated(&Site::ALL);
    let probe = cluster[0].1.clone();
    let stale_id = probe.seed_user("test-aws@example.com").await;

    let scenario = ReplicationScenario::new(cluster, ScenarioOptions::default());
    scenario
        .run()
        .await
        .expect("run should replace the leftover user");

    // The stale entry must have been removed along the way.
    assert_eq!(probe.user_count().await, 0);
    assert!(!stale_id.is_empty());
}

#[tokio::test]
async fn federated_id_format_check_accepts_federated_ids() {
    let cluster = FakeCluster::replicated(&Site::ALL);
    let options = ScenarioOptions {
        require_federated_id_format: true,
        ..ScenarioOptions::default()
    };
    let scenario = ReplicationScenario::new(cluster, options);
    scenario.run().await.expect("federated ids should pass the check");
}

#[tokio::test]
async fn federated_id_format_check_rejects_plain_ids() {
    let cluster = FakeCluster::replicated_with_plain_ids(&[Site::Aws]);
    let options = ScenarioOptions {
        require_federated_id_format: true,
        ..ScenarioOptions::default()
    };
    let scenario = ReplicationScenario::new(cluster, options);

    let err = scenario.run().await.expect_err("plain ids must fail the check");
    match err {
        ScenarioError::Mismatch { site, detail, .. } => {
            assert_eq!(site, Site::Aws);
            assert!(detail.contains("federated-storage id"));
        }
        other => panic!("expected a mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn custom_options_shape_emails_and_names() {
    let cluster = FakeCluster::replicated(&[Site::Gce]);
    let probe = cluster[0].1.clone();
    let options = ScenarioOptions {
        user_prefix: "repl".to_string(),
        mail_domain: "corp.example".to_string(),
        provider_alias: "github".to_string(),
        ..ScenarioOptions::default()
    };
    let scenario = ReplicationScenario::new(cluster, options);

    let report = scenario.run().await.expect("custom options should pass");
    assert!(
        report
            .steps
            .iter()
            .all(|step| step.email == "repl-gce@corp.example")
    );
    assert_eq!(probe.user_count().await, 0);
}
