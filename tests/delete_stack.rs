// ABOUTME: Integration tests for the delete-stack command.
// ABOUTME: Checks nothing is deleted without a y/Y answer and image failures never block the stack.

mod support;

use lamdeploy::commands;
use lamdeploy::config::Settings;
use lamdeploy::confirm::FixedConfirm;
use lamdeploy::deploy::DeployErrorKind;
use lamdeploy::diagnostics::{Diagnostics, WarningKind};
use lamdeploy::output::{Output, OutputMode};
use support::mock_cloud::MockCloud;
use support::{env_without, invocation, invocation_with};

fn output() -> Output {
    Output::new(OutputMode::Quiet)
}

#[tokio::test]
async fn anything_but_y_aborts_without_deleting() {
    for answer in ["", "\n", "n", "N", "no", "yes", "YES", "yy", " q "] {
        let cloud = MockCloud::new().with_remote_tags(&["v1", "latest"]);
        let confirm = FixedConfirm::new(answer);

        let err = commands::delete_stack(&invocation(), &cloud, &confirm, &output(), &mut Diagnostics::default())
            .await
            .unwrap_err();

        assert_eq!(err.deploy_kind(), Some(DeployErrorKind::UserAborted), "answer {answer:?}");
        assert!(cloud.calls().is_empty(), "answer {answer:?} made calls: {:?}", cloud.calls());
        assert_eq!(cloud.remote_tags().len(), 2);
    }
}

#[tokio::test]
async fn y_and_capital_y_delete_images_then_stack() {
    for answer in ["y", "Y"] {
        let cloud = MockCloud::new().with_remote_tags(&["20240101-120000", "20240102-090000", "latest"]);
        let confirm = FixedConfirm::new(answer);

        let report = commands::delete_stack(&invocation(), &cloud, &confirm, &output(), &mut Diagnostics::default())
            .await
            .unwrap();

        assert_eq!(report.deleted.len(), 3);
        assert_eq!(cloud.count("delete_image"), 3);
        assert_eq!(cloud.count("delete_stack"), 1);
        assert!(cloud.remote_tags().is_empty());

        let calls = cloud.calls();
        let last_image = calls.iter().rposition(|c| *c == "delete_image").unwrap();
        let stack = calls.iter().position(|c| *c == "delete_stack").unwrap();
        assert!(last_image < stack, "images must go before the stack: {calls:?}");
    }
}

#[tokio::test]
async fn repository_comes_from_stack_outputs() {
    let cloud = MockCloud::new().with_remote_tags(&["v1"]);

    let report = commands::delete_stack(
        &invocation(),
        &cloud,
        &FixedConfirm::new("y"),
        &output(),
        &mut Diagnostics::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.repository.unwrap().as_str(), "x");
}

#[tokio::test]
async fn image_delete_failure_does_not_block_stack_deletion() {
    let cloud = MockCloud::new()
        .with_remote_tags(&["v1", "v2"])
        .failing_tag("v1");
    let mut diagnostics = Diagnostics::default();

    let report = commands::delete_stack(&invocation(), &cloud, &FixedConfirm::new("y"), &output(), &mut diagnostics)
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(cloud.count("delete_stack"), 1);
    assert_eq!(diagnostics.count(WarningKind::ImageDelete), 1);
}

#[tokio::test]
async fn remote_tags_outside_local_rules_are_still_deleted() {
    let long_tag = "a".repeat(200);
    let cloud = MockCloud::new().with_remote_tags(&["v1", long_tag.as_str(), "latest"]);
    let mut diagnostics = Diagnostics::default();

    let report = commands::delete_stack(&invocation(), &cloud, &FixedConfirm::new("y"), &output(), &mut diagnostics)
        .await
        .unwrap();

    assert_eq!(report.deleted, vec!["v1".to_string(), long_tag, "latest".to_string()]);
    assert!(report.failed.is_empty());
    assert!(cloud.remote_tags().is_empty());
    assert!(!diagnostics.has_warnings());
    assert_eq!(cloud.count("delete_stack"), 1);
}

#[tokio::test]
async fn listing_failure_does_not_block_stack_deletion() {
    let cloud = MockCloud::new().failing("list_image_tags");
    let mut diagnostics = Diagnostics::default();

    commands::delete_stack(&invocation(), &cloud, &FixedConfirm::new("Y"), &output(), &mut diagnostics)
        .await
        .unwrap();

    assert_eq!(cloud.count("delete_stack"), 1);
    assert_eq!(diagnostics.count(WarningKind::ImageDelete), 1);
}

#[tokio::test]
async fn stack_deletion_failure_is_fatal() {
    let cloud = MockCloud::new().failing("delete_stack");

    let err = commands::delete_stack(
        &invocation(),
        &cloud,
        &FixedConfirm::new("y"),
        &output(),
        &mut Diagnostics::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.deploy_kind(), Some(DeployErrorKind::InfrastructureFailure));
    assert!(err.to_string().starts_with("stack deletion failed"));
}

#[tokio::test]
async fn missing_secret_stops_before_prompt() {
    let cloud = MockCloud::new();
    let invocation = invocation_with(env_without("SLACK_BOT_TOKEN"), Settings::default());

    let err = commands::delete_stack(
        &invocation,
        &cloud,
        &FixedConfirm::new("y"),
        &output(),
        &mut Diagnostics::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.deploy_kind(), Some(DeployErrorKind::MissingSecret));
    assert!(cloud.calls().is_empty());
}
