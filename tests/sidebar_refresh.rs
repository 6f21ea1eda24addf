//! End-to-end refresh tests against a mock GitHub API.
//!
//! Each test drives the command dispatcher with an `SQLite` store, so the
//! pins, tracked repositories and credential all round-trip through the
//! database between commands.

mod support;

use forgebar::aggregate::{CiStatus, MergeBadge, SidebarView};
use forgebar::telemetry::TelemetryEvent;
use forgebar::{RepoKey, Response};
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use support::{Sidebar, pull_json};

fn passing_check_run() -> serde_json::Value {
    json!({
        "total_count": 1,
        "check_runs": [
            { "name": "build", "status": "completed", "conclusion": "success" }
        ]
    })
}

fn no_check_runs() -> serde_json::Value {
    json!({ "total_count": 0, "check_runs": [] })
}

async fn mount_repository(sidebar: &Sidebar) {
    mount_repository_with_checks(sidebar, passing_check_run()).await;
}

async fn mount_repository_with_checks(sidebar: &Sidebar, check_runs: serde_json::Value) {
    sidebar.mount_get("/user", json!({ "login": "alice" })).await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/pulls",
            json!([pull_json(42, "alice", "open")]),
        )
        .await;
    sidebar
        .mount_get("/repos/acme/widgets/issues", json!([]))
        .await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/pulls/42",
            pull_json(42, "alice", "open"),
        )
        .await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/commits/sha-42/status",
            json!({ "state": "success", "statuses": [] }),
        )
        .await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/commits/sha-42/check-runs",
            check_runs,
        )
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "repository": {
                    "pullRequest": {
                        "reviewThreads": {
                            "totalCount": 1,
                            "nodes": [{ "isResolved": true }]
                        }
                    }
                }
            }
        })))
        .mount(&sidebar.server)
        .await;
}

fn widgets() -> RepoKey {
    RepoKey::parse("acme/widgets").expect("valid repository")
}

#[rstest]
#[case::passing_check_run(passing_check_run())]
#[case::legacy_status_only(no_check_runs())]
#[tokio::test]
async fn own_pull_request_is_ready_to_merge(#[case] check_runs: serde_json::Value) {
    let sidebar = Sidebar::start().await;
    mount_repository_with_checks(&sidebar, check_runs).await;
    sidebar
        .send(json!({ "type": "track_repo", "repo": "acme/widgets" }))
        .await;

    let response = sidebar.send(json!({ "type": "refresh" })).await;

    let Response::Sidebar(SidebarView::Repositories {
        login,
        repositories,
    }) = response
    else {
        panic!("expected repositories, got {response:?}");
    };
    assert_eq!(login, "alice");
    let repo = repositories.get(&widgets()).expect("acme/widgets view");
    let pull = repo.my_pull_requests.first().expect("own pull request");
    assert_eq!(pull.pull_request.number, 42);
    assert_eq!(pull.merge_badge, MergeBadge::ReadyToMerge);
    assert_eq!(pull.merge_badge.label(), "Ready to merge");
    assert_eq!(pull.ci, Some(CiStatus::Success));
    assert_eq!(pull.unresolved_badge(), None);
    assert!(!pull.unread, "never viewed, so not unread");
}

#[rstest]
#[tokio::test]
async fn merged_pin_is_pruned_after_one_refresh() {
    let sidebar = Sidebar::start().await;
    mount_repository(&sidebar).await;
    sidebar
        .mount_get("/repos/acme/widgets/pulls/7", pull_json(7, "bob", "closed"))
        .await;
    sidebar
        .send(json!({ "type": "pin_pull_request", "repo": "acme/widgets", "number": 7 }))
        .await;

    let response = sidebar.send(json!({ "type": "refresh" })).await;

    let Response::Sidebar(SidebarView::Repositories { repositories, .. }) = response else {
        panic!("expected repositories, got {response:?}");
    };
    let repo = repositories.get(&widgets()).expect("acme/widgets view");
    assert!(
        repo.pinned_pull_requests.is_empty(),
        "merged pin must not be rendered"
    );
    let pinned = sidebar
        .send(json!({ "type": "get_pinned_pull_requests" }))
        .await;
    let Response::PinnedNumbers(numbers) = pinned else {
        panic!("expected pinned numbers, got {pinned:?}");
    };
    assert!(numbers.is_empty(), "merged pin should be removed from storage");
    assert_eq!(
        sidebar.telemetry.take(),
        vec![
            TelemetryEvent::PinsPruned {
                repo: "acme/widgets".to_owned(),
                pull_requests: vec![7],
                issues: Vec::new(),
            },
            TelemetryEvent::RefreshCompleted { repositories: 1 },
        ]
    );
}

#[rstest]
#[tokio::test]
async fn line_counts_fall_back_to_file_totals() {
    let sidebar = Sidebar::start().await;
    let mut pull = pull_json(42, "alice", "open");
    let fields = pull.as_object_mut().expect("pull request object");
    fields.insert("additions".to_owned(), json!(null));
    fields.insert("deletions".to_owned(), json!(null));
    sidebar.mount_get("/repos/acme/widgets/pulls/42", pull).await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/pulls/42/files",
            json!([
                { "filename": "a.rs", "additions": 3, "deletions": 1 },
                { "filename": "b.rs", "additions": 5, "deletions": 0 }
            ]),
        )
        .await;

    let response = sidebar
        .send(json!({ "type": "get_pull_request", "repo": "acme/widgets", "number": 42 }))
        .await;

    let Response::PullRequest(loaded) = response else {
        panic!("expected a pull request, got {response:?}");
    };
    assert_eq!((loaded.additions, loaded.deletions), (8, 1));
}

#[rstest]
#[tokio::test]
async fn workflow_pinned_by_file_name_refreshes_its_runs() {
    let sidebar = Sidebar::start().await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/actions/workflows",
            json!({
                "total_count": 1,
                "workflows": [
                    {
                        "id": 5,
                        "name": "Deploy Site",
                        "path": ".github/workflows/deploy.yml",
                        "state": "active"
                    }
                ]
            }),
        )
        .await;
    sidebar
        .mount_get(
            "/repos/acme/widgets/actions/runs",
            json!({ "total_count": 0, "workflow_runs": [] }),
        )
        .await;

    let pinned = sidebar
        .send(json!({ "type": "pin_workflow_by_path", "repo": "acme/widgets", "path": "deploy.yml" }))
        .await;
    let runs = sidebar.send(json!({ "type": "refresh_workflow_runs" })).await;

    let Response::PinnedWorkflow(workflow) = pinned else {
        panic!("expected the pinned workflow, got {pinned:?}");
    };
    assert_eq!(workflow.id, 5);
    let Response::WorkflowViews(views) = runs else {
        panic!("expected workflow views, got {runs:?}");
    };
    let widgets_views = views.get(&widgets()).expect("acme/widgets runs");
    assert_eq!(widgets_views.len(), 1);
}
