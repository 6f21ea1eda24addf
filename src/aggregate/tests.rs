//! Tests for the sidebar refresh pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::{Aggregator, CiStatus, MergeBadge, SidebarView};
use crate::github::models::test_support::{
    closed_issue, closed_pull_request, open_issue, open_pull_request,
};
use crate::github::{
    CheckRun, CommentThread, CommitStatus, ForgeError, Issue, LegacyStatus, MergeableState,
    MockForgeGateway, PullRequest, RepoKey, WorkflowDescriptor, WorkflowRun,
};
use crate::persistence::{MemoryRecordStore, MockRecordStore, PersistenceError, SidebarStore};
use crate::telemetry::TelemetryEvent;
use crate::telemetry::test_support::RecordingSink;

/// Canned answers of the fake GitHub used by a scenario.
#[derive(Clone)]
struct Remote {
    listed_pulls: Result<Vec<PullRequest>, ForgeError>,
    listed_issues: Result<Vec<Issue>, ForgeError>,
    pull_details: HashMap<u64, PullRequest>,
    issues: HashMap<u64, Issue>,
    status: CommitStatus,
    unresolved: u32,
    activity: Option<Activity>,
}

/// Timestamps returned by the activity endpoints.
#[derive(Clone, Copy)]
struct Activity {
    committed_at: Option<DateTime<Utc>>,
    commented_at: Option<DateTime<Utc>>,
}

impl Default for Remote {
    fn default() -> Self {
        Self {
            listed_pulls: Ok(Vec::new()),
            listed_issues: Ok(Vec::new()),
            pull_details: HashMap::new(),
            issues: HashMap::new(),
            status: CommitStatus::default(),
            unresolved: 0,
            activity: None,
        }
    }
}

fn server_error() -> ForgeError {
    ForgeError::Remote {
        status: 500,
        body_excerpt: "boom".to_owned(),
    }
}

fn passing_checks() -> CommitStatus {
    CommitStatus {
        legacy: None,
        check_runs: vec![CheckRun {
            name: "build".to_owned(),
            status: Some("completed".to_owned()),
            conclusion: Some("success".to_owned()),
        }],
    }
}

fn legacy_success_only() -> CommitStatus {
    CommitStatus {
        legacy: Some(LegacyStatus {
            state: "success".to_owned(),
        }),
        check_runs: Vec::new(),
    }
}

fn timestamp(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Builds a gateway answering from `remote`; activity endpoints must not be
/// called unless `remote.activity` is set.
fn gateway_for(remote: Remote) -> MockForgeGateway {
    let mut gateway = MockForgeGateway::new();
    gateway
        .expect_authenticated_login()
        .returning(|| Ok("alice".to_owned()));

    let listed_pulls = remote.listed_pulls;
    gateway
        .expect_list_open_pull_requests()
        .returning(move |_| listed_pulls.clone());
    let listed_issues = remote.listed_issues;
    gateway
        .expect_list_open_issues()
        .returning(move |_| listed_issues.clone());

    let pull_details = remote.pull_details;
    gateway.expect_pull_request().returning(move |_, number| {
        pull_details
            .get(&number)
            .cloned()
            .ok_or_else(server_error)
    });
    let issues = remote.issues;
    gateway.expect_issue().returning(move |_, number| {
        issues.get(&number).cloned().ok_or_else(|| ForgeError::NotFound {
            what: format!("issue {number}"),
        })
    });

    let status = remote.status;
    gateway
        .expect_commit_status()
        .returning(move |_, _| Ok(status.clone()));
    let unresolved = remote.unresolved;
    gateway
        .expect_unresolved_review_thread_count()
        .returning(move |_, _| Ok(unresolved));
    gateway
        .expect_list_active_workflow_runs()
        .returning(|_, _| Ok(Vec::new()));

    match remote.activity {
        Some(activity) => {
            gateway
                .expect_commit_timestamp()
                .returning(move |_, _| Ok(activity.committed_at));
            gateway
                .expect_latest_comment_at()
                .returning(move |_, _, thread| match thread {
                    CommentThread::Issue => Ok(activity.commented_at),
                    CommentThread::Review => Ok(None),
                });
        }
        None => {
            gateway.expect_commit_timestamp().never();
            gateway.expect_latest_comment_at().never();
        }
    }
    gateway
}

struct Harness {
    store: SidebarStore,
    telemetry: RecordingSink,
    repo: RepoKey,
}

impl Harness {
    async fn refresh(&self, gateway: &MockForgeGateway) -> Result<SidebarView, ForgeError> {
        Aggregator::new(gateway, &self.store, &self.telemetry)
            .refresh()
            .await
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        store: SidebarStore::new(Arc::new(MemoryRecordStore::new())),
        telemetry: RecordingSink::default(),
        repo: RepoKey::parse("acme/widgets").expect("valid repo key"),
    }
}

fn merged_detail(number: u64, author: &str, state: MergeableState) -> PullRequest {
    let mut detail = open_pull_request(number, author);
    detail.mergeable_state = state;
    detail.additions = 10;
    detail.deletions = 2;
    detail
}

#[rstest]
#[case::passing_check_run(passing_checks())]
#[case::legacy_status_without_check_runs(legacy_success_only())]
#[tokio::test]
async fn own_pull_request_is_listed_as_ready_to_merge(
    harness: Harness,
    #[case] status: CommitStatus,
) {
    harness
        .store
        .track_repo(harness.repo.clone())
        .await
        .expect("track should succeed");
    let gateway = gateway_for(Remote {
        listed_pulls: Ok(vec![open_pull_request(42, "alice")]),
        pull_details: HashMap::from([(42, merged_detail(42, "alice", MergeableState::Clean))]),
        status,
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&harness.repo).expect("repository present");
    let [mine] = repo_view.my_pull_requests.as_slice() else {
        panic!("expected exactly one own pull request, got {repo_view:?}");
    };
    assert_eq!(mine.pull_request.number, 42);
    assert_eq!(mine.pull_request.additions, 10);
    assert_eq!(mine.merge_badge.label(), "Ready to merge");
    assert_eq!(mine.ci, Some(CiStatus::Success));
    assert_eq!(mine.unresolved_badge(), None);
    assert!(!mine.unread);
    assert_eq!(
        harness.telemetry.take(),
        vec![TelemetryEvent::RefreshCompleted { repositories: 1 }]
    );
}

#[rstest]
#[tokio::test]
async fn pull_requests_are_split_into_sections(harness: Harness) {
    let repo = harness.repo.clone();
    harness
        .store
        .pin_pull_request(repo.clone(), 8)
        .await
        .expect("pin should succeed");
    let mut review = open_pull_request(5, "bob");
    review.requested_reviewers = vec!["alice".to_owned()];
    let gateway = gateway_for(Remote {
        listed_pulls: Ok(vec![
            open_pull_request(4, "alice"),
            review.clone(),
            open_pull_request(6, "carol"),
            open_pull_request(8, "dave"),
        ]),
        pull_details: HashMap::from([
            (4, open_pull_request(4, "alice")),
            (5, review),
            (8, open_pull_request(8, "dave")),
        ]),
        unresolved: 2,
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&repo).expect("repository present");
    let numbers = |views: &[super::PullRequestView]| -> Vec<u64> {
        views.iter().map(|view| view.pull_request.number).collect()
    };
    assert_eq!(numbers(&repo_view.my_pull_requests), vec![4]);
    assert_eq!(numbers(&repo_view.pinned_pull_requests), vec![8]);
    assert_eq!(numbers(&repo_view.review_pull_requests), vec![5]);
    assert!(repo_view.pull_request(6).is_none());
    assert_eq!(
        repo_view
            .pull_request(5)
            .and_then(super::PullRequestView::unresolved_badge)
            .as_deref(),
        Some("2 unresolved")
    );
}

#[rstest]
#[tokio::test]
async fn merged_pinned_pull_request_is_pruned(harness: Harness) {
    let repo = harness.repo.clone();
    harness
        .store
        .track_repo(repo.clone())
        .await
        .expect("track should succeed");
    harness
        .store
        .pin_pull_request(repo.clone(), 7)
        .await
        .expect("pin should succeed");
    let gateway = gateway_for(Remote {
        pull_details: HashMap::from([(7, closed_pull_request(7, "bob"))]),
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&repo).expect("repository present");
    assert!(repo_view.is_empty());
    let pinned = harness
        .store
        .pinned_pull_requests()
        .await
        .expect("read should succeed");
    assert!(pinned.get(&repo).is_empty());
    assert_eq!(
        harness.telemetry.take(),
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
async fn closed_pinned_issue_is_pruned_and_open_one_kept(harness: Harness) {
    let repo = harness.repo.clone();
    for number in [3, 9] {
        harness
            .store
            .pin_issue(repo.clone(), number)
            .await
            .expect("pin should succeed");
    }
    let gateway = gateway_for(Remote {
        listed_issues: Ok(vec![open_issue(9, "bob"), open_issue(11, "alice")]),
        issues: HashMap::from([(3, closed_issue(3, "bob"))]),
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&repo).expect("repository present");
    let mine: Vec<u64> = repo_view.my_issues.iter().map(|view| view.issue.number).collect();
    let pinned: Vec<u64> = repo_view
        .pinned_issues
        .iter()
        .map(|view| view.issue.number)
        .collect();
    assert_eq!(mine, vec![11]);
    assert_eq!(pinned, vec![9]);
    let stored = harness
        .store
        .pinned_issues()
        .await
        .expect("read should succeed");
    assert_eq!(stored.get(&repo), &[9]);
}

#[rstest]
#[tokio::test]
async fn empty_repo_set_makes_no_remote_calls(harness: Harness) {
    let gateway = MockForgeGateway::new();

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    assert_eq!(view, SidebarView::Empty);
    assert!(harness.telemetry.take().is_empty());
}

#[rstest]
#[tokio::test]
async fn identity_failure_aborts_the_refresh(harness: Harness) {
    harness
        .store
        .track_repo(harness.repo.clone())
        .await
        .expect("track should succeed");
    let mut gateway = MockForgeGateway::new();
    gateway.expect_authenticated_login().returning(|| {
        Err(ForgeError::Remote {
            status: 401,
            body_excerpt: "Bad credentials".to_owned(),
        })
    });

    let error = harness
        .refresh(&gateway)
        .await
        .expect_err("refresh should fail");

    assert!(
        matches!(error, ForgeError::Remote { status: 401, .. }),
        "expected 401, got {error:?}"
    );
}

#[rstest]
#[tokio::test]
async fn store_read_failure_aborts_the_refresh() {
    let mut records = MockRecordStore::new();
    records.expect_load().returning(|_| {
        Err(PersistenceError::QueryFailed {
            message: "disk I/O error".to_owned(),
        })
    });
    let store = SidebarStore::new(Arc::new(records));
    let telemetry = RecordingSink::default();
    let gateway = MockForgeGateway::new();

    let error = Aggregator::new(&gateway, &store, &telemetry)
        .refresh()
        .await
        .expect_err("refresh should fail");

    assert!(
        matches!(error, ForgeError::Storage { ref message } if message.contains("disk I/O error")),
        "expected storage error, got {error:?}"
    );
}

#[rstest]
#[tokio::test]
async fn unread_is_false_without_last_viewed(harness: Harness) {
    harness
        .store
        .track_repo(harness.repo.clone())
        .await
        .expect("track should succeed");
    let gateway = gateway_for(Remote {
        listed_pulls: Ok(vec![open_pull_request(42, "alice")]),
        listed_issues: Ok(vec![open_issue(3, "alice")]),
        pull_details: HashMap::from([(42, open_pull_request(42, "alice"))]),
        activity: None,
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&harness.repo).expect("repository present");
    assert!(repo_view.my_pull_requests.iter().all(|view| !view.unread));
    assert!(repo_view.my_issues.iter().all(|view| !view.unread));
}

#[rstest]
#[case::newer_comment(Some(timestamp(11)), None, true)]
#[case::newer_commit(None, Some(timestamp(12)), true)]
#[case::older_activity(Some(timestamp(9)), Some(timestamp(8)), false)]
#[case::no_activity(None, None, false)]
#[tokio::test]
async fn unread_compares_activity_with_last_view(
    harness: Harness,
    #[case] commented_at: Option<DateTime<Utc>>,
    #[case] committed_at: Option<DateTime<Utc>>,
    #[case] expected: bool,
) {
    let repo = harness.repo.clone();
    harness
        .store
        .record_viewed_pull_request(repo.clone(), 42, timestamp(10))
        .await
        .expect("record should succeed");
    let gateway = gateway_for(Remote {
        listed_pulls: Ok(vec![open_pull_request(42, "alice")]),
        pull_details: HashMap::from([(42, open_pull_request(42, "alice"))]),
        activity: Some(Activity {
            committed_at,
            commented_at,
        }),
        ..Remote::default()
    });
    harness
        .store
        .track_repo(repo.clone())
        .await
        .expect("track should succeed");

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let pull = view
        .repository(&repo)
        .and_then(|repo_view| repo_view.pull_request(42))
        .expect("pull request present");
    assert_eq!(pull.unread, expected);
}

#[rstest]
#[tokio::test]
async fn issue_unread_uses_issue_comments(harness: Harness) {
    let repo = harness.repo.clone();
    harness
        .store
        .record_viewed_issue(repo.clone(), 3, timestamp(10))
        .await
        .expect("record should succeed");
    harness
        .store
        .track_repo(repo.clone())
        .await
        .expect("track should succeed");
    let gateway = gateway_for(Remote {
        listed_issues: Ok(vec![open_issue(3, "alice")]),
        activity: Some(Activity {
            committed_at: None,
            commented_at: Some(timestamp(10) + Duration::minutes(5)),
        }),
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&repo).expect("repository present");
    let [issue] = repo_view.my_issues.as_slice() else {
        panic!("expected one issue, got {repo_view:?}");
    };
    assert!(issue.unread);
}

#[rstest]
#[tokio::test]
async fn failed_listing_still_shows_pinned_items(harness: Harness) {
    let repo = harness.repo.clone();
    harness
        .store
        .pin_issue(repo.clone(), 3)
        .await
        .expect("pin should succeed");
    let gateway = gateway_for(Remote {
        listed_pulls: Err(server_error()),
        listed_issues: Err(server_error()),
        issues: HashMap::from([(3, open_issue(3, "bob"))]),
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let repo_view = view.repository(&repo).expect("repository present");
    assert!(repo_view.my_pull_requests.is_empty());
    let pinned: Vec<u64> = repo_view
        .pinned_issues
        .iter()
        .map(|view| view.issue.number)
        .collect();
    assert_eq!(pinned, vec![3]);
}

#[rstest]
#[tokio::test]
async fn failed_detail_keeps_listing_record(harness: Harness) {
    harness
        .store
        .track_repo(harness.repo.clone())
        .await
        .expect("track should succeed");
    let listed = open_pull_request(42, "alice");
    let gateway = gateway_for(Remote {
        listed_pulls: Ok(vec![listed.clone()]),
        ..Remote::default()
    });

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    let pull = view
        .repository(&harness.repo)
        .and_then(|repo_view| repo_view.pull_request(42))
        .expect("pull request present");
    assert_eq!(pull.pull_request, listed);
    assert_eq!(pull.merge_badge, MergeBadge::Checking);
}

#[rstest]
#[tokio::test]
async fn failed_pinned_fetch_keeps_the_pin(harness: Harness) {
    let repo = harness.repo.clone();
    harness
        .store
        .pin_pull_request(repo.clone(), 9)
        .await
        .expect("pin should succeed");
    let gateway = gateway_for(Remote::default());

    let view = harness.refresh(&gateway).await.expect("refresh succeeds");

    assert!(view.repository(&repo).is_some_and(super::RepoView::is_empty));
    let pinned = harness
        .store
        .pinned_pull_requests()
        .await
        .expect("read should succeed");
    assert_eq!(pinned.get(&repo), &[9]);
    assert_eq!(
        harness.telemetry.take(),
        vec![TelemetryEvent::RefreshCompleted { repositories: 1 }]
    );
}

#[rstest]
#[tokio::test]
async fn workflow_run_refresh_only_lists_runs(harness: Harness) {
    let repo = harness.repo.clone();
    let workflow = WorkflowDescriptor {
        id: 77,
        name: "Deploy".to_owned(),
        path: ".github/workflows/deploy.yml".to_owned(),
    };
    harness
        .store
        .pin_workflow(repo.clone(), workflow.clone())
        .await
        .expect("pin should succeed");
    let run = WorkflowRun {
        id: 1001,
        status: "in_progress".to_owned(),
        run_number: 12,
        html_url: "https://github.com/acme/widgets/actions/runs/1001".to_owned(),
        actor: "alice".to_owned(),
    };
    let mut gateway = MockForgeGateway::new();
    let expected_run = run.clone();
    gateway
        .expect_list_active_workflow_runs()
        .withf(|_, workflow_id| *workflow_id == 77)
        .times(1)
        .returning(move |_, _| Ok(vec![expected_run.clone()]));

    let runs = Aggregator::new(&gateway, &harness.store, &harness.telemetry)
        .refresh_workflow_runs()
        .await
        .expect("run refresh succeeds");

    let views = runs.get(&repo).expect("repository present");
    let [view] = views.as_slice() else {
        panic!("expected one workflow view, got {views:?}");
    };
    assert_eq!(view.workflow, workflow);
    assert_eq!(view.active_runs, vec![run]);
}
