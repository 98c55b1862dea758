use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "/api/v4/projects/42";
const ENV_VARS: [&str; 6] = [
    "GITLAB_URL",
    "GITLAB_PROJECT_ID",
    "GITLAB_TOKEN",
    "SOURCE_BRANCH",
    "TARGET_BRANCH",
    "RUST_LOG",
];

fn mrpulse(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mrpulse"));
    cmd.current_dir(dir);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[tokio::test]
async fn missing_project_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = mrpulse(dir.path())
        .arg("analyze")
        .env("GITLAB_TOKEN", "t")
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("project id"), "stderr: {stderr}");
}

#[tokio::test]
async fn no_open_merge_request_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PROJECT}/merge_requests")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let output = mrpulse(dir.path())
        .args(["analyze", "--project", "42", "--source", "feature/x"])
        .env("GITLAB_URL", server.uri())
        .env("GITLAB_TOKEN", "t")
        .output()
        .await
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no open merge request"), "stderr: {stderr}");
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());
}

#[tokio::test]
async fn prints_json_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PROJECT}/merge_requests")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "iid": 8,
            "title": "Login page",
            "source_branch": "develop",
            "target_branch": "main",
            "state": "opened"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PROJECT}/merge_requests/8/commits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "c1", "short_id": "c1", "title": "one", "author_name": "A" },
            { "id": "c2", "short_id": "c2", "title": "two", "author_name": "B" }
        ])))
        .mount(&server)
        .await;
    for (sha, author, diff) in [
        ("c1", "A", "@@ -0,0 +1,5 @@\n+1\n+2\n+3\n+4\n+5\n"),
        ("c2", "B", "@@ -0,0 +1,5 @@\n+1\n+2\n+3\n+4\n+5\n"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("{PROJECT}/repository/commits/{sha}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": sha, "author_name": author })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{PROJECT}/repository/commits/{sha}/diff")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "old_path": "f.rs", "new_path": "f.rs", "diff": diff }
            ])))
            .mount(&server)
            .await;
    }
    let dir = tempfile::tempdir().unwrap();

    let output = mrpulse(dir.path())
        .args(["--format", "json", "analyze", "--project", "42"])
        .env("GITLAB_URL", server.uri())
        .env("GITLAB_TOKEN", "t")
        .output()
        .await
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mergeRequest"]["iid"], 8);
    assert_eq!(report["lineCounts"]["A"], 5);
    assert_eq!(report["commitCounts"]["B"], 1);
    // Equal scores: the first contributor seen wins.
    assert_eq!(report["topContributor"]["name"], "A");
}
