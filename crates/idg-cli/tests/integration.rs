#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

const GRAPH_BODY: &str = "```mermaid\r\ngraph TD\r\nA(Write parser) --> B(Ship it)\r\n```";

const README: &str = "# Roadmap\n\n```mermaid\ngraph TD\n  %% core work\n  A(Write parser) --> B(Ship it)\n  click A href \"https://github.com/o/r/issues/2\" _blank\n  class A done\n```\n";

fn idg(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("idg").unwrap();
    cmd.current_dir(dir.path())
        .env("IDG_ROOT", dir.path())
        .env("HOME", dir.path())
        .env_remove("IDG_REPO")
        .env_remove("IDG_TOKEN")
        .env_remove("IDG_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn issues_body() -> String {
    json!([
        {
            "number": 1,
            "title": "Dependency graph",
            "state": "open",
            "html_url": "https://github.com/o/r/issues/1",
            "body": GRAPH_BODY,
            "milestone": null,
        },
        {
            "number": 2,
            "title": "Write parser",
            "state": "closed",
            "html_url": "https://github.com/o/r/issues/2",
            "body": null,
            "milestone": null,
        },
    ])
    .to_string()
}

fn mock_issue_list(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/repos/o/r/issues")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("state".into(), "all".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(issues_body())
        .create()
}

// ---------------------------------------------------------------------------
// argument and configuration errors
// ---------------------------------------------------------------------------

#[test]
fn sync_without_repo_fails_readably() {
    let dir = TempDir::new().unwrap();
    idg(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository name is not set"))
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn malformed_repo_is_rejected() {
    let dir = TempDir::new().unwrap();
    idg(&dir)
        .args(["--repo", "noslash", "sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid repository 'noslash'"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".idg.yaml"), "repo: [oops\n").unwrap();
    idg(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load"));
}

// ---------------------------------------------------------------------------
// idg show --local
// ---------------------------------------------------------------------------

#[test]
fn show_local_prints_nodes_and_edges() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README.md"), README).unwrap();

    idg(&dir)
        .args(["show", "--local", "README.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Write parser"))
        .stdout(predicate::str::contains("done"))
        .stdout(predicate::str::contains("https://github.com/o/r/issues/2"))
        .stdout(predicate::str::contains("A → B"));
}

#[test]
fn show_local_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("README.md"), README).unwrap();

    let output = idg(&dir)
        .args(["--json", "show", "--local", "README.md"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["nodes"][0]["key"], "A");
    assert_eq!(graph["nodes"][0]["done"], true);
    assert_eq!(graph["nodes"][1]["name"], "Ship it");
    assert!(graph["nodes"][1].get("link").is_none());
    assert_eq!(graph["edges"][0], json!({ "from": "A", "to": "B" }));
}

#[test]
fn show_local_without_diagram_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("NOTES.md"), "# No graph here\n").unwrap();

    idg(&dir)
        .args(["show", "--local", "NOTES.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no mermaid graph"));
}

// ---------------------------------------------------------------------------
// idg sync against a mock GitHub
// ---------------------------------------------------------------------------

#[test]
fn sync_annotates_graph_then_creates_missing_issues() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();

    let list = mock_issue_list(&mut server);
    let edit = server
        .mock("PATCH", "/repos/o/r/issues/1")
        .match_header("authorization", "Bearer t0ken")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("classDef done fill:#8250df,color:#fff".into()),
            Matcher::Regex("click A href".into()),
            Matcher::Regex("class A done".into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create();
    let create = server
        .mock("POST", "/repos/o/r/issues")
        .match_body(Matcher::PartialJson(json!({ "title": "Ship it" })))
        .with_status(201)
        .with_body(
            json!({
                "number": 3,
                "title": "Ship it",
                "state": "open",
                "html_url": "https://github.com/o/r/issues/3",
            })
            .to_string(),
        )
        .create();

    idg(&dir)
        .args(["--repo", "o/r", "--token", "t0ken", "--api-url"])
        .arg(server.url())
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked A → https://github.com/o/r/issues/2"))
        .stdout(predicate::str::contains("Marked A done"))
        .stdout(predicate::str::contains("Updated the graph in issue #1."))
        .stdout(predicate::str::contains("Creating issue with title Ship it"));

    list.assert();
    edit.assert();
    create.assert();
}

#[test]
fn dry_run_reads_config_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    std::fs::write(
        dir.path().join(".idg.yaml"),
        format!("repo: o/r\napi_url: {}\n", server.url()),
    )
    .unwrap();
    std::fs::write(dir.path().join("token"), "file-token\n").unwrap();

    let list = server
        .mock("GET", "/repos/o/r/issues")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer file-token")
        .with_status(200)
        .with_body(issues_body())
        .create();
    let edit = server
        .mock("PATCH", Matcher::Any)
        .expect(0)
        .create();
    let create = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create();

    idg(&dir)
        .args(["--dry-run", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: graph in issue #1 not written."))
        .stdout(predicate::str::contains("Would create issue with title Ship it"));

    list.assert();
    edit.assert();
    create.assert();
}

#[test]
fn api_errors_fail_the_command() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let _list = server
        .mock("GET", "/repos/o/r/issues")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(json!({ "message": "Bad credentials" }).to_string())
        .create();

    idg(&dir)
        .args(["--repo", "o/r", "--api-url"])
        .arg(server.url())
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GitHub API error 401: Bad credentials"));
}

// ---------------------------------------------------------------------------
// idg set-milestone
// ---------------------------------------------------------------------------

#[test]
fn set_milestone_assigns_graph_issues() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();

    let milestones = server
        .mock("GET", "/repos/o/r/milestones")
        .match_query(Matcher::UrlEncoded("state".into(), "open".into()))
        .with_status(200)
        .with_body(json!([{ "number": 7, "title": "MVP" }]).to_string())
        .create();
    let list = mock_issue_list(&mut server);
    let assign = server
        .mock("PATCH", "/repos/o/r/issues/2")
        .match_body(Matcher::Json(json!({ "milestone": 7 })))
        .with_status(200)
        .with_body("{}")
        .create();

    idg(&dir)
        .args(["--repo", "o/r", "--api-url"])
        .arg(server.url())
        .args(["set-milestone", "--milestone", "MVP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set milestone 'MVP' on #2"));

    milestones.assert();
    list.assert();
    assign.assert();
}

#[test]
fn set_milestone_unknown_title_fails() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let _milestones = server
        .mock("GET", "/repos/o/r/milestones")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!([{ "number": 1, "title": "MVP" }]).to_string())
        .create();

    idg(&dir)
        .args(["--repo", "o/r", "--api-url"])
        .arg(server.url())
        .args(["set-milestone", "--milestone", "v2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("milestone not found: v2"));
}
