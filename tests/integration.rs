//! End-to-end connection lifecycle tests against a scripted MCP server.
//!
//! The good server is a small Python stdio fixture; tests are skipped
//! when `python3` is not available.

use std::time::Duration;

use maestro_mcp::supervisor::{ServerEntry, Supervisor, ToolDispatch};
use maestro_mcp::ToolRegistry;

fn fixture_path() -> String {
    format!(
        "{}/tests/fixtures/mock_server.py",
        env!("CARGO_MANIFEST_DIR")
    )
}

fn python_available() -> bool {
    std::process::Command::new("python3")
        .arg("--version")
        .output()
        .is_ok()
}

fn good_server(id: &str) -> ServerEntry {
    ServerEntry {
        id: id.into(),
        command: "python3".into(),
        args: vec![fixture_path()],
        timeout: Duration::from_secs(10),
    }
}

fn bad_server(id: &str) -> ServerEntry {
    ServerEntry {
        id: id.into(),
        command: "/nonexistent/mcp-server".into(),
        args: vec![],
        timeout: Duration::from_secs(10),
    }
}

#[tokio::test]
async fn partial_success_keeps_only_good_server() {
    if !python_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    let supervisor = Supervisor::new(vec![good_server("alpha"), bad_server("beta")]);
    let tools = tokio::time::timeout(Duration::from_secs(30), supervisor.connect_all())
        .await
        .expect("connect_all should not hang");

    assert_eq!(supervisor.connected_ids().await, ["alpha"]);
    let registry = ToolRegistry::from_tools(tools);
    let search = registry.get("search").expect("fixture exposes 'search'");
    assert_eq!(search.server_id, "alpha");

    supervisor.shutdown_all().await;
    assert_eq!(supervisor.connected_count().await, 0);
}

#[tokio::test]
async fn failed_server_does_not_block_later_one() {
    if !python_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    // bad first: the failure must not prevent the next attempt
    let supervisor = Supervisor::new(vec![bad_server("beta"), good_server("alpha")]);
    let tools = tokio::time::timeout(Duration::from_secs(30), supervisor.connect_all())
        .await
        .expect("connect_all should not hang");

    assert_eq!(tools.len(), 1);
    assert_eq!(supervisor.connected_ids().await, ["alpha"]);
    supervisor.shutdown_all().await;
}

#[tokio::test]
async fn dispatch_routes_to_owning_server() {
    if !python_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    let supervisor = Supervisor::new(vec![good_server("alpha")]);
    supervisor.connect_all().await;

    let text = supervisor
        .dispatch("alpha", "search", serde_json::json!({"query": "rust"}))
        .await
        .unwrap();
    assert_eq!(text, "result from search");

    supervisor.shutdown_all().await;
}

#[tokio::test]
async fn two_servers_collide_later_wins() {
    if !python_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    // both fixtures expose 'search'; the later server shadows the earlier
    let supervisor = Supervisor::new(vec![good_server("first"), good_server("second")]);
    let tools = tokio::time::timeout(Duration::from_secs(30), supervisor.connect_all())
        .await
        .expect("connect_all should not hang");

    assert_eq!(tools.len(), 2);
    let registry = ToolRegistry::from_tools(tools);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("search").unwrap().server_id, "second");

    supervisor.shutdown_all().await;
    assert_eq!(supervisor.connected_count().await, 0);
}

#[tokio::test]
async fn all_failures_leave_empty_registry() {
    let supervisor = Supervisor::new(vec![bad_server("one"), bad_server("two")]);
    let tools = supervisor.connect_all().await;
    let registry = ToolRegistry::from_tools(tools);
    assert!(registry.is_empty());
    supervisor.shutdown_all().await;
}
