//! Tests for the tcg-harvest binary
//!
//! Each test writes a config file pointed at a wiremock site and runs the
//! compiled binary, checking its exit status and report output.

use crate::support::mount_scenario;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let config_path = dir.join("harvest.toml");
    let content = format!(
        r#"
[crawler]
concurrency = 4
max-retries = 0
retry-backoff-ms = 10
request-timeout-secs = 5

[source]
base-url = "{}"
show = 100

[output]
database-path = "{}"
"#,
        base_url,
        dir.join("harvest.db").to_string_lossy()
    );
    std::fs::write(&config_path, content).unwrap();
    config_path
}

async fn run_harvest(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tcg-harvest"))
        .arg(config)
        .args(args)
        .output()
        .await
        .expect("binary should start")
}

#[tokio::test]
async fn test_crawl_exits_zero_and_prints_report() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &mock_server.uri());

    let output = run_harvest(&config, &["--backfill", "--time", "7days", "-q"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Crawl Report"));
    assert!(stdout.contains("participant_deck: 4"));
    assert!(stdout.contains("Item failures (1)"));
}

#[tokio::test]
async fn test_listing_failure_exits_non_zero() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tournaments/completed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &mock_server.uri());

    let output = run_harvest(&config, &["--backfill", "-q"]).await;

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Crawl Report"));
}

#[tokio::test]
async fn test_dry_run_lists_everything_for_a_past_month() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), &mock_server.uri());

    let output = run_harvest(&config, &["--month", "2024-01", "--dry-run", "-q"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Mode: windowed (2024-01)"));
    assert!(stdout.contains("time: all"));
}

#[tokio::test]
async fn test_invalid_month_exits_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), "https://play.example.com");

    let output = run_harvest(&config, &["--month", "2024-13", "--dry-run"]).await;

    assert!(!output.status.success());
}
