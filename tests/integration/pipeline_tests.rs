//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve listing, standings, decklist and
//! player pages, and run the full crawl against a SQLite file.

use crate::support::{
    create_test_config, history_html, listing_html, mount_listing, mount_page, mount_scenario,
    standings_html,
};
use tcg_harvest::crawler::{crawl, Coordinator, CrawlMode, TargetMonth};
use tcg_harvest::storage::{RowCounts, RunStatus, SqliteStorage, Storage};
use tcg_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_end_to_end_scenario() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("harvest.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 100);

    let report = crawl(
        config,
        "test-hash",
        CrawlMode::Backfill,
        Some("7days".to_string()),
    )
    .await
    .expect("crawl should succeed despite the failing decklist");

    assert_eq!(report.counts.tournaments, 3);
    assert_eq!(report.counts.participants, 6);
    assert_eq!(report.counts.decks, 4);
    assert_eq!(report.counts.matches, 6);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        HarvestError::ItemExtraction { stage: "decklist", key, .. } if key.ends_with("/tournament/t2/standings#P1")
    ));

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.row_counts().unwrap(), report.counts);

    let t1 = format!("{}/tournament/t1/standings", mock_server.uri());
    let deck = storage.get_deck(&t1, "P1").unwrap().unwrap();
    assert_eq!(deck.cards.len(), 3);
    assert_eq!(deck.cards[0].name, "Pikachu ex");
    assert_eq!(deck.cards[0].code.as_deref(), Some("A1 96"));
    assert_eq!(deck.cards[2].code, None);
    assert!(storage.get_deck(&t1, "P2").unwrap().is_none());

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.item_failures, 1);
}

#[tokio::test]
async fn test_rerun_over_same_window_is_idempotent() {
    let mock_server = MockServer::start().await;
    mount_scenario(&mock_server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("harvest.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 100);

    let mut coordinator = Coordinator::from_config(config, "test-hash")
        .unwrap()
        .with_time_override(Some("7days".to_string()));

    coordinator.run(CrawlMode::Backfill).await.unwrap();
    let first = coordinator.storage().row_counts().unwrap();
    coordinator.run(CrawlMode::Backfill).await.unwrap();
    let second = coordinator.storage().row_counts().unwrap();

    assert_eq!(first, second);
    assert_eq!(
        second,
        RowCounts {
            tournaments: 3,
            participants: 6,
            decks: 4,
            matches: 6,
        }
    );
}

#[tokio::test]
async fn test_windowed_crawl_stops_at_older_tournament() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        1,
        listing_html(&[("a", "2024-03-05"), ("b", "2024-02-20")]),
    )
    .await;
    mount_listing(
        &mock_server,
        2,
        listing_html(&[("c", "2024-02-01"), ("d", "2024-01-30")]),
    )
    .await;

    // Page 3 must never be requested
    Mock::given(method("GET"))
        .and(path("/tournaments/completed"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[
            ("e", "2024-01-10"),
            ("f", "2024-01-02"),
        ])))
        .expect(0)
        .mount(&mock_server)
        .await;

    for t in ["b", "c"] {
        mount_page(
            &mock_server,
            &format!("/tournament/{}/standings", t),
            standings_html(t, &[]),
        )
        .await;
    }

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("harvest.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 2);

    let mode = CrawlMode::Windowed(TargetMonth::new(2024, 2).unwrap());
    let mut coordinator = Coordinator::from_config(config, "test-hash").unwrap();
    let report = coordinator.run(mode).await.unwrap();

    assert_eq!(report.pages_fetched, 2);
    assert!(report.stopped_early);
    assert_eq!(report.counts.tournaments, 2);
    assert!(report.failures.is_empty());

    let run = coordinator.storage().get_latest_run().unwrap().unwrap();
    assert_eq!(run.mode, "month:2024-02");
}

#[tokio::test]
async fn test_listing_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tournaments/completed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("harvest.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 100);

    let result = crawl(config, "test-hash", CrawlMode::Backfill, None).await;

    assert!(matches!(result, Err(HarvestError::Discovery { page: 1, .. })));

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(storage.row_counts().unwrap(), RowCounts::default());
}

#[tokio::test]
async fn test_failing_standings_page_drops_only_that_tournament() {
    let mock_server = MockServer::start().await;

    mount_listing(
        &mock_server,
        1,
        listing_html(&[("ok", "2024-02-20"), ("broken", "2024-02-19")]),
    )
    .await;
    mount_page(
        &mock_server,
        "/tournament/ok/standings",
        standings_html("ok", &[("Ash", false)]),
    )
    .await;
    mount_page(
        &mock_server,
        "/tournament/ok/player/Ash",
        history_html("Misty", "TIE"),
    )
    .await;
    mount_page(
        &mock_server,
        "/tournament/broken/standings",
        "<html><body><p>Not found</p></body></html>".to_string(),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("harvest.db");
    let config = create_test_config(&mock_server.uri(), &db_path, 100);

    let report = crawl(config, "test-hash", CrawlMode::Backfill, None)
        .await
        .unwrap();

    assert_eq!(report.counts.tournaments, 2);
    assert_eq!(report.counts.participants, 1);
    assert_eq!(report.counts.decks, 0);
    assert_eq!(report.counts.matches, 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        HarvestError::ItemExtraction { stage: "participants", .. }
    ));
}
