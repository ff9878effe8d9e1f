//! Shared fixtures: mock site pages and test configuration

use std::path::Path;
use tcg_harvest::config::Config;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
pub fn create_test_config(base_url: &str, db_path: &Path, show: u32) -> Config {
    let mut config = Config::default();
    config.source.base_url = base_url.to_string();
    config.source.show = show;
    config.crawler.concurrency = 4;
    config.crawler.max_retries = 0;
    config.crawler.retry_backoff_ms = 10;
    config.crawler.request_timeout_secs = 5;
    config.output.database_path = db_path.to_string_lossy().to_string();
    config
}

pub fn listing_html(tournaments: &[(&str, &str)]) -> String {
    let rows: String = tournaments
        .iter()
        .map(|(id, date)| {
            format!(
                r#"<tr data-date="{date}" data-name="Tournament {id}" data-players="2">
                     <td>{date}</td><td><a href="/tournament/{id}/standings">Tournament {id}</a></td>
                   </tr>"#,
                id = id,
                date = date
            )
        })
        .collect();

    format!(
        r#"<html><body><div class="main"><table>
             <tr><th>Date</th><th>Name</th></tr>{}
           </table></div></body></html>"#,
        rows
    )
}

/// `(name, has decklist link)` per player
pub fn standings_html(tournament: &str, players: &[(&str, bool)]) -> String {
    let rows: String = players
        .iter()
        .enumerate()
        .map(|(i, (name, has_list))| {
            let list = if *has_list {
                format!(
                    r#"<a href="/tournament/{}/player/{}/decklist">List</a>"#,
                    tournament, name
                )
            } else {
                String::new()
            };
            format!(
                r#"<tr><td>{place}</td><td><a href="/tournament/{t}/player/{name}">{name}</a></td>
                     <td>3</td><td>1 - 0 - 0</td><td>Deck</td><td>{list}</td></tr>"#,
                place = i + 1,
                t = tournament,
                name = name,
                list = list
            )
        })
        .collect();

    format!(
        r#"<html><body><div class="standings"><table>
             <tr><th>Place</th><th>Name</th><th>Points</th><th>Record</th><th>Deck</th><th>List</th></tr>{}
           </table></div></body></html>"#,
        rows
    )
}

pub fn decklist_html(cards: &[&str]) -> String {
    let lines: String = cards.iter().map(|c| format!("<p>{}</p>", c)).collect();
    format!(
        r#"<html><body><div class="decklist"><div class="cards">{}</div></div></body></html>"#,
        lines
    )
}

pub fn history_html(opponent: &str, result: &str) -> String {
    format!(
        r#"<html><body><div class="history"><table>
             <tr><th>Round</th><th>Result</th><th>Opponent</th></tr>
             <tr><td>1</td><td>{}</td><td>{}</td></tr>
           </table></div></body></html>"#,
        result, opponent
    )
}

pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/tournaments/completed"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Three tournaments with two players each. t1/P2 has no decklist link and
/// the t2/P1 decklist page answers 500.
pub async fn mount_scenario(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/tournaments/completed"))
        .and(query_param("time", "7days"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[
            ("t1", "2024-02-20T10:00:00.000Z"),
            ("t2", "2024-02-15T10:00:00.000Z"),
            ("t3", "2024-02-10T10:00:00.000Z"),
        ])))
        .mount(server)
        .await;

    for t in ["t1", "t2", "t3"] {
        let players = [("P1", true), ("P2", t != "t1")];
        mount_page(
            server,
            &format!("/tournament/{}/standings", t),
            standings_html(t, &players),
        )
        .await;

        mount_page(
            server,
            &format!("/tournament/{}/player/P1", t),
            history_html("P2", "WIN"),
        )
        .await;
        mount_page(
            server,
            &format!("/tournament/{}/player/P2", t),
            history_html("P1", "LOSS"),
        )
        .await;

        for (player, _) in players.iter().filter(|(_, has_list)| *has_list) {
            let route = format!("/tournament/{}/player/{}/decklist", t, player);
            if t == "t2" && *player == "P1" {
                Mock::given(method("GET"))
                    .and(path(route.as_str()))
                    .respond_with(ResponseTemplate::new(500))
                    .mount(server)
                    .await;
            } else {
                mount_page(
                    server,
                    &route,
                    decklist_html(&["2 Pikachu ex (A1 96)", "2 Zapdos ex (A1 104)", "1 Potion"]),
                )
                .await;
            }
        }
    }
}
