//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the review site and run complete
//! harvests against it with the example configuration, writing to a temporary
//! database.

use review_harvester::config::{load_config, Config};
use review_harvester::crawler::harvest;
use review_harvester::storage::{open_storage, RunStatus, Storage};
use review_harvester::{Field, NOT_AVAILABLE};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INFO_SLICE: &str =
    "BaseWrap-sc-gjQpdd BaseText-ewhhUZ InfoSliceValue-tfmqg iUEiRd dcTQYO fkSlPp";

/// Loads the example configuration, pointed at the mock server and a temp database
fn test_config(server: &MockServer, dir: &TempDir, pages: (u32, u32)) -> Config {
    let example = Path::new(env!("CARGO_MANIFEST_DIR")).join("harvester.example.toml");
    let mut config = load_config(&example).expect("example config should be valid");

    config.site.origin = server.uri();
    config.harvest.start_page = pages.0;
    config.harvest.end_page = pages.1;
    config.harvest.page_concurrency = 4;
    config.harvest.detail_concurrency = 2;
    config.fetch.timeout_ms = 500;
    config.fetch.backoff_base_ms = 10;
    config.fetch.backoff_max_ms = 50;
    config.output.database_path = dir
        .path()
        .join("reviews.db")
        .to_string_lossy()
        .into_owned();
    config
}

fn listing_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<li><a class="review__link" href="{}">Review</a></li>"#, href))
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", anchors)
}

fn review_page(artist: &str, album: &str, info: &[&str]) -> String {
    let slices: String = info
        .iter()
        .map(|value| format!(r#"<p class="{}">{}</p>"#, INFO_SLICE, value))
        .collect();
    format!(
        r#"<html><body>
        <div class="SplitScreenContentHeaderArtist-ftloCc">{artist}</div>
        <h1 class="BaseWrap-sc-gjQpdd BaseText-ewhhUZ SplitScreenContentHeaderHed-lcUSuI iUEiRd fnwdMb fTtZlw">{album}</h1>
        <div class="ScoreCircle-jAxRuP"><p>8.4</p></div>
        <time class="SplitScreenContentHeaderReleaseYear-UjuHP">2001</time>
        <a class="BylineLink-gEnFiw">A. Critic</a>
        {slices}
        <div class="BaseWrap-sc-gjQpdd BaseText-ewhhUZ SplitScreenContentHeaderDekDown-csTFQR iUEiRd jqOMmZ MVQMg">Short dek.</div>
        <div class="BodyWrapper-kufPGa cmVAut body body__container article__body">
            <p>Opening paragraph.</p>
            <p>Closing paragraph.</p>
        </div>
        </body></html>"#
    )
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/reviews/albums/"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_review(server: &MockServer, href: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(href))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Reads back (artist, album, best_new) of every stored row, sorted
fn stored_rows(db: &str) -> Vec<(String, String, String)> {
    let conn = rusqlite::Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT artist, album, best_new FROM reviews ORDER BY artist, album")
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_end_to_end_two_reviews() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &server,
        1,
        listing_page(&["/reviews/albums/1000-x/", "/reviews/albums/1001-y/"]),
    )
    .await;
    mount_review(
        &server,
        "/reviews/albums/1000-x/",
        review_page("Artist X", "Album X", &["Rock", "Label X", "May 1, 2001"]),
    )
    .await;
    mount_review(
        &server,
        "/reviews/albums/1001-y/",
        review_page("Artist Y", "Album Y", &["Jazz", "Label Y", "May 2, 2001"]),
    )
    .await;

    let config = test_config(&server, &dir, (1, 1));
    let db = config.output.database_path.clone();
    let report = harvest(config, "hash-e2e", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_succeeded, 1);
    assert_eq!(report.records_stored, 2);
    assert_eq!(report.records_failed, 0);

    let rows = stored_rows(&db);
    assert_eq!(
        rows,
        vec![
            (
                "Artist X".to_string(),
                "Album X".to_string(),
                NOT_AVAILABLE.to_string()
            ),
            (
                "Artist Y".to_string(),
                "Album Y".to_string(),
                NOT_AVAILABLE.to_string()
            ),
        ]
    );

    let storage = open_storage(Path::new(&db)).unwrap();
    assert_eq!(storage.count_missing(Field::Genre).unwrap(), 0);
    assert_eq!(storage.count_missing(Field::ReviewText).unwrap(), 0);
    assert_eq!(storage.count_missing(Field::BestNew).unwrap(), 2);

    let runs = storage.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].config_hash, "hash-e2e");
    assert_eq!(runs[0].records_stored, 2);
    assert!(runs[0].finished_at.is_some());
}

#[tokio::test]
async fn test_short_info_group_is_not_available() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, 1, listing_page(&["/reviews/albums/2000-z/"])).await;
    mount_review(
        &server,
        "/reviews/albums/2000-z/",
        review_page("Artist Z", "Album Z", &["Electronic", "Warp"]),
    )
    .await;

    let config = test_config(&server, &dir, (1, 1));
    let db = config.output.database_path.clone();
    harvest(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    let storage = open_storage(Path::new(&db)).unwrap();
    assert_eq!(storage.count_reviews().unwrap(), 1);
    assert_eq!(storage.count_missing(Field::Genre).unwrap(), 1);
    assert_eq!(storage.count_missing(Field::Label).unwrap(), 1);
    assert_eq!(storage.count_missing(Field::ReviewDate).unwrap(), 1);
    assert_eq!(storage.count_missing(Field::Artist).unwrap(), 0);
}

#[tokio::test]
async fn test_listing_404_fails_only_its_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, 1, listing_page(&["/reviews/albums/1-a/"])).await;
    Mock::given(method("GET"))
        .and(path("/reviews/albums/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, 3, listing_page(&["/reviews/albums/3-c/"])).await;
    mount_review(
        &server,
        "/reviews/albums/1-a/",
        review_page("A", "One", &["Rock", "L", "D"]),
    )
    .await;
    mount_review(
        &server,
        "/reviews/albums/3-c/",
        review_page("C", "Three", &["Rock", "L", "D"]),
    )
    .await;

    let config = test_config(&server, &dir, (1, 3));
    let db = config.output.database_path.clone();
    let report = harvest(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_attempted, 3);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.failed_pages, vec![2]);
    assert_eq!(report.records_stored, 2);
    assert!(report.has_failures());

    assert_eq!(stored_rows(&db).len(), 2);

    let storage = open_storage(Path::new(&db)).unwrap();
    let runs = storage.recent_runs(1).unwrap();
    assert_eq!(runs[0].status, RunStatus::Partial);
    assert_eq!(runs[0].pages_failed, 1);
}

#[tokio::test]
async fn test_timeout_then_success_stores_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, 1, listing_page(&["/reviews/albums/slow/"])).await;
    Mock::given(method("GET"))
        .and(path("/reviews/albums/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(review_page("Slow", "Eventually", &["a", "b", "c"]))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_review(
        &server,
        "/reviews/albums/slow/",
        review_page("Slow", "Eventually", &["a", "b", "c"]),
    )
    .await;

    let config = test_config(&server, &dir, (1, 1));
    let db = config.output.database_path.clone();
    let report = harvest(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.records_stored, 1);
    assert_eq!(report.records_failed, 0);
    assert_eq!(
        stored_rows(&db),
        vec![(
            "Slow".to_string(),
            "Eventually".to_string(),
            NOT_AVAILABLE.to_string()
        )]
    );
}

#[tokio::test]
async fn test_empty_listing_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, 1, "<html><body><p>No reviews</p></body></html>".to_string()).await;

    let config = test_config(&server, &dir, (1, 1));
    let report = harvest(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.pages_succeeded, 1);
    assert_eq!(report.links_found, 0);
    assert_eq!(report.records_stored, 0);
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_dedupe_across_overlapping_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Page 2 repeats a review that shifted down from page 1.
    mount_listing(
        &server,
        1,
        listing_page(&["/reviews/albums/10-a/", "/reviews/albums/11-b/"]),
    )
    .await;
    mount_listing(
        &server,
        2,
        listing_page(&["/reviews/albums/11-b/", "/reviews/albums/12-c/"]),
    )
    .await;
    for (href, artist) in [
        ("/reviews/albums/10-a/", "A"),
        ("/reviews/albums/11-b/", "B"),
        ("/reviews/albums/12-c/", "C"),
    ] {
        mount_review(&server, href, review_page(artist, "Album", &["x", "y", "z"])).await;
    }

    let mut config = test_config(&server, &dir, (1, 2));
    config.harvest.dedupe_urls = true;
    let db = config.output.database_path.clone();
    let report = harvest(config, "hash", CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.links_found, 4);
    assert_eq!(report.duplicates_skipped, 1);
    assert_eq!(report.records_stored, 3);
    assert_eq!(stored_rows(&db).len(), 3);
}

#[tokio::test]
async fn test_existing_reviews_survive_a_second_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, 1, listing_page(&["/reviews/albums/1-a/"])).await;
    mount_review(
        &server,
        "/reviews/albums/1-a/",
        review_page("A", "One", &["x", "y", "z"]),
    )
    .await;

    let config = test_config(&server, &dir, (1, 1));
    let db = config.output.database_path.clone();
    harvest(config.clone(), "first", CancellationToken::new())
        .await
        .unwrap();
    harvest(config, "second", CancellationToken::new())
        .await
        .unwrap();

    let storage = open_storage(Path::new(&db)).unwrap();
    assert_eq!(storage.count_reviews().unwrap(), 2);

    let runs = storage.recent_runs(10).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].config_hash, "second");
    assert_eq!(runs[1].config_hash, "first");
}

#[tokio::test]
async fn test_interrupted_run_fetches_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = test_config(&server, &dir, (1, 5));
    let db = config.output.database_path.clone();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = harvest(config, "hash", cancel).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.pages_skipped, 5);
    assert!(server.received_requests().await.unwrap().is_empty());

    let storage = open_storage(Path::new(&db)).unwrap();
    let runs = storage.recent_runs(1).unwrap();
    assert_eq!(runs[0].status, RunStatus::Interrupted);
}
