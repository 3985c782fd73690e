//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive a real
//! coordinator over an in-memory graph store.

use link_weaver::config::Config;
use link_weaver::crawler::{Coordinator, FetchOutcome};
use link_weaver::output::build_report;
use link_weaver::storage::{GraphStore, RunStatus, SqliteStorage};
use link_weaver::WeaverError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a coordinator over a fresh in-memory store
fn coordinator(config: Config) -> Coordinator<SqliteStorage> {
    let storage = SqliteStorage::new_in_memory().expect("Failed to open in-memory storage");
    Coordinator::with_storage(config, storage).expect("Failed to build coordinator")
}

/// HTML response; `set_body_raw` keeps the MIME type that `set_body_string` would replace
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

fn redirect(status: u16, location: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).insert_header("location", location)
}

#[tokio::test]
async fn test_seed_crawl_records_links_titles_and_external_urls() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/about" title="About Us">About</a>
               <a href="http://other.com">Other</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>About page</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator
        .run(&format!("{}/", base))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.failed, 0);

    let storage = coordinator.storage();
    let root = storage
        .find_url(&format!("{}/", base))
        .unwrap()
        .expect("Seed URL missing");
    let about = storage
        .find_url(&format!("{}/about", base))
        .unwrap()
        .expect("About URL missing");

    assert_eq!(root.status, Some(200));
    assert_eq!(about.status, Some(200));

    // The external URL exists but is neither linked nor fetched
    let other = storage.find_url("http://other.com").unwrap().expect("External URL missing");
    assert_eq!(other.status, None);

    let links = storage.links_from(root.id).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].destination_url_id, about.id);
    assert_eq!(links[0].occurances, 1);
    assert_eq!(storage.link_titles(links[0].id).unwrap(), vec!["About Us", "About"]);

    assert!(storage.get_page_by_url(about.id).unwrap().is_some());
    assert_eq!(storage.count_pages().unwrap(), 2);

    let run = storage.get_latest_run().unwrap().expect("Run missing");
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.finished_at.is_some());

    let report = build_report(storage).unwrap();
    let page = report.page(&format!("{}/", base)).expect("Report page missing");
    assert_eq!(page.links[0].titles, vec!["About Us", "About"]);
}

#[tokio::test]
async fn test_redirect_chain_is_attached_to_final_page() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect(301, "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<p>New home</p>"))
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator
        .run(&format!("{}/old", base))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.redirects, 1);

    let storage = coordinator.storage();
    let old = storage.find_url(&format!("{}/old", base)).unwrap().unwrap();
    let new = storage.find_url(&format!("{}/new", base)).unwrap().unwrap();
    assert_eq!(old.status, Some(301));
    assert_eq!(new.status, Some(200));

    assert!(storage.get_page_by_url(old.id).unwrap().is_none());
    let page = storage.get_page_by_url(new.id).unwrap().expect("Page missing");

    let redirections = storage.page_redirections(page.id).unwrap();
    assert_eq!(redirections, vec![old]);
}

#[tokio::test]
async fn test_redirect_target_is_fetched_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect(301, "/new"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(
            r#"<a href="/new">Self</a><a href="/old">Old</a><a href="/other">Other</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(html(r#"<a href="/new">Back</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator.run(&format!("{}/old", base)).await.unwrap();

    assert_eq!(summary.dequeued, 2);
    assert_eq!(summary.pages, 2);

    let storage = coordinator.storage();
    let new = storage.find_url(&format!("{}/new", base)).unwrap().unwrap();
    let occurances: Vec<u32> = storage
        .links_from(new.id)
        .unwrap()
        .iter()
        .map(|l| l.occurances)
        .collect();
    assert_eq!(occurances, vec![1, 1, 1]);
}

#[tokio::test]
async fn test_scheme_relative_link_to_other_host_is_not_followed() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="//other.invalid/lib">CDN</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator.run(&format!("{}/", base)).await.unwrap();

    assert_eq!(summary.dequeued, 1);
    assert_eq!(summary.failed, 0);

    let storage = coordinator.storage();
    assert!(storage.find_url("http://other.invalid/lib").unwrap().is_some());
    assert_eq!(storage.count_links().unwrap(), 0);
}

/// Mounts `/hop0` -> `/hop1` -> ... -> `/hop{hops}` where the last one is HTML
async fn mount_redirect_chain(mock_server: &MockServer, hops: usize) {
    for i in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/hop{}", i)))
            .respond_with(redirect(302, &format!("/hop{}", i + 1)))
            .mount(mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(format!("/hop{}", hops)))
        .respond_with(html("<p>end of chain</p>"))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_redirect_budget_boundary() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_redirect_chain(&mock_server, 3).await;

    let mut coordinator = coordinator(Config::default());
    let start = format!("{}/hop0", base);

    // Exactly as many redirects as the budget allows
    let outcome = coordinator.fetch(&start, 3, Vec::new()).await.unwrap();
    match outcome {
        FetchOutcome::Page { url, redirects, .. } => {
            assert_eq!(url, format!("{}/hop3", base));
            assert_eq!(redirects, 3);
        }
        other => panic!("Expected a page, got {:?}", other),
    }

    // One redirect more than the budget
    let err = coordinator.fetch(&start, 2, Vec::new()).await.unwrap_err();
    match err {
        WeaverError::RedirectDepthExceeded { url, limit } => {
            assert_eq!(url, format!("{}/hop2", base));
            assert_eq!(limit, 2);
        }
        other => panic!("Expected RedirectDepthExceeded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_overflow_is_skipped_by_default() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_redirect_chain(&mock_server, 3).await;

    let mut config = Config::default();
    config.crawler.redirect_limit = 1;

    let mut coordinator = coordinator(config);
    let summary = coordinator.run(&format!("{}/hop0", base)).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.pages, 0);
    assert_eq!(coordinator.storage().count_pages().unwrap(), 0);
}

#[tokio::test]
async fn test_redirect_overflow_can_halt_the_run() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    mount_redirect_chain(&mock_server, 3).await;

    let mut config = Config::default();
    config.crawler.redirect_limit = 1;
    config.crawler.halt_on_redirect_overflow = true;

    let mut coordinator = coordinator(config);
    let result = coordinator.run(&format!("{}/hop0", base)).await;

    assert!(matches!(
        result,
        Err(WeaverError::RedirectDepthExceeded { limit: 1, .. })
    ));

    let run = coordinator.storage().get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
}

#[tokio::test]
async fn test_non_html_response_creates_no_page() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/report.pdf">Report</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator.run(&format!("{}/", base)).await.unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.non_html, 1);

    let storage = coordinator.storage();
    let pdf = storage.find_url(&format!("{}/report.pdf", base)).unwrap().unwrap();
    assert_eq!(pdf.status, Some(200));
    assert!(storage.get_page_by_url(pdf.id).unwrap().is_none());

    // The link to it is still part of the graph
    assert_eq!(storage.count_links().unwrap(), 1);
}

#[tokio::test]
async fn test_repeated_links_are_fetched_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">A</a>
               <a href="/a#section">A again</a>
               <a href="/a">A once more</a>
               <a href="/b">B</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/">Home</a><a href="/b">B</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(r#"<a href="/a">A</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator.run(&format!("{}/", base)).await.unwrap();

    assert_eq!(summary.dequeued, 3);
    assert_eq!(summary.pages, 3);

    let storage = coordinator.storage();
    let root = storage.find_url(&format!("{}/", base)).unwrap().unwrap();
    let a = storage.find_url(&format!("{}/a", base)).unwrap().unwrap();

    let links = storage.links_from(root.id).unwrap();
    assert_eq!(links.len(), 2);
    let to_a = links
        .iter()
        .find(|l| l.destination_url_id == a.id)
        .expect("Link to /a missing");
    assert_eq!(to_a.occurances, 3);
    assert_eq!(
        storage.link_titles(to_a.id).unwrap(),
        vec!["A", "A again", "A once more"]
    );
}

#[tokio::test]
async fn test_query_params_are_stripped_when_disabled() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .respond_with(html("<p>second page</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html("<p>first page</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler.include_query_params = false;

    let mut coordinator = coordinator(config);
    let summary = coordinator
        .run(&format!("{}/list?page=2", base))
        .await
        .unwrap();
    assert_eq!(summary.pages, 1);

    // Identity keeps the query even though the request dropped it
    let storage = coordinator.storage();
    assert!(storage
        .find_url(&format!("{}/list?page=2", base))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_query_params_are_sent_by_default() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .respond_with(html("<p>second page</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator
        .run(&format!("{}/list?page=2", base))
        .await
        .unwrap();
    assert_eq!(summary.pages, 1);
}

#[tokio::test]
async fn test_error_statuses_are_recorded_and_skipped() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/missing">Gone</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut coordinator = coordinator(Config::default());
    let summary = coordinator.run(&format!("{}/", base)).await.unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.ignored, 1);

    let missing = coordinator
        .storage()
        .find_url(&format!("{}/missing", base))
        .unwrap()
        .unwrap();
    assert_eq!(missing.status, Some(404));
}
