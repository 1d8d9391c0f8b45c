//! Integration tests for discovery and the crawl pipeline
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl cycle end-to-end.

use crate::{article_html, test_config};
use sumi_scribe::config::FetchStrategy;
use sumi_scribe::crawler::{Coordinator, HttpFetcher, Walker};
use sumi_scribe::url::KeywordFilter;
use sumi_scribe::ScribeError;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pagination_chain_fetches_each_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Three listing pages; the last "Next" points back at the first
    mount_page(
        &server,
        "/list",
        r#"<a href="/a1">First</a><a href="/subscribe">Sub</a><a href="/list/2">Next</a>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/list/2",
        r#"<a href="/a2">Second</a><a href="/list/3">Next</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/list/3",
        format!(r#"<a href="{}/a3">Third</a><a href="/list">Next</a>"#, base),
        1,
    )
    .await;
    mount_page(&server, "/a1", article_html("Alpha", None), 1).await;
    mount_page(&server, "/a2", article_html("Bravo", None), 1).await;
    mount_page(&server, "/a3", article_html("Charlie", None), 1).await;

    let config = test_config(
        &format!("{}/list", base),
        r#"
[crawler]
discovery-mode = "pagination"
retry-delay-ms = 0
"#,
    );

    let coordinator = Coordinator::new(config).await.unwrap();
    let result = coordinator.run().await.unwrap();

    let urls: Vec<&str> = result.records().iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/a1", base),
            format!("{}/a2", base),
            format!("{}/a3", base)
        ]
    );
    assert!(result.records()[0].text.starts_with("Alpha opens the match."));
    assert_eq!(result.stats().listing_pages_fetched, 3);
}

#[tokio::test]
async fn test_sitemap_returns_every_loc() {
    let server = MockServer::start().await;
    let base = server.uri();

    let locs: String = (1..=4)
        .map(|i| format!("<url><loc>{}/post/{}</loc></url>", base, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            locs
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(
        &format!("{}/blog/", base),
        "[crawler]\ndiscovery-mode = \"sitemap\"\n",
    );
    let fetcher = HttpFetcher::new(&config.user_agent, FetchStrategy::Plain).unwrap();
    let filter = KeywordFilter::from_config(&config.filter);
    let walker = Walker::new(&fetcher, &config.crawler, &filter);

    let seed = Url::parse(&format!("{}/blog/", base)).unwrap();
    let discovery = walker.discover(&seed).await.unwrap();

    assert!(!discovery.seed_only);
    assert_eq!(
        discovery.links.into_vec(),
        (1..=4)
            .map(|i| format!("{}/post/{}", base, i))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_unreachable_sitemap_falls_back_to_seed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/only", article_html("Solo", None), 1).await;

    let seed = format!("{}/only", base);
    let config = test_config(&seed, "[crawler]\ndiscovery-mode = \"sitemap\"\n");

    let result = Coordinator::new(config).await.unwrap().run().await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.records()[0].url, seed);
}

#[tokio::test]
async fn test_duplicate_content_is_excluded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/one">1</a><a href="/two">2</a><a href="/ads/three">3</a>"#.to_string(),
        1,
    )
    .await;
    let same = r#"<p>Hello</p><img src="/x.png">"#.to_string();
    mount_page(&server, "/one", same.clone(), 1).await;
    mount_page(&server, "/two", same, 1).await;
    mount_page(&server, "/ads/three", String::new(), 0).await;

    let config = test_config(&format!("{}/", base), "[extraction]\npolicy = \"flat\"\n");
    let result = Coordinator::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(result.len(), 1);
    let record = &result.records()[0];
    assert_eq!(record.url, format!("{}/one", base));
    assert_eq!(record.text, "Hello");
    assert_eq!(record.images, vec![format!("{}/x.png", base)]);
    assert_eq!(result.stats().duplicates_skipped, 1);
}

#[tokio::test]
async fn test_unreachable_seed_aborts_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/missing", server.uri()), "");
    let err = Coordinator::new(config).await.unwrap().run().await.unwrap_err();

    match err {
        ScribeError::SeedUnreachable { url, reason } => {
            assert!(url.ends_with("/missing"));
            assert_eq!(reason, "HTTP 404");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_failed_article_is_retried_then_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/flaky">F</a><a href="/broken">B</a>"#.to_string(),
        1,
    )
    .await;

    // Two server errors, then success
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", article_html("Flaky", None), 1).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = test_config(
        &format!("{}/", base),
        "[crawler]\nmax-attempts = 3\nretry-delay-ms = 0\n",
    );
    let result = Coordinator::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.records()[0].url, format!("{}/flaky", base));
    assert_eq!(result.warnings().len(), 1);
    assert_eq!(result.warnings()[0].message, "HTTP 500");
    assert_eq!(result.stats().pages_failed, 1);
}

#[tokio::test]
async fn test_plain_strategy_sends_identity_user_agent() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/a">A</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", article_html("Agent", None), 1).await;

    let config = test_config(&format!("{}/", base), "");
    let result = Coordinator::new(config).await.unwrap().run().await.unwrap();
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_session_headers_share_cookies() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/members">M</a>"#)
                .insert_header("set-cookie", "sid=abc123; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/members"))
        .and(header("cookie", "sid=abc123"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_html("Member", None)))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(
        &format!("{}/", base),
        "[crawler]\nfetch-strategy = \"session-headers\"\n",
    );
    let result = Coordinator::new(config).await.unwrap().run().await.unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.warnings().is_empty());
}
