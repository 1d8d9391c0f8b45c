//! Integration tests for exporting a crawl result

use crate::{article_html, test_config};
use sumi_scribe::crawler::Coordinator;
use sumi_scribe::output::{export_all, read_json};
use sumi_scribe::{ArticleRecord, CrawlResult};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_export_layout() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    serve(
        &server,
        "/",
        ResponseTemplate::new(200)
            .set_body_string(r#"<a href="/match-report">R</a><a href="/다음-경기">N</a>"#),
    )
    .await;
    serve(
        &server,
        "/match-report",
        ResponseTemplate::new(200).set_body_string(article_html("Kim", Some("/img/goal.jpg"))),
    )
    .await;
    serve(
        &server,
        "/%EB%8B%A4%EC%9D%8C-%EA%B2%BD%EA%B8%B0",
        ResponseTemplate::new(200).set_body_string(article_html("다음", None)),
    )
    .await;
    serve(
        &server,
        "/img/goal.jpg",
        ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]),
    )
    .await;

    let config = test_config(
        &format!("{}/", base),
        &format!(
            r#"
[output]
directory = "{}"
basename = "report"
formats = ["csv", "json", "pdf", "xlsx"]
page-directories = true
download-images = true
pdf-per-article = true
"#,
            out.path().display()
        ),
    );

    let result = Coordinator::new(config.clone())
        .await
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(result.len(), 2);

    let report = export_all(&result, &config).await.unwrap();

    for name in ["report.csv", "report.json", "report.pdf", "report.xlsx"] {
        assert!(out.path().join(name).exists(), "missing {}", name);
    }
    // The Korean article cannot be represented in the PDF code page
    let pdf = report
        .artifacts
        .iter()
        .find(|a| a.path.ends_with("report.pdf"))
        .unwrap();
    assert_eq!(pdf.degraded, 1);

    assert!(out.path().join("articles/match-report.pdf").exists());
    assert_eq!(std::fs::read_dir(out.path().join("articles")).unwrap().count(), 2);

    let page_1 = out.path().join("page_1");
    assert!(page_1.join("data.json").exists());
    assert!(page_1.join("page.html").exists());
    assert_eq!(
        std::fs::read(page_1.join("image_1.jpg")).unwrap(),
        vec![0xFF, 0xD8, 0xFF, 0xE0]
    );
    assert!(out.path().join("page_2/data.json").exists());
    // Only the per-article PDF of the Korean page reports a substitution
    assert_eq!(report.warnings.len(), 1, "{:?}", report.warnings);

    let parsed = read_json(&out.path().join("report.json")).unwrap();
    assert_eq!(parsed, result.records());
}

#[tokio::test]
async fn test_json_round_trip() {
    let out = TempDir::new().unwrap();
    let records = vec![
        ArticleRecord::new(
            "https://example.com/a",
            "First line\nSecond, with \"quotes\"",
            vec!["https://example.com/a.png".to_string()],
        ),
        ArticleRecord::new("https://example.com/b", "", vec![]),
    ];
    let result = CrawlResult::from_records(records.clone());

    let config = test_config(
        "https://example.com/",
        &format!(
            "[output]\ndirectory = \"{}\"\nformats = [\"json\"]\n",
            out.path().display()
        ),
    );
    let report = export_all(&result, &config).await.unwrap();

    assert_eq!(report.artifacts.len(), 1);
    let parsed = read_json(&report.artifacts[0].path).unwrap();
    assert_eq!(parsed, records);
}

#[tokio::test]
async fn test_missing_image_is_a_warning() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    serve(&server, "/gone.png", ResponseTemplate::new(404)).await;

    let records = vec![ArticleRecord::new(
        format!("{}/a", server.uri()),
        "Body",
        vec![format!("{}/gone.png", server.uri())],
    )];
    let result = CrawlResult::from_records(records);

    let config = test_config(
        "https://example.com/",
        &format!(
            "[output]\ndirectory = \"{}\"\nformats = []\npage-directories = true\ndownload-images = true\n",
            out.path().display()
        ),
    );
    let report = export_all(&result, &config).await.unwrap();

    assert!(report.artifacts.is_empty());
    assert!(out.path().join("page_1/data.json").exists());
    assert_eq!(report.warnings.len(), 1);
}
