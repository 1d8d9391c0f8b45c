//! Filesystem layout for per-page and per-article artifacts
//!
//! ```text
//! <directory>/
//!   articles/<slug>.pdf        one PDF per record (pdf-per-article)
//!   page_1/                    one directory per record (page-directories)
//!     data.json
//!     page.html
//!     screenshot.png
//!     image_1.jpg ...
//! ```
//!
//! Every file is isolated: a failure is reported as a warning and the next
//! file is attempted.

use crate::article::{ArticleRecord, CrawlResult};
use crate::output::encoding::sanitize_file_stem;
use crate::output::json::write_record;
use crate::output::pdf::write_article;
use crate::output::traits::{ExportReport, OutputError, OutputResult};
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Subdirectory holding per-article PDFs
pub const ARTICLES_DIR: &str = "articles";

/// Directory name for the record at `index` (zero-based)
pub fn page_dir_name(index: usize) -> String {
    format!("page_{}", index + 1)
}

/// Picks a unique file stem for each record
///
/// The URL's last path segment is used when it yields a usable name;
/// otherwise `article_<n>`. Repeated stems get a `-<n>` suffix.
pub fn article_file_stems(records: &[ArticleRecord]) -> Vec<String> {
    let mut used = HashSet::new();

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let base = record
                .slug()
                .and_then(|slug| sanitize_file_stem(&slug))
                .unwrap_or_else(|| format!("article_{}", index + 1));

            let mut stem = base.clone();
            let mut suffix = index + 1;
            while !used.insert(stem.clone()) {
                stem = format!("{}-{}", base, suffix);
                suffix += 1;
            }
            stem
        })
        .collect()
}

/// Writes one PDF per record into `<root>/articles/`
pub fn write_article_pdfs(records: &[ArticleRecord], root: &Path, report: &mut ExportReport) {
    let dir = root.join(ARTICLES_DIR);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        report
            .warnings
            .push(format!("Cannot create {}: {}", dir.display(), e));
        return;
    }

    for (record, stem) in records.iter().zip(article_file_stems(records)) {
        let path = dir.join(format!("{}.pdf", stem));
        match write_article(record, &path) {
            Ok(lossless) => {
                if !lossless {
                    report.warnings.push(format!(
                        "{}: unsupported characters replaced in {}",
                        record.url,
                        path.display()
                    ));
                }
                report.files.push(path);
            }
            Err(e) => {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
                report.warnings.push(format!("{}: {}", record.url, e));
            }
        }
    }
}

/// Writes `page_<n>/` directories for every record
///
/// Images are downloaded only when `downloader` is given.
pub async fn write_page_directories(
    result: &CrawlResult,
    root: &Path,
    downloader: Option<&ImageDownloader>,
    report: &mut ExportReport,
) {
    for (index, record) in result.records().iter().enumerate() {
        let dir = root.join(page_dir_name(index));
        if let Err(e) = std::fs::create_dir_all(&dir) {
            report
                .warnings
                .push(format!("Cannot create {}: {}", dir.display(), e));
            continue;
        }

        let data_path = dir.join("data.json");
        match write_record(record, &data_path) {
            Ok(()) => report.files.push(data_path),
            Err(e) => report.warnings.push(format!("{}: {}", data_path.display(), e)),
        }

        if let Some(snapshot) = result.snapshot(index) {
            if let Some(html) = &snapshot.html {
                write_file(&dir.join("page.html"), html.as_bytes(), report);
            }
            if let Some(png) = &snapshot.screenshot {
                write_file(&dir.join("screenshot.png"), png, report);
            }
        }

        if let Some(downloader) = downloader {
            for (n, image_url) in record.images.iter().enumerate() {
                match downloader.download(image_url, &dir, n + 1).await {
                    Ok(path) => report.files.push(path),
                    Err(e) => {
                        tracing::warn!("Image {} not saved: {}", image_url, e);
                        report.warnings.push(format!("{}: {}", image_url, e));
                    }
                }
            }
        }
    }
}

fn write_file(path: &Path, bytes: &[u8], report: &mut ExportReport) {
    match std::fs::write(path, bytes) {
        Ok(()) => report.files.push(path.to_path_buf()),
        Err(e) => report.warnings.push(format!("{}: {}", path.display(), e)),
    }
}

/// Fetches article images with a per-request timeout
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: Client,
    timeout: Duration,
}

impl ImageDownloader {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Downloads one image to `<dir>/image_<n>.<ext>`
    pub async fn download(&self, image_url: &str, dir: &Path, n: usize) -> OutputResult<PathBuf> {
        let response = self
            .client
            .get(image_url)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| OutputError::Write(format!("download failed: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| OutputError::Write(format!("download failed: {}", e)))?;

        let path = dir.join(format!("image_{}.{}", n, image_extension(image_url)));
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

/// File extension taken from the URL path, or `img`
fn image_extension(image_url: &str) -> String {
    url::Url::parse(image_url)
        .ok()
        .and_then(|url| {
            let segment = url.path_segments()?.last()?.to_string();
            let (_, ext) = segment.rsplit_once('.')?;
            let ext = ext.to_ascii_lowercase();
            (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
                .then_some(ext)
        })
        .unwrap_or_else(|| "img".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::PageSnapshot;
    use tempfile::TempDir;

    fn record(url: &str) -> ArticleRecord {
        ArticleRecord::new(url, "Body", vec![])
    }

    #[test]
    fn test_article_file_stems() {
        let records = vec![
            record("https://a.com/analysis/high-press/"),
            record("https://a.com/"),
            record("https://a.com/other/high-press"),
            record("https://a.com/p/post.html"),
        ];
        assert_eq!(
            article_file_stems(&records),
            vec!["high-press", "article_2", "high-press-3", "post"]
        );
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("https://a.com/x/photo.JPG"), "jpg");
        assert_eq!(image_extension("https://a.com/x/photo.webp?w=300"), "webp");
        assert_eq!(image_extension("https://a.com/x/photo"), "img");
        assert_eq!(image_extension("https://a.com/x/archive.tar-gz"), "img");
    }

    #[test]
    fn test_write_article_pdfs() {
        let dir = TempDir::new().unwrap();
        let mut report = ExportReport::default();
        let records = vec![record("https://a.com/one"), record("https://a.com/two")];

        write_article_pdfs(&records, dir.path(), &mut report);

        assert!(report.warnings.is_empty());
        assert!(dir.path().join("articles/one.pdf").exists());
        assert!(dir.path().join("articles/two.pdf").exists());
    }

    #[tokio::test]
    async fn test_page_directories_without_downloads() {
        let dir = TempDir::new().unwrap();
        let mut report = ExportReport::default();
        let result = CrawlResult::new(
            vec![record("https://a.com/one")],
            vec![PageSnapshot {
                html: Some("<p>Body</p>".to_string()),
                screenshot: Some(vec![0x89, b'P', b'N', b'G']),
            }],
            vec![],
            Default::default(),
        );

        write_page_directories(&result, dir.path(), None, &mut report).await;

        let page = dir.path().join("page_1");
        assert!(page.join("data.json").exists());
        assert_eq!(std::fs::read_to_string(page.join("page.html")).unwrap(), "<p>Body</p>");
        assert!(page.join("screenshot.png").exists());
        assert_eq!(report.files.len(), 3);
    }

    #[tokio::test]
    async fn test_stalled_image_download_times_out() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0xFF, 0xD8])
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = ImageDownloader::new(Client::new(), Duration::from_secs(1));
        let image_url = format!("{}/slow.jpg", server.uri());

        let outcome = tokio::time::timeout(
            Duration::from_secs(10),
            downloader.download(&image_url, dir.path(), 1),
        )
        .await
        .expect("download must give up on its own");

        assert!(outcome.is_err());
        assert!(!dir.path().join("image_1.jpg").exists());
    }
}
