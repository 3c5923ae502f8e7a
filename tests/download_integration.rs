//! Integration tests for the retrying download engine.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fulltext_core::download::Sleeper;
use fulltext_core::{DownloadOptions, Downloader, HttpSettings};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

#[derive(Default)]
struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

fn downloader(sleeper: &Arc<RecordingSleeper>) -> Downloader {
    Downloader::new(HttpSettings::download())
        .unwrap()
        .with_sleeper(Arc::clone(sleeper) as Arc<dyn Sleeper>)
}

fn options(retries: u32, delay_ms: u64) -> DownloadOptions {
    DownloadOptions {
        retries,
        retry_delay: Duration::from_millis(delay_ms),
    }
}

fn pdf_body(len: usize) -> Vec<u8> {
    let mut body = b"%PDF-1.7\n".to_vec();
    body.resize(len, b'x');
    body
}

#[tokio::test]
async fn test_download_writes_file_and_creates_parent_dirs() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();
    let body = pdf_body(4096);

    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let dest = temp_dir.path().join("papers").join("smith2024").join("paper.pdf");
    let result = downloader(&sleeper)
        .download(&format!("{}/paper.pdf", mock_server.uri()), &dest, &options(3, 10))
        .await;

    assert!(result.is_success(), "unexpected failure: {:?}", result.error());
    assert_eq!(result.size(), Some(4096));
    assert_eq!(std::fs::read(&dest).unwrap(), body);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_transient_failures_back_off_linearly() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(pdf_body(64), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let result = downloader(&sleeper)
        .download(
            &format!("{}/flaky.pdf", mock_server.uri()),
            &temp_dir.path().join("flaky.pdf"),
            &options(3, 25),
        )
        .await;

    assert!(result.is_success());
    assert_eq!(result.size(), Some(64));
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(25), Duration::from_millis(50)]
    );
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let dest = temp_dir.path().join("missing.pdf");
    let result = downloader(&sleeper)
        .download(&format!("{}/missing.pdf", mock_server.uri()), &dest, &options(5, 10))
        .await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("404"));
    assert!(sleeper.delays().is_empty());
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_content_type_mismatch_is_not_retried() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/paywall.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"<html>login</html>".to_vec(), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let dest = temp_dir.path().join("paywall.pdf");
    let result = downloader(&sleeper)
        .download(&format!("{}/paywall.pdf", mock_server.uri()), &dest, &options(3, 10))
        .await;

    assert!(!result.is_success());
    let error = result.error().unwrap();
    assert!(error.contains("content type"), "unexpected error: {error}");
    assert!(error.contains("text/html"));
    assert!(sleeper.delays().is_empty());
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf_body(16)))
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let result = downloader(&sleeper)
        .download(
            &format!("{}/bare", mock_server.uri()),
            &temp_dir.path().join("bare.pdf"),
            &options(2, 10),
        )
        .await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("<missing>"));
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_octet_stream_with_parameters_is_accepted() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            pdf_body(32),
            "Application/Octet-Stream; charset=binary",
        ))
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let result = downloader(&sleeper)
        .download(
            &format!("{}/blob", mock_server.uri()),
            &temp_dir.path().join("blob.pdf"),
            &options(1, 10),
        )
        .await;
    assert_eq!(result.size(), Some(32));
}

#[tokio::test]
async fn test_pmc_xml_uses_efetch() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();
    let xml = b"<?xml version=\"1.0\"?><pmc-articleset><article/></pmc-articleset>".to_vec();

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pmc"))
        .and(query_param("id", "3531190"))
        .and(query_param("rettype", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml.clone(), "text/xml; charset=UTF-8"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let dest = temp_dir.path().join("PMC3531190.xml");
    let result = downloader(&sleeper)
        .with_base_urls(
            format!("{}/efetch.fcgi", mock_server.uri()),
            format!("{}/html", mock_server.uri()),
        )
        .download_pmc_xml("pmc3531190", &dest, &options(3, 10))
        .await;

    assert!(result.is_success(), "unexpected failure: {:?}", result.error());
    assert_eq!(result.size(), Some(xml.len() as u64));
    assert_eq!(std::fs::read(&dest).unwrap(), xml);
}

#[tokio::test]
async fn test_arxiv_html_missing_rendering() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/html/2401.12345"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let result = downloader(&sleeper)
        .with_base_urls(
            format!("{}/efetch.fcgi", mock_server.uri()),
            format!("{}/html/", mock_server.uri()),
        )
        .download_arxiv_html("arXiv:2401.12345", &temp_dir.path().join("a.html"), &options(3, 10))
        .await;

    assert_eq!(
        result.error(),
        Some("HTML rendering not available for arXiv:2401.12345")
    );
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_arxiv_html_success() {
    let mock_server = require_mock_server!();
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/html/2401.12345"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<html><body>paper</body></html>".to_vec(), "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let result = downloader(&sleeper)
        .with_base_urls(
            format!("{}/efetch.fcgi", mock_server.uri()),
            format!("{}/html", mock_server.uri()),
        )
        .download_arxiv_html("2401.12345", &temp_dir.path().join("a.html"), &options(3, 10))
        .await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_reported() {
    // Port 9 (discard) is closed on loopback, so every attempt is refused.
    let temp_dir = TempDir::new().unwrap();
    let sleeper = Arc::new(RecordingSleeper::default());

    let result = downloader(&sleeper)
        .download(
            "http://127.0.0.1:9/x.pdf",
            &temp_dir.path().join("x.pdf"),
            &options(3, 7),
        )
        .await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("network error"));
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(7), Duration::from_millis(14)]
    );
    assert!(!temp_dir.path().join("x.pdf").exists());
}
