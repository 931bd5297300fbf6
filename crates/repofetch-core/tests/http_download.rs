//! Exercises `HttpArchiveDownloader` against a one-shot loopback server.

use std::io::{Cursor, Write};

use repofetch_core::{
    ArchiveDownloader, ArchiveOptions, DownloadError, FetchConfig, HttpArchiveDownloader,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use zip::write::SimpleFileOptions;

/// Serve a single response and hand back the raw request head.
async fn serve_once(status_line: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{addr}"), handle)
}

fn snapshot_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.add_directory("widget-v1.0/", options).unwrap();
    writer.start_file("widget-v1.0/README.md", options).unwrap();
    writer.write_all(b"# widget\n").unwrap();
    writer.add_directory("widget-v1.0/src/", options).unwrap();
    writer.start_file("widget-v1.0/src/lib.rs", options).unwrap();
    writer.write_all(b"pub fn widget() {}\n").unwrap();
    writer.finish().unwrap().into_inner()
}

fn downloader() -> HttpArchiveDownloader {
    HttpArchiveDownloader::new(&FetchConfig::default().with_user_agent("repofetch-test")).unwrap()
}

#[tokio::test]
async fn downloads_and_strips_wrapping_folder() {
    let (base, server) = serve_once("200 OK", snapshot_zip()).await;
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("widget");

    downloader()
        .download_and_extract(
            &format!("{base}/acme/widget/archive/v1.0.zip"),
            &dest,
            &ArchiveOptions::provider_snapshot(),
        )
        .await
        .unwrap();

    let request = server.await.unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /acme/widget/archive/v1.0.zip "));
    assert!(request.contains("accept: application/zip"));
    assert!(request.contains("user-agent: repofetch-test"));

    assert_eq!(
        std::fs::read_to_string(dest.join("README.md")).unwrap(),
        "# widget\n"
    );
    assert!(dest.join("src/lib.rs").is_file());
    assert!(!dest.join("widget-v1.0").exists());
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let (base, server) = serve_once("404 Not Found", Vec::new()).await;
    let dir = tempfile::tempdir().unwrap();
    let url = format!("{base}/acme/missing/archive/master.zip");

    let err = downloader()
        .download_and_extract(&url, dir.path(), &ArchiveOptions::provider_snapshot())
        .await
        .unwrap_err();
    server.await.unwrap();

    match err {
        DownloadError::Http { url: got, status } => {
            assert_eq!(got, url);
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_archive_is_an_archive_error() {
    let (base, server) = serve_once("200 OK", b"not a zip".to_vec()).await;
    let dir = tempfile::tempdir().unwrap();

    let err = downloader()
        .download_and_extract(
            &format!("{base}/x.zip"),
            dir.path(),
            &ArchiveOptions::provider_snapshot(),
        )
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, DownloadError::Archive(_)));
}

#[tokio::test]
async fn extract_disabled_saves_the_raw_archive() {
    let body = snapshot_zip();
    let (base, server) = serve_once("200 OK", body.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let options = ArchiveOptions {
        extract: false,
        ..ArchiveOptions::provider_snapshot()
    };

    downloader()
        .download_and_extract(
            &format!("{base}/acme/widget/repository/archive.zip?ref=dev"),
            dir.path(),
            &options,
        )
        .await
        .unwrap();
    server.await.unwrap();

    assert_eq!(std::fs::read(dir.path().join("archive.zip")).unwrap(), body);
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = tempfile::tempdir().unwrap();

    let err = downloader()
        .download_and_extract(
            &format!("http://{addr}/x.zip"),
            dir.path(),
            &ArchiveOptions::provider_snapshot(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Request { .. }));
}
