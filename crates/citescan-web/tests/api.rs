use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use citescan_parsing::ParsingConfig;
use citescan_web::{AppState, ServerSettings, router};

const BOUNDARY: &str = "citescan-test-boundary";

fn app() -> Router {
    app_with(ServerSettings::default())
}

fn app_with(settings: ServerSettings) -> Router {
    router(Arc::new(AppState::new(ParsingConfig::default(), settings)))
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn extract_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::post("/extract")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_extract_returns_deduplicated_references() {
    let request = extract_request(&[
        Part::Text("keyword", "finding"),
        Part::File(
            "files",
            "a.txt",
            b"This finding confirms Smith et al., 2010 and (Brown, 1999).",
        ),
        Part::File("files", "b.txt", b"Another finding by Smith et al., 2010."),
    ]);
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["references"],
        serde_json::json!(["Smith et al., 2010", "Brown, 1999"])
    );
    assert_eq!(json["skipped"], serde_json::json!([]));
}

#[tokio::test]
async fn test_no_citations_is_empty_list() {
    let request = extract_request(&[
        Part::Text("keyword", "finding"),
        Part::File("files", "a.txt", b"A finding with nothing cited."),
    ]);
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["references"], serde_json::json!([]));
}

#[tokio::test]
async fn test_unsupported_file_is_reported_as_skipped() {
    let request = extract_request(&[
        Part::File("files", "scan.pdf", b"%PDF-1.7"),
        Part::File("files", "notes.txt", b"A claim by Adams, 2001."),
        Part::Text("keyword", "claim"),
    ]);
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["references"], serde_json::json!(["Adams, 2001"]));
    assert_eq!(json["skipped"][0]["file"], "scan.pdf");
    assert!(
        json["skipped"][0]["reason"]
            .as_str()
            .unwrap()
            .contains("only .docx and .txt")
    );
}

#[tokio::test]
async fn test_empty_keyword_is_rejected() {
    let request = extract_request(&[
        Part::Text("keyword", "   "),
        Part::File("files", "a.txt", b"Smith, 2010."),
    ]);
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Keyword is required");
}

#[tokio::test]
async fn test_missing_files_are_rejected() {
    let request = extract_request(&[
        Part::Text("keyword", "finding"),
        Part::File("files", "", b""),
    ]);
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "At least one file is required");
}

#[tokio::test]
async fn test_all_files_failing_is_rejected() {
    let request = extract_request(&[
        Part::Text("keyword", "finding"),
        Part::File("files", "a.pdf", b"%PDF-1.7"),
        Part::File("files", "refs.txt", b"References\nSmith, 2010."),
    ]);
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap();
    assert!(detail.contains("a.pdf"));
    assert!(detail.contains("refs.txt"));
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected_as_json() {
    let request = Request::post("/extract")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, json) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_static_frontend_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>citescan</h1>").unwrap();
    let app = app_with(ServerSettings {
        static_dir: Some(dir.path().to_path_buf()),
        ..ServerSettings::default()
    });

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>citescan</h1>");

    let (status, _) = send(app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
