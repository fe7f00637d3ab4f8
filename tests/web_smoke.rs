use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use docqa::{
    DocumentStore,
    server::{AppState, ServerConfig, create_router},
};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "docqa-test-boundary";

fn test_app(config: &ServerConfig) -> (tempfile::TempDir, Router) {
    let tmp = tempfile::tempdir().unwrap();
    let store =
        DocumentStore::open(&tmp.path().join("documents.redb")).unwrap();
    (tmp, create_router(AppState::new(store, config)))
}

fn multipart_request(
    field: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_request(method: &str, uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn upload_text(app: &Router, filename: &str, text: &str) -> String {
    let (status, body) = send(
        app,
        multipart_request("document", filename, "text/plain", text.as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    body["documentId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(&app, empty_request("GET", "/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "OK", "message": "Server is running"}));
}

#[tokio::test]
async fn upload_list_ask_search_delete() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        multipart_request(
            "document",
            "launch.txt",
            "text/plain",
            b"The launch date is March fifth. Marketing owns the budget. \
              Engineering ships the release.",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "launch.txt");
    assert_eq!(body["message"], "Document processed successfully");
    assert!(!body["summary"].as_str().unwrap().is_empty());
    let launch_id = body["documentId"].as_str().unwrap().to_string();

    upload_text(&app, "garden.txt", "Tomatoes need sun. Water them daily.")
        .await;

    let (status, body) =
        send(&app, empty_request("GET", "/api/documents")).await;
    assert_eq!(status, StatusCode::OK);
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["filename"], "garden.txt");
    assert_eq!(documents[1]["id"], launch_id.as_str());
    assert!(documents[1]["uploaded_at"].is_string());
    assert!(documents[1]["content"].as_str().unwrap().starts_with("The launch"));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/ask",
            json!({"question": "When is the launch date?"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "The launch date is March fifth");
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["filename"], "launch.txt");
    assert!(sources[0]["similarity"].as_f64().unwrap() > 0.0);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            json!({"query": "tomatoes sun", "limit": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "tomatoes sun");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["filename"], "garden.txt");
    assert_eq!(results[0]["rank"], 1);

    let (status, body) = send(
        &app,
        empty_request("DELETE", &format!("/api/documents/{launch_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Document deleted successfully"})
    );

    let (_, body) = send(&app, empty_request("GET", "/api/documents")).await;
    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["filename"], "garden.txt");
}

#[tokio::test]
async fn upload_without_document_field_is_rejected() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        multipart_request("attachment", "notes.txt", "text/plain", b"hello"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn upload_of_unsupported_type_is_rejected() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        multipart_request("document", "photo.png", "image/png", b"\x89PNG"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid file type"));
}

#[tokio::test]
async fn upload_without_text_is_rejected() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        multipart_request("document", "blank.md", "text/markdown", b"  \n "),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Could not extract text from document");

    let (_, body) = send(&app, empty_request("GET", "/api/documents")).await;
    assert!(body["documents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let config = ServerConfig {
        max_upload_bytes: 1024,
        ..ServerConfig::default()
    };
    let (_tmp, app) = test_app(&config);

    let big = "word ".repeat(2000);
    let (status, _) = send(
        &app,
        multipart_request("document", "big.txt", "text/plain", big.as_bytes()),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn ask_requires_a_question() {
    let (_tmp, app) = test_app(&ServerConfig::default());
    upload_text(&app, "a.txt", "Some text.").await;

    for payload in [json!({"question": "   "}), json!({})] {
        let (status, body) =
            send(&app, json_request("POST", "/api/ask", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Question is required");
    }
}

#[tokio::test]
async fn ask_without_documents_is_rejected() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/ask", json!({"question": "anything?"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No documents uploaded yet");
}

#[tokio::test]
async fn search_requires_a_query() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/search", json!({"query": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_unknown_document_is_not_found() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    for id in ["not-a-document-id", "6f1c2a4e-9b1d-4c1e-8a5f-0d3b2e7c9a10"] {
        let (status, body) = send(
            &app,
            empty_request("DELETE", &format!("/api/documents/{id}")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }
}

fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });
    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}

#[tokio::test]
async fn word_upload_is_extracted_and_answerable() {
    let (_tmp, app) = test_app(&ServerConfig::default());
    let bytes = docx_bytes(&["The launch moved to April.", "Budget unchanged."]);

    let (status, body) = send(
        &app,
        multipart_request(
            "document",
            "brief.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            &bytes,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    assert_eq!(body["filename"], "brief.docx");
    assert!(!body["summary"].as_str().unwrap().is_empty());

    let (_, body) = send(&app, empty_request("GET", "/api/documents")).await;
    assert_eq!(
        body["documents"][0]["content"],
        "The launch moved to April.\nBudget unchanged."
    );

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/ask",
            json!({"question": "When did the launch move?"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "The launch moved to April");
}

#[tokio::test]
async fn null_question_is_required_error() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/ask", json!({"question": null})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question is required");
}

#[tokio::test]
async fn malformed_json_bodies_get_json_errors() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let not_json = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, body) = send(&app, not_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request");
    assert!(body["details"].is_string());

    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/ask")
        .body(Body::from(r#"{"question":"hi"}"#))
        .unwrap();
    let (status, body) = send(&app, no_content_type).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "Invalid request");

    let (status, body) = send(
        &app,
        json_request("POST", "/api/search", json!({"query": "x", "limit": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid request");
}

#[tokio::test]
async fn upload_without_multipart_body_gets_json_error() {
    let (_tmp, app) = test_app(&ServerConfig::default());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/upload", json!({"document": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid upload");
}

#[tokio::test]
async fn search_min_score_drops_unrelated_documents() {
    let (_tmp, app) = test_app(&ServerConfig::default());
    upload_text(&app, "launch.txt", "The launch date is March fifth.").await;
    upload_text(&app, "garden.txt", "Tomatoes need sun. Water them daily.")
        .await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            json!({"query": "tomatoes sun", "limit": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/search",
            json!({"query": "tomatoes sun", "limit": 10, "minScore": 0.01}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["filename"], "garden.txt");
}
