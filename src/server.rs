//! HTTP API for uploading documents and asking questions about them.

use std::{path::Path as FsPath, sync::Arc};

use axum::{
    Json,
    Router,
    extract::{
        DefaultBodyLimit,
        Multipart,
        Path,
        State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    doc_id::DocumentId,
    document_store::{DocumentStore, StoredDocument},
    error::{self, Error},
    ingestion,
    qa::{self, Answer},
    search::{self, SearchParams},
    similarity::DEFAULT_TOP_K,
};

/// Uploads larger than this are rejected with 413.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "document";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Number of documents consulted per question when the request does
    /// not say.
    pub source_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            source_limit: DEFAULT_TOP_K,
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<DocumentStore>,
    source_limit: usize,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: DocumentStore, config: &ServerConfig) -> Self {
        Self {
            store: Arc::new(store),
            source_limit: config.source_limit,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Map a domain error to a response. `context` names the failed
    /// operation and is only shown for server-side failures.
    fn from_error(context: &str, err: Error) -> Self {
        let details = err.to_string();
        match err {
            Error::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            Error::NoDocuments => {
                Self::new(StatusCode::BAD_REQUEST, "No documents uploaded yet")
            }
            Error::EmptyDocument(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "Could not extract text from document",
            )
            .with_details(details),
            Error::UnsupportedFileType(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "Invalid file type. Only PDF, Word, and text files are allowed.",
            )
            .with_details(details),
            Error::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, details)
            }
            _ => {
                tracing::error!("{context}: {details}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
                    .with_details(details)
            }
        }
    }

    fn from_multipart(err: MultipartError) -> Self {
        Self::new(err.status(), "Invalid upload").with_details(err.body_text())
    }

    fn from_json(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "Invalid request")
            .with_details(rejection.body_text())
    }

    fn from_multipart_rejection(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), "Invalid upload")
            .with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.error,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

/// Run blocking store work off the async runtime.
async fn blocking<T, F>(context: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("{context}: worker task failed: {e}");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, context)
                .with_details(e.to_string())
        })?
        .map_err(|e| ApiError::from_error(context, e))
}

// -- Health --

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
    })
}

// -- Upload --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: String,
    pub filename: String,
    pub summary: String,
    pub message: String,
}

/// Strip any client-side directory components from an upload name.
fn upload_filename(raw: Option<&str>) -> String {
    raw.and_then(|name| FsPath::new(name).file_name())
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string())
}

async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart =
        multipart.map_err(ApiError::from_multipart_rejection)?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = upload_filename(field.file_name());
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
        upload = Some((filename, content_type, bytes));
        break;
    }

    let Some((filename, content_type, bytes)) = upload else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No file uploaded"));
    };

    tracing::info!(filename = %filename, bytes = bytes.len(), "processing upload");

    let store = state.store.clone();
    let doc = blocking("Error processing document", move || {
        ingestion::ingest_bytes(
            &store,
            &filename,
            content_type.as_deref(),
            &bytes,
        )
    })
    .await?;

    Ok(Json(UploadResponse {
        success: true,
        document_id: doc.id,
        filename: doc.filename,
        summary: doc.summary,
        message: "Document processed successfully".to_string(),
    }))
}

// -- Ask --

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

async fn ask_question(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let Json(req) = body.map_err(ApiError::from_json)?;
    let limit = req.limit.unwrap_or(state.source_limit);
    let question = req.question.unwrap_or_default();
    let store = state.store.clone();
    let answer = blocking("Error answering question", move || {
        qa::answer(&store, &question, limit)
    })
    .await?;
    Ok(Json(answer))
}

// -- Search --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_score: f32,
}

#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub score: f32,
    pub id: String,
    pub filename: String,
    pub summary: String,
    pub uploaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultItem>,
}

async fn search_documents(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = body.map_err(ApiError::from_json)?;
    let query = req.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Query is required"));
    }

    let params = SearchParams {
        query: query.clone(),
        count: req.limit.unwrap_or(state.source_limit),
        min_score: req.min_score,
        all: false,
    };
    let store = state.store.clone();
    let hits = blocking("Error searching documents", move || {
        search::execute_search(&params, &store)
    })
    .await?;

    let results = hits
        .into_iter()
        .map(|hit| SearchResultItem {
            rank: hit.rank,
            score: hit.score,
            id: hit.document.id,
            filename: hit.document.filename,
            summary: hit.document.summary,
            uploaded_at: hit.document.uploaded_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(SearchResponse {
        query,
        results,
    }))
}

// -- Documents --

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<StoredDocument>,
}

async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentsResponse>, ApiError> {
    let store = state.store.clone();
    let documents =
        blocking("Error fetching documents", move || store.list()).await?;
    Ok(Json(DocumentsResponse { documents }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let store = state.store.clone();
    blocking("Error deleting document", move || {
        let doc_id = DocumentId::parse(&id)?;
        if !store.remove(&doc_id)? {
            return Err(Error::NotFound {
                kind: "document",
                name: id,
            });
        }
        tracing::info!(id = %doc_id, "deleted document");
        Ok(())
    })
    .await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Document deleted successfully".to_string(),
    }))
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/upload", post(upload_document))
        .route("/api/ask", post(ask_question))
        .route("/api/search", post(search_documents))
        .route("/api/documents", get(list_documents))
        .route("/api/documents/{id}", delete(delete_document))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(store: DocumentStore, config: ServerConfig) -> error::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let app = create_router(AppState::new(store, &config));

    tracing::info!("server listening on http://{addr}");
    tracing::info!("health check: http://{addr}/api/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
