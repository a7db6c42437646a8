use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};

mod metrics;

use voicescript::document_encoder::encode_document;
use voicescript::session::CommandRecord;
use voicescript::storage::{
    DocumentPatch, DocumentStore, MemStorage, NewDocument, StoredDocument,
};
use voicescript::{
    Opts, OutputType, RecognitionFragment, RecordingSession, ScriptedRecognizer,
    SessionEndPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "voicescript-server")]
#[command(about = "HTTP backend for voice-dictated screenplays")]
struct Params {
    /// Host interface to bind to.
    #[arg(long = "host", default_value = "127.0.0.1")]
    host: String,

    /// TCP port to listen on.
    #[arg(long = "port", default_value_t = 8080)]
    port: u16,

    /// Maximum request body size (bytes).
    #[arg(long = "max-bytes", default_value_t = 4 * 1024 * 1024)]
    max_bytes: usize,
}

#[derive(Clone, Default)]
struct AppState {
    store: Arc<Mutex<MemStorage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptRequest {
    fragments: Vec<RecognitionFragment>,
    #[serde(default)]
    discard_interim: bool,
    #[serde(default)]
    control_commands: bool,
}

#[derive(Debug, Serialize)]
struct TranscriptResponse {
    document: StoredDocument,
    commands: Vec<CommandRecord>,
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(default, alias = "output_type")]
    output: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Document not found".to_owned(),
        }
    }
}

impl From<voicescript::Error> for AppError {
    fn from(err: voicescript::Error) -> Self {
        match err {
            voicescript::Error::Validation(message) => Self::bad_request(message),
            voicescript::Error::NotFound(_) => Self::not_found(),
            other => {
                error!(error = %other, "request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: other.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, AppError>;

#[tokio::main]
async fn main() {
    voicescript::init_logging();

    if let Err(err) = run().await {
        error!(error = ?err, "voicescript-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();
    metrics::init();

    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .context("invalid host/port bind address")?;

    let app = router(AppState::default())
        .layer(DefaultBodyLimit::max(params.max_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        );

    let listener = TcpListener::bind(addr).await.context("bind failed")?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/api/documents", get(list_documents).post(create_document))
        .route(
            "/api/documents/{id}",
            get(get_document)
                .put(update_document)
                .delete(delete_document),
        )
        .route("/api/documents/{id}/transcript", post(apply_transcript))
        .route("/api/documents/{id}/export", get(export_document))
        .route_layer(from_fn(metrics::track_http_metrics))
        .with_state(state)
}

async fn root() -> &'static str {
    "voicescript-server: /api/documents (GET, POST), /api/documents/{id} (GET, PUT, DELETE)"
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_documents(State(state): State<AppState>) -> Json<Vec<StoredDocument>> {
    Json(state.store.lock().await.list())
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StoredDocument>> {
    let id = parse_id(&id)?;
    let doc = state.store.lock().await.get(id).ok_or_else(AppError::not_found)?;
    Ok(Json(doc))
}

async fn create_document(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let new: NewDocument = parse_body(&body)?;
    let doc = state.store.lock().await.create(new)?;
    info!(id = doc.id, "document created");
    Ok((StatusCode::CREATED, Json(doc)).into_response())
}

async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<StoredDocument>> {
    let id = parse_id(&id)?;
    let patch: DocumentPatch = parse_body(&body)?;
    let doc = state.store.lock().await.update(id, patch)?;
    Ok(Json(doc))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if !state.store.lock().await.delete(id) {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Replay a batch of fragments onto a stored document and save the result.
async fn apply_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<TranscriptResponse>> {
    let id = parse_id(&id)?;
    let request: TranscriptRequest = parse_body(&body)?;

    let opts = Opts {
        session_end_policy: if request.discard_interim {
            SessionEndPolicy::Discard
        } else {
            SessionEndPolicy::Finalize
        },
        enable_control_commands: request.control_commands,
        ..Opts::default()
    };

    // Hold the lock for the whole replay so concurrent transcripts for the same document
    // apply one after the other.
    let mut store = state.store.lock().await;
    let stored = store.get(id).ok_or_else(AppError::not_found)?;

    let mut session = RecordingSession::with_document(
        ScriptedRecognizer::new(request.fragments),
        opts,
        stored.content,
    );
    session.start()?;
    let delivered = session.pump();
    let commands = session.history().to_vec();
    let content = session.finish();
    metrics::record_transcript_fragments(delivered);

    let document = store.update(
        id,
        DocumentPatch {
            content: Some(content),
            ..DocumentPatch::default()
        },
    )?;
    info!(id, delivered, elements = document.content.len(), "transcript applied");

    Ok(Json(TranscriptResponse { document, commands }))
}

async fn export_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let id = parse_id(&id)?;
    let output_type = match query.output.as_deref() {
        None => OutputType::Json,
        Some(raw) => raw.parse::<OutputType>()?,
    };

    let doc = state.store.lock().await.get(id).ok_or_else(AppError::not_found)?;
    let mut buf = Vec::new();
    encode_document(&doc.content, &mut buf, output_type)?;

    let content_type = HeaderValue::from_static(output_type.content_type());
    Ok(([(header::CONTENT_TYPE, content_type)], buf).into_response())
}

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AppError::bad_request("Invalid document ID"))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|err| AppError::bad_request(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> anyhow::Result<serde_json::Value> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn create(state: &AppState, body: &'static str) -> StoredDocument {
        match create_document(State(state.clone()), Bytes::from_static(body.as_bytes())).await {
            Ok(response) => {
                assert_eq!(response.status(), StatusCode::CREATED);
                let value = body_json(response).await.expect("json body");
                let id = value["id"].as_u64().expect("id");
                state.store.lock().await.get(id).expect("stored")
            }
            Err(err) => panic!("unexpected error: {}", err.message),
        }
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid document ID");
    }

    #[test]
    fn parse_body_treats_empty_as_empty_object() -> anyhow::Result<()> {
        let patch: DocumentPatch = match parse_body(b"  ") {
            Ok(p) => p,
            Err(err) => anyhow::bail!(err.message),
        };
        assert!(patch.title.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let state = AppState::default();
        let doc = create(&state, "{}").await;
        assert_eq!(doc.id, 1);
        assert_eq!(doc.title, "Untitled Document");
        assert_eq!(doc.format, "script");
    }

    #[tokio::test]
    async fn create_rejects_unknown_format() {
        let state = AppState::default();
        let res = create_document(
            State(state),
            Bytes::from_static(br#"{"format":"novel"}"#),
        )
        .await;
        let err = res.err().expect("expected AppError");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("unknown format"));
    }

    #[tokio::test]
    async fn get_missing_document_is_404() {
        let state = AppState::default();
        let err = get_document(State(state), Path("9".to_owned()))
            .await
            .err()
            .expect("expected AppError");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_then_delete() -> anyhow::Result<()> {
        let state = AppState::default();
        let doc = create(&state, "{}").await;

        let updated = match update_document(
            State(state.clone()),
            Path(doc.id.to_string()),
            Bytes::from_static(br#"{"title":"Pilot"}"#),
        )
        .await
        {
            Ok(Json(d)) => d,
            Err(err) => anyhow::bail!(err.message),
        };
        assert_eq!(updated.title, "Pilot");

        let status = match delete_document(State(state.clone()), Path(doc.id.to_string())).await {
            Ok(s) => s,
            Err(err) => anyhow::bail!(err.message),
        };
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_document(State(state), Path(doc.id.to_string()))
            .await
            .err()
            .expect("second delete should fail");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn transcript_is_folded_into_stored_content() -> anyhow::Result<()> {
        let state = AppState::default();
        let doc = create(
            &state,
            r#"{"content":{"elements":[{"type":"action","content":"Hello"}]}}"#,
        )
        .await;

        let body = Bytes::from_static(
            br#"{"fragments":[
                {"text":"wor","isFinal":false},
                {"text":"world","isFinal":true},
                {"text":"Character: john","isFinal":true},
                {"text":"hi the","isFinal":false}
            ]}"#,
        );
        let res = apply_transcript(State(state.clone()), Path(doc.id.to_string()), body).await;
        let Json(res) = match res {
            Ok(r) => r,
            Err(err) => anyhow::bail!(err.message),
        };

        let value = serde_json::to_value(&res.document.content)?;
        assert_eq!(
            value,
            serde_json::json!({ "elements": [
                { "type": "action", "content": "Hello world" },
                { "type": "character", "content": "JOHN" },
                { "type": "action", "content": "hi the" }
            ]})
        );
        assert_eq!(res.commands.len(), 1);
        assert_eq!(res.commands[0].command, "character");

        let stored = state.store.lock().await.get(doc.id).expect("stored");
        assert_eq!(stored.content, res.document.content);
        Ok(())
    }

    #[tokio::test]
    async fn control_commands_are_opt_in_for_transcripts() -> anyhow::Result<()> {
        let state = AppState::default();
        let doc = create(
            &state,
            r#"{"content":{"elements":[{"type":"action","content":"Hello"}]}}"#,
        )
        .await;

        let dictated = Bytes::from_static(
            br#"{"fragments":[{"text":"delete last line","isFinal":true}]}"#,
        );
        let res = apply_transcript(State(state.clone()), Path(doc.id.to_string()), dictated).await;
        let Json(res) = match res {
            Ok(r) => r,
            Err(err) => anyhow::bail!(err.message),
        };
        assert_eq!(
            serde_json::to_value(&res.document.content)?,
            serde_json::json!({ "elements": [
                { "type": "action", "content": "Hello delete last line" }
            ]})
        );

        let edited = Bytes::from_static(
            br#"{"controlCommands":true,"fragments":[{"text":"delete last line","isFinal":true}]}"#,
        );
        let res = apply_transcript(State(state), Path(doc.id.to_string()), edited).await;
        let Json(res) = match res {
            Ok(r) => r,
            Err(err) => anyhow::bail!(err.message),
        };
        assert!(res.document.content.is_empty());
        assert_eq!(res.commands[0].command, "delete-last-line");
        Ok(())
    }

    #[tokio::test]
    async fn export_as_text() -> anyhow::Result<()> {
        let state = AppState::default();
        let doc = create(
            &state,
            r#"{"content":{"elements":[{"type":"scene-heading","content":"INT. OFFICE"}]}}"#,
        )
        .await;

        let response = match export_document(
            State(state),
            Path(doc.id.to_string()),
            Query(ExportQuery {
                output: Some("text".to_owned()),
            }),
        )
        .await
        {
            Ok(r) => r,
            Err(err) => anyhow::bail!(err.message),
        };
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(std::str::from_utf8(&bytes)?, "INT. OFFICE\n");
        Ok(())
    }

    #[tokio::test]
    async fn export_rejects_unknown_output() {
        let state = AppState::default();
        let doc = create(&state, "{}").await;
        let err = export_document(
            State(state),
            Path(doc.id.to_string()),
            Query(ExportQuery {
                output: Some("pdf".to_owned()),
            }),
        )
        .await
        .err()
        .expect("expected AppError");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn router_builds() {
        let _ = router(AppState::default());
    }
}
