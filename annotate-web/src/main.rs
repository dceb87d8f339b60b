//! Axum backend for the annotation UI: PDF upload/extraction, stubbed
//! annotation/entity persistence, and corpus export.

mod config;
mod pdf;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use annotate_core::entity::slug;
use annotate_core::export::{
    export_conll, export_huggingface, export_json, export_spacy, ExportFormat,
};
use annotate_core::{Annotation, Entity, EntityCatalog};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::pdf::PdfError;

/// Shared application state.
///
/// The stores are in-memory stand-ins for a database: annotations and
/// custom entities survive only as long as the process. Losing them is
/// acceptable because the frontend owns the working state and these
/// endpoints are best-effort mirrors.
struct AppState {
    config: Config,
    annotations: Mutex<HashMap<String, Vec<Annotation>>>,
    entities: Mutex<Vec<Entity>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env();
    let port = config.port;
    let state = Arc::new(AppState {
        config,
        annotations: Mutex::new(HashMap::new()),
        entities: Mutex::new(Vec::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/upload-pdf", post(upload_pdf_handler))
        .route(
            "/api/annotations/:document_id",
            get(get_annotations_handler).post(save_annotations_handler),
        )
        .route(
            "/api/entities",
            get(get_entities_handler).post(create_entity_handler),
        )
        .route("/api/export/:format", post(export_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap();
    info!("annotation backend listening on http://localhost:{port}");
    axum::serve(listener, app).await.unwrap();
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Receives a multipart PDF upload, runs the external extractor and
/// returns the extracted text plus metadata.
async fn upload_pdf_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("pdf") {
            continue;
        }
        let content_type = field.content_type().map(|ct| ct.to_string());
        let filename = field
            .file_name()
            .unwrap_or("document.pdf")
            .to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "failed to read upload body");
                return pdf_error_response(PdfError::NoFile);
            }
        };

        if let Err(err) =
            pdf::validate_upload(&state.config, content_type.as_deref(), bytes.len())
        {
            warn!(code = err.code(), "PDF upload rejected");
            return pdf_error_response(err);
        }

        return match pdf::extract_text(&state.config, &bytes, &filename).await {
            Ok(document) => {
                info!(
                    filename = %document.filename,
                    file_size = document.metadata.file_size,
                    "PDF upload successful"
                );
                Json(document).into_response()
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "PDF extraction failed");
                pdf_error_response(err)
            }
        };
    }

    pdf_error_response(PdfError::NoFile)
}

fn pdf_error_response(err: PdfError) -> axum::response::Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(serde_json::json!({
            "error": err.to_string(),
            "code": err.code(),
        })),
    )
        .into_response()
}

async fn get_annotations_handler(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> impl IntoResponse {
    debug!(%document_id, "get annotations requested");
    let stored = state
        .annotations
        .lock()
        .map(|store| store.get(&document_id).cloned().unwrap_or_default())
        .unwrap_or_default();
    Json(serde_json::json!({ "annotations": stored }))
}

#[derive(Deserialize)]
struct SaveAnnotationsRequest {
    annotations: Vec<Annotation>,
}

async fn save_annotations_handler(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
    Json(req): Json<SaveAnnotationsRequest>,
) -> impl IntoResponse {
    debug!(%document_id, count = req.annotations.len(), "save annotations requested");
    if let Ok(mut store) = state.annotations.lock() {
        store.insert(document_id, req.annotations);
    }
    Json(serde_json::json!({ "success": true, "message": "Annotations saved" }))
}

async fn get_entities_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("get entities requested");
    let entities = state
        .entities
        .lock()
        .map(|store| store.clone())
        .unwrap_or_default();
    Json(serde_json::json!({ "entities": entities }))
}

#[derive(Deserialize)]
struct CreateEntityRequest {
    label: String,
    color: String,
    description: String,
}

async fn create_entity_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEntityRequest>,
) -> impl IntoResponse {
    debug!(label = %req.label, "create entity requested");
    let entity = Entity {
        id: slug(&req.label),
        label: req.label.trim().to_uppercase(),
        color: req.color,
        description: req.description,
    };
    let entity_id = entity.id.clone();
    if let Ok(mut store) = state.entities.lock() {
        store.push(entity);
    }
    Json(serde_json::json!({ "success": true, "entityId": entity_id }))
}

#[derive(Deserialize)]
struct ExportRequest {
    text: String,
    annotations: Vec<Annotation>,
    entities: Vec<Entity>,
}

/// Runs the requested core exporter over the posted annotation state.
/// CoNLL is returned as plain text; everything else as JSON.
async fn export_handler(
    Path(format): Path<String>,
    Json(req): Json<ExportRequest>,
) -> impl IntoResponse {
    let format: ExportFormat = match format.parse() {
        Ok(format) => format,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": err })),
            )
                .into_response();
        }
    };

    info!(%format, annotations = req.annotations.len(), "export requested");
    let entities = EntityCatalog::from_entities(req.entities);

    match format {
        ExportFormat::Json => {
            Json(export_json(&req.text, &req.annotations, &entities)).into_response()
        }
        ExportFormat::Spacy => {
            Json(export_spacy(&req.text, &req.annotations, &entities)).into_response()
        }
        ExportFormat::HuggingFace => {
            Json(export_huggingface(&req.text, &req.annotations, &entities)).into_response()
        }
        ExportFormat::Conll => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            export_conll(&req.text, &req.annotations, &entities),
        )
            .into_response(),
    }
}
