use crate::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::models::{AnalysisRecord, BatchRecord, EssayRecord};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BatchAnalyzeRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestIdResponse {
    #[serde(rename = "requestId")]
    pub request_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: &'static str,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(status: StatusCode, error: &'static str) -> ErrorReply {
    (status, Json(ErrorResponse { error }))
}

fn not_found() -> ErrorReply {
    error_reply(StatusCode::NOT_FOUND, "Result not found.")
}

#[utoipa::path(post, path = "/analyze", request_body = AnalyzeRequest, responses((status = OK, body = RequestIdResponse), (status = BAD_REQUEST, body = ErrorResponse), (status = INTERNAL_SERVER_ERROR, body = ErrorResponse)), description = "Evaluates and analyzes an essay, the result is fetched from /result/{request_id}")]
#[axum::debug_handler]
pub async fn analyze(
    state: State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<RequestIdResponse>, ErrorReply> {
    let missing_text = || error_reply(StatusCode::BAD_REQUEST, "Essay text is required");
    let Json(request) = body.map_err(|rejection| {
        warn!("Rejected analyze request: {rejection}");
        missing_text()
    })?;
    if request.text.is_empty() {
        return Err(missing_text());
    }

    let analysis = state
        .analyzer
        .analyze_essay(&request.text)
        .await
        .map_err(|err| {
            error!("Error while processing essay: {err}");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to analyze the essay.",
            )
        })?;

    let request_id = Uuid::new_v4();
    state
        .store
        .put(
            request_id,
            AnalysisRecord::Essay(EssayRecord {
                evaluation: analysis.evaluation,
                semantic_analysis: analysis.semantic_analysis,
                created_at: Utc::now(),
            }),
        )
        .await;
    info!("Stored essay analysis {request_id}");

    Ok(Json(RequestIdResponse { request_id }))
}

#[utoipa::path(post, path = "/ai_analyze", request_body = BatchAnalyzeRequest, responses((status = OK, body = RequestIdResponse), (status = BAD_REQUEST, body = ErrorResponse), (status = INTERNAL_SERVER_ERROR, body = ErrorResponse)), description = "Analyzes text chunks and summarizes them, the result is fetched from /result/ai_analyze/{request_id}")]
#[axum::debug_handler]
pub async fn ai_analyze(
    state: State<AppState>,
    body: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<Json<RequestIdResponse>, ErrorReply> {
    let missing_texts = || {
        error_reply(
            StatusCode::BAD_REQUEST,
            "A non-empty list of texts is required",
        )
    };
    let Json(request) = body.map_err(|rejection| {
        warn!("Rejected ai_analyze request: {rejection}");
        missing_texts()
    })?;
    if request.texts.is_empty() {
        return Err(missing_texts());
    }

    let ai_analysis = state
        .analyzer
        .analyze_batch(&request.texts)
        .await
        .map_err(|err| {
            error!("Error while processing texts: {err}");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to analyze the texts.",
            )
        })?;

    let request_id = Uuid::new_v4();
    state
        .store
        .put(request_id, AnalysisRecord::Batch(BatchRecord { ai_analysis }))
        .await;
    info!(
        "Stored analysis of {} text(s) as {request_id}",
        request.texts.len()
    );

    Ok(Json(RequestIdResponse { request_id }))
}

async fn lookup(state: &AppState, request_id: &str) -> Option<AnalysisRecord> {
    let id = Uuid::parse_str(request_id).ok()?;
    state.store.get(&id).await
}

#[utoipa::path(get, path = "/result/{request_id}", params(("request_id" = String, Path, description = "Id returned by /analyze")), responses((status = OK, body = EssayRecord), (status = NOT_FOUND, body = ErrorResponse)), description = "Gets an essay analysis")]
pub async fn get_result(
    state: State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<EssayRecord>, ErrorReply> {
    match lookup(&state, &request_id).await {
        Some(AnalysisRecord::Essay(record)) => Ok(Json(record)),
        _ => Err(not_found()),
    }
}

#[utoipa::path(get, path = "/result/ai_analyze/{request_id}", params(("request_id" = String, Path, description = "Id returned by /ai_analyze")), responses((status = OK, body = BatchRecord), (status = NOT_FOUND, body = ErrorResponse)), description = "Gets a text chunk analysis")]
pub async fn get_ai_result(
    state: State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<BatchRecord>, ErrorReply> {
    match lookup(&state, &request_id).await {
        Some(AnalysisRecord::Batch(record)) => Ok(Json(record)),
        _ => Err(not_found()),
    }
}
