//! HTTP request handlers
//!
//! Implements the REST endpoints for follow-up sequences and the trainer.
//! Request bodies carry enum fields as strings and ids as UUID strings;
//! parsing failures map to 400 before any domain logic runs.

use crate::api::server::AppContext;
use crate::api::{error_response, ErrorResponse};
use crate::error::Error;
use crate::trainer::session::ResponseScores;
use crate::{followup, trainer};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_common::db::models::{
    FollowUpSequence, LetterGrade, QuestionType, SequenceStatus, SessionMode, TrainingSession,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFollowupRequest {
    call_analysis_id: Uuid,
    contact_name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteStepRequest {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordAnswerRequest {
    trainee_id: String,
    question_type: String,
    level: i64,
    grade: Option<String>,
    type_correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct DueReviewsQuery {
    trainee_id: String,
    level: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    trainee_id: String,
    mode: String,
    level: i64,
    vertical: Option<String>,
    timer_seconds: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionResponseRequest {
    type_accuracy: f64,
    quality: f64,
    naturalness: f64,
    type_correct: bool,
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn parse_trainee_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.trim().is_empty() {
        return Err(error_response(Error::Validation(
            "trainee_id is required".to_string(),
        )));
    }
    Uuid::parse_str(raw).map_err(|_| {
        error_response(Error::Validation(format!("invalid trainee_id: {}", raw)))
    })
}

fn parse_question_type(raw: &str) -> Result<QuestionType, ApiError> {
    QuestionType::from_str(raw).ok_or_else(|| {
        error_response(Error::Validation(format!(
            "question_type must be one of S, P, I, N, got {}",
            raw
        )))
    })
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "cadence_ops".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Follow-up Endpoints
// ============================================================================

/// POST /followups - Create a follow-up sequence for a warm call
pub async fn create_followup(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateFollowupRequest>,
) -> Result<(StatusCode, Json<FollowUpSequence>), ApiError> {
    match followup::create_sequence(
        &ctx.db,
        ctx.clock.as_ref(),
        req.call_analysis_id,
        req.contact_name,
    )
    .await
    {
        Ok(seq) => Ok((StatusCode::CREATED, Json(seq))),
        Err(e) => {
            error!("Failed to create follow-up sequence: {}", e);
            Err(error_response(e))
        }
    }
}

/// GET /followups - List all sequences in display order
pub async fn list_followups(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<FollowUpSequence>>, ApiError> {
    match followup::list_sequences(&ctx.db, ctx.clock.as_ref()).await {
        Ok(seqs) => {
            info!("Listed {} follow-up sequences", seqs.len());
            Ok(Json(seqs))
        }
        Err(e) => {
            error!("Failed to list follow-up sequences: {}", e);
            Err(error_response(e))
        }
    }
}

/// POST /followups/:id/steps/:step - Mark a step done
pub async fn complete_step(
    State(ctx): State<AppContext>,
    Path((id, step)): Path<(Uuid, u8)>,
    body: Option<Json<CompleteStepRequest>>,
) -> Result<Json<FollowUpSequence>, ApiError> {
    let content = body.and_then(|Json(req)| req.content);
    match followup::advance_step(&ctx.db, ctx.clock.as_ref(), id, step, content).await {
        Ok(seq) => Ok(Json(seq)),
        Err(e) => {
            error!("Failed to complete step {} on sequence {}: {}", step, id, e);
            Err(error_response(e))
        }
    }
}

/// DELETE /followups/:id/steps/:step - Undo a step
pub async fn undo_step(
    State(ctx): State<AppContext>,
    Path((id, step)): Path<(Uuid, u8)>,
) -> Result<Json<FollowUpSequence>, ApiError> {
    match followup::undo_step(&ctx.db, ctx.clock.as_ref(), id, step).await {
        Ok(seq) => Ok(Json(seq)),
        Err(e) => {
            error!("Failed to undo step {} on sequence {}: {}", step, id, e);
            Err(error_response(e))
        }
    }
}

/// POST /followups/:id/status - Set the sequence status
pub async fn set_status(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<FollowUpSequence>, ApiError> {
    let status = SequenceStatus::from_str(&req.status).ok_or_else(|| {
        error_response(Error::Validation(format!(
            "status must be one of cooling, active, won, got {}",
            req.status
        )))
    })?;

    match followup::set_status(&ctx.db, ctx.clock.as_ref(), id, status).await {
        Ok(seq) => Ok(Json(seq)),
        Err(e) => {
            error!("Failed to set status on sequence {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

/// DELETE /followups/:id - Delete a sequence (abandoned lead)
pub async fn delete_followup(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match followup::delete_sequence(&ctx.db, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete sequence {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

// ============================================================================
// Trainer Endpoints
// ============================================================================

/// POST /trainer/answers - Fold a graded answer into mastery state
pub async fn record_answer(
    State(ctx): State<AppContext>,
    Json(req): Json<RecordAnswerRequest>,
) -> Result<Json<cadence_common::db::models::ReviewRecord>, ApiError> {
    let trainee = parse_trainee_id(&req.trainee_id)?;
    let question_type = parse_question_type(&req.question_type)?;
    let grade = match &req.grade {
        Some(raw) => Some(LetterGrade::from_str(raw).ok_or_else(|| {
            error_response(Error::Validation(format!("invalid grade: {}", raw)))
        })?),
        None => None,
    };

    match trainer::record_answer(
        &ctx.db,
        ctx.clock.as_ref(),
        trainee,
        question_type,
        req.level,
        grade,
        req.type_correct,
    )
    .await
    {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            error!("Failed to record answer for trainee {}: {}", trainee, e);
            Err(error_response(e))
        }
    }
}

/// GET /trainer/reviews/due - Ranked list of due review items
pub async fn due_reviews(
    State(ctx): State<AppContext>,
    Query(query): Query<DueReviewsQuery>,
) -> Result<Json<trainer::DueReviews>, ApiError> {
    let trainee = parse_trainee_id(&query.trainee_id)?;

    match trainer::due_reviews(&ctx.db, ctx.clock.as_ref(), trainee, query.level).await {
        Ok(due) => Ok(Json(due)),
        Err(e) => {
            error!("Failed to rank reviews for trainee {}: {}", trainee, e);
            Err(error_response(e))
        }
    }
}

/// POST /trainer/sessions - Start a practice session
pub async fn start_session(
    State(ctx): State<AppContext>,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<TrainingSession>), ApiError> {
    let trainee = parse_trainee_id(&req.trainee_id)?;
    let mode = SessionMode::from_str(&req.mode).ok_or_else(|| {
        error_response(Error::Validation(format!(
            "mode must be one of learn, practice, live_sim, got {}",
            req.mode
        )))
    })?;

    match trainer::start_session(
        &ctx.db,
        ctx.clock.as_ref(),
        trainee,
        mode,
        req.level,
        req.vertical,
        req.timer_seconds,
    )
    .await
    {
        Ok(session) => Ok((StatusCode::CREATED, Json(session))),
        Err(e) => {
            error!("Failed to start session for trainee {}: {}", trainee, e);
            Err(error_response(e))
        }
    }
}

/// POST /trainer/sessions/:id/responses - Record one response
pub async fn record_response(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SessionResponseRequest>,
) -> Result<Json<TrainingSession>, ApiError> {
    let scores = ResponseScores {
        type_accuracy: req.type_accuracy,
        quality: req.quality,
        naturalness: req.naturalness,
        type_correct: req.type_correct,
    };

    match trainer::record_session_response(&ctx.db, id, scores).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            error!("Failed to record response in session {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

/// POST /trainer/sessions/:id/complete - Finalize a session
pub async fn complete_session(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainingSession>, ApiError> {
    match trainer::complete_session(&ctx.db, ctx.clock.as_ref(), id).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            error!("Failed to complete session {}: {}", id, e);
            Err(error_response(e))
        }
    }
}

/// GET /trainer/sessions/:id - Get a session
pub async fn get_session(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<TrainingSession>, ApiError> {
    match trainer::get_session(&ctx.db, id).await {
        Ok(session) => Ok(Json(session)),
        Err(e) => {
            error!("Failed to get session {}: {}", id, e);
            Err(error_response(e))
        }
    }
}
