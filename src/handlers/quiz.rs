// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::session::{
        AnswerRequest, NavigateRequest, ResultResponse, SignalRequest, StartSessionRequest,
    },
    quiz::{
        Assignment, AssignmentConfig, LiveSession, QuizSession, SessionBuilder, SessionEvent,
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Fetches the bank for an assignment and builds a fresh attempt.
async fn build_session(
    state: &AppState,
    owner_id: &str,
    assignment_id: &str,
    config: AssignmentConfig,
    previous: Option<&QuizSession>,
) -> Result<QuizSession, AppError> {
    let questions = state.bank.questions_for(assignment_id).await?;
    let assignment = Assignment {
        id: assignment_id.to_string(),
        questions,
        config,
    };

    let mut builder = SessionBuilder::new(&assignment);
    if let Some(previous) = previous {
        builder = builder.follow_up(previous);
    }

    let mut rng = StdRng::from_entropy();
    Ok(builder.build(owner_id, state.clock.now(), &mut rng)?)
}

/// Registers a new session and starts its clock.
fn go_live(state: &AppState, session: QuizSession) -> Arc<LiveSession> {
    let live = LiveSession::new(session, state.clock.clone(), state.hooks.clone());
    state.sessions.insert(live.clone(), state.clock.now());
    live.start_ticker(state.config.quiz.tick_interval);
    live
}

/// Finds a session owned by `owner_id`, reloading it from the checkpoint store when it is
/// no longer in memory (e.g. after a restart of the service).
async fn find_session(state: &AppState, id: Uuid, owner_id: &str) -> Result<Arc<LiveSession>, AppError> {
    // Someone else's session looks exactly like a missing one.
    let not_found = || AppError::NotFound("Session not found".to_string());

    if let Some(live) = state.sessions.get(id) {
        if live.owner_id() != owner_id {
            return Err(not_found());
        }
        return Ok(live);
    }

    let snapshot = state
        .checkpoint
        .load_snapshot(id)
        .await?
        .filter(|snapshot| snapshot.owner_id == owner_id)
        .ok_or_else(not_found)?;

    tracing::info!(session_id = %id, "Resuming quiz session from checkpoint");
    let candidate = LiveSession::new(snapshot, state.clock.clone(), state.hooks.clone());
    let live = state.sessions.insert_if_absent(candidate.clone());
    if Arc::ptr_eq(&live, &candidate) {
        live.start_ticker(state.config.quiz.tick_interval);
    }
    Ok(live)
}

fn result_response(session: &QuizSession) -> Result<ResultResponse, AppError> {
    match (&session.result, session.termination) {
        (Some(result), Some(reason)) => Ok(ResultResponse {
            status: session.status,
            reason,
            message: reason.message(),
            result: result.clone(),
        }),
        _ => Err(AppError::NotFound("Quiz is still in progress".to_string())),
    }
}

/// Starts a timed attempt at an assignment.
///
/// * Draws and shuffles questions from the bank.
/// * Returns 404 when the bank is empty.
pub async fn start_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let config = req.assignment_config(&state.config.quiz);
    let session = build_session(&state, &claims.sub, &req.assignment_id, config, None).await?;
    let live = go_live(&state, session);

    Ok((StatusCode::CREATED, Json(live.view())))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;
    if live.is_discarded() {
        return Err(AppError::Gone("Session has been discarded".to_string()));
    }
    Ok(Json(live.view()))
}

/// Records an answer. Unknown question or option ids leave the session unchanged.
pub async fn record_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let live = find_session(&state, id, &claims.sub).await?;
    live.dispatch(SessionEvent::Answer {
        question_id: req.question_id,
        option_id: req.option_id,
    })?;

    Ok(Json(live.view()))
}

pub async fn navigate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<NavigateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;
    live.dispatch(SessionEvent::Navigate { index: req.index })?;

    Ok(Json(live.view()))
}

/// Reports a focus loss or blocked gesture from the browser.
pub async fn report_signal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SignalRequest>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;
    live.dispatch(SessionEvent::Signal(req.signal()))?;

    Ok(Json(live.view()))
}

/// Submits the attempt. Repeated submissions return the same result.
pub async fn submit_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;
    live.dispatch(SessionEvent::Submit)?;

    Ok(Json(result_response(&live.snapshot())?))
}

pub async fn get_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;
    // Lets a passed deadline show up even between ticks.
    live.dispatch(SessionEvent::Tick)?;

    Ok(Json(result_response(&live.snapshot())?))
}

/// Starts a brand-new attempt of the same assignment with a fresh shuffle.
///
/// A previous attempt that is still running is abandoned without a result.
pub async fn restart_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;

    let previous = live.snapshot();
    let session = build_session(
        &state,
        &claims.sub,
        &previous.assignment_id,
        previous.config.clone(),
        Some(&previous),
    )
    .await?;

    // Only abandon the old attempt once its replacement exists.
    live.discard();
    let next = go_live(&state, session);

    Ok((StatusCode::CREATED, Json(next.view())))
}

/// Abandons an attempt: the timer stops and no result is produced.
pub async fn abandon_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let live = find_session(&state, id, &claims.sub).await?;
    live.discard();

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the caller's graded attempts, newest first.
pub async fn list_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = state.checkpoint.attempts_for_owner(&claims.sub).await?;
    Ok(Json(attempts))
}
