use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::AppState;
use crate::advisories::{self, DEFAULT_LIMIT, DEFAULT_WINDOW_DAYS, MAX_LIMIT};
use crate::content::{self, ContentSection, ModuleSummary};
use crate::error::{ExternalServiceError, InvalidStateError};
use crate::generation::{GenerationRequest, TextGenerator};
use crate::models::*;
use crate::password;
use crate::training::{self, advisor, incident, phishing, quiz, scenario, InputError};

type ApiError = (StatusCode, String);

// ============================================================
// Error Handling
// ============================================================

fn session_not_found() -> ApiError {
    (StatusCode::NOT_FOUND, "Session not found".to_string())
}

fn bad_input(e: InputError) -> ApiError {
    tracing::warn!("Rejected input: {}", e);
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// A blank response is bad input; anything else is a conflict with the
/// slot's current state.
fn invalid_state(e: InvalidStateError) -> ApiError {
    tracing::warn!("Invalid slot transition: {}", e);
    let status = match e {
        InvalidStateError::EmptyResponse { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::CONFLICT,
    };
    (status, e.to_string())
}

fn generator(state: &AppState) -> Result<&dyn TextGenerator, ApiError> {
    state.generator.as_deref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "AI features are unavailable: no generation service is configured".to_string(),
        )
    })
}

fn require_session(state: &AppState, session_id: Uuid) -> Result<(), ApiError> {
    if state.sessions.contains(session_id) {
        Ok(())
    } else {
        Err(session_not_found())
    }
}

fn check_rate(state: &AppState, session_id: Uuid) -> Result<(), ApiError> {
    match &state.limiter {
        Some(limiter) if !limiter.check(session_id) => {
            tracing::warn!(%session_id, "Generation rate limit exceeded");
            Err((
                StatusCode::TOO_MANY_REQUESTS,
                "Too many generation requests; please wait a moment".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

/// Reason shown on a failed slot. Full details stay in the log.
fn failure_reason(e: &ExternalServiceError) -> String {
    tracing::error!("Generation service error: {}", e);
    match e {
        ExternalServiceError::Timeout => {
            "The AI service took too long to respond. Please try again.".to_string()
        }
        ExternalServiceError::RateLimited(_) => {
            "The AI service is busy or its quota is exhausted. Please try again shortly."
                .to_string()
        }
        ExternalServiceError::Malformed(_) => {
            "The AI service returned an empty or unreadable answer. Please try again.".to_string()
        }
        ExternalServiceError::Http(_) | ExternalServiceError::Status { .. } => {
            "The AI service could not be reached. Please try again.".to_string()
        }
    }
}

// ============================================================
// Generation Flow
// ============================================================

/// Run one generation for `key`: begin, call the service with no lock
/// held, then settle with the same ticket. Service failures end up on the
/// slot, not in the HTTP status.
async fn run_generation(
    state: &AppState,
    session_id: Uuid,
    key: SlotKey,
    request: GenerationRequest,
    validate: Option<fn(&str) -> Result<(), String>>,
) -> Result<GeneratedItem, ApiError> {
    require_session(state, session_id)?;
    let generator = generator(state)?;
    check_rate(state, session_id)?;

    let ticket = state
        .sessions
        .with_session(session_id, |s| s.begin_request(key.clone(), request.prompt.clone()))
        .ok_or_else(session_not_found)?;

    let outcome = match generator.generate(&request).await {
        Ok(text) => match validate {
            Some(check) => check(&text).map(|()| text),
            None => Ok(text),
        },
        Err(e) => Err(failure_reason(&e)),
    };

    state
        .sessions
        .with_session(session_id, |s| {
            match outcome {
                Ok(content) => s.complete_request(&key, ticket, content),
                Err(reason) => s.fail_request(&key, ticket, reason),
            };
            s.get(&key)
        })
        .ok_or_else(session_not_found)
}

/// Record the user's response on `key` and evaluate it against the slot's
/// content with the request `build` produces.
async fn run_evaluation<F>(
    state: &AppState,
    session_id: Uuid,
    key: SlotKey,
    response: String,
    build: F,
) -> Result<GeneratedItem, ApiError>
where
    F: FnOnce(&str, &str) -> Result<GenerationRequest, InputError>,
{
    require_session(state, session_id)?;
    let generator = generator(state)?;
    check_rate(state, session_id)?;

    let (ticket, request) = state
        .sessions
        .with_session(session_id, |s| {
            s.record_user_response(&key, response.as_str())
                .map_err(invalid_state)?;
            let content = s.get(&key).content().unwrap_or_default().to_string();
            let request = build(&content, &response).map_err(bad_input)?;
            let ticket = s
                .begin_evaluation(&key, request.prompt.clone())
                .map_err(invalid_state)?;
            Ok::<_, ApiError>((ticket, request))
        })
        .ok_or_else(session_not_found)??;

    let outcome = generator.generate(&request).await;

    state
        .sessions
        .with_session(session_id, |s| {
            match outcome {
                Ok(content) => s.complete_evaluation(&key, ticket, content),
                Err(e) => s.fail_evaluation(&key, ticket, failure_reason(&e)),
            };
            s.get(&key)
        })
        .ok_or_else(session_not_found)
}

// ============================================================
// Health & Catalogue
// ============================================================

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "generation_available": state.generator.is_some(),
        "active_sessions": state.sessions.len(),
    }))
}

pub async fn list_modules() -> Json<Vec<ModuleSummary>> {
    Json(content::catalogue())
}

pub async fn get_content(Path(topic): Path<String>) -> Result<Json<ContentSection>, ApiError> {
    content::section(&topic)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown topic: {}", topic)))
}

// ============================================================
// Sessions & Slots
// ============================================================

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionInfo>) {
    (StatusCode::CREATED, Json(state.sessions.create()))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state
        .sessions
        .with_session(id, |s| SessionSnapshot {
            session: s.info(),
            slots: s.slots(),
        })
        .map(Json)
        .ok_or_else(session_not_found)
}

pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id) {
        if let Some(limiter) = &state.limiter {
            limiter.forget(id);
        }
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found())
    }
}

pub async fn clear_module(
    State(state): State<AppState>,
    Path((id, module)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .with_session(id, |s| s.clear_module(&module))
        .map(|()| StatusCode::NO_CONTENT)
        .ok_or_else(session_not_found)
}

pub async fn get_slot(
    State(state): State<AppState>,
    Path((id, module, slot)): Path<(Uuid, String, String)>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let key = SlotKey::new(module, slot);
    state
        .sessions
        .with_session(id, |s| s.get(&key))
        .map(Json)
        .ok_or_else(session_not_found)
}

pub async fn clear_slot(
    State(state): State<AppState>,
    Path((id, module, slot)): Path<(Uuid, String, String)>,
) -> Result<StatusCode, ApiError> {
    let key = SlotKey::new(module, slot);
    state
        .sessions
        .with_session(id, |s| s.clear(&key))
        .map(|()| StatusCode::NO_CONTENT)
        .ok_or_else(session_not_found)
}

pub async fn record_response(
    State(state): State<AppState>,
    Path((id, module, slot)): Path<(Uuid, String, String)>,
    Json(input): Json<UserResponseInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let key = SlotKey::new(module, slot);
    state
        .sessions
        .with_session(id, |s| {
            s.record_user_response(&key, input.text)
                .map(|()| s.get(&key))
                .map_err(invalid_state)
        })
        .ok_or_else(session_not_found)?
        .map(Json)
}

// ============================================================
// Phishing
// ============================================================

pub async fn generate_phishing_sample(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PhishingSampleInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let request = phishing::sample_request(&input.email_type).map_err(bad_input)?;
    let key = training::phishing_sample_key();
    run_generation(&state, id, key, request, None).await.map(Json)
}

pub async fn evaluate_phishing_explanation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PhishingExplanationInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let key = training::phishing_sample_key();
    run_evaluation(
        &state,
        id,
        key,
        input.explanation,
        phishing::explanation_evaluation_request,
    )
    .await
    .map(Json)
}

pub async fn analyse_email(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<EmailAnalysisInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let request = phishing::analysis_request(&input.email_text).map_err(bad_input)?;
    let key = training::phishing_analysis_key();
    run_generation(&state, id, key, request, None).await.map(Json)
}

// ============================================================
// Scenarios
// ============================================================

pub async fn generate_scenario(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let request = scenario::scenario_request(&input.category).map_err(bad_input)?;
    let key = training::scenario_key();
    run_generation(&state, id, key, request, None).await.map(Json)
}

pub async fn evaluate_scenario_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ScenarioResponseInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let key = training::scenario_key();
    run_evaluation(
        &state,
        id,
        key,
        input.strategy,
        scenario::strategy_evaluation_request,
    )
    .await
    .map(Json)
}

// ============================================================
// Quiz
// ============================================================

pub async fn generate_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    input: Option<Json<QuizInput>>,
) -> Result<Json<QuizView>, ApiError> {
    let input = input.map(|Json(input)| input).unwrap_or_default();
    let request = quiz::quiz_request(input.num_questions).map_err(bad_input)?;
    let key = training::quiz_key();
    run_generation(&state, id, key, request, Some(quiz::validate))
        .await
        .map(|item| Json(quiz::view(item)))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, ApiError> {
    let key = training::quiz_key();
    state
        .sessions
        .with_session(id, |s| quiz::view(s.get(&key)))
        .map(Json)
        .ok_or_else(session_not_found)
}

pub async fn submit_quiz_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<QuizAnswersInput>,
) -> Result<Json<QuizView>, ApiError> {
    let key = training::quiz_key();
    state
        .sessions
        .with_session(id, |s| {
            let item = s.get(&key);
            let questions = item.content().map(quiz::parse_quiz).unwrap_or_default();
            let answers = quiz::sanitize_answers(&questions, &input.answers);
            s.record_user_response(&key, quiz::encode_answers(&answers))
                .map_err(invalid_state)?;
            Ok(quiz::view(s.get(&key)))
        })
        .ok_or_else(session_not_found)?
        .map(Json)
}

// ============================================================
// Incident Response, Compliance & References
// ============================================================

pub async fn generate_incident_guide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let request = incident::guide_request(&input.category).map_err(bad_input)?;
    let key = training::incident_guide_key();
    run_generation(&state, id, key, request, None).await.map(Json)
}

pub async fn ask_compliance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<QuestionInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let request = advisor::compliance_request(&input.query).map_err(bad_input)?;
    let key = training::compliance_answer_key();
    run_generation(&state, id, key, request, None).await.map(Json)
}

pub async fn ask_reference(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<QuestionInput>,
) -> Result<Json<GeneratedItem>, ApiError> {
    let request = advisor::reference_request(&input.query).map_err(bad_input)?;
    let key = training::reference_answer_key();
    run_generation(&state, id, key, request, None).await.map(Json)
}

// ============================================================
// Advisories
// ============================================================

pub async fn list_advisories(
    State(state): State<AppState>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Json<AdvisoryListing>, ApiError> {
    let window_days = advisories::clamp_window(query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS));
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    match state.advisories.recent(window_days, limit).await {
        Ok(advisories) => Ok(Json(AdvisoryListing {
            window_days,
            fetched_at: Utc::now(),
            advisories,
        })),
        Err(e) => {
            tracing::error!("Advisory lookup failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                "Could not fetch vulnerability advisories. Please try again later.".to_string(),
            ))
        }
    }
}

// ============================================================
// Passwords
// ============================================================

pub async fn generate_password(
    State(state): State<AppState>,
    input: Option<Json<PasswordOptions>>,
) -> Json<GeneratedPassword> {
    let options = input.map(|Json(options)| options).unwrap_or_default();
    let generated = password::generate_password(&options);
    let strength = password::check_strength(state.strength.as_ref(), &generated, &[]);
    Json(GeneratedPassword {
        password: generated,
        strength,
    })
}

pub async fn check_password_strength(
    State(state): State<AppState>,
    Json(input): Json<StrengthCheckInput>,
) -> Json<StrengthReport> {
    Json(password::check_strength(
        state.strength.as_ref(),
        &input.candidate,
        &input.user_inputs,
    ))
}
