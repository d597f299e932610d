// HTTP API routes (chat, puzzles, profiles, sessions, etc.)

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::characters::{self, CHARACTERS};
use crate::config::Config;
use crate::error::LlmError;
use crate::gamification;
use crate::llm::{self, TextGenerator};
use crate::metrics;
use crate::profile::UserProfile;
use crate::puzzle::{PuzzleGenerator, PuzzleRequest, TemplateRenderer};
use crate::session::{
    ChatSession, ANONYMOUS_USER, DEFAULT_CATEGORY, DEFAULT_LEVEL, DEFAULT_SESSION_ID,
};
use crate::store::{MemoryStore, Store};

const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const MAX_LEADERBOARD_LIMIT: usize = 100;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleBody {
    pub category: Option<String>,
    pub level: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub user_id: String,
    pub correct: bool,
    pub level: Option<String>,
}

#[derive(Deserialize)]
pub struct SetCharacterRequest {
    pub character: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: Arc<dyn Store<UserProfile>>,
    pub sessions: Arc<dyn Store<ChatSession>>,
    pub generator: PuzzleGenerator,
    pub llm: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Build state backed by in-memory stores.
    pub fn new(config: Config, renderer: TemplateRenderer, llm: Arc<dyn TextGenerator>) -> Self {
        let profiles: Arc<dyn Store<UserProfile>> = Arc::new(MemoryStore::new());
        let sessions: Arc<dyn Store<ChatSession>> = Arc::new(MemoryStore::new());
        let generator = PuzzleGenerator::new(renderer, profiles.clone(), Some(llm.clone()));
        Self {
            config: Arc::new(config),
            profiles,
            sessions,
            generator,
            llm,
        }
    }
}

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": true, "message": msg })))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/llms.txt", get(get_llms_txt))
        // Chat
        .route("/chat", post(chat))
        .route("/test-gemini", get(test_gemini))
        // Puzzles
        .route("/puzzle", post(generate_puzzle))
        .route("/answer", post(submit_answer))
        .route("/categories", get(list_categories))
        .route("/characters", get(list_characters))
        // Profiles
        .route("/profile/{user_id}", get(get_profile))
        .route("/profile/{user_id}/character", put(set_character))
        .route("/profile/{user_id}/reset-history", post(reset_history))
        .route("/leaderboard", get(leaderboard))
        // Sessions
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .with_state(state)
}

// ── Service handlers ──────────────────────────────────────────────────

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "✅ الخادم يعمل",
        "service": "luku-backend",
        "gemini_configured": state.llm.is_configured(),
        "sessions_active": state.sessions.len(),
    }))
}

async fn serve_index(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::read_to_string(&state.config.index_file).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(path = %state.config.index_file.display(), "failed to load index: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error loading HTML file: {e}"),
            )
                .into_response()
        }
    }
}

async fn get_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn get_llms_txt() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        crate::llms_txt::LLMS_TXT,
    )
}

// ── Chat handlers ─────────────────────────────────────────────────────

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "الرسالة مطلوبة").into_response();
    }

    let session_id = non_empty(req.session_id).unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
    let category = non_empty(req.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let level = non_empty(req.level).unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let user_id = non_empty(req.user_id);

    let character_key = user_id
        .as_deref()
        .and_then(|id| state.profiles.get(id))
        .map(|p| p.character)
        .unwrap_or_else(|| characters::DEFAULT_CHARACTER.to_string());
    let prompt = llm::chat_prompt(
        &req.message,
        &category,
        &level,
        characters::resolve(&character_key),
    );

    let reply = match state.llm.generate_text(&prompt).await {
        Ok(text) => text,
        Err(LlmError::MissingApiKey) => {
            "❌ خطأ: مفتاح API غير مضبوط. يرجى إضافة GEMINI_API_KEY في إعدادات الخادم.".to_string()
        }
        Err(_) => "🧩 عذرًا، حدث خطأ في خدمة الألغاز. جرب مرة أخرى لاحقًا!".to_string(),
    };

    let mut started = false;
    let mut session_user = None;
    state.sessions.update(&session_id, &mut |session| {
        if session.first_message {
            started = true;
            if let Some(id) = &user_id {
                session.user_id = id.clone();
            }
        }
        session.record_turn(&req.message, &reply, &category, &level);
        session_user = Some(session.user_id.clone());
    });
    if started {
        tracing::info!(session_id = %session_id, "chat session started");
        if let Some(id) = &user_id {
            state.generator.tracker().start_session(id);
        }
    }
    tracing::debug!(session_id = %session_id, user_id = ?session_user, "chat turn recorded");

    metrics::CHAT_MESSAGES_TOTAL.inc();
    metrics::ACTIVE_SESSIONS.set(state.sessions.len() as i64);

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "reply": reply,
            "sessionId": session_id,
        })),
    )
        .into_response()
}

async fn test_gemini(State(state): State<AppState>) -> impl IntoResponse {
    let configured = state.llm.is_configured();
    if !configured {
        return Json(json!({
            "success": false,
            "message": "❌ GEMINI_API_KEY غير مضبوط",
            "api_key_exists": false,
        }));
    }

    match state.llm.generate_text(llm::PROBE_PROMPT).await {
        Ok(text) => Json(json!({
            "success": true,
            "message": "✅ اتصال Gemini ناجح",
            "response": text,
            "api_key_exists": configured,
        })),
        Err(e) => Json(json!({
            "success": false,
            "message": format!("❌ فشل اتصال Gemini: {e}"),
            "api_key_exists": configured,
        })),
    }
}

// ── Puzzle handlers ───────────────────────────────────────────────────

async fn generate_puzzle(
    State(state): State<AppState>,
    body: Option<Json<PuzzleBody>>,
) -> impl IntoResponse {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let request = PuzzleRequest::new(
        non_empty(body.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        non_empty(body.level).unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
        non_empty(body.user_id).unwrap_or_else(|| ANONYMOUS_USER.to_string()),
    );

    let puzzle = state.generator.generate(&request, Utc::now()).await;

    let mut puzzle_number = None;
    if let Some(session_id) = non_empty(body.session_id) {
        state.sessions.update(&session_id, &mut |session| {
            if session.first_message && session.history.is_empty() {
                session.user_id = request.user_id.clone();
                session.category = request.category.clone();
                session.level = request.level.clone();
            }
            puzzle_number = Some(session.next_puzzle());
        });
        metrics::ACTIVE_SESSIONS.set(state.sessions.len() as i64);
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "puzzle": puzzle.text,
            "tier": puzzle.tier,
            "attempts": puzzle.attempts,
            "forced": puzzle.forced,
            "fingerprint": puzzle.fingerprint,
            "puzzleNumber": puzzle_number,
        })),
    )
}

async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> impl IntoResponse {
    if req.user_id.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "userId is required").into_response();
    }
    let level = non_empty(req.level).unwrap_or_else(|| DEFAULT_LEVEL.to_string());

    let mut outcome = None;
    state.profiles.update(&req.user_id, &mut |profile| {
        outcome = Some(gamification::record_answer(profile, req.correct, &level));
    });
    let Some(outcome) = outcome else {
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            .into_response();
    };

    let titles: Vec<&str> = outcome
        .new_achievements
        .iter()
        .filter_map(|k| gamification::achievement_title(k))
        .collect();
    if !titles.is_empty() {
        tracing::info!(user_id = %req.user_id, "achievements unlocked: {titles:?}");
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "result": outcome,
            "achievementTitles": titles,
        })),
    )
        .into_response()
}

async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!(state.generator.renderer().library().categories()))
}

async fn list_characters() -> impl IntoResponse {
    Json(json!(CHARACTERS))
}

// ── Profile handlers ──────────────────────────────────────────────────

async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let profile = state.profiles.get(&user_id).unwrap_or_default();
    Json(json!(profile.summary(&user_id)))
}

async fn set_character(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetCharacterRequest>,
) -> impl IntoResponse {
    let Some(character) = characters::find(&req.character) else {
        return json_error(StatusCode::BAD_REQUEST, "Unknown character").into_response();
    };
    state.profiles.update(&user_id, &mut |profile| {
        profile.character = character.key.to_string();
    });
    (
        StatusCode::OK,
        Json(json!({ "success": true, "character": character })),
    )
        .into_response()
}

async fn reset_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    state.generator.tracker().reset(&user_id);
    tracing::info!(user_id = %user_id, "puzzle history reset");
    Json(json!({ "success": true }))
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> impl IntoResponse {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);
    Json(json!(gamification::leaderboard(
        state.profiles.entries(),
        limit
    )))
}

// ── Session handlers ──────────────────────────────────────────────────

async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> impl IntoResponse {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let user_id = non_empty(body.user_id);
    let session = ChatSession::new(
        user_id.as_deref().unwrap_or(ANONYMOUS_USER),
        &non_empty(body.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        &non_empty(body.level).unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
    );
    let session_id = uuid::Uuid::new_v4().to_string();
    state.sessions.put(&session_id, session.clone());
    if let Some(id) = &user_id {
        state.generator.tracker().start_session(id);
    }
    metrics::ACTIVE_SESSIONS.set(state.sessions.len() as i64);

    (
        StatusCode::CREATED,
        Json(json!({ "sessionId": session_id, "session": session })),
    )
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.sessions.get(&id) {
        Some(session) => (StatusCode::OK, Json(json!(session))).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Session not found").into_response(),
    }
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state.sessions.delete(&id);
    metrics::ACTIVE_SESSIONS.set(state.sessions.len() as i64);
    if deleted {
        StatusCode::NO_CONTENT.into_response()
    } else {
        json_error(StatusCode::NOT_FOUND, "Session not found").into_response()
    }
}
