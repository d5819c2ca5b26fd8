//! HTTP routes for the web form.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::page::INDEX_HTML;
use crate::agent::ConversationMemory;
use crate::core::Turn;
use crate::error::InteractionError;
use crate::interaction::Interaction;
use crate::storage::HistoryOrder;

/// Sessions kept before the least recently used one is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Idle time after which a session's memory is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

struct Session {
    memory: Arc<Mutex<ConversationMemory>>,
    last_used: Instant,
}

/// Shared server state.
pub struct AppState {
    interaction: Interaction,
    sessions: DashMap<String, Session>,
    next_session: AtomicU64,
    max_sessions: usize,
    session_ttl: Duration,
}

impl AppState {
    /// Creates state around an interaction loop with no sessions.
    #[must_use]
    pub fn new(interaction: Interaction) -> Self {
        Self::with_session_limits(interaction, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL)
    }

    /// Creates state with an explicit session cap and idle timeout.
    #[must_use]
    pub fn with_session_limits(
        interaction: Interaction,
        max_sessions: usize,
        session_ttl: Duration,
    ) -> Self {
        Self {
            interaction,
            sessions: DashMap::new(),
            next_session: AtomicU64::new(1),
            max_sessions: max_sessions.max(1),
            session_ttl,
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn new_session_id(&self) -> String {
        let n = self.next_session.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{nanos:x}-{n}")
    }

    /// Memory of a live session, refreshing its idle clock. Expired
    /// sessions are dropped. The map guard is released before returning
    /// so callers may hold the session lock across awaits.
    fn existing_session(&self, id: &str) -> Option<Arc<Mutex<ConversationMemory>>> {
        let ttl = self.session_ttl;
        self.sessions.remove_if(id, |_, s| s.last_used.elapsed() >= ttl);
        let mut session = self.sessions.get_mut(id)?;
        session.last_used = Instant::now();
        Some(session.memory.clone())
    }

    /// Registers a session that has recorded its first exchange, evicting
    /// expired sessions and then the least recently used ones to stay
    /// under the cap.
    fn store_session(&self, id: String, memory: ConversationMemory) {
        let ttl = self.session_ttl;
        self.sessions.retain(|_, s| s.last_used.elapsed() < ttl);
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_used)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    debug!(session = %key, "evicting session");
                    self.sessions.remove(&key);
                }
                None => break,
            }
        }
        self.sessions.entry(id).or_insert_with(|| Session {
            memory: Arc::new(Mutex::new(memory)),
            last_used: Instant::now(),
        });
    }
}

/// Body of `POST /api/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Question text.
    pub question: String,
    /// Session to continue; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply from `POST /api/ask`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    /// Session the question was handled in.
    pub session_id: String,
    /// Answer text, when one was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Logged turn, when the answer was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<Turn>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query string of `GET /api/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of turns; all when absent.
    pub limit: Option<usize>,
}

/// Builds the router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/ask", post(ask))
        .route("/api/history", get(history))
        .route("/health", get(health))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.new_session_id());

    debug!(session = session_id, "ask");

    // A session is only registered once it holds an exchange, so rejected
    // and failed questions leave no state behind.
    let result = match state.existing_session(&session_id) {
        Some(memory) => {
            let mut memory = memory.lock().await;
            state
                .interaction
                .handle_question(&req.question, &mut memory)
                .await
        }
        None => {
            let mut memory = ConversationMemory::new();
            let result = state
                .interaction
                .handle_question(&req.question, &mut memory)
                .await;
            if !memory.is_empty() {
                state.store_session(session_id.clone(), memory);
            }
            result
        }
    };

    let reply = |status: StatusCode, answer, turn, error| {
        (
            status,
            Json(AskResponse {
                session_id: session_id.clone(),
                answer,
                turn,
                error,
            }),
        )
            .into_response()
    };

    match result {
        Ok(Some(turn)) => reply(StatusCode::OK, Some(turn.answer.clone()), Some(turn), None),
        Ok(None) => reply(
            StatusCode::BAD_REQUEST,
            None,
            None,
            Some("question cannot be blank".to_string()),
        ),
        Err(e @ InteractionError::QuestionTooLong { .. }) => {
            reply(StatusCode::PAYLOAD_TOO_LARGE, None, None, Some(e.to_string()))
        }
        Err(e @ InteractionError::Provider { .. }) => {
            warn!(error = %e, "question not answered");
            reply(StatusCode::BAD_GATEWAY, None, None, Some(e.to_string()))
        }
        Err(e @ InteractionError::Storage { .. }) => {
            warn!(error = %e, "answer not logged");
            let answer = e.answer().map(str::to_string);
            reply(StatusCode::OK, answer, None, Some(e.to_string()))
        }
    }
}

async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Turn>>, (StatusCode, String)> {
    let storage = state.interaction.storage();
    let turns = match params.limit {
        Some(limit) => storage.list_recent(limit),
        None => storage.list_all(HistoryOrder::NewestFirst),
    };
    turns.map(Json).map_err(|e| {
        warn!(error = %e, "history query failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.interaction.storage().stats() {
        Ok(stats) => Json(serde_json::json!({
            "status": "ok",
            "turns": stats.turns,
            "sessions": state.session_count(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "error", "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RetentionPolicy;
    use crate::interaction::tests::{ScriptedAgent, memory_storage};
    use crate::storage::{SqliteStorage, Storage};

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> (Arc<AppState>, Arc<ScriptedAgent>, Arc<SqliteStorage>) {
        let agent = Arc::new(ScriptedAgent::new(&[
            ("What is the capital of France?", "Paris."),
            ("And Italy?", "Rome."),
        ]));
        let storage = memory_storage();
        let interaction =
            Interaction::new(agent.clone(), storage.clone(), RetentionPolicy::Answered);
        (Arc::new(AppState::new(interaction)), agent, storage)
    }

    fn ask_request(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let (state, _, _) = state();
        let response = router(state)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("<form id=\"ask\">"));
    }

    #[tokio::test]
    async fn test_ask_answers_and_logs() {
        let (state, _, storage) = state();
        let response = router(state)
            .oneshot(ask_request(
                &serde_json::json!({ "question": "What is the capital of France?" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: AskResponse = body_json(response).await;
        assert_eq!(body.answer.as_deref(), Some("Paris."));
        assert!(!body.session_id.is_empty());
        assert_eq!(body.turn.map(|t| t.id), Some(storage.list_recent(1).unwrap()[0].id));
    }

    #[tokio::test]
    async fn test_ask_blank_is_rejected() {
        let (state, agent, storage) = state();
        let response = router(state)
            .oneshot(ask_request(&serde_json::json!({ "question": "  " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(agent.calls(), 0);
        assert_eq!(storage.stats().unwrap().turns, 0);
    }

    #[tokio::test]
    async fn test_ask_provider_failure() {
        let (state, _, storage) = state();
        let response = router(state)
            .oneshot(ask_request(&serde_json::json!({ "question": "X" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: AskResponse = body_json(response).await;
        assert!(body.error.unwrap().contains("\"X\""));
        assert!(body.answer.is_none());
        assert_eq!(storage.stats().unwrap().turns, 0);
    }

    #[tokio::test]
    async fn test_sessions_keep_separate_memory() {
        let (state, agent, _) = state();
        let app = router(state.clone());

        for session in ["a", "a", "b"] {
            let response = app
                .clone()
                .oneshot(ask_request(&serde_json::json!({
                    "question": "What is the capital of France?",
                    "session_id": session,
                })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        // Memory seen per call: a fresh, a after one turn, b fresh.
        assert_eq!(agent.seen_memory.lock().unwrap().as_slice(), [0, 1, 0]);
        assert_eq!(state.session_count(), 2);
    }

    #[tokio::test]
    async fn test_rejected_questions_leave_no_session() {
        let (state, agent, _) = state();
        let app = router(state.clone());
        let long = "x".repeat(crate::interaction::MAX_QUESTION_LEN + 1);

        for i in 0..50 {
            let question = if i % 2 == 0 { "  ".to_string() } else { long.clone() };
            let body = if i % 3 == 0 {
                serde_json::json!({ "question": question })
            } else {
                serde_json::json!({ "question": question, "session_id": format!("client-{i}") })
            };
            let response = app.clone().oneshot(ask_request(&body)).await.unwrap();
            assert!(response.status().is_client_error());
        }

        // Unanswerable question, so the agent fails.
        let response = app
            .oneshot(ask_request(&serde_json::json!({ "question": "X", "session_id": "s" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        assert_eq!(agent.calls(), 1);
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn test_least_recently_used_session_is_evicted() {
        let agent = Arc::new(ScriptedAgent::new(&[("What is the capital of France?", "Paris.")]));
        let interaction =
            Interaction::new(agent.clone(), memory_storage(), RetentionPolicy::Answered);
        let state = Arc::new(AppState::with_session_limits(
            interaction,
            2,
            Duration::from_secs(3600),
        ));
        let app = router(state.clone());

        for session in ["a", "b", "c", "a"] {
            let response = app
                .clone()
                .oneshot(ask_request(&serde_json::json!({
                    "question": "What is the capital of France?",
                    "session_id": session,
                })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        // "a" was evicted when "c" arrived, so it starts over.
        assert_eq!(agent.seen_memory.lock().unwrap().as_slice(), [0, 0, 0, 0]);
        assert_eq!(state.session_count(), 2);
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let agent = Arc::new(ScriptedAgent::new(&[("What is the capital of France?", "Paris.")]));
        let interaction =
            Interaction::new(agent.clone(), memory_storage(), RetentionPolicy::Answered);
        let state = Arc::new(AppState::with_session_limits(interaction, 8, Duration::ZERO));
        let app = router(state.clone());

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(ask_request(&serde_json::json!({
                    "question": "What is the capital of France?",
                    "session_id": "a",
                })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(agent.seen_memory.lock().unwrap().as_slice(), [0, 0]);
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn test_history_newest_first_with_limit() {
        let (state, _, storage) = state();
        storage.append("first", "1").unwrap();
        storage.append("second", "2").unwrap();
        storage.append("third", "3").unwrap();

        let response = router(state)
            .oneshot(
                Request::get("/api/history?limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let turns: Vec<Turn> = body_json(response).await;
        let questions: Vec<&str> = turns.iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, ["third", "second"]);
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _, _) = state();
        let response = router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["turns"], 0);
    }
}
