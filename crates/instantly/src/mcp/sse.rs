//! HTTP + SSE transport
//!
//! `GET /sse` opens a session. Its first event is `endpoint`, naming the
//! `/message?sessionId=...` URL the client posts JSON-RPC requests to; every
//! response is then pushed back on the stream as a `message` event. A POST
//! without a `sessionId` is answered inline instead.

use crate::prelude::{eprintln, *};
use crate::tools::ToolContext;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

/// Responses queued per session before a slow client applies backpressure
const SESSION_BUFFER: usize = 32;

pub struct SseState {
    ctx: ToolContext,
    keep_alive: Duration,
    sessions: Mutex<HashMap<String, mpsc::Sender<String>>>,
}

impl SseState {
    pub fn new(ctx: ToolContext, keep_alive: Duration) -> Self {
        Self {
            ctx,
            keep_alive,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new session and return its id with the receiving half
    fn open_session(&self) -> (String, mpsc::Receiver<String>) {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let (sender, receiver) = mpsc::channel(SESSION_BUFFER);
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(id.clone(), sender);
        }
        (id, receiver)
    }

    fn session(&self, id: &str) -> Option<mpsc::Sender<String>> {
        self.sessions.lock().ok()?.get(id).cloned()
    }

    fn close_session(&self, id: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(id);
        }
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.lock().map(|sessions| sessions.len()).unwrap_or(0)
    }
}

pub async fn run_sse(options: super::cli::SseOptions, ctx: ToolContext) -> Result<()> {
    let verbose = ctx.config.verbose;
    let addr = format!("{}:{}", options.host, options.port);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(SseState::new(
        ctx,
        Duration::from_secs(options.keep_alive_secs),
    ));

    let app_router = Router::new()
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    if verbose {
        eprintln!("Instantly MCP server listening on http://{addr}");
        eprintln!("  stream:   GET  http://{addr}/sse");
        eprintln!("  requests: POST http://{addr}/message?sessionId=<id>");
    }
    log::info!("SSE transport bound to {addr}");

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

async fn sse_handler(
    State(state): State<Arc<SseState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session_id, receiver) = state.open_session();
    log::debug!("SSE session {session_id} opened");

    let keep_alive = KeepAlive::new().interval(state.keep_alive);
    Sse::new(session_stream(state, session_id, receiver)).keep_alive(keep_alive)
}

/// `endpoint` event followed by one `message` event per queued response
///
/// The session is dropped from the registry once the client disconnects and
/// a later delivery finds the channel closed, or when the channel ends.
fn session_stream(
    state: Arc<SseState>,
    session_id: String,
    receiver: mpsc::Receiver<String>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/message?sessionId={session_id}"));

    let messages = stream::unfold(
        (receiver, state, session_id),
        |(mut receiver, state, session_id)| async move {
            match receiver.recv().await {
                Some(message) => {
                    let event = Event::default().event("message").data(message);
                    Some((Ok::<_, Infallible>(event), (receiver, state, session_id)))
                }
                None => {
                    state.close_session(&session_id);
                    None
                }
            }
        },
    );

    stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(messages)
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn message_handler(
    State(state): State<Arc<SseState>>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    let sender = match &query.session_id {
        Some(id) => match state.session(id) {
            Some(sender) => Some(sender),
            None => {
                return (StatusCode::NOT_FOUND, format!("Unknown session: {id}")).into_response()
            }
        },
        None => None,
    };

    let response = super::handle_request(&request.to_string(), &state.ctx).await;

    let (Some(sender), Some(id)) = (sender, query.session_id) else {
        return match response {
            Some(response) => Json(response).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        };
    };

    if let Some(response) = response {
        let payload = match serde_json::to_string(&response) {
            Ok(payload) => payload,
            Err(e) => {
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        };
        if sender.send(payload).await.is_err() {
            state.close_session(&id);
            return (StatusCode::GONE, format!("Session {id} is closed")).into_response();
        }
    }

    StatusCode::ACCEPTED.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstantlyConfig;
    use serde_json::{json, Value};

    fn state() -> Arc<SseState> {
        let ctx = ToolContext::new(InstantlyConfig {
            api_key: Some("test-key".to_string()),
            base_url: "http://127.0.0.1:9/api/v2".to_string(),
            ..Default::default()
        })
        .unwrap();
        Arc::new(SseState::new(ctx, Duration::from_secs(15)))
    }

    async fn post(state: &Arc<SseState>, session_id: Option<&str>, body: Value) -> Response {
        message_handler(
            State(Arc::clone(state)),
            Query(MessageQuery {
                session_id: session_id.map(str::to_string),
            }),
            Json(body),
        )
        .await
    }

    #[tokio::test]
    async fn test_session_response_is_pushed_to_stream() {
        let state = state();
        let (id, mut receiver) = state.open_session();

        let response = post(
            &state,
            Some(&id),
            json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let pushed: Value = serde_json::from_str(&receiver.recv().await.unwrap()).unwrap();
        assert_eq!(pushed["id"], json!(7));
        assert_eq!(pushed["result"], json!({}));
    }

    #[tokio::test]
    async fn test_notification_pushes_nothing() {
        let state = state();
        let (id, mut receiver) = state.open_session();

        let response = post(
            &state,
            Some(&id),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = state();
        let response = post(
            &state,
            Some("missing"),
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_without_session_answers_inline() {
        let state = state();
        let response = post(
            &state,
            None,
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_closed_stream_drops_session() {
        let state = state();
        let (id, receiver) = state.open_session();
        drop(receiver);

        let response = post(
            &state,
            Some(&id),
            json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::GONE);
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn test_stream_starts_with_endpoint_event() {
        let state = state();
        let (id, receiver) = state.open_session();
        let sender = state.session(&id).unwrap();

        let mut events = Box::pin(session_stream(Arc::clone(&state), id.clone(), receiver));
        assert!(events.next().await.is_some());

        sender.send("{}".to_string()).await.unwrap();
        assert!(events.next().await.is_some());

        drop(sender);
        state.close_session(&id);
        assert!(events.next().await.is_none());
        assert_eq!(state.session_count(), 0);
    }
}
