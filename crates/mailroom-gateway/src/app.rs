use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::limit::RateLimiter;
use crate::resolve::{ChatDirectory, FixedChat, ResolveChat};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
///
/// The resolvers and the Telegram client are immutable after construction;
/// the rate limiter is the only mutable shared state in the process.
pub struct AppState {
    pub telegram: mailroom_telegram::Client,
    pub limiter: RateLimiter,
    /// Resolver behind the bare message route.
    pub default_chat: Arc<dyn ResolveChat>,
    /// Resolver behind the labelled message route.
    pub labelled_chats: Arc<dyn ResolveChat>,
}

impl AppState {
    pub fn new(
        telegram: mailroom_telegram::Client,
        limiter: RateLimiter,
        default_chat_id: &str,
        directory: HashMap<String, String>,
    ) -> Self {
        Self {
            telegram,
            limiter,
            default_chat: Arc::new(FixedChat::new(default_chat_id)),
            labelled_chats: Arc::new(ChatDirectory::new(directory)),
        }
    }
}

/// Assemble the full Axum router.
///
/// Registering only `post` on the message routes makes the method router
/// answer 405 for everything else.
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/message", post(crate::http::message::post_message))
        .route(
            "/message/{label}",
            post(crate::http::message::post_message_labelled),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
