use crate::appender::LogAppender;
use crate::normalizer::{ExtractionStrategy, RequestPayload};
use crate::response;
use crate::store::ContentStore;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

pub const LOG_ROUTES: [&str; 3] = ["/", "/log-ip", "/.netlify/functions/log-ip"];

pub struct AppState {
    pub appender: LogAppender<Box<dyn ContentStore>>,
    pub strategy: ExtractionStrategy,
}

pub struct App {
    state: Arc<AppState>,
}

impl App {
    pub fn new(appender: LogAppender<Box<dyn ContentStore>>, strategy: ExtractionStrategy) -> Self {
        Self {
            state: Arc::new(AppState { appender, strategy }),
        }
    }

    pub fn router(self) -> Router {
        let mut router = Router::new().route("/health", get(health_handler));
        for path in LOG_ROUTES {
            router = router.route(path, post(log_ip_handler).options(preflight_handler));
        }
        router.with_state(self.state)
    }
}

pub async fn log_ip_handler(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = RequestPayload {
        body: (!body.is_empty()).then_some(&body[..]),
        headers: &headers,
        peer: peer.map(|ConnectInfo(addr)| addr),
    };

    let text = match state.strategy.normalize(&payload) {
        Ok(text) => text,
        Err(e) => {
            error!("Rejected request: {}", e);
            return response::failure(&e);
        }
    };

    match state.appender.record(&text).await {
        Ok(entry) => {
            info!("Logged {} at {}", entry.text(), entry.timestamp());
            response::success(entry.text())
        }
        Err(e) => {
            error!("Failed to log {}: {}", text, e);
            response::failure(&e)
        }
    }
}

pub async fn preflight_handler() -> Response {
    response::preflight()
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
