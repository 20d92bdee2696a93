use crate::config::RouteConfig;
use crate::core::client_ip::resolve_client_ip;
use crate::core::orchestrator::RequestOrchestrator;
use crate::utils::error::CardError;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    orchestrator: RequestOrchestrator,
}

#[derive(Debug, Deserialize)]
pub struct IpQuery {
    ip: Option<String>,
}

/// 兩個不公開的路徑：自動判斷 IP 與 `?ip=` 指定 IP
pub fn router(orchestrator: RequestOrchestrator, routes: &RouteConfig) -> Router {
    Router::new()
        .route(&format!("/{}", routes.auto), get(auto_ip_card))
        .route(&format!("/{}", routes.query), get(query_ip_card))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { orchestrator })
}

pub async fn run_server(
    orchestrator: RequestOrchestrator,
    routes: &RouteConfig,
    bind: &str,
) -> std::io::Result<()> {
    let app = router(orchestrator, routes);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("🚀 Server running at {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn auto_ip_card(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let ip = resolve_client_ip(&headers, &remote.to_string());
    render_card(&state, &ip).await
}

async fn query_ip_card(State(state): State<AppState>, Query(params): Query<IpQuery>) -> Response {
    match params.ip.filter(|ip| !ip.is_empty()) {
        Some(ip) => render_card(&state, &ip).await,
        None => CardError::BadRequest {
            message: "please provide the IP address via ?ip=".to_string(),
        }
        .into_response(),
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn render_card(state: &AppState, ip: &str) -> Response {
    match state.orchestrator.handle(ip).await {
        Ok(report) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, "no-store")],
            report.into_bytes(),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
        } else {
            tracing::warn!("⚠️ Rejected request: {}", self);
        }

        (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received");
}
