pub mod context;
pub mod handlers;
pub mod protocol;

use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::generate::GenerationClient;
use crate::publish::VercelClient;
use crate::session::SessionStore;

pub use context::{AppContext, AppError, SharedDeployments};
pub use protocol::{
    DeployRequest, DownloadRequest, ErrorBody, GenerateAppRequest, GenerateAppResponse,
    GenerateUiRequest, GenerateUiResponse, ModifyUiRequest, ModifyUiResponse, ProjectFile,
    PROTOCOL_VERSION,
};

/// 组装路由
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/generate-ui", post(handlers::generate::generate_ui))
        .route("/generate-app", post(handlers::generate::generate_app))
        .route("/modify-ui", post(handlers::generate::modify_ui))
        .route("/download", post(handlers::download::download))
        .route("/deploy", post(handlers::deploy::deploy))
        .route("/deployments/:id", get(handlers::deploy::get_deployment))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Run the REST server on the specified port
pub async fn run_server(port: u16, config: AppConfig) -> anyhow::Result<()> {
    let config = Arc::new(config);

    let ctx = AppContext {
        generator: Arc::new(GenerationClient::new(config.generation.clone())),
        hosting: Arc::new(VercelClient::new(config.hosting.clone())),
        sessions: Arc::new(SessionStore::new()),
        deployments: Arc::new(RwLock::new(HashMap::new())),
        config,
    };

    let app = build_router(ctx);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        "Listening on http://{} (protocol v{})",
        addr, PROTOCOL_VERSION
    );

    axum::serve(listener, app).await?;

    Ok(())
}
