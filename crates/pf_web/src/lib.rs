use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/profiles", post(handlers::save_profile))
        .route("/api/profiles/:user_id", get(handlers::get_profile))
        .route("/api/scans", post(handlers::scan))
        .route("/api/users/:user_id/articles", get(handlers::list_articles))
        .route("/api/threads", post(handlers::create_thread))
        .route("/api/users/:user_id/threads", get(handlers::list_threads))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> pf_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use pf_core::{Error, Result};
}
