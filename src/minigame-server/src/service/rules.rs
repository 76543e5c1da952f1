use axum::{routing::get, Json, Router};
use common::model::game::{rule_table, RoundResult};
use tokio::{net::TcpListener, sync::broadcast};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/rules", get(rules))
        .layer(TraceLayer::new_for_http())
}

pub async fn rest_endpoint_thread(
    listener: TcpListener,
    mut shutdown_receiver: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    info!("Rules endpoint listening on {}", listener.local_addr()?);
    axum::serve(listener, router())
        .with_graceful_shutdown(async move {
            let _ = shutdown_receiver.recv().await;
        })
        .await
}

async fn root() -> &'static str {
    "Rock Paper Scissors"
}

async fn rules() -> Json<Vec<RoundResult>> {
    Json(rule_table())
}
