// ============================================================================
// HTTP Boundary - webhook intake, order listing, health and metrics
// ============================================================================

mod handlers;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};

use crate::metrics::{metrics_handler, Metrics};

pub use handlers::AppState;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/webhooks/orders", web::post().to(handlers::receive_order))
        .route("/orders/{user_id}", web::get().to(handlers::list_orders))
        .route("/health-check", web::get().to(handlers::health_check))
        .route("/metrics", web::get().to(metrics_handler));
}

/// Run the server until it is stopped by a signal.
pub async fn serve(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let metrics: Arc<Metrics> = state.metrics.clone();
    let state = web::Data::new(state);

    tracing::info!("🌐 Listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::Data::new(metrics.clone()))
            .configure(routes)
    })
    .bind((host, port))?
    .run()
    .await
}
