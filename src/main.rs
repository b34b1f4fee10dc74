use axum::routing::{get, post};
use axum::Router;
use camet_analytics_api::config::{DashboardConfig, Settings};
use camet_analytics_api::handlers;
use camet_analytics_api::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| {
            EnvFilter::new("camet_analytics_api=info,tower_http=info")
        }))
        .init();

    let dashboard_config = DashboardConfig::load("dashboard.toml");
    let bind_addr = settings.bind_addr;

    let state = AppState::new(settings, dashboard_config).await?;

    let app = Router::new()
        // Dashboard pipeline
        .route(
            "/dashboard/data",
            get(handlers::dashboard::dashboard_data_query).post(handlers::dashboard::dashboard_data),
        )
        .route("/dashboard/preview", post(handlers::dashboard::dashboard_preview))
        // Layout
        .route("/layout/config", get(handlers::layout::get_layout_config))
        // Filters
        .route("/filters", get(handlers::filters::list_filters))
        .route("/filters/{class_name}/options", get(handlers::filters::filter_options))
        // Detection diagnostics
        .route("/detections/{line_id}", get(handlers::detections::get_line_detections))
        .route("/detections/query", post(handlers::detections::query_detections))
        .route("/detections/count", post(handlers::detections::count_detections))
        .route("/detections/summary", post(handlers::detections::summarize_detections))
        .route("/detections/export", post(handlers::detections::export_detections))
        // Admin / cache / partitions
        .route("/system/cache/load/{db_name}", post(handlers::system::load_cache))
        .route("/system/cache/refresh", post(handlers::system::refresh_cache))
        .route("/system/cache/info", get(handlers::system::cache_info))
        .route("/system/health", get(handlers::system::health))
        .route("/system/partitions/{table}/ensure", post(handlers::system::ensure_partitions))
        .route("/system/partitions/{table}/drop-old", post(handlers::system::drop_old_partitions))
        .route("/system/partitions/{table}", get(handlers::system::list_partitions))
        // Liveness
        .route("/healthz", get(handlers::health::healthz))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("camet-analytics-api listening on {bind_addr}");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
