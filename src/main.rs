use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use credit_risk_api::classifier::ScorecardModel;
use credit_risk_api::config::Config;
use credit_risk_api::docs;
use credit_risk_api::features::FeatureBuilder;
use credit_risk_api::handlers::{self, AppState};
use credit_risk_api::risk::RiskBucketizer;
use credit_risk_api::services::ScoringService;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Model artifact loading (fatal on failure).
/// - Schema defaults and risk thresholds.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_risk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Load the classifier once; there is no degraded mode without it
    let model = ScorecardModel::load(&config.model_path, config.model_sha256.as_deref())?;
    tracing::info!(
        "Classifier ready: {} ({} features)",
        model.model_name,
        model.feature_names.len()
    );

    let defaults = config.schema_defaults()?;
    let thresholds = config.risk_thresholds()?;
    tracing::info!(
        "Risk thresholds: medium >= {}, high >= {}",
        thresholds.medium(),
        thresholds.high()
    );

    let scorer = ScoringService::new(
        Arc::new(model),
        FeatureBuilder::new(defaults),
        RiskBucketizer::new(thresholds),
    );

    // Build application state
    let app_state = Arc::new(AppState { scorer });

    // Configure per-IP rate limiter
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit_period_ms())
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // API Documentation
        .route("/docs", get(docs::serve_swagger_ui))
        .route("/api-docs/openapi.json", get(docs::serve_openapi_spec))
        // Scoring endpoints
        .route("/api/v1/predict", post(handlers::predict))
        .route("/api/v1/schema", get(handlers::feature_schema))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 64KB max payload
                .layer(RequestBodyLimitLayer::new(64 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
