mod analysis;
mod api;
mod comments;
mod config;
mod error;
mod ml;
mod session;
mod users;

use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::analyze_comments,
        api::health,
        users::signup,
        users::login,
        users::logout,
        users::profile
    ),
    components(
        schemas(
            api::AnalyzeRequest,
            api::AnalyzeResponse,
            api::HealthResponse,
            analysis::AnalysisData,
            analysis::AnalyzedComment,
            analysis::SentimentBreakdown,
            analysis::MlMetrics,
            analysis::MlInsights,
            analysis::ContentMetadata,
            ml::Keyword,
            ml::Sentiment,
            users::UserRecord,
            users::SignupRequest,
            users::LoginRequest,
            users::UserResponse,
            users::MessageResponse,
            error::ErrorResponse
        )
    ),
    tags(
        (name = "analysis", description = "Mock Comment Analysis API"),
        (name = "user", description = "Session-backed Demo Users")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!("🚀 Starting comment insights API");
    info!("   - Static dir: {}", config.static_dir.display());
    info!("   - Comment sample size: {}", config.comment_sample_size);

    if config.static_dir.join("index.html").exists() {
        info!("✓ Dashboard found");
    } else {
        warn!(
            "✗ {} has no index.html; GET / will return an error page",
            config.static_dir.display()
        );
    }

    let addr = config.bind_addr();
    let state = Arc::new(api::AppState::new(config));

    let app = api::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    info!("📡 Available endpoints:");
    info!("   GET  /                   - Dashboard");
    info!("   POST /api/analyze        - Generate mock comment analysis");
    info!("   POST /api/user/signup    - Store a new user in the session");
    info!("   POST /api/user/login     - Log in as the demo user");
    info!("   POST /api/user/logout    - Clear the session");
    info!("   GET  /api/user/profile   - Current session user");
    info!("   GET  /swagger-ui         - API docs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("🛑 Shutdown signal received");
}
