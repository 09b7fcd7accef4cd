use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::analysis::{generate_ml_analysis, AnalysisData};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::ml::SentimentAnalyzer;
use crate::session::SessionStore;
use crate::users;

pub struct AppState {
    pub config: AppConfig,
    pub analyzer: SentimentAnalyzer,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sessions = SessionStore::new(&config.session_cookie, config.session_ttl);
        Self {
            config,
            analyzer: SentimentAnalyzer::new(),
            sessions,
        }
    }
}

impl FromRef<Arc<AppState>> for SessionStore {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.sessions.clone()
    }
}

/// A missing `platform` means YouTube; an explicit `null` is analysed as an
/// unrecognised platform.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Link to the post being "analysed"; only logged
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_platform")]
    pub platform: Option<String>,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: Option<String>,
}

const UNKNOWN_PLATFORM: &str = "unknown";

fn default_platform() -> Option<String> {
    Some("youtube".to_string())
}

fn default_analysis_type() -> Option<String> {
    Some("advanced_ml".to_string())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: AnalysisData,
    pub analysis_id: String,
    pub model_used: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Mock analysis generated", body = AnalyzeResponse),
        (status = 500, description = "Analysis failed", body = crate::error::ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_comments(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Analysis(e.body_text()))?;

    let platform = req.platform.as_deref().unwrap_or(UNKNOWN_PLATFORM);
    let analysis_type = req.analysis_type.as_deref().unwrap_or("advanced_ml");
    info!(platform, url = %req.url.unwrap_or_default(), "🔍 Analyzing content");

    let data = generate_ml_analysis(
        platform,
        analysis_type,
        &state.analyzer,
        state.config.comment_sample_size,
        &mut rand::thread_rng(),
    )
    .map_err(|e| ApiError::Analysis(e.to_string()))?;

    Ok(Json(AnalyzeResponse {
        success: true,
        data,
        analysis_id: format!("ML_{}", chrono::Local::now().format("%Y%m%d_%H%M%S")),
        model_used: state.analyzer.model_name.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "analysis"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.analyzer.model_name.to_string(),
    })
}

/// Serve the dashboard, or an explanatory error page if it is missing.
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let path = state.config.static_dir.join("index.html");

    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "⚠️ Dashboard not found");
            let page = format!(
                r#"<html>
    <head><title>Error</title></head>
    <body>
        <h1>Dashboard Error</h1>
        <p>Could not load index.html. Please make sure:</p>
        <ol>
            <li>The '{dir}' folder exists next to the server binary (or set STATIC_DIR)</li>
            <li>The '{dir}' folder contains 'index.html'</li>
        </ol>
        <p>Error details: {e}</p>
    </body>
</html>"#,
                dir = state.config.static_dir.display(),
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_comments))
        .route("/api/user/signup", post(users::signup))
        .route("/api/user/login", post(users::login))
        .route("/api/user/logout", post(users::logout))
        .route("/api/user/profile", get(users::profile))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, HeaderMap, Request},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with(config: AppConfig) -> Router {
        router(Arc::new(AppState::new(config)))
    }

    fn app() -> Router {
        app_with(AppConfig {
            static_dir: "does-not-exist".into(),
            ..AppConfig::default()
        })
    }

    fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    /// `name=value` part of the response's Set-Cookie header.
    fn session_cookie(headers: &HeaderMap) -> String {
        let raw = headers
            .get(header::SET_COOKIE)
            .expect("expected a Set-Cookie header")
            .to_str()
            .unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_analyze_returns_payload() {
        let app = app();
        let (status, _, body) = send(
            &app,
            post_json(
                "/api/analyze",
                json!({"url": "https://youtu.be/x", "platform": "youtube"}),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["model_used"], "Advanced Sentiment Analyzer v2.0");
        assert!(body["analysis_id"].as_str().unwrap().starts_with("ML_"));

        let data = &body["data"];
        assert_eq!(data["platform"], "youtube");
        let sum: f64 = ["positive", "neutral", "negative"]
            .iter()
            .map(|k| data["sentiment"][k].as_f64().unwrap())
            .sum();
        assert!((sum - 100.0).abs() <= 0.2);

        for comment in data["comments"].as_array().unwrap() {
            let score = comment["ml_score"].as_f64().unwrap();
            let toxicity = comment["toxicity"].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&score));
            assert!((0.0..=1.0).contains(&toxicity));
        }
    }

    #[tokio::test]
    async fn test_analyze_defaults_to_youtube() {
        let app = app();
        let (status, _, body) = send(&app, post_json("/api/analyze", json!({}), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["platform"], "youtube");
        assert_eq!(body["data"]["totalComments"], 19);
    }

    #[tokio::test]
    async fn test_analyze_accepts_null_url() {
        let app = app();
        let (status, _, body) = send(
            &app,
            post_json("/api/analyze", json!({"url": null, "platform": "youtube"}), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["platform"], "youtube");
    }

    #[tokio::test]
    async fn test_analyze_null_platform_uses_base_pool() {
        let app = app();
        let (status, _, body) = send(
            &app,
            post_json(
                "/api/analyze",
                json!({"url": "https://example.com/p/1", "platform": null, "analysis_type": null}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["platform"], "unknown");
        assert_eq!(body["data"]["totalComments"], 15);
        assert_eq!(body["data"]["content_metadata"]["category"], "Entertainment");
    }

    #[tokio::test]
    async fn test_analyze_malformed_body_is_500() {
        let app = app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _, body) = send(&app, req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Analysis failed. Please try again.");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_empty_sample_is_500() {
        let app = app_with(AppConfig {
            comment_sample_size: 0,
            ..AppConfig::default()
        });
        let (status, _, body) =
            send(&app, post_json("/api/analyze", json!({"platform": "tiktok"}), None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_profile_requires_session() {
        let app = app();
        let (status, _, body) = send(&app, get_with("/api/user/profile", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": "Not logged in"}));
    }

    #[tokio::test]
    async fn test_signup_then_logout_flow() {
        let app = app();
        let (status, headers, body) = send(
            &app,
            post_json(
                "/api/user/signup",
                json!({"name": "Ada", "email": "ada@example.com", "occupation": "Engineer"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["user"]["type"], "basic");
        assert_eq!(body["user"]["userType"], "professional");

        let cookie = session_cookie(&headers);
        let (status, _, body) = send(&app, get_with("/api/user/profile", Some(&cookie))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Ada");
        assert_eq!(body["user"]["occupation"], "Engineer");

        let (status, headers, body) =
            send(&app, post_json("/api/user/logout", json!({}), Some(&cookie))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Logged out successfully");
        assert!(headers
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));

        let (status, _, _) = send(&app, get_with("/api/user/profile", Some(&cookie))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_overwrites_session_user() {
        let app = app();
        let (_, headers, _) = send(
            &app,
            post_json("/api/user/signup", json!({"name": "Ada"}), None),
        )
        .await;
        let cookie = session_cookie(&headers);

        let (status, headers, body) = send(
            &app,
            post_json(
                "/api/user/login",
                json!({"email": "demo@example.com", "password": "anything"}),
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        // existing session keeps its cookie
        assert!(headers.get(header::SET_COOKIE).is_none());

        let (_, _, body) = send(&app, get_with("/api/user/profile", Some(&cookie))).await;
        assert_eq!(body["user"]["name"], "Demo User");
        assert_eq!(body["user"]["email"], "demo@example.com");
        assert_eq!(body["user"]["type"], "premium");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let app = app();
        let (_, headers, _) = send(
            &app,
            post_json("/api/user/login", json!({"email": "a@example.com"}), None),
        )
        .await;
        let cookie = session_cookie(&headers);
        assert!(cookie.starts_with("session="));

        let (status, _, _) = send(
            &app,
            get_with("/api/user/profile", Some("session=someone-else")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_without_session_succeeds() {
        let app = app();
        let (status, headers, body) =
            send(&app, post_json("/api/user/logout", json!({}), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(headers.get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_missing_dashboard_is_500_html() {
        let app = app();
        let response = app.oneshot(get_with("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("Could not load index.html"));
    }

    #[tokio::test]
    async fn test_dashboard_is_served() {
        let dir = std::env::temp_dir().join(format!("comment-insights-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>Dashboard</h1>").unwrap();

        let app = app_with(AppConfig {
            static_dir: dir.clone(),
            ..AppConfig::default()
        });
        let response = app.oneshot(get_with("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, _, body) = send(&app, get_with("/api/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
