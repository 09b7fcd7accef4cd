//! Demo user endpoints backed by the session store.
//!
//! Nothing is persisted and passwords are never checked; signup and login just
//! place a user record in the caller's session.

use axum::{
    extract::rejection::JsonRejection,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "userType")]
    pub user_type: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    /// Account tier: `basic` after signup, `premium` after login
    #[serde(rename = "type")]
    pub account_type: String,
}

impl UserRecord {
    /// The canned profile every login receives.
    pub fn demo(email: Option<String>) -> Self {
        Self {
            name: Some("Demo User".to_string()),
            email,
            user_type: Some("professional".to_string()),
            occupation: Some("Digital Marketer".to_string()),
            company: Some("Social Media Agency".to_string()),
            bio: Some("Passionate about data-driven social media strategies".to_string()),
            account_type: "premium".to_string(),
        }
    }
}

/// Absent fields take their defaults; an explicit `null` is kept as null.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "userType", default = "default_user_type")]
    pub user_type: Option<String>,
    #[serde(default = "empty")]
    pub occupation: Option<String>,
    #[serde(default = "empty")]
    pub company: Option<String>,
    #[serde(default = "empty")]
    pub bio: Option<String>,
}

fn default_user_type() -> Option<String> {
    Some("professional".to_string())
}

fn empty() -> Option<String> {
    Some(String::new())
}

impl From<SignupRequest> for UserRecord {
    fn from(req: SignupRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            user_type: req.user_type,
            occupation: req.occupation,
            company: req.company,
            bio: req.bio,
            account_type: "basic".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    /// Accepted for client compatibility; never verified.
    #[allow(dead_code)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/user/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User stored in session", body = UserResponse),
        (status = 500, description = "Malformed request", body = crate::error::ErrorResponse)
    ),
    tag = "user"
)]
pub async fn signup(
    mut session: Session,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Internal(e.body_text()))?;
    let user = UserRecord::from(req);

    session.set_user(user.clone())?;
    info!(session = %session.id(), new_session = session.is_new(), email = ?user.email, "👤 User signed up");

    Ok((
        AppendHeaders(session.cookie_header()),
        Json(UserResponse {
            success: true,
            message: Some("User created successfully".to_string()),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Demo user stored in session", body = UserResponse),
        (status = 500, description = "Malformed request", body = crate::error::ErrorResponse)
    ),
    tag = "user"
)]
pub async fn login(
    mut session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Internal(e.body_text()))?;
    let user = UserRecord::demo(req.email);

    session.set_user(user.clone())?;
    info!(session = %session.id(), new_session = session.is_new(), email = ?user.email, "🔑 User logged in");

    Ok((
        AppendHeaders(session.cookie_header()),
        Json(UserResponse {
            success: true,
            message: Some("Login successful".to_string()),
            user,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/user/logout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse)
    ),
    tag = "user"
)]
pub async fn logout(mut session: Session) -> Result<impl IntoResponse, ApiError> {
    session.clear()?;
    info!(session = %session.id(), "👋 User logged out");

    Ok((
        AppendHeaders(session.cookie_header()),
        Json(MessageResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Current session user", body = UserResponse),
        (status = 401, description = "No user in session", body = crate::error::ErrorResponse)
    ),
    tag = "user"
)]
pub async fn profile(session: Session) -> Result<Json<UserResponse>, ApiError> {
    let user = session.user()?.ok_or(ApiError::NotLoggedIn)?;

    Ok(Json(UserResponse {
        success: true,
        message: None,
        user,
    }))
}
