/// Authentication Routes
///
/// Registration, login, token refresh, password change, profile and logout.
/// Every field of every request body is optional at the JSON layer so that
/// missing fields are reported by the validators, not by the deserializer.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::REFRESH_TOKEN_COOKIE;
use crate::error::AppError;
use crate::routes::cookies::CookiePolicy;
use crate::session::{PasswordChange, SessionManager};
use crate::user::{AuthenticatedUser, UserProfile};
use crate::validators::RegistrationInput;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// `{success, message}` plus a sanitized account
#[derive(Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub message: String,
    pub data: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub data: UserProfile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/user/registerUser
///
/// # Errors
/// - 400: missing field, bad email/phone, weak password, mismatch
/// - 409: email or mobile number already registered
pub async fn register_user(
    body: web::Json<RegisterRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let input = RegistrationInput {
        full_name: body.full_name.as_deref(),
        email: body.email.as_deref(),
        mobile_number: body.mobile_number.as_deref(),
        password: body.password.as_deref(),
        confirm_password: body.confirm_password.as_deref(),
    };

    let profile = sessions.register(&input).await?;

    Ok(HttpResponse::Created().json(UserResponse {
        success: true,
        message: "User created successfully".to_string(),
        data: profile,
    }))
}

/// POST /api/user/login
///
/// Sets `accessToken` and `refreshToken` cookies and also returns both
/// tokens in the body for clients that do not keep cookies.
///
/// # Errors
/// - 400: email or password missing
/// - 404: no account with this email
/// - 401: wrong password
pub async fn login(
    body: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
    cookies: web::Data<CookiePolicy>,
) -> Result<HttpResponse, AppError> {
    let outcome = sessions
        .login(body.email.as_deref(), body.password.as_deref())
        .await?;

    let mut response = HttpResponse::Ok();
    for cookie in cookies.session_cookies(&outcome.tokens) {
        response.cookie(cookie);
    }

    Ok(response.json(LoginResponse {
        success: true,
        message: "User logged in successfully".to_string(),
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
        data: outcome.user,
    }))
}

/// POST /api/user/refresh-token
///
/// Reads the refresh token from the `refreshToken` cookie, falling back to
/// the `refreshToken` body field. The body is optional.
///
/// # Errors
/// - 401: token missing, invalid, or for an unknown account
/// - 403: token already rotated or revoked
pub async fn refresh_token(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    sessions: web::Data<SessionManager>,
    cookies: web::Data<CookiePolicy>,
) -> Result<HttpResponse, AppError> {
    let presented = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token));

    let tokens = sessions.refresh(presented.as_deref()).await?;

    let mut response = HttpResponse::Ok();
    for cookie in cookies.session_cookies(&tokens) {
        response.cookie(cookie);
    }

    Ok(response.json(RefreshResponse {
        success: true,
        message: "Access token refreshed".to_string(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/user/change-password (protected)
///
/// # Errors
/// - 400: missing field, mismatch, or weak new password
/// - 401: old password is wrong
/// - 404: account no longer exists
pub async fn change_password(
    identity: web::ReqData<AuthenticatedUser>,
    body: web::Json<ChangePasswordRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let change = PasswordChange {
        old_password: body.old_password.as_deref(),
        new_password: body.new_password.as_deref(),
        confirm_password: body.confirm_password.as_deref(),
    };

    sessions.change_password(identity.user_id, &change).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Password changed successfully".to_string(),
    }))
}

/// GET /api/user/getUserDetails (protected)
///
/// Served from the identity resolved by the guard; no extra lookup.
pub async fn get_user_details(identity: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse {
        success: true,
        message: "User details fetched successfully".to_string(),
        data: identity.into_inner().profile,
    })
}

/// POST /api/user/logOut (protected)
///
/// # Errors
/// - 404: account no longer exists
pub async fn log_out(
    identity: web::ReqData<AuthenticatedUser>,
    sessions: web::Data<SessionManager>,
    cookies: web::Data<CookiePolicy>,
) -> Result<HttpResponse, AppError> {
    sessions.logout(identity.user_id).await?;

    let mut response = HttpResponse::Ok();
    for cookie in cookies.removal_cookies() {
        response.cookie(cookie);
    }

    Ok(response.json(MessageResponse {
        success: true,
        message: "User logged out successfully".to_string(),
    }))
}
