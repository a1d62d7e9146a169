//! Sign-in route handlers (OpenID Connect authorization code flow).
//!
//! - Login: stores CSRF state, nonce and the return path, then redirects to
//!   the identity provider
//! - Callback: validates state, exchanges the code, stores the user
//! - Logout: clears the session and ends the provider session
//! - Me: the signed-in user as JSON

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::{AuthError, generate_random_string, sanitize_return_to};
use crate::state::AppState;

/// Length of the generated `state` and `nonce` values.
const OAUTH_RANDOM_LEN: usize = 32;

/// Query parameters for starting sign-in.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Local path to land on after sign-in.
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// Query parameters from the provider's callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Start sign-in.
///
/// # Route
///
/// `GET /api/auth/login[?returnTo=/path]`
#[instrument(skip(state, session))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    let oauth_state = generate_random_string(OAUTH_RANDOM_LEN);
    let nonce = generate_random_string(OAUTH_RANDOM_LEN);
    let return_to = sanitize_return_to(query.return_to.as_deref());

    session.insert(session_keys::OAUTH_STATE, &oauth_state).await?;
    session.insert(session_keys::OAUTH_NONCE, &nonce).await?;
    session.insert(session_keys::RETURN_TO, &return_to).await?;

    let auth_url =
        state
            .identity()
            .authorization_url(&state.auth_callback_url(), &oauth_state, &nonce);

    Ok(Redirect::to(&auth_url).into_response())
}

/// Handle the provider's callback.
///
/// # Route
///
/// `GET /api/auth/callback`
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Identity provider denied sign-in: {error} - {description}");
        return Ok(Redirect::to("/").into_response());
    }

    let Some(code) = query.code else {
        return Err(AppError::BadRequest("missing authorization code".to_string()));
    };

    // One-time values: take them out whatever the outcome
    let stored_state: Option<String> = session.remove(session_keys::OAUTH_STATE).await?;
    let _: Option<String> = session.remove(session_keys::OAUTH_NONCE).await?;
    let return_to: Option<String> = session.remove(session_keys::RETURN_TO).await?;

    if stored_state.is_none() || stored_state != query.state {
        tracing::warn!("OAuth state mismatch");
        return Err(AuthError::InvalidSessionState.into());
    }

    let user = state
        .identity()
        .sign_in(&code, &state.auth_callback_url())
        .await?;

    set_current_user(&session, &user).await?;
    set_sentry_user(user.email.as_str());
    tracing::info!(email = %user.email, "User signed in");

    Ok(Redirect::to(&sanitize_return_to(return_to.as_deref())).into_response())
}

/// Sign out.
///
/// # Route
///
/// `GET|POST /api/auth/logout`
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    let return_to = format!("{}/", state.config().base_url);
    Ok(Redirect::to(&state.identity().logout_url(&return_to)).into_response())
}

/// The signed-in user's profile.
///
/// # Route
///
/// `GET /api/auth/me` (401 when signed out)
pub async fn me(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
