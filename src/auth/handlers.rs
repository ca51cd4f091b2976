use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{HomeResponse, LoginForm, SignupForm},
        repo::CredentialError,
        services::{expired_cookie, AuthSession, JwtKeys},
    },
    responses::{found, found_with_cookie, internal, unprocessable},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

pub fn home_routes() -> Router<AppState> {
    Router::new().route("/", get(home))
}

#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>, session: Option<AuthSession>) -> Json<HomeResponse> {
    let Some(session) = session else {
        return Json(HomeResponse {
            username: None,
            message: None,
        });
    };
    let message = state.sessions.take_message(session.id).await;
    Json(HomeResponse {
        username: Some(session.username),
        message,
    })
}

#[instrument(skip(state, form))]
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, (StatusCode, String)> {
    let username = form.username.trim();
    let password = form.password.trim();

    if username.is_empty() || password.is_empty() {
        warn!("blank username or password");
        return Err(unprocessable(
            "Username and password must have a valid character!",
        ));
    }

    match state.credentials.create(username, password).await {
        Ok(()) => {
            info!(%username, "user signed up");
            Ok(found(
                "/",
                format!("New user, {username} has been created, please sign in to continue"),
            ))
        }
        Err(CredentialError::UsernameTaken(_)) => Err(unprocessable(
            "Username exists! please select another username",
        )),
        Err(CredentialError::InvalidUsername(_)) => {
            warn!(%username, "username with path characters");
            Err(unprocessable(
                "Username may not contain '/', '\\' or start with '.'",
            ))
        }
        Err(e) => Err(internal(e)),
    }
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let ok = match state.credentials.verify(&form.username, &form.password).await {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify credentials failed");
            return Err(internal(e));
        }
    };

    if !ok {
        warn!(username = %form.username, "login rejected");
        return Err(unprocessable("Please enter valid username and password!"));
    }

    let session_id = state
        .sessions
        .on_login(&form.username)
        .await
        .map_err(internal)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(session_id, &form.username).map_err(|e| {
        error!(error = %e, "session token signing failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(%session_id, username = %form.username, "user logged in");
    Ok(found_with_cookie(
        "/",
        keys.cookie(&token),
        format!("Logged in as {}", form.username),
    ))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>, session: Option<AuthSession>) -> Response {
    if let Some(session) = session {
        if let Err(e) = state.sessions.on_logout(session.id).await {
            return internal(e).into_response();
        }
        info!(username = %session.username, "user logged out");
    }
    found_with_cookie("/", expired_cookie(), "Logged out")
}
