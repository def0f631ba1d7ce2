use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginData {
    message: &'static str,
    token: String,
}

/// Forwards credentials upstream and stores the returned token.
///
/// The token slot is written only after upstream hands back a token, so a
/// failed login leaves any previous token in place.
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginData>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        ApiError::new(
            "bad_request",
            format!("Invalid login body: {}", rejection.body_text()),
        )
    })?;

    let (Some(username), Some(password)) = (non_blank(body.username), non_blank(body.password))
    else {
        return Err(ApiError::new(
            "missing_credentials",
            "Username and password are required.",
        ));
    };

    let token = state
        .upstream
        .login(&username, &password)
        .await
        .map_err(|e| map_upstream_error(&req_id.0, "Login error", &e))?;

    state.tokens.set(token.clone()).await;
    tracing::info!(request_id = %req_id.0, "upstream login succeeded, token stored");

    Ok(Json(LoginData {
        message: "Login successful!",
        token,
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
