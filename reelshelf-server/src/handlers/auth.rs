use axum::{Json, extract::State, http::StatusCode};
use reelshelf_core::auth::LoginOutcome;
use reelshelf_model::api::{ApiResponse, AuthToken, LoginRequest, RegisterRequest};

use crate::infra::{app_state::AppState, errors::AppResult};

fn auth_token(outcome: LoginOutcome) -> AuthToken {
    AuthToken {
        username: outcome.username,
        expires_at: outcome.token.expires_at(),
        access_token: outcome.token.into_inner(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthToken>>)> {
    let outcome = state
        .accounts
        .register(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(auth_token(outcome))),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthToken>>> {
    let outcome = state
        .accounts
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(ApiResponse::success(auth_token(outcome))))
}
