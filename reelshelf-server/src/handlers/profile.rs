use axum::{Extension, Json, extract::State, http::StatusCode};
use reelshelf_core::stats::load_profile_stats;
use reelshelf_core::transfer::ImportSummary;
use reelshelf_model::api::{ApiResponse, PasswordConfirmation, ShareCreated};
use reelshelf_model::{ExportDocument, ProfileStats};
use serde_json::Value;

use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::AuthenticatedUser;

pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<ProfileStats>>> {
    let stats =
        load_profile_stats(state.unit_of_work.stats.as_ref(), user.username())
            .await?;
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn generate_share(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<ShareCreated>>> {
    let share_id = state.shares.generate(user.username()).await?;
    Ok(Json(ApiResponse::success(ShareCreated {
        share_id: share_id.into_inner(),
    })))
}

pub async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PasswordConfirmation>,
) -> AppResult<Json<ApiResponse<ExportDocument>>> {
    let document = state
        .transfer
        .export(user.username(), &request.password)
        .await?;
    Ok(Json(ApiResponse::success(document)))
}

/// Accepts any JSON value; the document shape is checked by the import plan
/// so schema problems come back as field-level validation errors.
pub async fn import(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(document): Json<Value>,
) -> AppResult<Json<ApiResponse<ImportSummary>>> {
    let summary = state.transfer.import(user.username(), document).await?;
    Ok(Json(
        ApiResponse::success(summary).with_message("Profile imported"),
    ))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PasswordConfirmation>,
) -> AppResult<StatusCode> {
    state
        .accounts
        .delete_account(user.username(), &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
