use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Public: anyone holding the id can fetch the image.
pub async fn share_image(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let png = state.shares.fetch_image(&share_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        png,
    ))
}
