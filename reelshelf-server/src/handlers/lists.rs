use axum::{Extension, Json, extract::State, http::StatusCode};
use reelshelf_core::CoreError;
use reelshelf_model::api::{AddBookRequest, AddMovieRequest, ApiResponse};
use reelshelf_model::{BookListItem, MovieListItem};
use tracing::debug;

use crate::infra::{app_state::AppState, errors::AppResult};
use crate::middleware::AuthenticatedUser;

fn require_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        Err(CoreError::validation("title: must not be empty"))
    } else {
        Ok(())
    }
}

pub async fn add_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<AddBookRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookListItem>>)> {
    require_title(&request.fields.title)?;

    let item = state
        .unit_of_work
        .lists
        .add_book(user.username(), &request.fields, &request.entry)
        .await?;
    debug!(username = %user.username(), book_id = %item.book.id, "book added");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

pub async fn list_books(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Vec<BookListItem>>>> {
    let items = state.unit_of_work.lists.list_books(user.username()).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn add_movie(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<AddMovieRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MovieListItem>>)> {
    require_title(&request.fields.title)?;

    let item = state
        .unit_of_work
        .lists
        .add_movie(user.username(), &request.fields, &request.entry)
        .await?;
    debug!(username = %user.username(), movie_id = %item.movie.id, "movie added");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

pub async fn list_movies(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Vec<MovieListItem>>>> {
    let items = state.unit_of_work.lists.list_movies(user.username()).await?;
    Ok(Json(ApiResponse::success(items)))
}
