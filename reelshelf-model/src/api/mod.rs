//! HTTP request/response shapes and route paths.

pub mod routes;
pub mod types;

pub use types::{
    AddBookRequest, AddMovieRequest, ApiResponse, AuthToken, LoginRequest,
    PasswordConfirmation, RegisterRequest, ShareCreated,
};
