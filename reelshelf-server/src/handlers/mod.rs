pub mod auth;
pub mod health;
pub mod lists;
pub mod profile;
pub mod share;
