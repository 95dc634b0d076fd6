pub mod admin;
pub mod auth;
pub mod teams;
pub mod tournaments;
