pub mod auth;
pub mod registration;
pub mod tournament_service;
