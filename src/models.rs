pub mod auth;
pub mod registration;
pub mod team;
pub mod tournament;
