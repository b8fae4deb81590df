// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod auth;
pub mod profile;
pub mod users;
