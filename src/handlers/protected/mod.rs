// handlers/protected/mod.rs - Protected handlers
//
// Every route here sits behind jwt_auth_middleware, which inserts the
// verified AuthUser into request extensions before the handler runs.

pub mod auth;
pub mod posts;
pub mod profile;
