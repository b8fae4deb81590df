// handlers/mod.rs - Route handlers by security tier
//
// Public (no token) and Protected (x-auth-token verified by
// jwt_auth_middleware). Handlers extract, call one service, respond.

pub mod protected;
pub mod public;
