pub mod auth_middleware;
pub mod rate_limit;
