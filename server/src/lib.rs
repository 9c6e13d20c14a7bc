//! Hiring pipeline backend: REST routes, the GraphQL read model and the
//! persistence services behind both.

pub mod config;
pub mod graphql;
pub mod http;
pub mod routes;
pub mod seed;
pub mod service;

pub use config::AppConfig;
pub use http::{AppState, ServeConfig, build_router, serve};
