//! HTTP Module
//!
//! Axum front end over the read-through proxy.
//!
//! # Endpoints
//! - `GET /get/:key` - Retrieve a value by key (read-through)
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
