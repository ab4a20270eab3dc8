//! Admin API Module
//!
//! HTTP handlers and routing for inspecting and managing the named caches.
//!
//! # Endpoints
//! - `GET /health` - Health check with initialization status
//! - `GET /stats` - Statistics of every domain
//! - `GET /stats/:domain` - Statistics of one domain
//! - `POST /cache/:domain/invalidate` - Drop a key or every entry with a tag
//! - `POST /cache/:domain/cleanup` - Purge expired entries now
//! - `DELETE /cache/:domain` - Clear a domain
//! - `POST /warmup` - Run (or join) startup warmup
//! - `POST /warmup/users/:user_id` - Prime one user's data
//! - `DELETE /warmup/users/:user_id` - Drop one user's primed data

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
