//! HTTP surface expected by the AgentCore runtime.
//!
//! ## Endpoints
//!
//! - `POST /invocations` - Run the agent on a `{"prompt": ...}` payload
//! - `GET /ping` - Health check

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
