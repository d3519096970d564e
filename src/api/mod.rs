//! REST API Module
//!
//! Public surface for front-ends: read-only distribution status, claimed
//! lookups, proof pre-verification, claim submission, and the operator
//! endpoints (open, withdraw, pause, ownership transfer).

pub mod routes;
pub mod server;

pub use server::{build_router, serve, AppState, SharedAppState};
