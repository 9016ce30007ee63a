//! HTTP handler functions for all API endpoints.
//!
//! Each sub-module contains thin async handlers that extract request data,
//! call into the session store, verifier or warehouse, and return JSON
//! responses.

pub mod auth;
pub mod data;
pub mod filters;
pub mod health;
