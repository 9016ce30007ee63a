//! HTTP gateway between a flow-diagram client and the data warehouse.
//!
//! Exchanges identity-provider bearer tokens for cookie sessions and runs
//! allow-listed, parameterized flow queries on behalf of authenticated
//! sessions. This crate contains the server framework, API schema types,
//! error handling, and route definitions.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod session;
pub mod state;
