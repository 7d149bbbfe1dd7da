//! Chroma Service: the request/response surface over `chroma_search`.
//!
//! Owns everything the core crates leave out: configuration, request
//! validation and limits, logging, the HTTP server, and the `chroma` CLI.
//!
//! # Key items
//!
//! - [`runner::run_solve`] -- validate, solve, build the response
//! - [`runner::verify_tape`] -- end-to-end tape verification
//! - [`server::build_router`] / [`server::start_server`] -- axum app
//! - [`contract`] -- wire types for `POST /api/solve`
//! - [`fixtures`] -- named example problems

#![forbid(unsafe_code)]

pub mod config;
pub mod contract;
pub mod error;
pub mod fixtures;
pub mod runner;
pub mod server;

pub use config::ServerConfig;
pub use error::ServiceError;
