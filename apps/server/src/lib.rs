//! Happy Teeth - patient records and treatment sessions for a dental clinic
//!
//! The crate is split the usual way for an HTTP service:
//! - `api`: axum routes, handlers and middleware
//! - `services`: write workflows and read queries
//! - `db`: transactional building blocks (lookups, addresses, patients, sessions)
//! - `models`: request payloads, response views and the response envelope

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod startup;
pub mod state;

pub use error::{Error, Result};
