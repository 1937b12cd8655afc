#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]

//! domoctl library — client plumbing for the smart-home backend.
//!
//! The key building blocks:
//! - `config` — configuration loading and the state directory
//! - `tokens` — durable access/refresh token storage
//! - `session` — observable session state with persistence
//! - `gateway` — authenticated requests with one-shot 401 recovery
//! - `client` — the endpoint facade, with per-tag methods under `api/`
//! - `models` — wire types for the REST API
//! - `commands` — the CLI command handlers
//! - `error` — the unified error taxonomy

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod session;
mod storage;
pub mod tokens;

// Re-export key types at crate root for convenience.
pub use client::DomoClient;
pub use config::Config;
pub use error::ApiError;
pub use gateway::{ApiRequest, Gateway};
pub use session::{Session, SessionStore};
pub use tokens::TokenStore;
