//! Endpoint groups, one module per backend tag.
//!
//! Each module extends [`crate::client::DomoClient`] with the methods for
//! its tag. Paths, parameter names, and body shapes follow the backend's
//! OpenAPI description; the shared request behavior (bearer attachment,
//! refresh-and-retry, query stripping) lives in [`crate::gateway`].

pub mod applications;
pub mod auth;
pub mod home_control;
pub mod outdoor;
pub mod rooms;
pub mod sensors;
pub mod users;
