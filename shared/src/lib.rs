//! Shared types for the tour-admin backend.
//!
//! Domain models, the unified error/envelope types and small utilities used
//! by `tour-server`. This crate performs no I/O; database derives are gated
//! behind the `db` feature.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;
