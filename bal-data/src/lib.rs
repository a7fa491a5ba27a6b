//! Remote data access for the BAL address editor.
//!
//! Responsibilities:
//! - Implement [`bal_core::DataAccess`] over the address-database REST API.
//! - Encapsulate the API's JSON shapes and error bodies.
//!
//! Boundaries:
//! - Do not encode editing rules (live in `bal-core`).
//! - Never install a logger; report through the `log` facade only.

pub mod api;

pub use api::{ClientBuildError, HttpDataAccess, HttpDataAccessConfig};
