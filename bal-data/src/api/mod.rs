//! HTTP access to the address-database REST API.
//!
//! [`HttpDataAccess`] implements [`bal_core::DataAccess`]: it fetches whole
//! collections for a session scope and submits mutations authorised by a
//! write credential.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use bal_core::{CollectionKind, DataAccess, SessionScope};
//! use bal_data::api::{HttpDataAccess, HttpDataAccessConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpDataAccessConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let access = HttpDataAccess::with_config(config)?;
//!
//! let scope = SessionScope::new("5f1b7f0e8a1c2d0012345678", "94067");
//! let streets = access.fetch(CollectionKind::Streets, &scope).await?;
//! println!("{} streets", streets.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod wire;

pub use client::{ClientBuildError, HttpDataAccess};
pub use config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpDataAccessConfig};
