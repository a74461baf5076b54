//! End-to-end client for a running VidaPlus server
//!
//! Drives the public HTTP API the way an operator would after a deploy:
//! health, login, then create, read, update and delete across every resource.
//! Each step prints one colored pass/fail line and the run ends with a
//! summary.
//!
//! # Example Usage
//!
//! ```bash
//! vidaplus-e2e --base-url http://localhost:5000 --recreate-db
//! ```

pub mod client;
pub mod fixtures;
pub mod report;
pub mod scenario;

pub use client::{ApiClient, Reply};
pub use report::Report;
pub use scenario::{Options, Scenario};
