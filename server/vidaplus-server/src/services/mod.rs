//! Cross-cutting services used by several handlers

pub mod audit;
pub mod notifications;
pub mod telemedicine;

pub use audit::{audit_entry, snapshot};
pub use notifications::notify;
pub use telemedicine::telemedicine_link;
