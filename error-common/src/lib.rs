//! Common error handling utilities for the VidaPlus backend
//!
//! Every fallible domain operation returns [`VidaPlusError`], which always
//! carries an [`ErrorKind`]. Callers branch on the kind instead of matching
//! on message text, and the HTTP layer maps each kind to one status code.
//!
//! # Error Kinds
//!
//! - **NotFound**: the addressed record does not exist
//! - **InvalidInput**: the caller sent malformed or rule-breaking data
//! - **Conflict**: a uniqueness or referential constraint would be violated
//! - **Internal**: anything the caller cannot fix
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorKind, VidaPlusError};
//!
//! fn find_patient(id: i64) -> error_common::Result<String> {
//!     if id <= 0 {
//!         return Err(VidaPlusError::invalid_input("Patient id must be positive"));
//!     }
//!     Err(VidaPlusError::not_found("Patient"))
//! }
//!
//! let err = find_patient(7).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! ```

pub mod codes;
pub mod types;

pub use codes::*;
pub use types::*;
