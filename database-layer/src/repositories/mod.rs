//! Repositories over a borrowed connection
//!
//! Every repository wraps `&mut PgConnection`, so the same code runs inside a
//! [`UnitOfWork`](crate::UnitOfWork) for writes or on a plain pooled
//! connection for reads.

pub mod appointment;
pub mod facility;
pub mod notification;
pub mod patient;
pub mod prescription;
pub mod professional;
pub mod user;

pub use appointment::{AppointmentFilter, AppointmentRepository};
pub use facility::{FacilityFilter, FacilityRepository};
pub use notification::NotificationRepository;
pub use patient::{PatientFilter, PatientRepository};
pub use prescription::{PrescriptionFilter, PrescriptionRepository};
pub use professional::{ProfessionalFilter, ProfessionalRepository};
pub use user::UserRepository;
