// Row types and domain vocabularies
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Declares a closed string vocabulary stored as VARCHAR.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($tag => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(
    /// Account role
    UserType {
        Admin => "admin",
        Patient => "patient",
        Professional => "professional",
    }
);

vocabulary!(
    Sex {
        Male => "M",
        Female => "F",
        Other => "O",
    }
);

vocabulary!(
    AppointmentType {
        InPerson => "in_person",
        Telemedicine => "telemedicine",
    }
);

vocabulary!(
    AppointmentStatus {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

vocabulary!(
    PrescriptionStatus {
        Active => "active",
        Closed => "closed",
    }
);

vocabulary!(
    NotificationKind {
        Scheduling => "scheduling",
        Result => "result",
        System => "system",
    }
);

vocabulary!(
    /// Specialties a professional may register with
    Specialty {
        Cardiology => "Cardiology",
        InterventionalCardiology => "Interventional Cardiology",
        Pediatrics => "Pediatrics",
        Orthopedics => "Orthopedics",
        Gynecology => "Gynecology",
        GeneralPractice => "General Practice",
        Neurology => "Neurology",
        Dermatology => "Dermatology",
        Anesthesiology => "Anesthesiology",
        GeneralSurgery => "General Surgery",
    }
);

/// Renders the accepted tags of a vocabulary for error messages.
pub fn accepted<T: Copy + fmt::Display>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_access: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
}

/// Patient joined with its login account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub active: bool,
    pub cpf: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub sex: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub health_plan: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub family_history: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub user_id: i64,
    pub cpf: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub health_plan: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub family_history: Option<String>,
}

/// Fields a patient update may touch. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub health_plan: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub family_history: Option<String>,
}

impl PatientChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.health_plan.is_none()
            && self.allergies.is_none()
            && self.current_medications.is_none()
            && self.family_history.is_none()
    }
}

/// Professional joined with its login account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Professional {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub active: bool,
    pub license_number: String,
    pub name: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub professional_email: Option<String>,
    pub admission_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewProfessional {
    pub user_id: i64,
    pub license_number: String,
    pub name: String,
    pub specialty: Specialty,
    pub phone: Option<String>,
    pub professional_email: Option<String>,
    pub admission_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfessionalChanges {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub professional_email: Option<String>,
}

impl ProfessionalChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.specialty.is_none()
            && self.phone.is_none()
            && self.professional_email.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Facility {
    pub id: i64,
    pub name: String,
    pub facility_type: String,
    pub address: String,
    pub phone: Option<String>,
    pub cnpj: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewFacility {
    pub name: String,
    pub facility_type: String,
    pub address: String,
    pub phone: Option<String>,
    pub cnpj: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FacilityChanges {
    pub name: Option<String>,
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

impl FacilityChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.facility_type.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.active.is_none()
    }
}

/// Appointment with the names of everyone involved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub professional_id: i64,
    pub professional_name: String,
    pub facility_id: i64,
    pub facility_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub telemedicine_link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub professional_id: i64,
    pub facility_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
    pub telemedicine_link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub appointment_type: Option<AppointmentType>,
    pub status: Option<AppointmentStatus>,
    /// `Some(None)` clears the stored notes
    pub notes: Option<Option<String>>,
    pub telemedicine_link: Option<String>,
}

impl AppointmentChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scheduled_at.is_none()
            && self.appointment_type.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.telemedicine_link.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub professional_id: i64,
    pub professional_name: String,
    pub prescribed_at: DateTime<Utc>,
    pub medications: String,
    pub dosage: String,
    pub duration: Option<String>,
    pub notes: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub professional_id: i64,
    pub medications: String,
    pub dosage: String,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PrescriptionChanges {
    pub medications: Option<String>,
    pub dosage: Option<String>,
    pub duration: Option<String>,
    pub notes: Option<String>,
    pub status: Option<PrescriptionStatus>,
}

impl PrescriptionChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.medications.is_none()
            && self.dosage.is_none()
            && self.duration.is_none()
            && self.notes.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
