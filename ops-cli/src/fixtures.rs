//! Request bodies with values the server accepts

use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::{json, Value};
use vidaplus_server::validation::complete_cpf;

pub const PATIENT_PASSWORD: &str = "Patient@123";

/// A random CPF with correct check digits, formatted `XXX.XXX.XXX-XX`
#[must_use]
pub fn random_cpf<R: Rng>(rng: &mut R) -> String {
    loop {
        let base: String = (0..9)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        // repeated digits never validate
        if base.chars().all(|c| Some(c) == base.chars().next()) {
            continue;
        }
        if let Some(cpf) = complete_cpf(&base) {
            return cpf;
        }
    }
}

/// A random six-digit CRM/COREN
#[must_use]
pub fn random_license<R: Rng>(rng: &mut R) -> String {
    format!("CRM-{}", rng.gen_range(100_000..1_000_000))
}

/// Emails unique to one run so reruns never collide
#[must_use]
pub fn email(run: &str, who: &str) -> String {
    format!("{who}.{run}@e2e.vidaplus.com")
}

#[must_use]
pub fn patient(run: &str, who: &str, name: &str, cpf: &str) -> Value {
    json!({
        "email": email(run, who),
        "password": PATIENT_PASSWORD,
        "cpf": cpf,
        "name": name,
        "birth_date": "1990-05-15",
        "sex": "F",
        "phone": "(11) 99999-1001",
        "address": "Rua das Flores, 123 - São Paulo/SP",
        "health_plan": "Unimed",
        "allergies": "Penicillin",
    })
}

#[must_use]
pub fn professional(run: &str, who: &str, name: &str, license: &str, specialty: &str) -> Value {
    json!({
        "email": email(run, who),
        "password": "Doctor@123",
        "license_number": license,
        "name": name,
        "specialty": specialty,
        "phone": "(11) 88888-5002",
        "professional_email": email(run, &format!("{who}.work")),
        "admission_date": "2020-01-15",
    })
}

/// Appointment `days_ahead` days from now at `hour`:00
#[must_use]
pub fn appointment(
    patient_id: i64,
    professional_id: i64,
    facility_id: i64,
    days_ahead: i64,
    hour: u32,
    kind: &str,
) -> Value {
    let day = (Utc::now() + Duration::days(days_ahead)).date_naive();
    json!({
        "patient_id": patient_id,
        "professional_id": professional_id,
        "facility_id": facility_id,
        "scheduled_at": format!("{day}T{hour:02}:00:00"),
        "appointment_type": kind,
        "notes": "Annual check-up",
    })
}

#[must_use]
pub fn prescription(patient_id: i64, professional_id: i64, medications: &str) -> Value {
    json!({
        "patient_id": patient_id,
        "professional_id": professional_id,
        "medications": medications,
        "dosage": "1 tablet every 8 hours",
        "duration": "7 days",
        "notes": "Take with water",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use vidaplus_server::validation::validate_cpf;

    #[test]
    fn generated_cpfs_validate() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let cpf = random_cpf(&mut rng);
            assert!(validate_cpf(&cpf).valid, "{cpf}");
            assert_eq!(cpf.len(), 14);
        }
    }

    #[test]
    fn appointments_are_in_the_future() {
        let body = appointment(1, 2, 3, 1, 14, "in_person");
        let scheduled = body["scheduled_at"].as_str().unwrap();
        assert!(scheduled.ends_with("T14:00:00"));
        assert!(scheduled > Utc::now().format("%Y-%m-%d").to_string().as_str());
    }
}
