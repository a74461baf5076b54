//! The ordered end-to-end run

use anyhow::{anyhow, Result};
use chrono::Utc;
use colored::Colorize;
use rand::{rngs::StdRng, SeedableRng};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::client::{ApiClient, Reply};
use crate::fixtures::{self, random_cpf, random_license};
use crate::report::Report;

const API: &str = "/api/v1";

const PATIENT_NAMES: [&str; 3] = ["João Silva", "Maria Santos", "Pedro Oliveira"];
const PROFESSIONALS: [(&str, &str); 3] = [
    ("Dr. Carlos Mendes", "Cardiology"),
    ("Dra. Ana Paula Costa", "Pediatrics"),
    ("Dr. Roberto Almeida", "Orthopedics"),
];
const MEDICATIONS: [&str; 3] = ["Dipyrone 500mg", "Paracetamol 750mg", "Ibuprofen 600mg"];

#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub recreate_db: bool,
}

/// Login of a patient created during the run
#[derive(Debug, Clone)]
struct Credentials {
    email: String,
    password: String,
}

pub struct Scenario {
    client: ApiClient,
    report: Report,
    options: Options,
    rng: StdRng,
    run_id: String,
}

fn path(resource: &str) -> String {
    format!("{API}/{resource}")
}

fn item(resource: &str, id: i64) -> String {
    format!("{API}/{resource}/{id}")
}

fn check(reply: Result<Reply>, status: StatusCode) -> Result<()> {
    reply?.expect_status(status).map(|_| ())
}

fn section(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
}

impl Scenario {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(options: Options) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(&options.base_url)?,
            report: Report::new(),
            rng: StdRng::from_entropy(),
            run_id: Utc::now().format("%Y%m%d%H%M%S").to_string(),
            options,
        })
    }

    /// Runs every step in order and returns the filled report.
    pub async fn run(mut self) -> Report {
        section("🖥  System");
        if self.options.recreate_db {
            let reply = self.client.post(&path("dev/recreate-db"), &json!({})).await;
            let outcome = check(reply, StatusCode::OK);
            self.report.record("Recreate database", outcome, |()| String::new());
        }
        self.system().await;

        section("🔐 Authentication");
        if !self.login().await {
            self.report.skip("Remaining steps", "admin login failed");
            return self.report;
        }
        let outcome = self.fetch(&path("auth/profile")).await;
        self.report.record("Profile", outcome, |data| {
            format!("({})", data.pointer("/user/email").and_then(Value::as_str).unwrap_or("?"))
        });

        section("👥 Patients");
        let (patients, patient_login) = self.patients().await;

        section("🩺 Professionals");
        let professionals = self.professionals().await;

        section("🏥 Facilities");
        let facility = self.facility().await;

        section("📅 Appointments");
        match facility {
            Some(facility) => self.appointments(&patients, &professionals, facility).await,
            None => self.report.skip("Appointments", "no facility available"),
        }

        section("💊 Prescriptions");
        self.prescriptions(&patients, &professionals).await;

        section("🔔 Notifications");
        self.notifications(patient_login).await;

        section("👋 Logout");
        let reply = self.client.post(&path("auth/logout"), &json!({})).await;
        let outcome = check(reply, StatusCode::OK);
        self.report.record("Logout", outcome, |()| String::new());
        self.client.set_token(None);

        self.report
    }

    async fn system(&mut self) {
        let outcome = self.fetch(&path("health")).await;
        self.report.record("Health check", outcome, |data| {
            format!("({})", data.get("status").and_then(Value::as_str).unwrap_or("?"))
        });

        let outcome = self.fetch("/").await;
        self.report.record("System info", outcome, |data| {
            format!("({})", data.get("version").and_then(Value::as_str).unwrap_or("?"))
        });

        let outcome = self.fetch(&path("cors-test")).await;
        self.report.record("CORS test", outcome, |_| String::new());
    }

    async fn login(&mut self) -> bool {
        let body = json!({
            "email": self.options.admin_email,
            "password": self.options.admin_password,
        });
        let outcome = self.sign_in(&body).await;
        let token = self.report.record("Admin login", outcome, |_| String::new());
        let logged_in = token.is_some();
        self.client.set_token(token);
        logged_in
    }

    async fn sign_in(&self, body: &Value) -> Result<String> {
        let reply = self
            .client
            .post(&path("auth/login"), body)
            .await?
            .expect_status(StatusCode::OK)?;
        reply
            .data()
            .get("access_token")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("login returned no token"))
    }

    async fn patients(&mut self) -> (Vec<i64>, Option<Credentials>) {
        let mut ids = Vec::new();
        let mut login = None;

        for (n, name) in (1..).zip(PATIENT_NAMES) {
            let cpf = random_cpf(&mut self.rng);
            let who = format!("patient{n}");
            let body = fixtures::patient(&self.run_id, &who, name, &cpf);
            let outcome = self.create(&path("patients"), &body).await;
            let created = self.report.record(&format!("Create patient {n}"), outcome, |id| {
                format!("(id {id}, CPF {cpf})")
            });
            if let Some(id) = created {
                ids.push(id);
                login.get_or_insert_with(|| Credentials {
                    email: fixtures::email(&self.run_id, &who),
                    password: fixtures::PATIENT_PASSWORD.to_string(),
                });
            }
        }

        let changes = json!({
            "name": "João Silva Updated",
            "phone": "(11) 66666-6666",
            "address": "Rua das Palmeiras, 999 - São Paulo/SP",
        });
        self.crud_tail("patients", "patient", ids.first().copied(), &changes).await;

        let cpf = random_cpf(&mut self.rng);
        let temporary = fixtures::patient(&self.run_id, "temporary", "Temporary Patient", &cpf);
        self.create_then_delete("patients", "patient", &temporary).await;

        (ids, login)
    }

    async fn professionals(&mut self) -> Vec<i64> {
        let mut ids = Vec::new();

        for (n, (name, specialty)) in (1..).zip(PROFESSIONALS) {
            let license = random_license(&mut self.rng);
            let who = format!("doctor{n}");
            let body = fixtures::professional(&self.run_id, &who, name, &license, specialty);
            let outcome = self.create(&path("professionals"), &body).await;
            let created = self.report.record(&format!("Create professional {n}"), outcome, |id| {
                format!("(id {id}, {specialty})")
            });
            ids.extend(created);
        }

        let changes = json!({
            "name": "Dr. Carlos Mendes Updated",
            "specialty": "Interventional Cardiology",
            "phone": "(11) 66666-6666",
        });
        self.crud_tail("professionals", "professional", ids.first().copied(), &changes).await;

        let license = random_license(&mut self.rng);
        let temporary = fixtures::professional(
            &self.run_id,
            "temporary.doctor",
            "Dr. Temporary",
            &license,
            "General Practice",
        );
        self.create_then_delete("professionals", "professional", &temporary).await;

        ids
    }

    /// The seeded facility, or a new one when the list is empty
    async fn facility(&mut self) -> Option<i64> {
        let outcome = self.first_id(&path("facilities")).await;
        let existing = self
            .report
            .record("List facilities", outcome, |id| {
                id.map_or_else(String::new, |id| format!("(using id {id})"))
            })
            .flatten();
        if existing.is_some() {
            return existing;
        }

        let body = json!({
            "name": "VidaPlus E2E Clinic",
            "facility_type": "clinic",
            "address": "Rua Augusta, 789 - São Paulo/SP",
        });
        let outcome = self.create(&path("facilities"), &body).await;
        self.report.record("Create facility", outcome, |id| format!("(id {id})"))
    }

    async fn appointments(&mut self, patients: &[i64], professionals: &[i64], facility: i64) {
        let mut ids = Vec::new();
        let schedule = [(1, 14, "in_person"), (2, 10, "telemedicine"), (3, 16, "in_person")];

        for (n, ((patient, professional), (days, hour, kind))) in
            (1..).zip(patients.iter().zip(professionals).zip(schedule))
        {
            let body = fixtures::appointment(*patient, *professional, facility, days, hour, kind);
            let outcome = self.create_record(&path("appointments"), &body).await;
            let created = self.report.record(&format!("Create appointment {n}"), outcome, |data| {
                let link = data.get("telemedicine_link").and_then(Value::as_str);
                link.map_or_else(|| format!("({kind})"), |link| format!("({kind}, {link})"))
            });
            if let Some(id) = created.and_then(|data| data.get("id").and_then(Value::as_i64)) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            self.report.skip("Appointments", "no patient and professional pair available");
            return;
        }

        let changes = json!({
            "notes": "Updated: patient improving",
            "status": "completed",
        });
        self.crud_tail("appointments", "appointment", ids.first().copied(), &changes).await;

        if let Some(last) = ids.last().copied() {
            let outcome = self.remove(&item("appointments", last)).await;
            self.report.record("Delete appointment", outcome, |()| format!("(id {last})"));
        }
    }

    async fn prescriptions(&mut self, patients: &[i64], professionals: &[i64]) {
        let mut ids = Vec::new();

        for (n, ((patient, professional), medications)) in
            (1..).zip(patients.iter().zip(professionals).zip(MEDICATIONS))
        {
            let body = fixtures::prescription(*patient, *professional, medications);
            let outcome = self.create(&path("prescriptions"), &body).await;
            let created = self.report.record(&format!("Create prescription {n}"), outcome, |id| {
                format!("(id {id})")
            });
            ids.extend(created);
        }
        if ids.is_empty() {
            self.report.skip("Prescriptions", "no patient and professional pair available");
            return;
        }

        let changes = json!({
            "dosage": "1 tablet every 12 hours",
            "notes": "Updated prescription",
            "status": "closed",
        });
        self.crud_tail("prescriptions", "prescription", ids.first().copied(), &changes).await;

        if let Some(last) = ids.last().copied() {
            let outcome = self.remove(&item("prescriptions", last)).await;
            self.report.record("Delete prescription", outcome, |()| format!("(id {last})"));
        }
    }

    /// Signs in as the first patient, who has been notified along the way,
    /// and reads then acknowledges their notifications.
    async fn notifications(&mut self, patient: Option<Credentials>) {
        let Some(patient) = patient else {
            self.report.skip("Notifications", "no patient was created");
            return;
        };

        let admin_client = self.client.clone();
        let body = json!({ "email": patient.email, "password": patient.password });
        let outcome = self.sign_in(&body).await;
        let Some(token) = self.report.record("Patient login", outcome, |_| String::new()) else {
            return;
        };
        self.client.set_token(Some(token));

        let outcome = self.first_id(&path("notifications?unread_only=true")).await;
        let first = self
            .report
            .record("List notifications", outcome, |id| {
                id.map_or_else(|| "(none)".to_string(), |id| format!("(newest id {id})"))
            })
            .flatten();

        if let Some(id) = first {
            let outcome = async {
                let reply = self
                    .client
                    .put(&format!("{API}/notifications/{id}/read"), &json!({}))
                    .await?
                    .expect_status(StatusCode::OK)?;
                match reply.data().get("read").and_then(Value::as_bool) {
                    Some(true) => Ok(()),
                    _ => Err(anyhow!("notification was not marked read")),
                }
            }
            .await;
            self.report.record("Mark notification read", outcome, |()| format!("(id {id})"));
        }

        self.client = admin_client;
    }

    /// List, get and update for a resource whose records were just created
    async fn crud_tail(&mut self, resource: &str, label: &str, first: Option<i64>, changes: &Value) {
        let outcome = self.count(&path(resource)).await;
        self.report.record(&format!("List {resource}"), outcome, |count| {
            format!("({count} on the first page)")
        });

        let Some(id) = first else {
            self.report.skip(&format!("Get and update {label}"), "nothing was created");
            return;
        };

        let outcome = self.fetch(&item(resource, id)).await;
        self.report.record(&format!("Get {label}"), outcome, |_| format!("(id {id})"));

        let outcome = async {
            self.client
                .put(&item(resource, id), changes)
                .await?
                .expect_status(StatusCode::OK)
                .map(|_| ())
        }
        .await;
        self.report.record(&format!("Update {label}"), outcome, |()| format!("(id {id})"));
    }

    /// Deletion is exercised on a record nothing else references.
    async fn create_then_delete(&mut self, resource: &str, label: &str, body: &Value) {
        let outcome = async {
            let id = self.create(&path(resource), body).await?;
            self.remove(&item(resource, id)).await?;
            Ok::<_, anyhow::Error>(id)
        }
        .await;
        self.report.record(&format!("Delete {label}"), outcome, |id| {
            format!("(id {id}, temporary)")
        });
    }

    async fn fetch(&self, path: &str) -> Result<Value> {
        let reply = self.client.get(path).await?.expect_status(StatusCode::OK)?;
        Ok(reply.data().clone())
    }

    async fn count(&self, path: &str) -> Result<usize> {
        Ok(self.client.get(path).await?.expect_status(StatusCode::OK)?.count())
    }

    async fn first_id(&self, path: &str) -> Result<Option<i64>> {
        let reply = self.client.get(path).await?.expect_status(StatusCode::OK)?;
        Ok(reply
            .data()
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("id"))
            .and_then(Value::as_i64))
    }

    async fn create(&self, path: &str, body: &Value) -> Result<i64> {
        self.client
            .post(path, body)
            .await?
            .expect_status(StatusCode::CREATED)?
            .id()
    }

    async fn create_record(&self, path: &str, body: &Value) -> Result<Value> {
        let reply = self
            .client
            .post(path, body)
            .await?
            .expect_status(StatusCode::CREATED)?;
        Ok(reply.data().clone())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.client
            .delete(path)
            .await?
            .expect_status(StatusCode::OK)
            .map(|_| ())
    }
}
