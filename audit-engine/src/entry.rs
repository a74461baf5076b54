// Audit entry types and structures
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the actor did. Stored as an upper-case tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Register,
    PasswordChange,
    /// Any tag outside the fixed vocabulary
    Other(String),
}

impl AuditAction {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Register => "REGISTER",
            Self::PasswordChange => "PASSWORD_CHANGE",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for AuditAction {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "CREATE" => Self::Create,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "LOGIN" => Self::Login,
            "LOGOUT" => Self::Logout,
            "REGISTER" => Self::Register,
            "PASSWORD_CHANGE" => Self::PasswordChange,
            _ => Self::Other(tag),
        }
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        match action {
            AuditAction::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable line of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: i64,
    pub action: AuditAction,
    pub table: String,
    pub record_id: Option<i64>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub origin: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Starts an entry stamped with the current time.
    pub fn new(actor_id: i64, action: AuditAction, table: impl Into<String>) -> Self {
        Self {
            actor_id,
            action,
            table: table.into(),
            record_id: None,
            before: None,
            after: None,
            origin: None,
            recorded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn record_id(mut self, id: i64) -> Self {
        self.record_id = Some(id);
        self
    }

    #[must_use]
    pub fn before(mut self, state: Value) -> Self {
        self.before = Some(state);
        self
    }

    #[must_use]
    pub fn after(mut self, state: Value) -> Self {
        self.after = Some(state);
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_round_trip_through_tags() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::Register,
            AuditAction::PasswordChange,
        ] {
            let tag = String::from(action.clone());
            assert_eq!(AuditAction::from(tag), action);
        }
    }

    #[test]
    fn unknown_tags_are_kept_verbatim() {
        let action = AuditAction::from("EXPORT".to_string());
        assert_eq!(action, AuditAction::Other("EXPORT".to_string()));
        assert_eq!(action.to_string(), "EXPORT");
    }

    #[test]
    fn builder_fills_optional_fields() {
        let entry = AuditEntry::new(7, AuditAction::Update, "patients")
            .record_id(3)
            .before(json!({ "phone": "1" }))
            .after(json!({ "phone": "2" }))
            .origin(Some("10.0.0.1".to_string()));

        assert_eq!(entry.actor_id, 7);
        assert_eq!(entry.table, "patients");
        assert_eq!(entry.record_id, Some(3));
        assert_eq!(entry.before, Some(json!({ "phone": "1" })));
        assert_eq!(entry.origin.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn serializes_action_as_tag() {
        let entry = AuditEntry::new(1, AuditAction::PasswordChange, "users");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["action"], "PASSWORD_CHANGE");
        assert!(value["record_id"].is_null());
    }
}
