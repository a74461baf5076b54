//! Audit entry construction for handlers
//!
//! Every mutating handler builds its entry here, so actor id and caller
//! origin are always taken from the authenticated request.

use audit_engine::{AuditAction, AuditEntry};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::middleware::AuthContext;

/// Entry for an action taken by the authenticated caller
#[must_use]
pub fn audit_entry(auth: &AuthContext, action: AuditAction, table: &str) -> AuditEntry {
    AuditEntry::new(auth.user_id, action, table).origin(auth.origin())
}

/// Serializes a before/after state. A state that cannot be serialized is
/// logged and left out of the entry.
pub fn snapshot<T: Serialize>(state: &T) -> Option<Value> {
    serde_json::to_value(state)
        .map_err(|e| warn!(error = %e, "Audit snapshot could not be serialized"))
        .ok()
}

#[cfg(test)]
mod tests {
    use database_layer::models::UserType;
    use serde_json::json;

    use super::*;
    use crate::middleware::RequestContext;

    #[test]
    fn entry_carries_actor_and_origin() {
        let auth = AuthContext {
            user_id: 7,
            email: "admin@vidaplus.com".to_string(),
            user_type: UserType::Admin,
            request: RequestContext {
                remote_addr: Some("203.0.113.9".to_string()),
                ..RequestContext::default()
            },
        };

        let entry = audit_entry(&auth, AuditAction::Delete, "patients").record_id(3);
        assert_eq!(entry.actor_id, 7);
        assert_eq!(entry.origin.as_deref(), Some("203.0.113.9"));
        assert_eq!(entry.table, "patients");
        assert_eq!(entry.record_id, Some(3));
    }

    #[test]
    fn snapshot_serializes_state() {
        #[derive(Serialize)]
        struct State {
            status: &'static str,
        }
        assert_eq!(snapshot(&State { status: "active" }), Some(json!({ "status": "active" })));
    }
}
