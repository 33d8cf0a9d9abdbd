use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Auth provider's user record, as delivered with lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSubject {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthSubject {
    /// `username` from signup metadata, if it is a non-empty string.
    pub fn metadata_username(&self) -> Option<&str> {
        self.user_metadata
            .get("username")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}
