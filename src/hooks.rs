//! Write hooks: `updated_at` maintenance and post-signup provisioning.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;

use crate::types::profile::NewProfile;
use crate::types::subject::AuthSubject;

/// Current time at the store's resolution (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// New `updated_at` for a row last written at `previous`. Always strictly
/// later than `previous`, even if the clock has not advanced.
pub fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + Duration::microseconds(1))
}

/// Signup metadata username, else the email's local part.
pub fn default_username(subject: &AuthSubject) -> String {
    match subject.metadata_username() {
        Some(username) => username.to_string(),
        None => subject
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Profile inserted on the subject's behalf when the client has not done it.
pub fn provisioned_profile(subject: &AuthSubject) -> NewProfile {
    NewProfile {
        id: subject.id,
        email: subject.email.clone(),
        username: default_username(subject),
        country: None,
        date_of_birth: None,
        avatar_url: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Created,
    /// A profile with the subject's id already existed; nothing was written.
    AlreadyExists,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn subject(email: &str, metadata: serde_json::Value) -> AuthSubject {
        AuthSubject {
            id: Uuid::new_v4(),
            email: email.to_string(),
            user_metadata: metadata,
        }
    }

    #[test]
    fn metadata_username_wins() {
        let s = subject("someone@x.com", json!({ "username": "alice" }));
        assert_eq!(default_username(&s), "alice");
    }

    #[test]
    fn falls_back_to_email_local_part() {
        assert_eq!(default_username(&subject("bob@x.com", json!({}))), "bob");
        assert_eq!(default_username(&subject("bob@x.com", serde_json::Value::Null)), "bob");
        assert_eq!(default_username(&subject("bob@x.com", json!({ "username": "" }))), "bob");
        assert_eq!(default_username(&subject("bob@x.com", json!({ "username": 12345 }))), "bob");
    }

    #[test]
    fn touch_is_strictly_increasing() {
        let future = now() + Duration::seconds(60);
        assert!(touch(future) > future);
        let past = now() - Duration::seconds(60);
        assert!(touch(past) > past);
    }
}
