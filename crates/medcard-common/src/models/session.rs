use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Short-lived login session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub patient_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session for `patient_id` that expires `ttl` after `now`
    pub fn issue(patient_id: i64, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// A session is still valid at exactly `expires_at`, and expired after it
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Login request body
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_expiry_from_ttl() {
        let now = Utc::now();
        let session = Session::issue(42, now, Duration::minutes(1));
        assert_eq!(session.patient_id, 42);
        assert_eq!(session.created_at, now);
        assert_eq!(session.expires_at - session.created_at, Duration::minutes(1));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let session = Session::issue(1, now, Duration::minutes(1));
        assert!(!session.is_expired_at(now));
        assert!(!session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.expires_at + Duration::milliseconds(1)));
    }

    #[test]
    fn test_issue_generates_unique_ids() {
        let now = Utc::now();
        let a = Session::issue(1, now, Duration::minutes(1));
        let b = Session::issue(1, now, Duration::minutes(1));
        assert_ne!(a.id, b.id);
    }
}
