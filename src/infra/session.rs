//! Local session cache.
//!
//! A single-record JSON file remembering the last successfully
//! authenticated user, valid only for the calendar date on which it was
//! written. This is a convenience cache for same-day auto-login, not a
//! security boundary: no encryption, no integrity check, and every failure
//! here is logged and swallowed.

use std::fs;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::UserResponse;

/// On-disk record shape: `{ "user": <snapshot>, "date": "YYYY-MM-DD" }`
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    user: UserResponse,
    date: NaiveDate,
}

/// File-backed same-day session cache.
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the cached user snapshot if the record exists and was written
    /// today; otherwise delete the record and return `None`. Corrupt files
    /// are treated the same as stale ones.
    pub fn read(&self) -> Option<UserResponse> {
        self.read_for(Local::now().date_naive())
    }

    fn read_for(&self, today: NaiveDate) -> Option<UserResponse> {
        if !self.path.exists() {
            return None;
        }

        let record = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<SessionRecord>(&raw).ok());

        match record {
            Some(record) if record.date == today => Some(record.user),
            _ => {
                // Stale or unreadable: invalidate
                self.clear();
                None
            }
        }
    }

    /// Persist the user snapshot with today's date, overwriting any prior
    /// record.
    pub fn write(&self, user: &UserResponse) {
        let record = SessionRecord {
            user: user.clone(),
            date: Local::now().date_naive(),
        };

        let result = serde_json::to_string(&record)
            .map_err(|e| e.to_string())
            .and_then(|raw| fs::write(&self.path, raw).map_err(|e| e.to_string()));

        if let Err(e) = result {
            tracing::warn!("Failed to write session file {:?}: {}", self.path, e);
        }
    }

    /// Delete the record if present.
    pub fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("Failed to remove session file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn snapshot() -> UserResponse {
        UserResponse {
            id: Uuid::new_v4(),
            username: "jsousa".to_string(),
            email: "jsousa@example.com".to_string(),
            name: "Joana Sousa".to_string(),
            is_admin: false,
        }
    }

    fn cache_in(dir: &tempfile::TempDir) -> SessionCache {
        SessionCache::new(dir.path().join("session.json"))
    }

    #[test]
    fn test_same_day_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let user = snapshot();

        cache.write(&user);
        assert_eq!(cache.read(), Some(user));
    }

    #[test]
    fn test_next_day_invalidates_and_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.write(&snapshot());

        let tomorrow = Local::now().date_naive() + Duration::days(1);
        assert_eq!(cache.read_for(tomorrow), None);
        assert!(!dir.path().join("session.json").exists());
    }

    #[test]
    fn test_missing_file_reads_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cache_in(&dir).read(), None);
    }

    #[test]
    fn test_corrupt_file_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let cache = SessionCache::new(&path);
        assert_eq!(cache.read(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.write(&snapshot());

        cache.clear();
        assert_eq!(cache.read(), None);
    }
}
