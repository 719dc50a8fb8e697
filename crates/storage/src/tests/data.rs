use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use fittrack_domain as domain;

use crate::{firestore::FirebaseConfig, indexed_db::Session};

pub static DATE: LazyLock<domain::WorkoutDate> = LazyLock::new(|| date(2024, 1, 5));

pub static TIMESTAMP: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(2024, 1, 5, 18, 0, 0).unwrap());

pub static EXERCISE: LazyLock<domain::Exercise> = LazyLock::new(|| domain::Exercise {
    id: "bench-press".into(),
    name: domain::Name::new("Bench Press").unwrap(),
    created_at: *TIMESTAMP,
});

pub static SET: LazyLock<domain::SetEntry> = LazyLock::new(|| set(62.5, 5));
pub static SET_2: LazyLock<domain::SetEntry> = LazyLock::new(|| set(60.0, 8));
pub static SET_3: LazyLock<domain::SetEntry> = LazyLock::new(|| set(57.5, 10));

pub static SESSION: LazyLock<Session> = LazyLock::new(|| Session {
    user_id: "uid-1".to_string(),
    email: "alice@example.com".to_string(),
    id_token: "id-token".to_string(),
    refresh_token: "refresh-token".to_string(),
});

pub static FIREBASE_CONFIG: LazyLock<FirebaseConfig> = LazyLock::new(|| FirebaseConfig {
    api_key: "key".to_string(),
    project_id: "fittrack-test".to_string(),
    database_id: "(default)".to_string(),
    timeout_ms: 10_000,
});

pub fn date(year: i32, month: u32, day: u32) -> domain::WorkoutDate {
    domain::WorkoutDate::from_ymd(year, month, day).unwrap()
}

pub fn set(weight: f32, reps: u32) -> domain::SetEntry {
    domain::SetEntry {
        weight: domain::Weight::new(weight).unwrap(),
        reps: domain::Reps::new(reps).unwrap(),
        timestamp: *TIMESTAMP,
    }
}
