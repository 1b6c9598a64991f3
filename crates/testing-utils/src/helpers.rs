//! Small helpers shared by integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

pub struct TestEnv;

impl TestEnv {
    /// A fixed instant so assertions on timestamps stay deterministic.
    pub fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid fixed timestamp")
    }

    pub fn timestamp_with_offset(offset_seconds: i64) -> DateTime<Utc> {
        Self::fixed_now() + Duration::seconds(offset_seconds)
    }
}

/// Integration test setup helpers
pub struct IntegrationTestSetup;

impl IntegrationTestSetup {
    /// Set up logging for tests (call once per test binary)
    pub fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }
}
