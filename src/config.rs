use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// How many days ahead customers may browse for open slots.
    pub horizon_days: u32,
    /// Minimum notice, in hours, to cancel a confirmed appointment.
    pub min_cancel_notice_hours: i64,
    /// Insert demo shops on startup when the database is empty.
    pub seed_demo: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "barberbook.db".to_string()),
            horizon_days: env::var("HORIZON_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            min_cancel_notice_hours: env::var("MIN_CANCEL_NOTICE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            seed_demo: env::var("SEED_DEMO")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}
