use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum length of the free-text notes attached to a booking.
pub const MAX_NOTES_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub shop_id: String,
    pub customer_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    /// Snapshot of the service duration at booking time. Later catalog
    /// edits must not change it.
    pub duration_minutes: i32,
    /// Snapshot of the service price at booking time.
    pub price: Decimal,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// An appointment consumes its slot while it can still happen.
    pub fn blocks_slot(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => AppointmentStatus::Confirmed,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Pending,
        }
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// The lifecycle graph: pending -> confirmed -> completed, with
    /// cancellation allowed from pending and confirmed. Nothing re-enters
    /// pending.
    pub fn can_transition_to(&self, target: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        match (self, target) {
            (Pending, Confirmed) => true,
            (Pending, Cancelled) => true,
            (Confirmed, Completed) => true,
            (Confirmed, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize times as the `HH:MM` strings the booking wire format uses.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_outgoing_edges() {
        use AppointmentStatus::*;
        for from in [Completed, Cancelled] {
            for to in [Pending, Confirmed, Completed, Cancelled] {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn test_nothing_re_enters_pending() {
        use AppointmentStatus::*;
        for from in [Pending, Confirmed, Completed, Cancelled] {
            assert!(!from.can_transition_to(Pending));
        }
    }

    #[test]
    fn test_lifecycle_edges() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "confirmed", "completed", "cancelled"] {
            assert_eq!(AppointmentStatus::parse(s).as_str(), s);
        }
        assert_eq!(
            AppointmentStatus::parse("garbage"),
            AppointmentStatus::Pending
        );
    }

    #[test]
    fn test_blocks_slot() {
        let mut apt = sample();
        assert!(apt.blocks_slot());
        apt.status = AppointmentStatus::Confirmed;
        assert!(apt.blocks_slot());
        apt.status = AppointmentStatus::Cancelled;
        assert!(!apt.blocks_slot());
        apt.status = AppointmentStatus::Completed;
        assert!(!apt.blocks_slot());
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_hhmm() {
        let apt = sample();
        let json = serde_json::to_value(&apt).unwrap();
        assert_eq!(json["shopId"], "1");
        assert_eq!(json["time"], "09:00");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["date"], "2024-01-20");
    }

    fn sample() -> Appointment {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 1, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Appointment {
            id: "a-1".to_string(),
            shop_id: "1".to_string(),
            customer_id: "c-1".to_string(),
            service_id: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration_minutes: 30,
            price: Decimal::new(25, 0),
            status: AppointmentStatus::Pending,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}
