use chrono::{Days, NaiveDate, NaiveTime};

use crate::models::{AvailabilityCalendar, Service, ServiceCatalog};

/// A booking request that has passed selection validation. Carries the
/// resolved service so the caller can snapshot its price and duration.
#[derive(Debug, Clone)]
pub struct Selection {
    pub service: Service,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SelectionError {
    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("no availability on {0}")]
    DateNotAvailable(NaiveDate),

    #[error("{time} is not a bookable time on {date}")]
    TimeNotAvailable { date: NaiveDate, time: NaiveTime },

    #[error("{0} is in the past")]
    DateInPast(NaiveDate),
}

/// Dates within `[today, today + horizon_days)` that have at least one
/// configured slot, chronological. The iterator is cheap and `Clone`, so
/// callers can walk it more than once.
pub fn available_dates(
    calendar: &AvailabilityCalendar,
    today: NaiveDate,
    horizon_days: u32,
) -> impl Iterator<Item = NaiveDate> + Clone + '_ {
    let end = today
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);
    calendar
        .dates()
        .filter(move |d| *d >= today && *d < end)
}

/// The configured start times for `date`. Deliberately does not subtract
/// times consumed by existing appointments; that depends on mutable
/// appointment state and belongs to the caller holding the repository.
pub fn available_times(calendar: &AvailabilityCalendar, date: NaiveDate) -> &[NaiveTime] {
    calendar.times_for(date)
}

/// Check a caller-chosen (service, date, time) triple against the catalog
/// and calendar before it is handed to the booking lifecycle. Pure.
pub fn validate_selection(
    catalog: &ServiceCatalog,
    calendar: &AvailabilityCalendar,
    service_id: &str,
    date: NaiveDate,
    time: NaiveTime,
    today: NaiveDate,
) -> Result<Selection, SelectionError> {
    let service = catalog
        .find(service_id)
        .ok_or_else(|| SelectionError::UnknownService(service_id.to_string()))?;

    if date < today {
        return Err(SelectionError::DateInPast(date));
    }

    let times = calendar.times_for(date);
    if times.is_empty() {
        return Err(SelectionError::DateNotAvailable(date));
    }
    if !times.contains(&time) {
        return Err(SelectionError::TimeNotAvailable { date, time });
    }

    Ok(Selection {
        service: service.clone(),
        date,
        time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::from_json(
            r#"{"services":[{"id":"1","name":"Haircut","durationMinutes":30,"price":"25"},{"id":"2","name":"Beard Trim","durationMinutes":15,"price":"15"}]}"#,
        )
        .unwrap()
    }

    fn calendar() -> AvailabilityCalendar {
        AvailabilityCalendar::from_json(
            r#"{"2024-01-20":["09:00","09:30","10:00"],"2024-01-22":["09:30","10:30"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_available_dates_within_horizon() {
        let cal = calendar();
        let dates: Vec<NaiveDate> = available_dates(&cal, date("2024-01-19"), 7).collect();
        assert_eq!(dates, vec![date("2024-01-20"), date("2024-01-22")]);
    }

    #[test]
    fn test_available_dates_excludes_past_and_beyond_horizon() {
        let cal = calendar();
        // 2024-01-21 + 1 day horizon covers only the 21st itself
        let dates: Vec<NaiveDate> = available_dates(&cal, date("2024-01-21"), 1).collect();
        assert!(dates.is_empty());
        // horizon end is exclusive
        let dates: Vec<NaiveDate> = available_dates(&cal, date("2024-01-20"), 2).collect();
        assert_eq!(dates, vec![date("2024-01-20")]);
    }

    #[test]
    fn test_available_dates_is_restartable() {
        let cal = calendar();
        let iter = available_dates(&cal, date("2024-01-19"), 7);
        let first: Vec<NaiveDate> = iter.clone().collect();
        let second: Vec<NaiveDate> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_available_times_unfiltered() {
        let cal = calendar();
        assert_eq!(available_times(&cal, date("2024-01-20")).len(), 3);
        assert!(available_times(&cal, date("2024-01-21")).is_empty());
    }

    #[test]
    fn test_validate_selection_ok() {
        let selection = validate_selection(
            &catalog(),
            &calendar(),
            "1",
            date("2024-01-20"),
            time("09:00"),
            date("2024-01-19"),
        )
        .unwrap();
        assert_eq!(selection.service.name, "Haircut");
        assert_eq!(selection.date, date("2024-01-20"));
    }

    #[test]
    fn test_validate_selection_unknown_service() {
        let err = validate_selection(
            &catalog(),
            &calendar(),
            "99",
            date("2024-01-20"),
            time("09:00"),
            date("2024-01-19"),
        )
        .unwrap_err();
        assert_eq!(err, SelectionError::UnknownService("99".to_string()));
    }

    #[test]
    fn test_validate_selection_date_without_slots() {
        let err = validate_selection(
            &catalog(),
            &calendar(),
            "1",
            date("2024-01-21"),
            time("09:00"),
            date("2024-01-19"),
        )
        .unwrap_err();
        assert_eq!(err, SelectionError::DateNotAvailable(date("2024-01-21")));
    }

    #[test]
    fn test_validate_selection_time_not_offered() {
        let err = validate_selection(
            &catalog(),
            &calendar(),
            "1",
            date("2024-01-20"),
            time("12:00"),
            date("2024-01-19"),
        )
        .unwrap_err();
        assert!(matches!(err, SelectionError::TimeNotAvailable { .. }));
    }

    #[test]
    fn test_validate_selection_past_date() {
        let err = validate_selection(
            &catalog(),
            &calendar(),
            "1",
            date("2024-01-20"),
            time("09:00"),
            date("2024-02-01"),
        )
        .unwrap_err();
        assert_eq!(err, SelectionError::DateInPast(date("2024-01-20")));
    }

    #[test]
    fn test_validate_selection_today_is_allowed() {
        let selection = validate_selection(
            &catalog(),
            &calendar(),
            "2",
            date("2024-01-20"),
            time("09:30"),
            date("2024-01-20"),
        )
        .unwrap();
        assert_eq!(selection.service.id, "2");
    }
}
