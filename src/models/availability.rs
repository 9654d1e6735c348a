use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

/// Per-shop bookable start times, keyed by calendar date. Supplied by the
/// shop owner and treated as read-only input by the booking logic; whether
/// a slot is already consumed by an appointment is tracked separately.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityCalendar {
    days: BTreeMap<NaiveDate, Vec<NaiveTime>>,
}

impl AvailabilityCalendar {
    /// Parse the stored JSON shape `{"2024-01-20": ["09:00", "09:30"]}`.
    /// Times are validated, de-duplicated, and kept sorted per date.
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(s)?;
        let mut days = BTreeMap::new();
        for (date_str, times_str) in raw {
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("invalid date: {date_str}"))?;
            let mut times = Vec::with_capacity(times_str.len());
            for t in times_str {
                let time = NaiveTime::parse_from_str(&t, "%H:%M")
                    .map_err(|_| anyhow::anyhow!("invalid time for {date_str}: {t}"))?;
                times.push(time);
            }
            times.sort();
            times.dedup();
            days.insert(date, times);
        }
        Ok(Self { days })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.to_map())?)
    }

    /// The wire shape: date strings to HH:MM strings, chronological.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.days
            .iter()
            .map(|(date, times)| {
                (
                    date.format("%Y-%m-%d").to_string(),
                    times.iter().map(|t| t.format("%H:%M").to_string()).collect(),
                )
            })
            .collect()
    }

    pub fn insert_day(&mut self, date: NaiveDate, mut times: Vec<NaiveTime>) {
        times.sort();
        times.dedup();
        self.days.insert(date, times);
    }

    /// The configured start times for `date`, empty if none.
    pub fn times_for(&self, date: NaiveDate) -> &[NaiveTime] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_slot(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.times_for(date).contains(&time)
    }

    /// Chronological iterator over dates that have at least one slot.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + Clone + '_ {
        self.days
            .iter()
            .filter(|(_, times)| !times.is_empty())
            .map(|(date, _)| *date)
    }
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

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{"2024-01-20":["09:00","09:30","10:00"],"2024-01-21":["09:00"]}"#;
        let cal = AvailabilityCalendar::from_json(json).unwrap();
        assert_eq!(cal.times_for(date("2024-01-20")).len(), 3);
        assert_eq!(cal.times_for(date("2024-01-21")).len(), 1);
        assert!(cal.times_for(date("2024-01-22")).is_empty());
    }

    #[test]
    fn test_parse_invalid_date() {
        assert!(AvailabilityCalendar::from_json(r#"{"not-a-date":["09:00"]}"#).is_err());
    }

    #[test]
    fn test_parse_invalid_time() {
        assert!(AvailabilityCalendar::from_json(r#"{"2024-01-20":["25:00"]}"#).is_err());
    }

    #[test]
    fn test_times_are_sorted_and_unique() {
        let json = r#"{"2024-01-20":["14:00","09:00","09:00","10:30"]}"#;
        let cal = AvailabilityCalendar::from_json(json).unwrap();
        let times: Vec<String> = cal
            .times_for(date("2024-01-20"))
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect();
        assert_eq!(times, vec!["09:00", "10:30", "14:00"]);
    }

    #[test]
    fn test_has_slot() {
        let json = r#"{"2024-01-20":["09:00"]}"#;
        let cal = AvailabilityCalendar::from_json(json).unwrap();
        assert!(cal.has_slot(date("2024-01-20"), time("09:00")));
        assert!(!cal.has_slot(date("2024-01-20"), time("09:30")));
        assert!(!cal.has_slot(date("2024-01-21"), time("09:00")));
    }

    #[test]
    fn test_dates_skips_empty_days() {
        let json = r#"{"2024-01-20":["09:00"],"2024-01-21":[],"2024-01-22":["10:00"]}"#;
        let cal = AvailabilityCalendar::from_json(json).unwrap();
        let dates: Vec<NaiveDate> = cal.dates().collect();
        assert_eq!(dates, vec![date("2024-01-20"), date("2024-01-22")]);
    }

    #[test]
    fn test_round_trip() {
        let json = r#"{"2024-01-20":["09:00","10:00"]}"#;
        let cal = AvailabilityCalendar::from_json(json).unwrap();
        let again = AvailabilityCalendar::from_json(&cal.to_json().unwrap()).unwrap();
        assert_eq!(again.times_for(date("2024-01-20")).len(), 2);
    }
}
