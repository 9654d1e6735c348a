use chrono::{Days, NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{AvailabilityCalendar, ServiceCatalog, Shop};

/// Insert two demo barbershops when the shops table is empty, with slots
/// spread over the week starting at `today`. Handy for local development;
/// gated behind SEED_DEMO.
pub fn seed_demo(conn: &Connection, today: NaiveDate) -> anyhow::Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM shops", [], |row| row.get(0))?;
    if count > 0 {
        tracing::debug!("shops already present, skipping demo seed");
        return Ok(());
    }

    for shop in demo_shops(today)? {
        queries::save_shop(conn, &shop)?;
        tracing::info!("seeded demo shop: {}", shop.name);
    }
    Ok(())
}

fn demo_shops(today: NaiveDate) -> anyhow::Result<Vec<Shop>> {
    let mikes_catalog = ServiceCatalog::from_json(
        r#"{"services":[
            {"id":"1","name":"Haircut","durationMinutes":30,"price":"25"},
            {"id":"2","name":"Beard Trim","durationMinutes":15,"price":"15"},
            {"id":"3","name":"Hair Wash","durationMinutes":10,"price":"10"},
            {"id":"4","name":"Full Service","durationMinutes":60,"price":"45"}
        ]}"#,
    )?;

    let studio_catalog = ServiceCatalog::from_json(
        r#"{"services":[
            {"id":"1","name":"Haircut","durationMinutes":45,"price":"30"},
            {"id":"2","name":"Hair Wash","durationMinutes":20,"price":"12"},
            {"id":"3","name":"Styling","durationMinutes":30,"price":"25"}
        ]}"#,
    )?;

    const MIKES_TIMES: [&[&str]; 3] = [
        &["09:00", "09:30", "10:00", "11:00", "14:00", "15:00", "16:00"],
        &["09:00", "10:00", "11:00", "13:00", "14:00", "15:30", "16:30"],
        &["09:30", "10:30", "11:30", "14:30", "15:00", "16:00", "17:00"],
    ];
    const STUDIO_TIMES: [&[&str]; 3] = [
        &["10:00", "11:30", "14:00", "15:30", "17:00"],
        &["09:00", "10:30", "12:00", "14:30", "16:00"],
        &["09:30", "11:00", "13:30", "15:00", "16:30"],
    ];

    Ok(vec![
        Shop {
            id: "1".to_string(),
            name: "Mike's Barbershop".to_string(),
            address: "123 Main St, New York, NY".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            barber_name: "Mike Smith".to_string(),
            auto_confirm: true,
            catalog: mikes_catalog,
            calendar: week_calendar(today, &MIKES_TIMES),
        },
        Shop {
            id: "2".to_string(),
            name: "Style Studio".to_string(),
            address: "456 Oak Ave, New York, NY".to_string(),
            phone: "+1 (555) 987-6543".to_string(),
            barber_name: "John Doe".to_string(),
            auto_confirm: false,
            catalog: studio_catalog,
            calendar: week_calendar(today, &STUDIO_TIMES),
        },
    ])
}

fn week_calendar(today: NaiveDate, day_patterns: &[&[&str]]) -> AvailabilityCalendar {
    let mut calendar = AvailabilityCalendar::default();
    for offset in 0..7u64 {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            continue;
        };
        let pattern = day_patterns[(offset as usize) % day_patterns.len()];
        let times: Vec<NaiveTime> = pattern
            .iter()
            .filter_map(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
            .collect();
        calendar.insert_day(date, times);
    }
    calendar
}
