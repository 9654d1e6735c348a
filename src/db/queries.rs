use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::models::{Appointment, AppointmentStatus, AvailabilityCalendar, ServiceCatalog, Shop};

const APPOINTMENT_COLUMNS: &str = "id, shop_id, customer_id, service_id, date, time, \
     duration_minutes, price, status, notes, created_at, updated_at";

// ── Appointments ──

pub fn insert_appointment(conn: &Connection, apt: &Appointment) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO appointments (id, shop_id, customer_id, service_id, date, time, duration_minutes, price, status, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            apt.id,
            apt.shop_id,
            apt.customer_id,
            apt.service_id,
            apt.date.format("%Y-%m-%d").to_string(),
            apt.time.format("%H:%M").to_string(),
            apt.duration_minutes,
            apt.price.to_string(),
            apt.status.as_str(),
            apt.notes,
            apt.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            apt.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> rusqlite::Result<Option<Appointment>> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1");
    match conn.query_row(&sql, params![id], parse_appointment_row) {
        Ok(apt) => Ok(Some(apt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn get_appointments_for_shop_and_date(
    conn: &Connection,
    shop_id: &str,
    date: NaiveDate,
) -> rusqlite::Result<Vec<Appointment>> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE shop_id = ?1 AND date = ?2 ORDER BY time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![shop_id, date.format("%Y-%m-%d").to_string()],
        parse_appointment_row,
    )?;
    rows.collect()
}

pub fn get_appointments_for_shop(
    conn: &Connection,
    shop_id: &str,
    date: Option<NaiveDate>,
    status: Option<AppointmentStatus>,
) -> rusqlite::Result<Vec<Appointment>> {
    let mut sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE shop_id = ?1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(shop_id.to_string())];

    if let Some(date) = date {
        params_vec.push(Box::new(date.format("%Y-%m-%d").to_string()));
        sql.push_str(&format!(" AND date = ?{}", params_vec.len()));
    }
    if let Some(status) = status {
        params_vec.push(Box::new(status.as_str().to_string()));
        sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY date ASC, time ASC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), parse_appointment_row)?;
    rows.collect()
}

pub fn get_appointments_for_customer(
    conn: &Connection,
    customer_id: &str,
) -> rusqlite::Result<Vec<Appointment>> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE customer_id = ?1 ORDER BY date DESC, time DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![customer_id], parse_appointment_row)?;
    rows.collect()
}

pub fn update_appointment_status(
    conn: &Connection,
    id: &str,
    status: AppointmentStatus,
    updated_at: NaiveDateTime,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            status.as_str(),
            updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            id
        ],
    )
}

fn parse_appointment_row(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    let date_str: String = row.get(4)?;
    let time_str: String = row.get(5)?;
    let price_str: String = row.get(7)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Appointment {
        id: row.get(0)?,
        shop_id: row.get(1)?,
        customer_id: row.get(2)?,
        service_id: row.get(3)?,
        date: parse_column(4, &date_str, |s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))?,
        time: parse_column(5, &time_str, |s| NaiveTime::parse_from_str(s, "%H:%M"))?,
        duration_minutes: row.get(6)?,
        price: parse_column(7, &price_str, Decimal::from_str)?,
        status: AppointmentStatus::parse(&status_str),
        notes: row.get(9)?,
        created_at: parse_column(10, &created_at_str, |s| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        })?,
        updated_at: parse_column(11, &updated_at_str, |s| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        })?,
    })
}

fn parse_column<T, E>(
    idx: usize,
    raw: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> rusqlite::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    parse(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ── Shops ──

pub fn save_shop(conn: &Connection, shop: &Shop) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO shops (id, name, address, phone, barber_name, auto_confirm, services, availability)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           address = excluded.address,
           phone = excluded.phone,
           barber_name = excluded.barber_name,
           auto_confirm = excluded.auto_confirm,
           services = excluded.services,
           availability = excluded.availability,
           updated_at = datetime('now')",
        params![
            shop.id,
            shop.name,
            shop.address,
            shop.phone,
            shop.barber_name,
            shop.auto_confirm as i32,
            shop.catalog.to_json()?,
            shop.calendar.to_json()?,
        ],
    )?;
    Ok(())
}

pub fn get_shop(conn: &Connection, id: &str) -> anyhow::Result<Option<Shop>> {
    let result = conn.query_row(
        "SELECT id, name, address, phone, barber_name, auto_confirm, services, availability
         FROM shops WHERE id = ?1",
        params![id],
        parse_shop_row,
    );

    match result {
        Ok(raw) => Ok(Some(raw.into_shop()?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_shops(conn: &Connection) -> anyhow::Result<Vec<Shop>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, address, phone, barber_name, auto_confirm, services, availability
         FROM shops ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([], parse_shop_row)?;

    let mut shops = vec![];
    for row in rows {
        shops.push(row?.into_shop()?);
    }
    Ok(shops)
}

struct RawShop {
    id: String,
    name: String,
    address: String,
    phone: String,
    barber_name: String,
    auto_confirm: bool,
    services: String,
    availability: String,
}

impl RawShop {
    fn into_shop(self) -> anyhow::Result<Shop> {
        Ok(Shop {
            catalog: ServiceCatalog::from_json(&self.services)?,
            calendar: AvailabilityCalendar::from_json(&self.availability)?,
            id: self.id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            barber_name: self.barber_name,
            auto_confirm: self.auto_confirm,
        })
    }
}

fn parse_shop_row(row: &rusqlite::Row) -> rusqlite::Result<RawShop> {
    Ok(RawShop {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone: row.get(3)?,
        barber_name: row.get(4)?,
        auto_confirm: row.get::<_, i32>(5)? != 0,
        services: row.get(6)?,
        availability: row.get(7)?,
    })
}
