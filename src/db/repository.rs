use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{Appointment, AppointmentStatus};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("appointment not found: {0}")]
    NotFound(String),

    #[error("duplicate appointment id: {0}")]
    DuplicateId(String),

    #[error("slot already booked")]
    SlotTaken,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Persistence boundary for appointment records. The sqlite implementation
/// backs the server; tests may substitute their own.
///
/// `insert` is the authoritative serialization point for double-booking:
/// implementations must reject a second pending/confirmed appointment on
/// the same (shop, date, time) atomically, so the lifecycle's own check
/// stays a fast path rather than a correctness requirement.
pub trait AppointmentRepository {
    fn find_by_shop_and_date(
        &self,
        shop_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError>;

    fn insert(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError>;

    fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError>;

    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Appointment>, RepositoryError>;

    fn get(&self, id: &str) -> Result<Option<Appointment>, RepositoryError>;
}

pub struct SqliteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentRepository for SqliteRepository<'_> {
    fn find_by_shop_and_date(
        &self,
        shop_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(queries::get_appointments_for_shop_and_date(
            self.conn, shop_id, date,
        )?)
    }

    fn insert(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        match queries::insert_appointment(self.conn, appointment) {
            Ok(()) => Ok(appointment.clone()),
            Err(e) if is_constraint_violation(&e) => {
                // The primary key and the partial slot index are the only
                // unique constraints on the table.
                if constraint_message(&e).contains("appointments.id") {
                    Err(RepositoryError::DuplicateId(appointment.id.clone()))
                } else {
                    Err(RepositoryError::SlotTaken)
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        let now = Utc::now().naive_utc();
        let changed = queries::update_appointment_status(self.conn, id, status, now)?;
        if changed == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        queries::get_appointment(self.conn, id)?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(queries::get_appointments_for_customer(self.conn, customer_id)?)
    }

    fn get(&self, id: &str) -> Result<Option<Appointment>, RepositoryError> {
        Ok(queries::get_appointment(self.conn, id)?)
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn constraint_message(e: &rusqlite::Error) -> &str {
    match e {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg,
        _ => "",
    }
}
