use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::db::{AppointmentRepository, RepositoryError};
use crate::models::{Appointment, AppointmentStatus, MAX_NOTES_LEN};
use crate::services::slots::Selection;

/// Shop-level booking policy. `auto_confirm` decides the initial status of
/// a new appointment; `min_cancel_notice_hours` is the shortest notice at
/// which a confirmed appointment may still be cancelled.
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    pub auto_confirm: bool,
    pub min_cancel_notice_hours: i64,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            auto_confirm: false,
            min_cancel_notice_hours: 2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("that time slot is already booked")]
    SlotTaken,

    #[error("cannot move a {from} appointment to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("cancellations require at least {min_notice_hours} hours notice")]
    CancellationWindowClosed { min_notice_hours: i64 },

    #[error("notes are limited to 200 characters")]
    NotesTooLong,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Build a new appointment from a validated selection. Reads existing
/// appointments for the day to reject a taken slot early; the repository's
/// unique slot index remains the authoritative guard when callers race.
/// Returns the record without persisting it.
pub fn create(
    repo: &dyn AppointmentRepository,
    policy: &BookingPolicy,
    shop_id: &str,
    customer_id: &str,
    selection: &Selection,
    notes: Option<String>,
    now: NaiveDateTime,
) -> Result<Appointment, BookingError> {
    let notes = match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => return Err(BookingError::NotesTooLong),
        Some(n) if n.is_empty() => None,
        other => other,
    };

    let existing = repo.find_by_shop_and_date(shop_id, selection.date)?;
    if existing
        .iter()
        .any(|a| a.time == selection.time && a.blocks_slot())
    {
        return Err(BookingError::SlotTaken);
    }

    let status = if policy.auto_confirm {
        AppointmentStatus::Confirmed
    } else {
        AppointmentStatus::Pending
    };

    Ok(Appointment {
        id: Uuid::new_v4().to_string(),
        shop_id: shop_id.to_string(),
        customer_id: customer_id.to_string(),
        service_id: selection.service.id.clone(),
        date: selection.date,
        time: selection.time,
        // Frozen snapshots: later catalog edits must not touch this record.
        duration_minutes: selection.service.duration_minutes,
        price: selection.service.price,
        status,
        notes,
        created_at: now,
        updated_at: now,
    })
}

/// Validate and apply a status transition, returning the updated record.
/// Does not persist. Cancelling a confirmed appointment closer to its
/// start than the policy's notice window is rejected; pending appointments
/// may be cancelled at any time.
pub fn transition(
    appointment: &Appointment,
    target: AppointmentStatus,
    policy: &BookingPolicy,
    now: NaiveDateTime,
) -> Result<Appointment, BookingError> {
    if !appointment.status.can_transition_to(target) {
        return Err(BookingError::InvalidTransition {
            from: appointment.status,
            to: target,
        });
    }

    if target == AppointmentStatus::Cancelled
        && appointment.status == AppointmentStatus::Confirmed
    {
        let notice = Duration::hours(policy.min_cancel_notice_hours);
        if appointment.starts_at() - now < notice {
            return Err(BookingError::CancellationWindowClosed {
                min_notice_hours: policy.min_cancel_notice_hours,
            });
        }
    }

    let mut updated = appointment.clone();
    updated.status = target;
    updated.updated_at = now;
    Ok(updated)
}

/// An appointment still ahead of `now` that has not been cancelled.
pub fn is_upcoming(appointment: &Appointment, now: NaiveDateTime) -> bool {
    appointment.starts_at() > now && appointment.status != AppointmentStatus::Cancelled
}
