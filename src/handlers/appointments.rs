use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::db::{queries, AppointmentRepository, SqliteRepository};
use crate::errors::AppError;
use crate::models::{Appointment, AppointmentStatus};
use crate::services::{lifecycle, slots, BookingPolicy};
use crate::state::AppState;

// POST /api/appointments
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub shop_id: String,
    pub customer_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "crate::models::appointment::hhmm")]
    pub time: NaiveTime,
    pub notes: Option<String>,
}

pub async fn book(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BookRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let now = Utc::now().naive_utc();

    let db = state.db.lock().unwrap();
    let shop = queries::get_shop(&db, &body.shop_id)?
        .ok_or_else(|| AppError::NotFound(format!("shop {}", body.shop_id)))?;

    let selection = slots::validate_selection(
        &shop.catalog,
        &shop.calendar,
        &body.service_id,
        body.date,
        body.time,
        now.date(),
    )?;

    let policy = BookingPolicy {
        auto_confirm: shop.auto_confirm,
        min_cancel_notice_hours: state.config.min_cancel_notice_hours,
    };

    let repo = SqliteRepository::new(&db);
    let appointment = lifecycle::create(
        &repo,
        &policy,
        &shop.id,
        &body.customer_id,
        &selection,
        body.notes,
        now,
    )?;
    let stored = repo.insert(&appointment)?;

    tracing::info!(
        "booked appointment {} at shop {} for {} {}",
        stored.id,
        stored.shop_id,
        stored.date,
        stored.time.format("%H:%M"),
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

// GET /api/appointments?customerId=
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerQuery {
    pub customer_id: String,
    pub filter: Option<String>,
}

pub async fn list_for_customer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let now = Utc::now().naive_utc();

    let db = state.db.lock().unwrap();
    let repo = SqliteRepository::new(&db);
    let all = repo.list_by_customer(&query.customer_id)?;

    let filtered = match query.filter.as_deref() {
        None | Some("all") => all,
        Some("upcoming") => all
            .into_iter()
            .filter(|a| lifecycle::is_upcoming(a, now))
            .collect(),
        Some("completed") => status_filter(all, AppointmentStatus::Completed),
        Some("cancelled") => status_filter(all, AppointmentStatus::Cancelled),
        Some(other) => {
            return Err(AppError::BadRequest(format!("unknown filter: {other}")));
        }
    };
    Ok(Json(filtered))
}

fn status_filter(all: Vec<Appointment>, status: AppointmentStatus) -> Vec<Appointment> {
    all.into_iter().filter(|a| a.status == status).collect()
}

// GET /api/shops/:id/appointments?date=&status=
#[derive(Deserialize)]
pub struct ShopAppointmentsQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
}

pub async fn list_for_shop(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
    Query(query): Query<ShopAppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let status = match query.status.as_deref() {
        None => None,
        Some("pending") => Some(AppointmentStatus::Pending),
        Some("confirmed") => Some(AppointmentStatus::Confirmed),
        Some("completed") => Some(AppointmentStatus::Completed),
        Some("cancelled") => Some(AppointmentStatus::Cancelled),
        Some(other) => {
            return Err(AppError::BadRequest(format!("unknown status: {other}")));
        }
    };

    let db = state.db.lock().unwrap();
    let appointments = queries::get_appointments_for_shop(&db, &shop_id, query.date, status)?;
    Ok(Json(appointments))
}

// POST /api/appointments/:id/confirm | complete | cancel
pub async fn confirm(
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<Json<Appointment>, AppError> {
    apply_transition(state, id, AppointmentStatus::Confirmed).await
}

pub async fn complete(
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<Json<Appointment>, AppError> {
    apply_transition(state, id, AppointmentStatus::Completed).await
}

pub async fn cancel(
    state: State<Arc<AppState>>,
    id: Path<String>,
) -> Result<Json<Appointment>, AppError> {
    apply_transition(state, id, AppointmentStatus::Cancelled).await
}

async fn apply_transition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    target: AppointmentStatus,
) -> Result<Json<Appointment>, AppError> {
    let now = Utc::now().naive_utc();
    let policy = BookingPolicy {
        min_cancel_notice_hours: state.config.min_cancel_notice_hours,
        ..BookingPolicy::default()
    };

    let db = state.db.lock().unwrap();
    let repo = SqliteRepository::new(&db);
    let appointment = repo
        .get(&id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;

    let updated = lifecycle::transition(&appointment, target, &policy, now)?;
    let stored = repo.update_status(&updated.id, updated.status)?;

    tracing::info!("appointment {} moved to {}", stored.id, stored.status);
    Ok(Json(stored))
}
