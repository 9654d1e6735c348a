use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppointmentRepository, SqliteRepository};
use crate::errors::AppError;
use crate::models::{BookingQr, Service, Shop};
use crate::services::slots;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSummary {
    id: String,
    name: String,
    address: String,
    phone: String,
    barber: String,
}

impl From<&Shop> for ShopSummary {
    fn from(shop: &Shop) -> Self {
        Self {
            id: shop.id.clone(),
            name: shop.name.clone(),
            address: shop.address.clone(),
            phone: shop.phone.clone(),
            barber: shop.barber_name.clone(),
        }
    }
}

// GET /api/shops
pub async fn list_shops(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShopSummary>>, AppError> {
    let db = state.db.lock().unwrap();
    let shops = queries::list_shops(&db)?;
    Ok(Json(shops.iter().map(ShopSummary::from).collect()))
}

// GET /api/shops/:id
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDetail {
    #[serde(flatten)]
    summary: ShopSummary,
    auto_confirm: bool,
    services: Vec<Service>,
    available_slots: BTreeMap<String, Vec<String>>,
}

pub async fn get_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShopDetail>, AppError> {
    let db = state.db.lock().unwrap();
    let shop = load_shop(&db, &id)?;

    Ok(Json(ShopDetail {
        summary: ShopSummary::from(&shop),
        auto_confirm: shop.auto_confirm,
        services: shop.catalog.services.clone(),
        available_slots: shop.calendar.to_map(),
    }))
}

// GET /api/shops/:id/dates
#[derive(Deserialize)]
pub struct DatesQuery {
    pub from: Option<NaiveDate>,
    pub days: Option<u32>,
}

pub async fn get_dates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let today = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let horizon = query.days.unwrap_or(state.config.horizon_days);

    let db = state.db.lock().unwrap();
    let shop = load_shop(&db, &id)?;

    let dates: Vec<NaiveDate> = slots::available_dates(&shop.calendar, today, horizon).collect();
    Ok(Json(dates))
}

// GET /api/shops/:id/slots?date=
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Serialize)]
pub struct SlotResponse {
    #[serde(with = "crate::models::appointment::hhmm")]
    pub time: NaiveTime,
    /// Consumed by an existing pending or confirmed appointment.
    pub taken: bool,
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let db = state.db.lock().unwrap();
    let shop = load_shop(&db, &id)?;

    // The calendar alone does not know which slots appointments already
    // hold; cross-check against the repository here.
    let repo = SqliteRepository::new(&db);
    let existing = repo.find_by_shop_and_date(&id, query.date)?;

    let response = slots::available_times(&shop.calendar, query.date)
        .iter()
        .map(|time| SlotResponse {
            time: *time,
            taken: existing.iter().any(|a| a.time == *time && a.blocks_slot()),
        })
        .collect();
    Ok(Json(response))
}

// GET /api/shops/:id/qr
pub async fn get_qr(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BookingQr>, AppError> {
    let db = state.db.lock().unwrap();
    let shop = load_shop(&db, &id)?;
    Ok(Json(BookingQr::for_shop(&shop)))
}

// POST /api/qr/scan
#[derive(Deserialize)]
pub struct ScanRequest {
    pub payload: String,
}

pub async fn scan_qr(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<ShopSummary>, AppError> {
    let qr = BookingQr::from_json(&body.payload)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let db = state.db.lock().unwrap();
    let shop = load_shop(&db, &qr.shop_id)?;
    Ok(Json(ShopSummary::from(&shop)))
}

fn load_shop(db: &rusqlite::Connection, id: &str) -> Result<Shop, AppError> {
    queries::get_shop(db, id)?.ok_or_else(|| AppError::NotFound(format!("shop {id}")))
}
