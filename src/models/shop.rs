use serde::{Deserialize, Serialize};

use crate::models::{AvailabilityCalendar, ServiceCatalog};

/// A barbershop: contact details, the explicit confirmation policy, the
/// service catalog, and the availability calendar. Catalog and calendar
/// are stored as JSON columns and validated when a row is loaded.
#[derive(Debug, Clone)]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub barber_name: String,
    /// When true, new appointments start out confirmed; otherwise they
    /// start pending and wait for the barber.
    pub auto_confirm: bool,
    pub catalog: ServiceCatalog,
    pub calendar: AvailabilityCalendar,
}

/// The payload embedded in a shop's booking QR code. `kind` is a fixed
/// discriminator so a scanner can reject codes that are not booking codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingQr {
    pub shop_id: String,
    pub shop_name: String,
    pub barber: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub const BOOKING_QR_KIND: &str = "barber_booking";

impl BookingQr {
    pub fn for_shop(shop: &Shop) -> Self {
        Self {
            shop_id: shop.id.clone(),
            shop_name: shop.name.clone(),
            barber: shop.barber_name.clone(),
            kind: BOOKING_QR_KIND.to_string(),
        }
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let qr: BookingQr = serde_json::from_str(s)?;
        if qr.kind != BOOKING_QR_KIND {
            anyhow::bail!("not a booking QR code: {}", qr.kind);
        }
        if qr.shop_id.is_empty() {
            anyhow::bail!("booking QR code without shop id");
        }
        Ok(qr)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
