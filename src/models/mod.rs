pub mod appointment;
pub mod availability;
pub mod service;
pub mod shop;

pub use appointment::{Appointment, AppointmentStatus, MAX_NOTES_LEN};
pub use availability::AvailabilityCalendar;
pub use service::{Service, ServiceCatalog};
pub use shop::{BookingQr, Shop, BOOKING_QR_KIND};
