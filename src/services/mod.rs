pub mod lifecycle;
pub mod slots;

pub use lifecycle::{BookingError, BookingPolicy};
pub use slots::{Selection, SelectionError};
