//! sea-orm entities for the portal database.

pub mod bookings;
pub mod totp_devices;
pub mod users;
