use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::repository::BookingRepository;
use crate::domain::types::{Booking, BookingForm, NewBooking, PHONE_DIGITS};
use crate::error::PortalError;

fn parse_date(raw: &str) -> Result<NaiveDate, PortalError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| PortalError::InvalidDate)
}

fn parse_time(raw: &str) -> Result<NaiveTime, PortalError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| PortalError::InvalidTime)
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_booking(form: BookingForm) -> Result<NewBooking, PortalError> {
    let name = form.name.trim();
    let email = form.email.trim();
    let date = form.date.trim();
    let phone = form.phone.trim();
    let time = form.time.trim();
    let message = form.message.trim();

    if [name, email, date, phone, time].iter().any(|f| f.is_empty()) {
        return Err(PortalError::MissingBookingFields);
    }
    if !is_valid_phone(phone) {
        return Err(PortalError::InvalidPhone);
    }

    Ok(NewBooking {
        name: name.to_owned(),
        email: email.to_owned(),
        date: parse_date(date)?,
        phone: phone.to_owned(),
        time: parse_time(time)?,
        message: (!message.is_empty()).then(|| message.to_owned()),
    })
}

pub struct SubmitBookingUseCase<B: BookingRepository> {
    pub bookings: B,
}

impl<B: BookingRepository> SubmitBookingUseCase<B> {
    pub async fn execute(&self, user_id: Uuid, form: BookingForm) -> Result<Booking, PortalError> {
        let new = validate_booking(form)?;
        let booking = Booking {
            id: Uuid::now_v7(),
            user_id,
            name: new.name,
            email: new.email,
            date: new.date,
            phone: new.phone,
            time: new.time,
            message: new.message,
            created_at: Utc::now(),
        };

        if let Err(e) = self.bookings.create(&booking).await {
            tracing::error!(error = %e, kind = e.kind(), user_id = %user_id, "booking insert failed");
            return Err(PortalError::BookingFailed);
        }

        tracing::info!(booking_id = %booking.id, user_id = %user_id, "booking submitted");
        Ok(booking)
    }
}
