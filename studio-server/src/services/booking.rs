//! Booking placement shared by the public booking form and challenge scheduling

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use shared::availability::{self, SlotRules, TimeSlot};
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, GiftCard, PromoCode, ServiceType, KEY_SLOT_RULES};
use shared::pricing::{self, Quote};
use sqlx::PgPool;

use crate::db::{self, BoxError, bookings::NewBooking};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Slot rules from settings, falling back to the built-in schedule.
pub async fn slot_rules(pool: &PgPool) -> Result<SlotRules, BoxError> {
    Ok(db::settings::get_typed::<SlotRules>(pool, KEY_SLOT_RULES)
        .await?
        .unwrap_or_default())
}

/// Active service type or the matching error.
pub async fn bookable_service_type(pool: &PgPool, id: i64) -> ServiceResult<ServiceType> {
    let service = db::service_types::get(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ServiceTypeNotFound).with_detail("service_type_id", id))?;
    if !service.is_active {
        return Err(AppError::new(ErrorCode::ServiceTypeInactive)
            .with_detail("service_type_id", id)
            .into());
    }
    Ok(service)
}

/// Session length requested for `service`: explicit value or the package default.
pub fn session_duration(service: &ServiceType, requested: Option<u32>) -> Result<u32, AppError> {
    let hours = requested.unwrap_or_else(|| service.duration_hours.max(1) as u32);
    Ok(availability::validate_duration(hours)?)
}

/// What part of the day a booking occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    WholeDay,
    Session { start: NaiveTime, duration_hours: u32 },
}

/// Validate date and start time against the calendar rules, ignoring
/// existing bookings.
pub fn requested_window(
    service: &ServiceType,
    date: NaiveDate,
    today: NaiveDate,
    start_time: Option<&str>,
    duration_hours: Option<u32>,
    rules: &SlotRules,
) -> Result<(Window, Option<TimeSlot>), AppError> {
    if date < today {
        return Err(AppError::new(ErrorCode::BookingDateInPast).with_detail("date", date.to_string()));
    }
    if service.kind.blocks_whole_day() {
        return Ok((Window::WholeDay, None));
    }

    let duration_hours = session_duration(service, duration_hours)?;
    let start = start_time
        .ok_or_else(|| AppError::invalid_field("start_time", "Start time is required for sessions"))
        .and_then(|s| Ok(availability::parse_hhmm(s)?))?;
    let slot = availability::validate_session_request(date, start, duration_hours, &[], rules)?;
    Ok((Window::Session { start, duration_hours }, Some(slot)))
}

/// Re-check `window` against the live bookings of the date.
pub fn check_window(
    window: Window,
    date: NaiveDate,
    booked: &[availability::BookedRange],
    rules: &SlotRules,
) -> Result<(), AppError> {
    match window {
        Window::WholeDay => availability::validate_whole_day_request(date, booked),
        Window::Session { start, duration_hours } => {
            availability::validate_session_request(date, start, duration_hours, booked, rules).map(|_| ())
        }
    }
}

/// Voucher codes attached to a booking or quote
pub async fn resolve_vouchers(
    pool: &PgPool,
    promo_code: Option<&str>,
    gift_card_code: Option<&str>,
) -> ServiceResult<(Option<PromoCode>, Option<GiftCard>)> {
    let promo = match promo_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Some(
            db::promo_codes::find_by_code(pool, code)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::PromoCodeNotFound))?,
        ),
        None => None,
    };
    let gift_card = match gift_card_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Some(
            db::gift_cards::find_by_code(pool, code)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::GiftCardNotFound))?,
        ),
        None => None,
    };
    Ok((promo, gift_card))
}

/// Client-facing part of a booking request
#[derive(Debug, Clone)]
pub struct BookingDraft<'a> {
    pub service_type_id: i64,
    pub date: &'a str,
    pub start_time: Option<&'a str>,
    pub duration_hours: Option<u32>,
    pub client_name: &'a str,
    pub client_email: &'a str,
    pub client_phone: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub promo_code: Option<&'a str>,
    pub gift_card_code: Option<&'a str>,
    /// Challenge being scheduled: `(id, discount_percent)`
    pub challenge: Option<(i64, i32)>,
}

fn validate_client(name: &str, email: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::invalid_field("client_name", "Name is required"));
    }
    if !shared::util::is_valid_email(email) {
        return Err(AppError::invalid_field("client_email", "Invalid email address"));
    }
    Ok(())
}

/// Validate, price and store a booking, then notify client and studio.
pub async fn place_booking(state: &AppState, draft: &BookingDraft<'_>) -> ServiceResult<Booking> {
    validate_client(draft.client_name, draft.client_email)?;

    let service = bookable_service_type(&state.pool, draft.service_type_id).await?;
    let date = availability::parse_date(draft.date).map_err(AppError::from)?;
    let today = chrono::Local::now().date_naive();
    let rules = slot_rules(&state.pool).await?;

    let (window, slot) = requested_window(
        &service,
        date,
        today,
        draft.start_time,
        draft.duration_hours,
        &rules,
    )?;

    let subtotal = match draft.challenge {
        Some((_, discount_percent)) => pricing::challenge_price(service.price, discount_percent),
        None => service.price,
    };
    let (promo, gift_card) = resolve_vouchers(&state.pool, draft.promo_code, draft.gift_card_code).await?;
    let now = shared::util::now_millis();
    let quote: Quote = pricing::quote(subtotal, promo.as_ref(), gift_card.as_ref(), now)?;

    let new = NewBooking {
        service_type_id: service.id,
        date: date.format("%Y-%m-%d").to_string(),
        start_time: slot.map(|s| availability::format_hhmm(s.start)),
        end_time: slot.map(|s| availability::format_hhmm(s.end)),
        client_name: draft.client_name.trim().to_string(),
        client_email: draft.client_email.trim().to_lowercase(),
        client_phone: draft.client_phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        notes: draft.notes.map(str::to_string),
        price: quote.subtotal,
        discount_amount: quote.promo_discount,
        gift_card_amount: quote.gift_card_applied,
        total: quote.total,
        promo_code: promo.as_ref().map(|p| p.code.clone()),
        gift_card_code: gift_card
            .as_ref()
            .filter(|_| quote.gift_card_applied > Decimal::ZERO)
            .map(|g| g.code.clone()),
        challenge_id: draft.challenge.map(|(id, _)| id),
    };

    let booking = db::bookings::create_checked(&state.pool, &new, |booked| {
        check_window(window, date, booked, &rules)
    })
    .await?;

    tracing::info!(
        booking_id = booking.id,
        date = %booking.date,
        start_time = ?booking.start_time,
        service = %service.slug,
        total = %booking.total,
        "Booking created"
    );

    state.mailer.booking_created(&booking, &service.name);
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ServiceKind;

    fn service(kind: ServiceKind) -> ServiceType {
        ServiceType {
            id: 1,
            name: "Portrait".into(),
            slug: "portrait".into(),
            kind,
            price: Decimal::new(30000, 2),
            duration_hours: 1,
            description: None,
            is_active: true,
            sort_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn day(s: &str) -> NaiveDate {
        availability::parse_date(s).unwrap()
    }

    #[test]
    fn past_dates_are_rejected() {
        let err = requested_window(
            &service(ServiceKind::Session),
            day("2024-06-11"),
            day("2024-06-12"),
            Some("18:00"),
            None,
            &SlotRules::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BookingDateInPast);
    }

    #[test]
    fn whole_day_services_ignore_start_time() {
        let (window, slot) = requested_window(
            &service(ServiceKind::Wedding),
            day("2024-06-15"),
            day("2024-06-12"),
            Some("10:00"),
            None,
            &SlotRules::default(),
        )
        .unwrap();
        assert_eq!(window, Window::WholeDay);
        assert!(slot.is_none());
    }

    #[test]
    fn session_uses_package_duration_by_default() {
        let (window, slot) = requested_window(
            &service(ServiceKind::Session),
            day("2024-06-12"),
            day("2024-06-12"),
            Some("18:00"),
            None,
            &SlotRules::default(),
        )
        .unwrap();
        assert_eq!(
            window,
            Window::Session {
                start: availability::parse_hhmm("18:00").unwrap(),
                duration_hours: 1
            }
        );
        assert_eq!(availability::format_hhmm(slot.unwrap().end), "19:00");
    }

    #[test]
    fn session_requires_offered_start() {
        let err = requested_window(
            &service(ServiceKind::Session),
            day("2024-06-12"),
            day("2024-06-12"),
            Some("17:00"),
            Some(2),
            &SlotRules::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::SlotNotOffered);

        let err = requested_window(
            &service(ServiceKind::Session),
            day("2024-06-12"),
            day("2024-06-12"),
            None,
            None,
            &SlotRules::default(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = session_duration(&service(ServiceKind::Session), Some(3)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDuration);
    }

    #[test]
    fn live_check_detects_conflicts() {
        let rules = SlotRules::default();
        let saturday = day("2024-06-15");
        let window = Window::Session {
            start: availability::parse_hhmm("19:00").unwrap(),
            duration_hours: 1,
        };
        // 17:00-19:00 touches but does not overlap 19:00-20:00
        let earlier = availability::BookedRange::new(17 * 60, 19 * 60);
        assert!(check_window(window, saturday, &[earlier], &rules).is_ok());

        let overlapping = availability::BookedRange::new(18 * 60, 20 * 60);
        let err = check_window(window, saturday, &[overlapping], &rules).unwrap_err();
        assert_eq!(err.code, ErrorCode::SlotUnavailable);

        let err = check_window(window, saturday, &[availability::BookedRange::WHOLE_DAY], &rules).unwrap_err();
        assert_eq!(err.code, ErrorCode::DayFullyBooked);

        let err = check_window(Window::WholeDay, saturday, &[earlier], &rules).unwrap_err();
        assert_eq!(err.code, ErrorCode::DayFullyBooked);
    }

    #[test]
    fn client_fields_are_checked() {
        assert!(validate_client("Ola", "ola@example.com").is_ok());
        assert_eq!(validate_client(" ", "ola@example.com").unwrap_err().code, ErrorCode::ValidationFailed);
        assert_eq!(validate_client("Ola", "nope").unwrap_err().code, ErrorCode::ValidationFailed);
    }
}
