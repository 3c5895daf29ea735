//! Recipient side of a photo challenge and admin status changes

use shared::challenge::{self, ChallengeStatus};
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, ChallengeSchedule, PhotoChallenge};
use shared::util::now_millis;

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

use super::booking::{BookingDraft, place_booking};
use super::checkout::service_name;

/// Paid challenge behind an invitation token. Unpaid challenges are not
/// visible to the recipient yet.
async fn find_open(state: &AppState, token: &str) -> ServiceResult<PhotoChallenge> {
    let found = db::challenges::find_by_token(&state.pool, token.trim()).await?;
    match found {
        Some(c) if c.is_paid => Ok(c),
        _ => Err(AppError::new(ErrorCode::ChallengeNotFound).into()),
    }
}

/// Expire the challenge if its deadline passed; errors with `ChallengeExpired`.
async fn ensure_not_expired(state: &AppState, c: &PhotoChallenge) -> ServiceResult<()> {
    if c.status == ChallengeStatus::Expired {
        return Err(AppError::new(ErrorCode::ChallengeExpired).into());
    }
    if challenge::is_expired(c.status, c.expires_at, now_millis()) {
        db::challenges::update_status(&state.pool, c.id, c.status, ChallengeStatus::Expired).await?;
        tracing::info!(challenge_id = c.id, "Photo challenge expired on access");
        return Err(AppError::new(ErrorCode::ChallengeExpired).into());
    }
    Ok(())
}

/// Guarded status write; a concurrent change surfaces as an invalid transition.
async fn move_status(
    state: &AppState,
    c: &PhotoChallenge,
    to: ChallengeStatus,
) -> ServiceResult<PhotoChallenge> {
    db::challenges::update_status(&state.pool, c.id, c.status, to)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::ChallengeInvalidTransition)
                .with_detail("from", c.status.as_str())
                .with_detail("to", to.as_str())
                .into()
        })
}

/// Recipient opens the invitation link: `sent` becomes `viewed`.
pub async fn open(state: &AppState, token: &str) -> ServiceResult<PhotoChallenge> {
    let c = find_open(state, token).await?;
    ensure_not_expired(state, &c).await?;

    if c.status != ChallengeStatus::Sent {
        return Ok(c);
    }
    challenge::transition(c.status, ChallengeStatus::Viewed)?;
    match db::challenges::update_status(&state.pool, c.id, c.status, ChallengeStatus::Viewed).await? {
        Some(viewed) => Ok(viewed),
        // Opened twice at once; the other request already moved it
        None => find_open(state, token).await,
    }
}

/// Recipient accepts or declines.
pub async fn respond(state: &AppState, token: &str, accept: bool) -> ServiceResult<PhotoChallenge> {
    let c = find_open(state, token).await?;
    ensure_not_expired(state, &c).await?;

    let to = challenge::respond(c.status, accept)?;
    let updated = move_status(state, &c, to).await?;

    tracing::info!(challenge_id = updated.id, status = updated.status.as_str(), "Photo challenge answered");
    if updated.status == ChallengeStatus::Accepted {
        state.mailer.challenge_accepted(&updated);
    }
    Ok(updated)
}

/// Accepted recipient books the discounted session; the challenge becomes `scheduled`.
pub async fn schedule(state: &AppState, token: &str, req: &ChallengeSchedule) -> ServiceResult<Booking> {
    let c = find_open(state, token).await?;
    ensure_not_expired(state, &c).await?;
    challenge::transition(c.status, ChallengeStatus::Scheduled)?;

    let booking = place_booking(
        state,
        &BookingDraft {
            service_type_id: c.service_type_id,
            date: &req.date,
            start_time: req.start_time.as_deref(),
            duration_hours: req.duration_hours,
            client_name: &c.recipient_name,
            client_email: &c.recipient_email,
            client_phone: req.client_phone.as_deref(),
            notes: req.notes.as_deref(),
            promo_code: None,
            gift_card_code: None,
            challenge: Some((c.id, c.discount_percent)),
        },
    )
    .await?;

    tracing::info!(challenge_id = c.id, booking_id = booking.id, "Photo challenge scheduled");
    Ok(booking)
}

/// Moves that belong to the booking flow: scheduling creates a booking and
/// `scheduled -> accepted` follows cancelling or deleting it.
fn admin_may_set(from: ChallengeStatus, to: ChallengeStatus) -> bool {
    to != ChallengeStatus::Scheduled && !(from == ChallengeStatus::Scheduled && to == ChallengeStatus::Accepted)
}

/// Back-office status change through the lifecycle rules.
pub async fn set_status(state: &AppState, id: i64, to: ChallengeStatus) -> ServiceResult<PhotoChallenge> {
    let c = db::challenges::get(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ChallengeNotFound))?;

    if !admin_may_set(c.status, to) {
        return Err(AppError::new(ErrorCode::ChallengeInvalidTransition)
            .with_detail("from", c.status.as_str())
            .with_detail("to", to.as_str())
            .into());
    }
    if c.status == to && to == ChallengeStatus::Viewed {
        return Ok(c);
    }
    challenge::transition(c.status, to)?;
    let updated = move_status(state, &c, to).await?;

    tracing::info!(challenge_id = id, from = c.status.as_str(), to = to.as_str(), "Photo challenge status changed by admin");
    if to == ChallengeStatus::Accepted {
        state.mailer.challenge_accepted(&updated);
    }
    Ok(updated)
}

/// Webhook: the sender paid, so the invitation can go out.
pub async fn fulfil_payment(state: &AppState, session_id: &str) -> ServiceResult<Option<PhotoChallenge>> {
    let Some(c) = db::challenges::mark_paid_by_session(&state.pool, session_id).await? else {
        return Ok(None);
    };
    let name = service_name(state, &c).await;
    state.mailer.challenge_invitation(&c, &name);
    tracing::info!(challenge_id = c.id, "Photo challenge paid, invitation sent");
    Ok(Some(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ChallengeStatus::*;

    #[test]
    fn admin_cannot_detach_a_booking_by_status() {
        assert!(!admin_may_set(Accepted, Scheduled));
        assert!(!admin_may_set(Scheduled, Accepted));
        assert!(admin_may_set(Scheduled, Completed));
        assert!(admin_may_set(Viewed, Accepted));
        assert!(admin_may_set(Accepted, Expired));
    }
}
