//! Photo challenge lifecycle
//!
//! ```text
//! sent ──► viewed ──► accepted ◄──► scheduled ──► completed
//!   │         │    └► rejected
//!   └─────────┴──► accepted / rejected
//! sent / viewed / accepted ──► expired
//! ```
//!
//! `scheduled -> accepted` happens only when the challenge's booking is
//! cancelled or deleted; the recipient may then book again.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Challenge status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Scheduled,
    Completed,
    Expired,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Expired => "expired",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(Self::Sent),
            "viewed" => Some(Self::Viewed),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Expired)
    }

    /// Still waiting for the recipient's answer.
    pub fn is_awaiting_answer(&self) -> bool {
        matches!(self, Self::Sent | Self::Viewed)
    }

    /// Statuses the expiry sweep moves to `expired`.
    ///
    /// A scheduled challenge has a booking and runs to completion.
    pub fn expires(&self) -> bool {
        matches!(self, Self::Sent | Self::Viewed | Self::Accepted)
    }
}

/// Whether `from -> to` is a legal move.
pub fn can_transition(from: ChallengeStatus, to: ChallengeStatus) -> bool {
    use ChallengeStatus::*;
    match (from, to) {
        (Sent, Viewed) => true,
        (Sent | Viewed, Accepted | Rejected) => true,
        (Accepted, Scheduled) => true,
        (Scheduled, Accepted) => true,
        (Scheduled, Completed) => true,
        (from, Expired) => from.expires(),
        _ => false,
    }
}

/// Apply a status change.
///
/// Re-opening the invitation link (`viewed -> viewed`) is a no-op rather than
/// an error; every other same-state move is rejected.
pub fn transition(from: ChallengeStatus, to: ChallengeStatus) -> Result<ChallengeStatus, AppError> {
    if from == ChallengeStatus::Viewed && to == ChallengeStatus::Viewed {
        return Ok(to);
    }
    if from == ChallengeStatus::Expired {
        return Err(AppError::new(ErrorCode::ChallengeExpired));
    }
    if from.is_terminal() && matches!(to, ChallengeStatus::Accepted | ChallengeStatus::Rejected) {
        return Err(AppError::new(ErrorCode::ChallengeAlreadyAnswered)
            .with_detail("status", from.as_str()));
    }
    if can_transition(from, to) {
        Ok(to)
    } else {
        Err(AppError::new(ErrorCode::ChallengeInvalidTransition)
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()))
    }
}

/// Status the recipient's answer leads to.
pub fn respond(from: ChallengeStatus, accept: bool) -> Result<ChallengeStatus, AppError> {
    let to = if accept {
        ChallengeStatus::Accepted
    } else {
        ChallengeStatus::Rejected
    };
    if matches!(from, ChallengeStatus::Accepted | ChallengeStatus::Scheduled) {
        return Err(AppError::new(ErrorCode::ChallengeAlreadyAnswered)
            .with_detail("status", from.as_str()));
    }
    transition(from, to)
}

/// Whether the challenge is past its expiry and still expirable.
pub fn is_expired(status: ChallengeStatus, expires_at: i64, now: i64) -> bool {
    status.expires() && now >= expires_at
}

#[cfg(test)]
mod tests {
    use super::ChallengeStatus::*;
    use super::*;

    const ALL: [ChallengeStatus; 7] = [
        Sent, Viewed, Accepted, Rejected, Scheduled, Completed, Expired,
    ];

    #[test]
    fn happy_path() {
        let mut s = Sent;
        for next in [Viewed, Accepted, Scheduled, Completed] {
            s = transition(s, next).unwrap();
        }
        assert_eq!(s, Completed);
    }

    #[test]
    fn answer_without_viewing() {
        assert_eq!(transition(Sent, Accepted).unwrap(), Accepted);
        assert_eq!(transition(Sent, Rejected).unwrap(), Rejected);
    }

    #[test]
    fn viewing_twice_is_idempotent() {
        assert_eq!(transition(Viewed, Viewed).unwrap(), Viewed);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Rejected, Completed, Expired] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!can_transition(from, to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn cannot_skip_steps() {
        let err = transition(Sent, Scheduled).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChallengeInvalidTransition);
        assert!(transition(Viewed, Completed).is_err());
        assert!(transition(Accepted, Completed).is_err());
        assert!(transition(Viewed, Sent).is_err());
    }

    #[test]
    fn expiry_only_from_open_states() {
        assert!(can_transition(Sent, Expired));
        assert!(can_transition(Viewed, Expired));
        assert!(can_transition(Accepted, Expired));
        assert!(!can_transition(Scheduled, Expired));
        assert!(!can_transition(Completed, Expired));
    }

    #[test]
    fn respond_maps_answer() {
        assert_eq!(respond(Viewed, true).unwrap(), Accepted);
        assert_eq!(respond(Viewed, false).unwrap(), Rejected);
    }

    #[test]
    fn respond_twice_is_rejected() {
        let err = respond(Accepted, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChallengeAlreadyAnswered);

        let err = respond(Rejected, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChallengeAlreadyAnswered);
    }

    #[test]
    fn respond_after_expiry_is_rejected() {
        let err = respond(Expired, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChallengeExpired);
    }

    #[test]
    fn cancelled_booking_reopens_scheduling() {
        assert_eq!(transition(Scheduled, Accepted).unwrap(), Accepted);
        // and the reopened challenge can be scheduled again
        assert_eq!(transition(Accepted, Scheduled).unwrap(), Scheduled);

        let exits: Vec<_> = ALL.into_iter().filter(|to| can_transition(Scheduled, *to)).collect();
        assert_eq!(exits, vec![Accepted, Completed]);
    }

    #[test]
    fn recipient_cannot_reaccept_a_scheduled_challenge() {
        let err = respond(Scheduled, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChallengeAlreadyAnswered);
    }

    #[test]
    fn expiry_check() {
        assert!(is_expired(Sent, 1_000, 1_000));
        assert!(!is_expired(Sent, 1_000, 999));
        assert!(!is_expired(Scheduled, 1_000, 5_000));
        assert!(!is_expired(Expired, 1_000, 5_000));
    }

    #[test]
    fn db_names_roundtrip() {
        for s in ALL {
            assert_eq!(ChallengeStatus::from_db(s.as_str()), Some(s));
            assert_eq!(serde_json::to_value(s).unwrap(), s.as_str());
        }
    }
}
