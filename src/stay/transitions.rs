//! Status transition tables for tags and rooms plus the pure time helpers
//! the checkout logic is built on.
//!
//! Every transition is applied as one conditional `UPDATE ... WHERE status IN
//! (from_states)`; a zero-row update means another writer got there first.

use chrono::{DateTime, Duration, FixedOffset};

use crate::models::rfid_tag::RfidStatus;
use crate::models::room::RoomStatus;

/// Stay length used when a room carries no usable `hours_stay`.
pub const DEFAULT_HOURS_STAY: f64 = 1.0;

/// Longest stay the API accepts: one year.
pub const MAX_HOURS_STAY: f64 = 24.0 * 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfidTransition {
    /// available -> assigned, binding the tag to a guest
    Assign,
    /// assigned -> active, on first successful door verify
    Activate,
    /// any non-lost state -> lost
    MarkLost,
    /// assigned/active -> available, unbinding the guest
    Unassign,
}

impl RfidTransition {
    pub fn from_states(&self) -> &'static [RfidStatus] {
        match self {
            RfidTransition::Assign => &[RfidStatus::Available],
            RfidTransition::Activate => &[RfidStatus::Assigned],
            RfidTransition::MarkLost => &[
                RfidStatus::Available,
                RfidStatus::Assigned,
                RfidStatus::Active,
            ],
            RfidTransition::Unassign => &[RfidStatus::Assigned, RfidStatus::Active],
        }
    }

    pub fn to_state(&self) -> RfidStatus {
        match self {
            RfidTransition::Assign => RfidStatus::Assigned,
            RfidTransition::Activate => RfidStatus::Active,
            RfidTransition::MarkLost => RfidStatus::Lost,
            RfidTransition::Unassign => RfidStatus::Available,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RfidTransition::Assign => "assign",
            RfidTransition::Activate => "activate",
            RfidTransition::MarkLost => "mark_lost",
            RfidTransition::Unassign => "unassign",
        }
    }

    /// Whether `status` is a legal starting point.
    pub fn allowed_from(&self, status: RfidStatus) -> bool {
        self.from_states().contains(&status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTransition {
    /// available -> reserved
    Reserve,
    /// reserved -> occupied
    CheckIn,
    /// reserved/occupied -> available, clearing the stay
    Release,
    /// available -> maintenance
    EnterMaintenance,
    /// maintenance -> available
    ExitMaintenance,
}

impl RoomTransition {
    pub fn from_states(&self) -> &'static [RoomStatus] {
        match self {
            RoomTransition::Reserve => &[RoomStatus::Available],
            RoomTransition::CheckIn => &[RoomStatus::Reserved],
            RoomTransition::Release => &[RoomStatus::Reserved, RoomStatus::Occupied],
            RoomTransition::EnterMaintenance => &[RoomStatus::Available],
            RoomTransition::ExitMaintenance => &[RoomStatus::Maintenance],
        }
    }

    pub fn to_state(&self) -> RoomStatus {
        match self {
            RoomTransition::Reserve => RoomStatus::Reserved,
            RoomTransition::CheckIn => RoomStatus::Occupied,
            RoomTransition::Release => RoomStatus::Available,
            RoomTransition::EnterMaintenance => RoomStatus::Maintenance,
            RoomTransition::ExitMaintenance => RoomStatus::Available,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomTransition::Reserve => "reserve",
            RoomTransition::CheckIn => "check_in",
            RoomTransition::Release => "release",
            RoomTransition::EnterMaintenance => "enter_maintenance",
            RoomTransition::ExitMaintenance => "exit_maintenance",
        }
    }

    pub fn allowed_from(&self, status: RoomStatus) -> bool {
        self.from_states().contains(&status)
    }
}

/// Normalizes a stored stay length: missing, non-finite and non-positive
/// values fall back to [`DEFAULT_HOURS_STAY`].
pub fn resolve_hours_stay(hours: Option<f64>) -> f64 {
    match hours {
        Some(h) if h.is_finite() && h > 0.0 => h,
        _ => DEFAULT_HOURS_STAY,
    }
}

/// Stay length as a duration, millisecond precision. `None` when the
/// length does not fit in a [`Duration`].
pub fn stay_duration(hours: f64) -> Option<Duration> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// `check_in + hours_stay`, or `None` if the result falls outside the
/// representable date range.
pub fn compute_check_out(
    check_in: DateTime<FixedOffset>,
    hours_stay: Option<f64>,
) -> Option<DateTime<FixedOffset>> {
    stay_duration(resolve_hours_stay(hours_stay))
        .and_then(|stay| check_in.checked_add_signed(stay))
}

/// True once `now` has reached `check_out + grace`.
pub fn is_expired(
    check_out: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    grace: Duration,
) -> bool {
    check_out
        .checked_add_signed(grace)
        .is_some_and(|deadline| now >= deadline)
}

/// Whole minutes until `check_out`, floored (negative once past).
pub fn minutes_remaining(check_out: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> i64 {
    (check_out - now).num_seconds().div_euclid(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, s)
            .unwrap()
            .fixed_offset()
    }

    #[test]
    fn rfid_transitions_only_move_forward() {
        assert!(RfidTransition::Assign.allowed_from(RfidStatus::Available));
        assert!(!RfidTransition::Assign.allowed_from(RfidStatus::Active));
        assert!(!RfidTransition::Assign.allowed_from(RfidStatus::Assigned));
        assert!(RfidTransition::Activate.allowed_from(RfidStatus::Assigned));
        assert!(!RfidTransition::Activate.allowed_from(RfidStatus::Available));

        // No transition leads from active back to assigned
        for transition in [
            RfidTransition::Assign,
            RfidTransition::Activate,
            RfidTransition::MarkLost,
            RfidTransition::Unassign,
        ] {
            if transition.allowed_from(RfidStatus::Active) {
                assert_ne!(transition.to_state(), RfidStatus::Assigned);
            }
        }
    }

    #[test]
    fn lost_is_terminal() {
        for transition in [
            RfidTransition::Assign,
            RfidTransition::Activate,
            RfidTransition::MarkLost,
            RfidTransition::Unassign,
        ] {
            assert!(!transition.allowed_from(RfidStatus::Lost));
        }
    }

    #[test]
    fn rooms_are_reserved_only_when_available() {
        for status in [
            RoomStatus::Reserved,
            RoomStatus::Occupied,
            RoomStatus::Maintenance,
        ] {
            assert!(!RoomTransition::Reserve.allowed_from(status));
        }
        assert!(RoomTransition::Reserve.allowed_from(RoomStatus::Available));
        assert!(!RoomTransition::Release.allowed_from(RoomStatus::Maintenance));
    }

    #[test]
    fn hours_stay_falls_back_to_one_hour() {
        assert_eq!(resolve_hours_stay(None), 1.0);
        assert_eq!(resolve_hours_stay(Some(0.0)), 1.0);
        assert_eq!(resolve_hours_stay(Some(-3.0)), 1.0);
        assert_eq!(resolve_hours_stay(Some(f64::NAN)), 1.0);
        assert_eq!(resolve_hours_stay(Some(2.5)), 2.5);
    }

    #[test]
    fn check_out_adds_stay_length() {
        let check_in = at(10, 0, 0);
        assert_eq!(compute_check_out(check_in, Some(2.0)), Some(at(12, 0, 0)));
        assert_eq!(compute_check_out(check_in, Some(0.5)), Some(at(10, 30, 0)));
        assert_eq!(compute_check_out(check_in, None), Some(at(11, 0, 0)));
        assert_eq!(
            compute_check_out(check_in, Some(MAX_HOURS_STAY)),
            Some(check_in + Duration::days(365))
        );
    }

    #[test]
    fn oversized_stays_do_not_overflow() {
        let check_in = at(10, 0, 0);
        assert_eq!(compute_check_out(check_in, Some(1e12)), None);
        assert_eq!(compute_check_out(check_in, Some(f64::MAX)), None);
        assert!(stay_duration(1e30).is_none());
    }

    #[test]
    fn expiry_honours_grace() {
        let check_out = at(12, 0, 0);
        assert!(!is_expired(check_out, at(11, 59, 59), Duration::zero()));
        assert!(is_expired(check_out, at(12, 0, 0), Duration::zero()));
        assert!(!is_expired(check_out, at(12, 4, 0), Duration::minutes(5)));
        assert!(is_expired(check_out, at(12, 5, 0), Duration::minutes(5)));
    }

    #[test]
    fn minutes_remaining_floors() {
        let check_out = at(12, 0, 0);
        assert_eq!(minutes_remaining(check_out, at(11, 50, 0)), 10);
        assert_eq!(minutes_remaining(check_out, at(11, 49, 30)), 10);
        assert_eq!(minutes_remaining(check_out, at(11, 49, 0)), 11);
        assert_eq!(minutes_remaining(check_out, at(12, 0, 30)), -1);
    }
}
