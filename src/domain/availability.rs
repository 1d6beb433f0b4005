use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::booking::Booking;
use crate::error::{CheckoutError, Result};

/// Why a requested day cannot be booked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConflictKind {
    /// The day is covered by another guest's active booking.
    Booked,
    /// The host has manually blocked the day.
    Blocked,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Booked => write!(f, "booked"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// The first unavailable day found for a requested stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub date: NaiveDate,
}

/// A half-open stay interval `[check_in, check_out)`. The check-out day
/// itself is free for the next guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        if check_out <= check_in {
            return Err(CheckoutError::InvalidRange {
                reason: format!("check-out {check_out} must be after check-in {check_in}"),
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.check_in && date < self.check_out
    }

    /// Occupied days in chronological order (check-out day excluded).
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        self.check_in.iter_days().take_while({
            let check_out = self.check_out;
            move |d| *d < check_out
        })
    }
}

/// Scan the requested stay day by day and return the first day occupied by
/// an active booking or a host-blocked date. Cancelled-class bookings do
/// not block. On the same day a guest booking wins over a host block.
pub fn find_conflict(
    range: &StayRange,
    bookings: &[Booking],
    blocked_dates: &[NaiveDate],
) -> Option<Conflict> {
    for date in range.days() {
        if bookings
            .iter()
            .any(|b| b.status.blocks_dates() && b.occupies(date))
        {
            return Some(Conflict {
                kind: ConflictKind::Booked,
                date,
            });
        }
        if blocked_dates.contains(&date) {
            return Some(Conflict {
                kind: ConflictKind::Blocked,
                date,
            });
        }
    }
    None
}
