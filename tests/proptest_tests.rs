use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use stay_checkout::domain::availability::{ConflictKind, StayRange, find_conflict};
use stay_checkout::domain::booking::{Booking, BookingStatus};
use stay_checkout::domain::pricing::{quote_stay, split_net};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn booking_over(start_offset: i64, len: i64, status: BookingStatus) -> Booking {
    let check_in = base_date() + Duration::days(start_offset);
    Booking {
        id: format!("b-{start_offset}-{len}"),
        listing_id: "l1".into(),
        guest_id: "g1".into(),
        host_id: "h1".into(),
        check_in,
        check_out: check_in + Duration::days(len),
        number_of_guests: 1,
        gross_amount: dec!(100),
        discount_amount: dec!(0),
        net_amount: dec!(100),
        platform_fee: dec!(5),
        host_payout: dec!(95),
        status,
        coupon_code: None,
        transaction_id: "t1".into(),
        payment_reference: "cap1".into(),
    }
}

// ---------------------------------------------------------------------------
// Settlement split properties
// ---------------------------------------------------------------------------

proptest! {
    /// platform_fee + host_payout == net, exactly, for every net and fee rate.
    #[test]
    fn split_sum_is_exact(net_cents in 0i64..=100_000_000, fee_hundredths in 0i64..=10_000) {
        let net = Decimal::new(net_cents, 2);
        let fee_percent = Decimal::new(fee_hundredths, 2);
        let split = split_net(net, fee_percent);
        prop_assert_eq!(split.platform_fee + split.host_payout, net);
    }

    /// The fee never exceeds the net and never goes negative.
    #[test]
    fn split_fee_within_bounds(net_cents in 0i64..=100_000_000, fee_hundredths in 0i64..=10_000) {
        let net = Decimal::new(net_cents, 2);
        let fee_percent = Decimal::new(fee_hundredths, 2);
        let split = split_net(net, fee_percent);
        prop_assert!(split.platform_fee >= Decimal::ZERO);
        prop_assert!(split.platform_fee <= net + dec!(0.01));
    }
}

// ---------------------------------------------------------------------------
// Pricing properties
// ---------------------------------------------------------------------------

proptest! {
    /// net == nights * price * (1 - listing%/100) * (1 - coupon%/100)
    /// within one cent of rounding tolerance.
    #[test]
    fn net_matches_reference_formula(
        price_cents in 100i64..=500_000,
        nights in 1i64..=30,
        listing_discount in 0u32..=90,
        coupon_discount in proptest::option::of(0u32..=100),
    ) {
        let price = Decimal::new(price_cents, 2);
        let quote = quote_stay(
            price,
            Decimal::from(listing_discount),
            nights,
            coupon_discount.map(Decimal::from),
        ).unwrap();

        let reference = (nights as f64)
            * (price_cents as f64 / 100.0)
            * (1.0 - f64::from(listing_discount) / 100.0)
            * (1.0 - f64::from(coupon_discount.unwrap_or(0)) / 100.0);
        let net = quote.net_amount.to_f64().unwrap();
        prop_assert!((net - reference).abs() <= 0.011, "net {net} vs reference {reference}");
    }

    /// Net is the gross minus the discount and never negative.
    #[test]
    fn net_is_gross_minus_discount(
        price_cents in 100i64..=500_000,
        nights in 1i64..=30,
        coupon_discount in 0u32..=100,
    ) {
        let quote = quote_stay(
            Decimal::new(price_cents, 2),
            Decimal::ZERO,
            nights,
            Some(Decimal::from(coupon_discount)),
        ).unwrap();
        prop_assert_eq!(quote.net_amount, (quote.gross_amount - quote.discount_amount).max(Decimal::ZERO));
        prop_assert!(quote.net_amount >= Decimal::ZERO);
    }

    /// Stays shorter than one night never produce a quote.
    #[test]
    fn non_positive_nights_always_rejected(nights in -30i64..=0) {
        prop_assert!(quote_stay(dec!(100), Decimal::ZERO, nights, None).is_err());
    }
}

// ---------------------------------------------------------------------------
// Availability properties
// ---------------------------------------------------------------------------

proptest! {
    /// An active booking conflicts with a request iff their half-open
    /// ranges overlap, and the reported day is the first shared one.
    #[test]
    fn conflict_iff_ranges_overlap(
        start_a in 0i64..=60, len_a in 1i64..=14,
        start_b in 0i64..=60, len_b in 1i64..=14,
    ) {
        let booking = booking_over(start_a, len_a, BookingStatus::Accepted);
        let check_in = base_date() + Duration::days(start_b);
        let range = StayRange::new(check_in, check_in + Duration::days(len_b)).unwrap();

        let overlaps = start_b < start_a + len_a && start_a < start_b + len_b;
        let conflict = find_conflict(&range, std::slice::from_ref(&booking), &[]);
        prop_assert_eq!(conflict.is_some(), overlaps);
        if let Some(c) = conflict {
            prop_assert_eq!(c.kind, ConflictKind::Booked);
            prop_assert_eq!(c.date, booking.check_in.max(range.check_in()));
        }
    }

    /// Cancelled-class bookings never block any request.
    #[test]
    fn released_bookings_never_conflict(
        start_a in 0i64..=60, len_a in 1i64..=14,
        start_b in 0i64..=60, len_b in 1i64..=14,
    ) {
        for status in [BookingStatus::Declined, BookingStatus::Cancelled, BookingStatus::Refunded] {
            let booking = booking_over(start_a, len_a, status);
            let check_in = base_date() + Duration::days(start_b);
            let range = StayRange::new(check_in, check_in + Duration::days(len_b)).unwrap();
            prop_assert!(find_conflict(&range, std::slice::from_ref(&booking), &[]).is_none());
        }
    }

    /// A reversed or empty range is always invalid.
    #[test]
    fn reversed_ranges_rejected(start in 0i64..=60, shrink in 0i64..=14) {
        let check_in = base_date() + Duration::days(start);
        let check_out = check_in - Duration::days(shrink);
        prop_assert!(StayRange::new(check_in, check_out).is_err());
    }
}
