use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to 2 decimal places, midpoint away from zero (cent rounding).
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Priced stay before settlement: gross after the listing discount, net
/// after the optional coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub nights: i64,
    pub nightly_rate: Decimal,
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    pub net_amount: Decimal,
}

/// Price a stay of `nights` nights.
///
/// The listing discount applies to the nightly rate; the coupon discount
/// applies to the resulting gross. Net never goes below zero.
pub fn quote_stay(
    base_price: Decimal,
    listing_discount_percent: Decimal,
    nights: i64,
    coupon_percent: Option<Decimal>,
) -> Result<Quote> {
    if nights < 1 {
        return Err(CheckoutError::InvalidStay {
            reason: format!("stay must be at least one night, got {nights}"),
        });
    }

    let nightly_rate = base_price * (Decimal::ONE - listing_discount_percent / HUNDRED);
    let gross_amount = round_money(Decimal::from(nights) * nightly_rate);

    let discount_amount = match coupon_percent {
        Some(percent) => round_money(gross_amount * percent / HUNDRED),
        None => Decimal::ZERO,
    };
    let net_amount = (gross_amount - discount_amount).max(Decimal::ZERO);

    Ok(Quote {
        nights,
        nightly_rate,
        gross_amount,
        discount_amount,
        net_amount,
    })
}

/// Fee/payout split of a captured net amount.
///
/// The payout is derived by subtraction so that
/// `platform_fee + host_payout == net` holds exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Split {
    pub platform_fee: Decimal,
    pub host_payout: Decimal,
}

pub fn split_net(net_amount: Decimal, fee_percent: Decimal) -> Split {
    let platform_fee = round_money(net_amount * fee_percent / HUNDRED);
    Split {
        platform_fee,
        host_payout: net_amount - platform_fee,
    }
}
