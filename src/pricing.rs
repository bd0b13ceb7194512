//! Pricing

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use tracing::warn;

use crate::lines::CartLine;

/// Number of decimal places totals are presented with.
pub const TOTAL_DP: u32 = 2;

/// Sums line prices and rounds the result once to two decimal places.
///
/// Rounding happens on the sum, never on the individual prices, so fractional
/// line prices cannot drift the total. Midpoints round away from zero and the
/// result always carries two decimal places (an empty set yields `0.00`).
///
/// A sum past the largest representable amount saturates at [`Decimal::MAX`].
pub fn total_price<'a>(lines: impl IntoIterator<Item = &'a CartLine>) -> Decimal {
    let sum = lines
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.price))
        .unwrap_or_else(|| {
            warn!("line prices overflow, saturating total");
            Decimal::MAX
        });

    round_total(sum)
}

/// Rounds an amount to two decimal places, midpoint away from zero.
#[must_use]
pub fn round_total(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(TOTAL_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(TOTAL_DP);

    rounded
}

/// Wraps an already rounded amount in a currency.
pub fn to_money(amount: Decimal, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_decimal(amount, currency)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::iso::GBP;

    use crate::lines::NewCartLine;

    use super::*;

    fn line(price: Decimal) -> CartLine {
        CartLine::from(NewCartLine::new("s", "A", 1, price))
    }

    #[test]
    fn total_of_nothing_is_zero_with_two_places() {
        let total = total_price(std::iter::empty());

        assert_eq!(total, Decimal::ZERO);
        assert_eq!(total.to_string(), "0.00");
    }

    #[test]
    fn total_rounds_the_sum_not_the_parts() {
        // Rounding each price first would give 0.01 + 0.01 + 0.01 = 0.03.
        let lines = [line(dec!(0.005)), line(dec!(0.005)), line(dec!(0.005))];

        assert_eq!(total_price(&lines), dec!(0.02));
    }

    #[test]
    fn overflowing_total_saturates() {
        let lines = [line(Decimal::MAX), line(Decimal::MAX)];

        assert_eq!(total_price(&lines), round_total(Decimal::MAX));
    }

    #[test]
    fn midpoint_rounds_away_from_zero() {
        assert_eq!(round_total(dec!(2.345)), dec!(2.35));
        assert_eq!(round_total(dec!(-2.345)), dec!(-2.35));
        assert_eq!(round_total(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn money_keeps_the_amount() {
        let money = to_money(dec!(12.50), GBP);

        assert_eq!(money.amount(), &dec!(12.50));
        assert_eq!(money.currency(), GBP);
    }
}
