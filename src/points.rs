// Points Calculator - tiered loyalty formula
//
//   amount <= 50        -> 0
//   50 < amount <= 100  -> floor(amount - 50)
//   amount > 100        -> floor(2 * (amount - 100) + 50)
//
// The formula runs in exact decimal arithmetic and truncates once, at the end.

use crate::error::{Result, RewardsError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const LOWER_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const UPPER_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
const UPPER_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Points earned by a single transaction amount
///
/// Total over all inputs: negative amounts land in the lowest band and earn
/// nothing. Input boundaries reject them before they get here (see
/// [`validate_amount`]). Results too large for `i64` saturate.
pub fn calculate_points(amount: Decimal) -> i64 {
    let raw = if amount <= LOWER_THRESHOLD {
        Decimal::ZERO
    } else if amount <= UPPER_THRESHOLD {
        amount - LOWER_THRESHOLD
    } else {
        // 2 points per dollar above 100 plus the 50 from the lower band.
        // Decimal can overflow on multiplication near its max.
        (amount - UPPER_THRESHOLD)
            .checked_mul(UPPER_MULTIPLIER)
            .and_then(|doubled| doubled.checked_add(LOWER_THRESHOLD))
            .unwrap_or(Decimal::MAX)
    };

    raw.trunc().to_i64().unwrap_or(i64::MAX)
}

/// Reject negative amounts; zero is a valid (pointless) purchase
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(RewardsError::InvalidAmount(amount));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lower_band_earns_nothing() {
        assert_eq!(calculate_points(dec!(0)), 0);
        assert_eq!(calculate_points(dec!(10.5)), 0);
        assert_eq!(calculate_points(dec!(50)), 0);
        assert_eq!(calculate_points(dec!(50.00)), 0);
    }

    #[test]
    fn test_middle_band_one_point_per_dollar() {
        assert_eq!(calculate_points(dec!(50.99)), 0);
        assert_eq!(calculate_points(dec!(51)), 1);
        assert_eq!(calculate_points(dec!(60)), 10);
        assert_eq!(calculate_points(dec!(75)), 25);
        assert_eq!(calculate_points(dec!(99.99)), 49);
        assert_eq!(calculate_points(dec!(100)), 50);
    }

    #[test]
    fn test_upper_band_two_points_per_dollar() {
        assert_eq!(calculate_points(dec!(120)), 90);
        assert_eq!(calculate_points(dec!(150)), 150);
        assert_eq!(calculate_points(dec!(200)), 250);
        assert_eq!(calculate_points(dec!(220)), 290);
    }

    #[test]
    fn test_truncation_applies_to_final_value() {
        // 2 * 0.5 + 50 = 51: truncating (amount - 100) first would give 50
        assert_eq!(calculate_points(dec!(100.5)), 51);
        // 2 * 20.35 + 50 = 90.7
        assert_eq!(calculate_points(dec!(120.35)), 90);
        assert_eq!(calculate_points(dec!(100.01)), 50);
    }

    #[test]
    fn test_monotonic_non_decreasing() {
        let mut previous = i64::MIN;
        let mut amount = dec!(0);

        while amount <= dec!(300) {
            let points = calculate_points(amount);
            assert!(
                points >= previous,
                "points dropped at {}: {} < {}",
                amount,
                points,
                previous
            );
            previous = points;
            amount += dec!(0.25);
        }
    }

    #[test]
    fn test_negative_amount_earns_nothing_and_fails_validation() {
        assert_eq!(calculate_points(dec!(-120)), 0);
        assert!(matches!(
            validate_amount(dec!(-0.01)),
            Err(RewardsError::InvalidAmount(_))
        ));
        assert_eq!(validate_amount(dec!(0)).unwrap(), dec!(0));
        assert_eq!(validate_amount(dec!(75.5)).unwrap(), dec!(75.5));
    }

    #[test]
    fn test_huge_amount_saturates() {
        assert_eq!(calculate_points(Decimal::MAX), i64::MAX);
    }

    #[test]
    fn test_huge_amounts_saturate_when_summed() {
        use crate::models::{Customer, Transaction};
        use crate::rewards::summarize_for_customer;
        use chrono::NaiveDate;

        let customer = Customer::new(1, "Alice", "alice@example.com");
        let january = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let february = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let transactions = vec![
            Transaction::new(Some(1), january, Decimal::MAX, customer.clone()),
            Transaction::new(Some(2), january, Decimal::MAX, customer.clone()),
            Transaction::new(Some(3), february, Decimal::MAX, customer.clone()),
        ];

        let summary = summarize_for_customer(&customer, &transactions);
        let monthly_sum = summary
            .monthly_rewards
            .iter()
            .fold(0i64, |sum, reward| sum.saturating_add(reward.amount));

        assert_eq!(summary.points_for_month("2024-01"), Some(i64::MAX));
        assert_eq!(summary.total_rewards, i64::MAX);
        assert_eq!(summary.total_rewards, monthly_sum);
    }
}
