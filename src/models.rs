// Rewards domain models
//
// Customers and transactions are facts owned by the store. MonthlyReward and
// RewardsSummary are computed per call and never persisted.

use crate::error::{Result, RewardsError};
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// CUSTOMER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Stable identity assigned by the store
    pub id: i64,
    /// Display name (copied into summaries at computation time)
    pub name: String,
    pub email: String,
}

impl Customer {
    pub fn new(id: i64, name: &str, email: &str) -> Self {
        Customer {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// One purchase event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store; absent for transactions posted inline
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub date: NaiveDate,

    pub amount: Decimal,

    /// Owning customer; grouping uses `customer.id`, never object identity
    pub customer: Customer,
}

impl Transaction {
    pub fn new(id: Option<i64>, date: NaiveDate, amount: Decimal, customer: Customer) -> Self {
        Transaction {
            id,
            date,
            amount,
            customer,
        }
    }

    pub fn customer_id(&self) -> i64 {
        self.customer.id
    }
}

// ============================================================================
// COMPUTED VALUES
// ============================================================================

/// Points earned by one customer in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReward {
    /// Month key, formatted `YYYY-MM`
    pub month: String,
    pub amount: i64,
}

impl MonthlyReward {
    pub fn new(month: &str, amount: i64) -> Self {
        MonthlyReward {
            month: month.to_string(),
            amount,
        }
    }
}

/// Per-customer monthly breakdown plus grand total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSummary {
    pub customer_id: i64,
    pub customer_name: String,
    /// Sorted ascending by month key
    pub monthly_rewards: Vec<MonthlyReward>,
    pub total_rewards: i64,
}

impl RewardsSummary {
    /// Points recorded for a month key, if that month had any transactions
    pub fn points_for_month(&self, month: &str) -> Option<i64> {
        self.monthly_rewards
            .iter()
            .find(|reward| reward.month == month)
            .map(|reward| reward.amount)
    }
}

// ============================================================================
// QUERY TYPES
// ============================================================================

/// Inclusive date window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RewardsError::InvalidDateRange { start, end });
        }

        Ok(DateRange {
            start_date: start,
            end_date: end,
        })
    }

    /// The three calendar months before `today`, inclusive of `today`
    ///
    /// Day-of-month is clamped to the target month's length, so
    /// 2024-05-31 starts the window on 2024-02-29.
    pub fn last_three_months(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_months(Months::new(3))
            .unwrap_or(NaiveDate::MIN);

        DateRange {
            start_date: start,
            end_date: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end(&self) -> NaiveDate {
        self.end_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Filter for `RewardsStore::list_transactions`
///
/// No fields set = every transaction; both set = intersection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub customer_id: Option<i64>,
    pub date_range: Option<DateRange>,
}

impl TransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_customer(customer_id: i64) -> Self {
        TransactionFilter {
            customer_id: Some(customer_id),
            date_range: None,
        }
    }

    pub fn between(range: DateRange) -> Self {
        TransactionFilter {
            customer_id: None,
            date_range: Some(range),
        }
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let customer_ok = self
            .customer_id
            .map_or(true, |id| transaction.customer_id() == id);
        let date_ok = self
            .date_range
            .map_or(true, |range| range.contains(transaction.date));

        customer_ok && date_ok
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let result = DateRange::new(date(2024, 3, 1), date(2024, 1, 1));
        assert!(matches!(
            result,
            Err(RewardsError::InvalidDateRange { .. })
        ));

        // Single-day window is fine
        let single = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert!(single.contains(date(2024, 1, 1)));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(date(2024, 1, 10), date(2024, 2, 15)).unwrap();

        assert!(range.contains(date(2024, 1, 10)));
        assert!(range.contains(date(2024, 2, 15)));
        assert!(!range.contains(date(2024, 1, 9)));
        assert!(!range.contains(date(2024, 2, 16)));
    }

    #[test]
    fn test_last_three_months_window() {
        let range = DateRange::last_three_months(date(2024, 4, 18));
        assert_eq!(range.start(), date(2024, 1, 18));
        assert_eq!(range.end(), date(2024, 4, 18));

        // Clamped to the end of a shorter month
        let range = DateRange::last_three_months(date(2024, 5, 31));
        assert_eq!(range.start(), date(2024, 2, 29));
    }

    #[test]
    fn test_filter_matching() {
        let alice = Customer::new(1, "Alice", "alice@example.com");
        let tx = Transaction::new(Some(1), date(2024, 1, 10), dec!(120), alice);

        assert!(TransactionFilter::all().matches(&tx));
        assert!(TransactionFilter::for_customer(1).matches(&tx));
        assert!(!TransactionFilter::for_customer(2).matches(&tx));

        let january = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let february = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert!(TransactionFilter::between(january).matches(&tx));
        assert!(!TransactionFilter::for_customer(1)
            .with_range(Some(february))
            .matches(&tx));
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = r#"{"date":"2023-01-01","amount":120.0,"customer":{"id":1,"name":"Alice","email":"alice@example.com"}}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.id, None);
        assert_eq!(tx.date, date(2023, 1, 1));
        assert_eq!(tx.amount, dec!(120));
        assert_eq!(tx.customer_id(), 1);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = RewardsSummary {
            customer_id: 1,
            customer_name: "Alice".to_string(),
            monthly_rewards: vec![MonthlyReward::new("2024-01", 90)],
            total_rewards: 90,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["customerId"], 1);
        assert_eq!(value["customerName"], "Alice");
        assert_eq!(value["monthlyRewards"][0]["month"], "2024-01");
        assert_eq!(value["totalRewards"], 90);
        assert_eq!(summary.points_for_month("2024-01"), Some(90));
        assert_eq!(summary.points_for_month("2024-02"), None);
    }
}
