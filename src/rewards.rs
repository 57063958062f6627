// Rewards Aggregator - monthly bucketing and per-customer grouping
//
// Both entry points are pure: each call builds its own accumulators, so
// concurrent callers need no coordination.
//
// Ordering is deterministic: months ascend by key within a summary and
// summaries ascend by customer id, both falling out of BTreeMap iteration.

use crate::models::{Customer, MonthlyReward, RewardsSummary, Transaction};
use crate::points::calculate_points;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Month key (`YYYY-MM`) for a transaction date; day-of-month is discarded
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Summarize one customer's transactions
///
/// Transactions are assumed to belong to `customer`; this is not re-checked.
/// An empty slice yields an empty breakdown with a zero total.
pub fn summarize_for_customer(customer: &Customer, transactions: &[Transaction]) -> RewardsSummary {
    let mut by_month: BTreeMap<String, i64> = BTreeMap::new();
    let mut total: i64 = 0;

    for tx in transactions {
        let points = calculate_points(tx.amount);

        // Sums saturate like the per-transaction points do
        let month_total = by_month.entry(month_key(tx.date)).or_insert(0);
        *month_total = month_total.saturating_add(points);
        total = total.saturating_add(points);
    }

    let monthly_rewards: Vec<MonthlyReward> = by_month
        .into_iter()
        .map(|(month, amount)| MonthlyReward { month, amount })
        .collect();

    debug_assert_eq!(
        total,
        monthly_rewards
            .iter()
            .fold(0i64, |sum, reward| sum.saturating_add(reward.amount))
    );

    RewardsSummary {
        customer_id: customer.id,
        customer_name: customer.name.clone(),
        monthly_rewards,
        total_rewards: total,
    }
}

/// Partition a mixed batch by customer id and summarize each group
///
/// The customer record for a group is taken from its first transaction.
/// Customers with no transactions in the batch are absent from the result.
pub fn summarize_all_customers(transactions: &[Transaction]) -> Vec<RewardsSummary> {
    let mut groups: BTreeMap<i64, Vec<Transaction>> = BTreeMap::new();

    for tx in transactions {
        groups.entry(tx.customer_id()).or_default().push(tx.clone());
    }

    groups
        .values()
        .filter_map(|group| {
            group
                .first()
                .map(|representative| summarize_for_customer(&representative.customer, group))
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
