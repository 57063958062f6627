// Rewards Service - store lookups combined with summarization
//
// The store is injected at construction. Customer-id entry points surface
// CustomerNotFound instead of returning an empty summary.

use crate::db::RewardsStore;
use crate::error::Result;
use crate::models::{Customer, DateRange, RewardsSummary, Transaction, TransactionFilter};
use crate::points::{calculate_points, validate_amount};
use crate::rewards::{summarize_all_customers, summarize_for_customer};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RewardsService<S: RewardsStore> {
    store: Arc<S>,
}

impl<S: RewardsStore> Clone for RewardsService<S> {
    fn clone(&self) -> Self {
        RewardsService {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RewardsStore> RewardsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        RewardsService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn calculate_points(&self, amount: Decimal) -> i64 {
        calculate_points(amount)
    }

    /// Summarize an inline batch of transactions, one summary per customer
    ///
    /// All-or-nothing: one negative amount rejects the whole batch.
    pub fn summarize_transactions(&self, transactions: &[Transaction]) -> Result<Vec<RewardsSummary>> {
        for tx in transactions {
            validate_amount(tx.amount)?;
        }

        let summaries = summarize_all_customers(transactions);
        info!(
            "Summarized {} transactions into {} customer summaries",
            transactions.len(),
            summaries.len()
        );

        Ok(summaries)
    }

    /// Every stored transaction for one customer
    pub fn rewards_for_customer(&self, customer_id: i64) -> Result<RewardsSummary> {
        let customer = self.store.lookup_customer(customer_id)?;
        let transactions = self
            .store
            .list_transactions(&TransactionFilter::for_customer(customer_id))?;

        debug!(
            "Customer {} has {} transactions on record",
            customer_id,
            transactions.len()
        );

        Ok(summarize_for_customer(&customer, &transactions))
    }

    pub fn rewards_for_customer_between(
        &self,
        customer_id: i64,
        range: DateRange,
    ) -> Result<RewardsSummary> {
        let customer = self.store.lookup_customer(customer_id)?;
        self.rewards_for_customer_record(&customer, range)
    }

    /// Same as `rewards_for_customer_between` when the record is already in hand
    pub fn rewards_for_customer_record(
        &self,
        customer: &Customer,
        range: DateRange,
    ) -> Result<RewardsSummary> {
        let filter = TransactionFilter::for_customer(customer.id).with_range(Some(range));
        let transactions = self.store.list_transactions(&filter)?;

        debug!(
            "Customer {} has {} transactions between {} and {}",
            customer.id,
            transactions.len(),
            range.start(),
            range.end()
        );

        Ok(summarize_for_customer(customer, &transactions))
    }

    /// Per-customer window with defaults: start falls back to three months
    /// before `today`, end falls back to `today`
    pub fn rewards_for_customer_in_window(
        &self,
        customer_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<RewardsSummary> {
        let range = resolve_window(start, end, today)?;
        self.rewards_for_customer_between(customer_id, range)
    }

    /// Every customer with activity, optionally limited to a window
    pub fn rewards_for_all_customers(&self, range: Option<DateRange>) -> Result<Vec<RewardsSummary>> {
        let transactions = self
            .store
            .list_transactions(&TransactionFilter::all().with_range(range))?;

        Ok(summarize_all_customers(&transactions))
    }
}

/// Fill in missing window bounds relative to `today`
pub fn resolve_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange> {
    let default = DateRange::last_three_months(today);
    DateRange::new(
        start.unwrap_or(default.start()),
        end.unwrap_or(default.end()),
    )
}
