// Sample data and CSV import
//
// seed_sample_data mirrors what a fresh install starts with: two customers
// and three months of purchases relative to today. load_csv/import_transactions
// bring in real purchase history from a `date,amount,customer_name,customer_email`
// file.

use crate::db::SqliteStore;
use crate::error::Result;
use crate::points::validate_amount;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub customers: usize,
    pub transactions: usize,
}

/// Amounts per months-ago offset (2, 1, 0) for each sample customer
const ALICE_PURCHASES: [(u32, i64); 7] = [
    (2, 120),
    (2, 75),
    (2, 200),
    (1, 140),
    (1, 60),
    (0, 220),
    (0, 50),
];

const BOB_PURCHASES: [(u32, i64); 9] = [
    (2, 50),
    (2, 130),
    (2, 90),
    (1, 110),
    (1, 100),
    (1, 150),
    (0, 80),
    (0, 190),
    (0, 120),
];

/// Populate an empty store with Alice, Bob and their purchases
///
/// Safe to call on every startup: customers are matched by email and
/// purchases are only added while the transaction table is empty.
pub fn seed_sample_data(store: &SqliteStore, today: NaiveDate) -> Result<SeedReport> {
    let existing = store.count_transactions()?;
    let alice = store.find_or_create_customer("Alice", "alice@example.com")?;
    let bob = store.find_or_create_customer("Bob", "bob@example.com")?;

    let mut report = SeedReport {
        customers: 2,
        transactions: 0,
    };

    if existing > 0 {
        info!(
            "Skipping sample purchases: store already holds {} transactions",
            existing
        );
        return Ok(report);
    }

    for (customer_id, purchases) in [
        (alice.id, &ALICE_PURCHASES[..]),
        (bob.id, &BOB_PURCHASES[..]),
    ] {
        for &(months_ago, amount) in purchases {
            let date = today
                .checked_sub_months(Months::new(months_ago))
                .unwrap_or(today);
            store.insert_transaction(customer_id, date, Decimal::from(amount))?;
            report.transactions += 1;
        }
    }

    info!(
        "Seeded {} customers with {} transactions",
        report.customers, report.transactions
    );

    Ok(report)
}

// ============================================================================
// CSV IMPORT
// ============================================================================

/// One row of an import file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub customer_name: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub rows: usize,
    pub customers_created: usize,
    pub transactions_inserted: usize,
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<CsvTransaction>> {
    let file = std::fs::File::open(csv_path)?;
    load_csv_reader(file)
}

pub fn load_csv_reader<R: Read>(reader: R) -> Result<Vec<CsvTransaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: CsvTransaction = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// Insert imported rows, creating customers by email as needed
///
/// Every amount is validated before anything is written, so a negative
/// amount anywhere in the file leaves the store untouched. Rows are not
/// inserted atomically: a database error partway through keeps the rows
/// already written.
pub fn import_transactions(store: &SqliteStore, rows: &[CsvTransaction]) -> Result<ImportReport> {
    for (index, row) in rows.iter().enumerate() {
        if let Err(e) = validate_amount(row.amount) {
            // +2: header line, 1-based numbering
            warn!("Rejecting import: line {} has amount {}", index + 2, row.amount);
            return Err(e);
        }
    }

    let customers_before = store.list_customers()?.len();
    let mut report = ImportReport {
        rows: rows.len(),
        ..ImportReport::default()
    };

    for row in rows {
        let customer = store.find_or_create_customer(&row.customer_name, &row.customer_email)?;
        store.insert_transaction(customer.id, row.date, row.amount)?;
        report.transactions_inserted += 1;
    }

    report.customers_created = store.list_customers()?.len() - customers_before;
    info!(
        "Imported {} transactions ({} new customers)",
        report.transactions_inserted, report.customers_created
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RewardsStore;
    use crate::error::RewardsError;
    use crate::models::TransactionFilter;
    use crate::service::RewardsService;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_seed_sample_data() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = seed_sample_data(&store, date(2024, 3, 20)).unwrap();

        assert_eq!(report.customers, 2);
        assert_eq!(report.transactions, 16);
        assert_eq!(store.count_transactions().unwrap(), 16);

        let alice = store.find_customer_by_email("alice@example.com").unwrap().unwrap();
        let service = RewardsService::new(Arc::new(store));
        let summary = service.rewards_for_customer(alice.id).unwrap();

        // 120 + 75 + 200 -> 90 + 25 + 250
        assert_eq!(summary.points_for_month("2024-01"), Some(365));
        // 140 + 60 -> 130 + 10
        assert_eq!(summary.points_for_month("2024-02"), Some(140));
        // 220 + 50 -> 290 + 0
        assert_eq!(summary.points_for_month("2024-03"), Some(290));
        assert_eq!(summary.total_rewards, 795);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed_sample_data(&store, date(2024, 3, 20)).unwrap();
        let second = seed_sample_data(&store, date(2024, 3, 20)).unwrap();

        assert_eq!(second.transactions, 0);
        assert_eq!(store.count_transactions().unwrap(), 16);
        assert_eq!(store.list_customers().unwrap().len(), 2);
    }

    #[test]
    fn test_load_and_import_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,amount,customer_name,customer_email").unwrap();
        writeln!(file, "2024-01-10,120.00,Alice,alice@example.com").unwrap();
        writeln!(file, "2024-02-15, 100 ,Alice,alice@example.com").unwrap();
        writeln!(file, "2024-01-20,150,Bob,bob@example.com").unwrap();
        file.flush().unwrap();

        let rows = load_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].amount, dec!(100));

        let store = SqliteStore::open_in_memory().unwrap();
        let report = import_transactions(&store, &rows).unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(report.customers_created, 2);
        assert_eq!(report.transactions_inserted, 3);

        let alice = store.find_customer_by_email("alice@example.com").unwrap().unwrap();
        let alice_txns = store
            .list_transactions(&TransactionFilter::for_customer(alice.id))
            .unwrap();
        assert_eq!(alice_txns.len(), 2);
    }

    #[test]
    fn test_import_rejects_negative_amount_without_writing() {
        let csv = "date,amount,customer_name,customer_email\n\
                   2024-01-10,120,Alice,alice@example.com\n\
                   2024-01-11,-20,Alice,alice@example.com\n";
        let rows = load_csv_reader(csv.as_bytes()).unwrap();

        let store = SqliteStore::open_in_memory().unwrap();
        let result = import_transactions(&store, &rows);

        assert!(matches!(result, Err(RewardsError::InvalidAmount(_))));
        assert_eq!(store.count_transactions().unwrap(), 0);
        assert!(store.list_customers().unwrap().is_empty());
    }

    #[test]
    fn test_load_csv_reports_bad_rows() {
        let csv = "date,amount,customer_name,customer_email\n\
                   not-a-date,120,Alice,alice@example.com\n";

        assert!(matches!(
            load_csv_reader(csv.as_bytes()),
            Err(RewardsError::Csv(_))
        ));
    }
}
