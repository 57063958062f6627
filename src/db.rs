use crate::error::{Result, RewardsError};
use crate::models::{Customer, Transaction, TransactionFilter};
use crate::points::validate_amount;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// DATA-ACCESS CAPABILITIES
// ============================================================================

/// Read capabilities the rewards service needs from a backing store
pub trait RewardsStore: Send + Sync {
    /// Fetch a customer, failing with `CustomerNotFound` when absent
    fn lookup_customer(&self, id: i64) -> Result<Customer>;

    /// Transactions matching the filter, ordered by date then id
    ///
    /// Date bounds are inclusive on both ends.
    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// SQLite-backed store; one connection guarded by a mutex
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        info!("Opened rewards database at {:?}", path);

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;

        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Poisoned lock: the connection itself is still usable
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_customer(&self, name: &str, email: &str) -> Result<Customer> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO customers (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;

        let customer = Customer::new(conn.last_insert_rowid(), name, email);
        debug!("Inserted customer {} ({})", customer.id, customer.email);

        Ok(customer)
    }

    pub fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let customer = self
            .conn()
            .query_row(
                "SELECT id, name, email FROM customers WHERE email = ?1",
                [email],
                |row| {
                    Ok(Customer {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(customer)
    }

    /// Existing customer with this email, or a new one
    pub fn find_or_create_customer(&self, name: &str, email: &str) -> Result<Customer> {
        match self.find_customer_by_email(email)? {
            Some(customer) => Ok(customer),
            None => self.insert_customer(name, email),
        }
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, email FROM customers ORDER BY id")?;

        let customers = stmt
            .query_map([], |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(customers)
    }

    /// Record a purchase; rejects negative amounts and unknown customers
    pub fn insert_transaction(
        &self,
        customer_id: i64,
        date: NaiveDate,
        amount: Decimal,
    ) -> Result<Transaction> {
        let amount = validate_amount(amount)?;
        let customer = self.lookup_customer(customer_id)?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO transactions (customer_id, date, amount) VALUES (?1, ?2, ?3)",
            params![
                customer_id,
                date.format(DATE_FORMAT).to_string(),
                amount.to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(
            "Inserted transaction {} for customer {}: {} on {}",
            id, customer_id, amount, date
        );

        Ok(Transaction::new(Some(id), date, amount, customer))
    }

    pub fn count_transactions(&self) -> Result<i64> {
        let count: i64 =
            self.conn()
                .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;

        Ok(count)
    }
}

impl RewardsStore for SqliteStore {
    fn lookup_customer(&self, id: i64) -> Result<Customer> {
        self.conn()
            .query_row(
                "SELECT id, name, email FROM customers WHERE id = ?1",
                [id],
                |row| {
                    Ok(Customer {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(RewardsError::CustomerNotFound(id))
    }

    fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let start = filter
            .date_range
            .map(|range| range.start().format(DATE_FORMAT).to_string());
        let end = filter
            .date_range
            .map(|range| range.end().format(DATE_FORMAT).to_string());

        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.date, t.amount, c.id, c.name, c.email
             FROM transactions t
             JOIN customers c ON c.id = t.customer_id
             WHERE (?1 IS NULL OR t.customer_id = ?1)
               AND (?2 IS NULL OR t.date >= ?2)
               AND (?3 IS NULL OR t.date <= ?3)
             ORDER BY t.date ASC, t.id ASC",
        )?;

        let rows = stmt
            .query_map(params![filter.customer_id, start, end], |row| {
                Ok(TransactionRow {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    amount: row.get(2)?,
                    customer: Customer {
                        id: row.get(3)?,
                        name: row.get(4)?,
                        email: row.get(5)?,
                    },
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let transactions = rows
            .into_iter()
            .map(TransactionRow::into_transaction)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Listed {} transactions (customer: {:?}, range: {:?})",
            transactions.len(),
            filter.customer_id,
            filter.date_range
        );

        Ok(transactions)
    }
}

/// Raw row before the TEXT columns are decoded
struct TransactionRow {
    id: i64,
    date: String,
    amount: String,
    customer: Customer,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<Transaction> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            RewardsError::CorruptRecord(format!("transaction {} date {:?}: {}", self.id, self.date, e))
        })?;
        let amount = Decimal::from_str(&self.amount).map_err(|e| {
            RewardsError::CorruptRecord(format!(
                "transaction {} amount {:?}: {}",
                self.id, self.amount, e
            ))
        })?;

        Ok(Transaction::new(Some(self.id), date, amount, self.customer))
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases ignore it)
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Dates as YYYY-MM-DD so range filters compare lexicographically.
    // Amounts as TEXT to keep exact decimals.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL REFERENCES customers(id),
            date TEXT NOT NULL,
            amount TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_customer ON transactions(customer_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)",
        [],
    )?;

    Ok(())
}
