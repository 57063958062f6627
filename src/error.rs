// Error taxonomy for the rewards library
//
// Lookup failures and input validation failures are distinct variants so
// callers can tell "customer not found" apart from an empty-but-valid summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewardsError {
    /// No customer record exists for the requested identifier
    #[error("Customer not found with ID: {0}")]
    CustomerNotFound(i64),

    /// Transaction amounts must be zero or positive
    #[error("Invalid transaction amount: {0} (amounts must not be negative)")]
    InvalidAmount(Decimal),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A stored value could not be decoded (bad date or amount text)
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RewardsError {
    /// True for errors caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RewardsError::InvalidAmount(_) | RewardsError::InvalidDateRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RewardsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_not_found_message_names_the_id() {
        let err = RewardsError::CustomerNotFound(42);
        assert_eq!(err.to_string(), "Customer not found with ID: 42");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_validation_errors_are_client_errors() {
        assert!(RewardsError::InvalidAmount(dec!(-1)).is_client_error());

        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = RewardsError::InvalidDateRange { start, end };
        assert!(err.is_client_error());
        assert!(err.to_string().contains("2024-03-01"));
    }
}
