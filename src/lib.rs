// Customer Rewards - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod points;
pub mod rewards;
pub mod seed;
pub mod service;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::Config;
pub use db::{setup_database, RewardsStore, SqliteStore};
pub use error::{Result, RewardsError};
pub use models::{
    Customer, DateRange, MonthlyReward, RewardsSummary, Transaction, TransactionFilter,
};
pub use points::{calculate_points, validate_amount};
pub use rewards::{month_key, summarize_all_customers, summarize_for_customer};
pub use seed::{
    import_transactions, load_csv, seed_sample_data, CsvTransaction, ImportReport, SeedReport,
};
pub use service::{resolve_window, RewardsService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber (`RUST_LOG` overrides the `info` default)
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
