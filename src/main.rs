use anyhow::{bail, Context, Result};
use chrono::Local;
use customer_rewards::{
    import_transactions, init_logging, load_csv, seed_sample_data, Config, DateRange,
    RewardsService, RewardsSummary, SqliteStore,
};
use std::env;
use std::path::Path;
use std::sync::Arc;

const USAGE: &str = "Usage: customer-rewards <command>

Commands:
  import <csv-path>      Import purchases (date,amount,customer_name,customer_email)
  seed                   Insert the sample customers and purchases
  report [customer-id]   Print rewards (one customer: last three months)";

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let csv_path = args.get(2).context("import needs a CSV path")?;
            run_import(&config, Path::new(csv_path))?;
        }
        Some("seed") => run_seed(&config)?,
        Some("report") => {
            let customer_id = args
                .get(2)
                .map(|raw| raw.parse::<i64>())
                .transpose()
                .context("customer id must be an integer")?;
            run_report(&config, customer_id)?;
        }
        _ => {
            eprintln!("{}", USAGE);
            bail!("missing or unknown command");
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.db_path)
        .with_context(|| format!("Failed to open database at {:?}", config.db_path))
}

fn run_import(config: &Config, csv_path: &Path) -> Result<()> {
    println!("📂 Loading {:?}...", csv_path);
    let rows = load_csv(csv_path).with_context(|| format!("Failed to read {:?}", csv_path))?;
    println!("✓ Loaded {} rows", rows.len());

    let store = open_store(config)?;
    let report = import_transactions(&store, &rows)?;

    println!(
        "✓ Imported {} transactions, {} new customers",
        report.transactions_inserted, report.customers_created
    );
    println!("✓ Database contains {} transactions", store.count_transactions()?);

    Ok(())
}

fn run_seed(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let report = seed_sample_data(&store, Local::now().date_naive())?;

    println!(
        "✓ Sample data ready: {} customers, {} new transactions",
        report.customers, report.transactions
    );

    Ok(())
}

fn run_report(config: &Config, customer_id: Option<i64>) -> Result<()> {
    let service = RewardsService::new(Arc::new(open_store(config)?));

    match customer_id {
        Some(id) => {
            let range = DateRange::last_three_months(Local::now().date_naive());
            let summary = service.rewards_for_customer_between(id, range)?;
            println!("Rewards from {} to {}:", range.start(), range.end());
            print_summary(&summary);
        }
        None => {
            let summaries = service.rewards_for_all_customers(None)?;
            if summaries.is_empty() {
                println!("No transactions on record.");
            }
            for summary in &summaries {
                print_summary(summary);
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &RewardsSummary) {
    println!(
        "\n{} (#{}): {} points",
        summary.customer_name, summary.customer_id, summary.total_rewards
    );
    for reward in &summary.monthly_rewards {
        println!("  {}  {:>8}", reward.month, reward.amount);
    }
}
