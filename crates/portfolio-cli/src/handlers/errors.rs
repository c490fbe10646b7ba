//! Errors command handler.

use anyhow::Result;
use portfolio_core::ErrorLogRepository;

use crate::bootstrap::StoreContext;
use crate::error::CliError;
use crate::presentation::{format_timestamp, print_separator, truncate_string};

/// Print the newest error-table records, newest first.
pub async fn execute(store: &StoreContext, limit: u32) -> Result<()> {
    let records = store
        .error_log
        .recent(limit)
        .await
        .map_err(CliError::from)?;

    if records.is_empty() {
        println!("No errors recorded.");
        return Ok(());
    }

    println!("{:<20} {:<22} Message", "Logged", "Type");
    print_separator(100);

    for record in records {
        println!(
            "{:<20} {:<22} {}",
            format_timestamp(Some(&record.logged_at)),
            truncate_string(&record.error_type, 21),
            truncate_string(&record.message, 80),
        );
    }

    Ok(())
}
