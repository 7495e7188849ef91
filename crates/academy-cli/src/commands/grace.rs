//! Grace period command.

use chrono::{DateTime, Utc};
use clap::Args;

use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_core::types::SubscriptionId;

use crate::output::{self, OutputFormat};

/// Arguments for grant-grace
#[derive(Debug, Args)]
pub struct GrantGraceArgs {
    /// Subscription ID
    pub subscription_id: String,
    /// Grace deadline, RFC 3339 or YYYY-MM-DD
    #[arg(long, value_parser = super::parse_instant)]
    pub until: DateTime<Utc>,
}

/// grant-grace
pub async fn execute(args: &GrantGraceArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let id: SubscriptionId = args
        .subscription_id
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid subscription ID: {e}")))?;

    let ctx = super::connect(config_path).await?;
    let as_of = ctx.clock.now();
    let subscription = ctx.grace_service().grant(id, args.until, as_of).await?;

    match format {
        OutputFormat::Json => output::print_item(&subscription, format),
        OutputFormat::Table => {
            output::print_success(&format!("Grace period granted to {}", subscription.id));
            output::print_kv("Subscription", &subscription.label());
            output::print_kv("Status", subscription.status.as_str());
            output::print_kv("Ends", &subscription.end_date.to_rfc3339());
            output::print_kv("Grace until", &args.until.to_rfc3339());
        }
    }
    Ok(())
}
