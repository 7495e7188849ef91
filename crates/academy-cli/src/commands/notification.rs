//! Notification housekeeping command.

use chrono::{DateTime, Utc};
use clap::Args;

use academy_core::events::{DomainEvent, SystemEvent};
use academy_core::result::AppResult;
use academy_core::traits::publish_or_warn;
use academy_service::notification::PurgeSelector;

use crate::output;

/// Arguments for purge-notifications
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Delete every notification
    #[arg(long, conflicts_with = "before")]
    pub all: bool,
    /// Delete notifications created before this date or timestamp
    #[arg(long, value_parser = super::parse_instant)]
    pub before: Option<DateTime<Utc>>,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// purge-notifications
pub async fn execute(args: &PurgeArgs, config_path: &str) -> AppResult<()> {
    let selector = PurgeSelector::from_flags(args.all, args.before)?;

    let ctx = super::connect(config_path).await?;
    let service = ctx.notification_service();

    let matching = service.count(selector).await?;
    if matching == 0 {
        output::print_success("No notifications to delete.");
        return Ok(());
    }

    let prompt = format!("Delete {matching} notification(s)?");
    if !super::confirm(&prompt, args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    let removed = service.purge(selector).await?;
    publish_or_warn(
        ctx.events.as_ref(),
        DomainEvent::at(ctx.clock.now(), SystemEvent::NotificationsPurged { removed }.into()),
    )
    .await;

    output::print_success(&format!("Deleted {removed} notification(s)"));
    Ok(())
}
