//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use academy_worker::TaskReport;
use academy_worker::lifecycle::{RunMode, SweepReport};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{item:#?}");
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

#[derive(Serialize, Tabled)]
struct GroupRow {
    kind: String,
    action: String,
    count: usize,
}

#[derive(Serialize, Tabled)]
struct ItemRow {
    subscription: String,
    label: String,
    action: String,
    reason: String,
    outcome: String,
    detail: String,
}

/// Print whatever report a task produced
pub fn print_task_report(report: &TaskReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_item(report, format);
        return;
    }

    match report {
        TaskReport::Lifecycle(sweep) => print_sweep(sweep),
        TaskReport::Generation(r) => {
            println!("Session generation:");
            print_kv("Templates", &r.templates.to_string());
            print_kv("Created", &r.created.to_string());
            print_kv("Already existed", &r.existing.to_string());
            print_kv("Past subscription end", &r.beyond_end.to_string());
            print_kv("Inactive subscription", &r.skipped_templates.to_string());
            print_kv("Errors", &r.errors.to_string());
        }
        TaskReport::Preparation(r) => {
            println!("Session preparation:");
            print_kv("Eligible", &r.eligible.to_string());
            print_kv("Prepared", &r.prepared.to_string());
            print_kv("Skipped", &r.skipped.to_string());
            print_kv("Errors", &r.errors.to_string());
        }
        TaskReport::Recordings(r) => {
            let title = if r.dry_run {
                "Recording sweep (dry run):"
            } else {
                "Recording sweep:"
            };
            println!("{title}");
            print_kv("Eligible", &r.eligible.to_string());
            print_kv("Stopped", &r.stopped_count.to_string());
            print_kv("Nothing to stop", &r.nothing_to_stop.to_string());
            print_kv("Unsupported kind", &r.unsupported.to_string());
            print_kv("Errors", &r.error_count.to_string());
        }
        TaskReport::Locked { name } => {
            print_warning(&format!("{name} is already running elsewhere; nothing done"));
        }
    }
}

fn print_sweep(report: &SweepReport) {
    if report.locked {
        print_warning(&format!(
            "{} is already running elsewhere; nothing done",
            report.sweep
        ));
        return;
    }

    let mode = match report.mode {
        RunMode::Apply => "apply",
        RunMode::DryRun => "dry run",
    };
    println!("{} ({mode}) as of {}", report.sweep, report.as_of.to_rfc3339());

    if report.groups.is_empty() {
        print_success("Nothing to do.");
    } else {
        let groups: Vec<GroupRow> = report
            .groups
            .iter()
            .map(|g| GroupRow {
                kind: g.kind.to_string(),
                action: g.action.to_string(),
                count: g.count,
            })
            .collect();
        println!("{}", Table::new(&groups));
    }

    if !report.items.is_empty() {
        let items: Vec<ItemRow> = report
            .items
            .iter()
            .map(|i| ItemRow {
                subscription: i.subscription_id.to_string(),
                label: i.label.clone(),
                action: i.action.clone(),
                reason: i.reason.clone(),
                outcome: i.outcome.clone(),
                detail: i.detail.clone().unwrap_or_default(),
            })
            .collect();
        println!("{}", Table::new(&items));
    }

    let s = &report.summary;
    print_kv("Candidates", &s.candidates.to_string());
    match report.mode {
        RunMode::Apply => print_kv("Applied", &s.applied.to_string()),
        RunMode::DryRun => print_kv("Would apply", &s.previewed.to_string()),
    };
    print_kv("Already notified", &s.already_notified.to_string());
    print_kv("Skipped", &s.skipped.to_string());
    print_kv("Errors", &s.errors.to_string());
}
