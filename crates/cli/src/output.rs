//! Report rendering

use colored::Colorize;
use tabled::{Table, Tabled};

use busload_core::application::{HarnessConfig, RunOutcome, RunReport};

#[derive(Tabled)]
struct ReportRow {
    metric: &'static str,
    value: String,
}

fn format_percent(value: f32) -> String {
    format!("{:.2} %", value)
}

pub fn print_text(config: &HarnessConfig, report: &RunReport) {
    match &report.outcome {
        RunOutcome::Pass => {
            println!("{}", "✓ CPU usage stayed inside the envelope".green().bold());
        }
        RunOutcome::EnvelopeExceeded {
            observed,
            limit,
            iteration,
        } => {
            println!(
                "{}",
                format!(
                    "✗ [EXCEEDED] cpu usage = {} / limit = {} at iteration {}",
                    format_percent(*observed),
                    format_percent(*limit),
                    iteration
                )
                .red()
                .bold()
            );
        }
        RunOutcome::PlatformUnavailable(reason) => {
            println!(
                "{}",
                format!("○ Skipped: CPU counter unavailable ({})", reason).yellow()
            );
            return;
        }
        other => {
            println!("{}", format!("✗ {}", other).red().bold());
        }
    }
    println!();

    let rows = vec![
        ReportRow {
            metric: "threads",
            value: config.thread_count.to_string(),
        },
        ReportRow {
            metric: "duration",
            value: humantime::format_duration(config.duration).to_string(),
        },
        ReportRow {
            metric: "iterations",
            value: report.iterations.to_string(),
        },
        ReportRow {
            metric: "baseline",
            value: format_percent(report.baseline),
        },
        ReportRow {
            metric: "limit",
            value: format_percent(report.limit),
        },
        ReportRow {
            metric: "max observed",
            value: format_percent(report.max_observed),
        },
    ];
    println!("{}", Table::new(rows));

    if report.inconclusive {
        println!();
        println!(
            "{}",
            "○ Last iteration inconclusive: not every worker parked before the deadline".yellow()
        );
    }
}

pub fn print_json(report: &RunReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
