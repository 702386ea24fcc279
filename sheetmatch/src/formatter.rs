//! Console output for a reconciliation run

use chrono::{DateTime, Local};
use colored::*;
use sheetmatch_core::{Location, ReportSummary};
use std::path::Path;

const TIME_FORMAT: &str = "%H:%M:%S";

pub fn print_start(location: &Location, started: DateTime<Local>) {
    println!("\n{}", "Running!".bold());
    println!("Time Start: {}", started.format(TIME_FORMAT));
    println!("{} {}", "Location:".bold(), location.name.cyan());
}

pub fn print_step(message: &str) {
    println!("- {}", message);
}

pub fn print_finish(output: &Path, summary: &ReportSummary, finished: DateTime<Local>) {
    println!(
        "{}\n",
        format!("*** Data has been written to: {} ***", output.display())
            .green()
            .bold()
    );

    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Identifiers:".bold(), summary.identifiers);
    if summary.not_found > 0 {
        println!("  {} {}", "No device found:".yellow().bold(), summary.not_found);
    }
    if summary.duplicate_keys > 0 {
        println!(
            "  {} {}",
            "Duplicate devices:".red().bold(),
            summary.duplicate_keys
        );
    }
    println!("  {} {}", "Category1:".blue().bold(), summary.category1);
    println!("  {} {}", "Category2:".blue().bold(), summary.category2);
    println!("  {} {}", "Category3:".blue().bold(), summary.category3);

    println!("\nTime End: {}", finished.format(TIME_FORMAT));
}
