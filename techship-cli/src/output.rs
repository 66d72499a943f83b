//! Terminal rendering for lookup results and dashboard tables.
//!
//! The renderers only consume fully-populated values: every
//! `TrackingResult` carries enough to be displayed on its own, and results
//! are printed in the order the queries were made.

use console::style;
use techship::store::MasterDb;
use techship::tracking::TrackingResult;

/// Widest a table cell is rendered before truncation.
const MAX_CELL_WIDTH: usize = 32;

/// Print a batch of lookup results in query order.
pub fn print_results(results: &[TrackingResult]) {
    for (i, result) in results.iter().enumerate() {
        println!();
        println!(
            "{} Result {} of {}: {}",
            style(">").cyan().bold(),
            i + 1,
            results.len(),
            style(result.original_input()).bold()
        );
        print_result(result);
    }
}

fn print_result(result: &TrackingResult) {
    match result {
        TrackingResult::Success {
            tracking_number,
            event,
            retention_note,
            ..
        } => {
            let status = match event.name.to_lowercase() {
                name if name.contains("delivered") => style(&event.name).green().bold(),
                name if name.contains("transit") => style(&event.name).yellow().bold(),
                _ => style(&event.name).blue().bold(),
            };
            let location = match (event.location_city.as_str(), event.location_state.as_str()) {
                ("", "") => "Unknown".to_string(),
                (city, "") => city.to_string(),
                ("", state) => state.to_string(),
                (city, state) => format!("{}, {}", city, state),
            };

            println!("  Status:      {}", status);
            println!("  Local time:  {}", event.time_local);
            println!("  UTC time:    {}", event.time_utc);
            println!("  Location:    {}", location);
            println!("  Category:    {}", event.category);
            println!("  Description: {}", event.description);
            println!("  Tracking #:  {}", tracking_number);
            println!("  {}", style(retention_note).green());
        }
        TrackingResult::Failure {
            error,
            retention_note,
            ..
        } => {
            println!("  {}", style(error).red());
            if let Some(note) = retention_note {
                println!("  {}", note);
            }
        }
    }
}

/// Print a database as a plain fixed-width table.
pub fn print_table(db: &MasterDb) {
    let widths: Vec<usize> = db
        .headers()
        .iter()
        .enumerate()
        .map(|(col, header)| {
            db.rows()
                .iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let header_line: Vec<String> = db
        .headers()
        .iter()
        .zip(&widths)
        .map(|(header, &w)| pad(header, w))
        .collect();
    println!("{}", style(header_line.join("  ")).bold());
    println!(
        "{}",
        widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("  ")
    );

    for row in db.rows() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| pad(cell, w))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn pad(value: &str, width: usize) -> String {
    let truncated: String = if value.chars().count() > width {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", kept)
    } else {
        value.to_string()
    };
    format!("{:<width$}", truncated, width = width)
}
