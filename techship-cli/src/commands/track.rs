//! Track command - live carrier lookups.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use techship::tracking::{ReqwestClient, TrackingClient, TrackingResult};

use crate::commands::common;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Tracking numbers, separated by spaces or commas
    #[arg(required = true, value_name = "NUMBER")]
    pub numbers: Vec<String>,
}

/// Run the track command.
///
/// Works for any tracking number, whether or not it appears in the master
/// database. Lookups run sequentially and results print in input order; a
/// failed number never stops the rest of the batch.
pub fn run(args: TrackArgs) -> Result<(), CliError> {
    let config = common::load_config()?;
    let numbers = common::split_tracking_input(&args.numbers);
    if numbers.is_empty() {
        return Err(CliError::InvalidArgument(
            "Please enter at least one valid tracking number".to_string(),
        ));
    }

    let api = config.api_config();
    let http = ReqwestClient::new(api.timeout).map_err(|e| CliError::Http(e.to_string()))?;
    let client = TrackingClient::new(http, api);

    let bar = ProgressBar::new(numbers.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
            .expect("static template")
            .progress_chars("=> "),
    );
    bar.set_message(format!("Calling TechTrack API for {} number(s)", numbers.len()));

    let results: Vec<TrackingResult> = numbers
        .iter()
        .map(|number| {
            let result = client.lookup(number);
            bar.inc(1);
            result
        })
        .collect();
    bar.finish_and_clear();

    output::print_results(&results);
    println!();
    println!(
        "Note: carriers typically purge tracking data after 90-180 days."
    );
    Ok(())
}
