use crate::infra::{in_memory_calculation, parse_instant};
use art_eligibility::calculations::pvls::{
    CalculationContext, CalculationOutcome, ClinicalDataset, Cohort, EvaluateResponse,
    LocationRef, PatientId,
};
use art_eligibility::config::AppConfig;
use art_eligibility::error::AppError;
use chrono::{Local, NaiveDateTime};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// CSV export of ART start dates (patient_id,art_start_date)
    #[arg(long)]
    pub(crate) art_csv: PathBuf,
    /// CSV export of observations (patient_id,encounter_type,concept,location,obs_datetime,...)
    #[arg(long)]
    pub(crate) obs_csv: PathBuf,
    /// Reference instant for the lookback window (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Only consider viral-load results recorded at this location
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Patients to evaluate (repeatable); defaults to every patient in the exports
    #[arg(long)]
    pub(crate) cohort: Vec<u64>,
    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        art_csv,
        obs_csv,
        now,
        location,
        cohort,
        json,
    } = args;

    let config = AppConfig::load()?;
    let dataset = ClinicalDataset::from_paths(&art_csv, &obs_csv)?;
    let cohort: Cohort = if cohort.is_empty() {
        dataset.cohort()
    } else {
        cohort.into_iter().map(PatientId).collect()
    };

    let mut context = CalculationContext::new(now.unwrap_or_else(|| Local::now().naive_local()));
    if let Some(location) = location {
        context = context.at_location(LocationRef(location));
    }

    let calculation = in_memory_calculation(dataset, config.metadata.clone(), config.eligibility);
    let outcome = calculation.evaluate(&cohort, &context)?;
    let minimum_months_on_art = config.eligibility.minimum_months_on_art;

    if json {
        let response = EvaluateResponse::from_outcome(&outcome, minimum_months_on_art);
        serde_json::to_writer_pretty(std::io::stdout().lock(), &response)
            .map_err(std::io::Error::from)?;
        println!();
    } else {
        render_outcome(&outcome, &context, minimum_months_on_art);
    }

    Ok(())
}

fn render_outcome(outcome: &CalculationOutcome, context: &CalculationContext, minimum_months: u32) {
    let summary = outcome.summary();

    println!("On ART for more than {minimum_months} months");
    println!(
        "Viral load window: {} -> {}",
        outcome.window.start, outcome.window.end
    );
    match &context.location {
        Some(location) => println!("Location: {location}"),
        None => println!("Location: all"),
    }

    println!(
        "\nEvaluated {} patient(s): {} eligible, {} not eligible",
        summary.evaluated, summary.eligible, summary.not_eligible
    );

    if outcome.results.is_empty() {
        println!("\nNo patients in cohort");
        return;
    }

    println!("\nPatient results");
    for (patient_id, eligible) in &outcome.results {
        let label = if *eligible { "eligible" } else { "not eligible" };
        println!("- {patient_id}: {label}");
    }
}
