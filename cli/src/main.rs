//! Replay a JSON-lines observation feed through the reconciliation engine.
//!
//! Usage:
//!
//! ```text
//! passthrough-meter-cli <config.json> [feed.jsonl]
//! ```
//!
//! The config file is a `ReconcilerConfig` JSON object. The feed is one
//! observation per line (`{"key", "previous", "current", "unit"}`), read
//! from the given file or stdin. Observations with an unrecognized unit
//! are reported and skipped; malformed feed lines abort the replay.

use passthrough_meter_core_rs::{
    ObserveOutcome, Observation, ReconcileError, Reconciler, ReconcilerConfig,
};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        return Err("usage: passthrough-meter-cli <config.json> [feed.jsonl]".into());
    }

    let config_text = std::fs::read_to_string(&args[1])?;
    let config: ReconcilerConfig = serde_json::from_str(&config_text)?;
    let mut engine = Reconciler::new(config)?;

    let reader: Box<dyn BufRead> = match args.get(2) {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let observation: Observation = serde_json::from_str(line)
            .map_err(|e| format!("feed line {}: {}", index + 1, e))?;

        match engine.apply(&observation) {
            Ok(outcome) => print_outcome(&observation, &outcome),
            Err(err @ ReconcileError::Unit(_)) => {
                eprintln!("feed line {}: skipped: {}", index + 1, err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let totals = serde_json::json!({
        "pairing_id": engine.pairing_id().to_string(),
        "observations": engine.seq(),
        "total_input": engine.total_input(),
        "total_output": engine.total_output(),
        "pass_through": engine.pass_through(),
    });
    println!("{}", totals);

    Ok(())
}

fn print_outcome(observation: &Observation, outcome: &ObserveOutcome) {
    match outcome {
        ObserveOutcome::Applied {
            group,
            delta,
            recognized,
            residual,
        } => {
            eprintln!(
                "{} [{}] delta={} recognized={} residual={}",
                observation.key, group, delta, recognized, residual
            );
        }
        ObserveOutcome::Ignored(reason) => {
            eprintln!("{} ignored: {:?}", observation.key, reason);
        }
    }
}
