//! CSV export of session outcomes, one row per session.
//!
//! The two mapping columns hold a JSON object keyed by essence name, e.g.
//! `{"Haste":2,"Mind":1}`.

use crate::error::SimResult;
use crate::essence::SessionOutcome;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct OutcomeRow {
    initial_exalted_costs: f64,
    initial_minor_essences: u64,
    final_simulations: u64,
    remaining_minor_essences: String,
    major_essences: String,
    major_essence_value: f64,
    minor_essence_value: f64,
    total_values: f64,
    profits: f64,
}

impl OutcomeRow {
    fn from_outcome(outcome: &SessionOutcome) -> SimResult<Self> {
        Ok(Self {
            initial_exalted_costs: outcome.initial_cost,
            initial_minor_essences: outcome.initial_minor_count,
            final_simulations: outcome.total_conversions,
            remaining_minor_essences: serde_json::to_string(&outcome.remaining_inventory)?,
            major_essences: serde_json::to_string(&outcome.major_counts)?,
            major_essence_value: outcome.major_value,
            minor_essence_value: outcome.protected_value,
            total_values: outcome.total_value,
            profits: outcome.profit,
        })
    }
}

/// Write outcomes as CSV to any writer.
pub fn write_csv_to<W: Write>(writer: W, outcomes: &[SessionOutcome]) -> SimResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        csv_writer.serialize(OutcomeRow::from_outcome(outcome)?)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write outcomes as CSV to `path`, replacing any existing file.
pub fn write_csv(path: impl AsRef<Path>, outcomes: &[SessionOutcome]) -> SimResult<()> {
    let file = File::create(path)?;
    write_csv_to(BufWriter::new(file), outcomes)
}
