//! Monte Carlo simulator for essence conversion.
//!
//! Runs many independent conversion sessions in parallel to analyze:
//! - Expected profit per session and its spread
//! - How many conversions a starting stock sustains
//! - Which greater essences the conversions produce
//!
//! Every session uses `ConversionEngine` (src/essence/logic.rs), so the
//! simulated sessions follow exactly the same rules as a single session run.

mod config;
mod export;
mod report;
mod runner;

pub use config::SimConfig;
pub use export::{write_csv, write_csv_to};
pub use report::SimReport;
pub use runner::{run_many, run_simulation, session_rng};
