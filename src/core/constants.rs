// Conversion batches
pub const BATCH_SIZE: u64 = 3;
pub const ESSENCE_TYPE_COUNT: usize = 12;

// Session defaults
pub const DEFAULT_NUM_UNITS: u32 = 1000;
pub const DEFAULT_EXALTED_PRICE: f64 = 2.23;
pub const DEFAULT_CONVERSION_PROB: f64 = 0.02249178;

// Orchestrator defaults
pub const DEFAULT_NUM_SESSIONS: u32 = 100_000;
pub const DEFAULT_OUTPUT_PATH: &str = "poe2_essence_simulation_results.csv";

// Failure refund weights, from observed outcomes (3868 failed conversions:
// 291 Electricity, 111 Haste, the rest spread evenly over the other ten)
pub const FAILURE_OBSERVATIONS: f64 = 3868.0;
pub const FAILURE_ELECTRICITY_OBSERVED: f64 = 291.0;
pub const FAILURE_HASTE_OBSERVED: f64 = 111.0;
pub const FAILURE_OTHER_OBSERVED: f64 = 3466.0;
