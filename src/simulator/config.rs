//! Simulation configuration.

use crate::core::constants::{DEFAULT_NUM_SESSIONS, DEFAULT_OUTPUT_PATH};
use crate::essence::SessionConfig;
use std::path::PathBuf;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of independent sessions to run
    pub num_sessions: u32,

    /// Parameters shared by every session
    pub session: SessionConfig,

    /// Base random seed for reproducibility (None = OS entropy per session)
    pub seed: Option<u64>,

    /// Worker threads (None = rayon default, one per core)
    pub threads: Option<usize>,

    /// Where the per-session CSV is written
    pub output_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_sessions: DEFAULT_NUM_SESSIONS,
            session: SessionConfig::default(),
            seed: None,
            threads: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl SimConfig {
    /// Quick config for a small reproducible run
    pub fn quick(seed: u64) -> Self {
        Self {
            num_sessions: 1000,
            session: SessionConfig::with_units(100),
            seed: Some(seed),
            ..Default::default()
        }
    }
}
