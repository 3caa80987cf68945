//! Per-session configuration.

use super::tables::EssenceTables;
use super::types::EssenceType;
use crate::core::constants::{DEFAULT_CONVERSION_PROB, DEFAULT_EXALTED_PRICE, DEFAULT_NUM_UNITS};
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Parameters shared by every session of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Batches of three lesser essences bought at session start
    pub num_units: u32,

    /// Lesser essences per exalted orb, used as the cost basis
    pub exalted_price: f64,

    /// Chance that one conversion attempt yields a greater essence
    pub conversion_probability: f64,

    /// Type holding the whole initial stock
    pub starting_type: EssenceType,

    /// Types that are kept instead of converted
    pub protected_types: Vec<EssenceType>,

    pub tables: EssenceTables,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_units: DEFAULT_NUM_UNITS,
            exalted_price: DEFAULT_EXALTED_PRICE,
            conversion_probability: DEFAULT_CONVERSION_PROB,
            starting_type: EssenceType::Torment,
            protected_types: vec![EssenceType::Haste, EssenceType::Electricity],
            tables: EssenceTables::default(),
        }
    }
}

impl SessionConfig {
    /// Reference configuration with a different unit count
    pub fn with_units(num_units: u32) -> Self {
        Self {
            num_units,
            ..Default::default()
        }
    }

    /// Convert every type, keep nothing
    pub fn unprotected(num_units: u32) -> Self {
        Self {
            num_units,
            protected_types: Vec::new(),
            ..Default::default()
        }
    }

    /// Check the scalar parameters. Tables are checked when the engine is built.
    pub fn validate(&self) -> SimResult<()> {
        if self.num_units == 0 {
            return Err(SimError::invalid("num_units", "must be positive"));
        }
        if !self.exalted_price.is_finite() || self.exalted_price <= 0.0 {
            return Err(SimError::invalid(
                "exalted_price",
                format!("must be a positive number, got {}", self.exalted_price),
            ));
        }
        if !(0.0..=1.0).contains(&self.conversion_probability) {
            return Err(SimError::invalid(
                "conversion_probability",
                format!("must be within [0, 1], got {}", self.conversion_probability),
            ));
        }
        Ok(())
    }
}
