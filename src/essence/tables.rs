//! Price and weight tables for essence conversion.
//!
//! The tables are plain configuration data keyed by essence type. They ship
//! with the reference values below and can be replaced from a JSON file with
//! the same shape (see `data/essence_tables.json`).

use super::types::EssenceType;
use crate::core::constants::{
    ESSENCE_TYPE_COUNT, FAILURE_ELECTRICITY_OBSERVED, FAILURE_HASTE_OBSERVED,
    FAILURE_OBSERVATIONS, FAILURE_OTHER_OBSERVED,
};
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One value per essence type.
pub type EssenceTable = BTreeMap<EssenceType, f64>;

/// Dense per-type values, indexed by `EssenceType::index`.
pub type DenseTable = [f64; ESSENCE_TYPE_COUNT];

// Greater essence prices, in canonical type order
const MAJOR_PRICES: DenseTable = [
    2.7,   // Body
    26.0,  // Mind
    13.5,  // Enhancement
    86.0,  // Infinite
    3.5,   // Flames
    5.6,   // Ice
    55.0,  // Electricity
    58.0,  // Torment
    8.5,   // Battle
    60.0,  // Sorcery
    6.0,   // Ruin
    186.0, // Haste
];

// Lesser essence prices; only protected types are ever valued
const MINOR_PRICES: DenseTable = [
    0.5,  // Body
    0.5,  // Mind
    13.5, // Enhancement
    0.5,  // Infinite
    0.5,  // Flames
    0.5,  // Ice
    5.0,  // Electricity
    0.5,  // Torment
    0.5,  // Battle
    0.5,  // Sorcery
    0.5,  // Ruin
    1.5,  // Haste
];

// Greater essence drop weights on a successful conversion
const MAJOR_WEIGHTS: DenseTable = [7.0, 13.0, 10.0, 10.0, 8.0, 8.0, 6.0, 4.0, 6.0, 5.0, 8.0, 4.0];

/// Converts a dense array into a keyed table.
fn keyed(values: &DenseTable) -> EssenceTable {
    EssenceType::ALL
        .into_iter()
        .map(|essence| (essence, values[essence.index()]))
        .collect()
}

/// Refund weights on a failed conversion.
fn default_failure_weights() -> EssenceTable {
    EssenceType::ALL
        .into_iter()
        .map(|essence| {
            let weight = match essence {
                EssenceType::Electricity => FAILURE_ELECTRICITY_OBSERVED / FAILURE_OBSERVATIONS,
                EssenceType::Haste => FAILURE_HASTE_OBSERVED / FAILURE_OBSERVATIONS,
                _ => FAILURE_OTHER_OBSERVED / FAILURE_OBSERVATIONS / 10.0,
            };
            (essence, weight)
        })
        .collect()
}

/// The four configuration tables a session reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssenceTables {
    pub major_prices: EssenceTable,
    pub minor_prices: EssenceTable,
    pub major_weights: EssenceTable,
    pub failure_weights: EssenceTable,
}

impl Default for EssenceTables {
    fn default() -> Self {
        Self {
            major_prices: keyed(&MAJOR_PRICES),
            minor_prices: keyed(&MINOR_PRICES),
            major_weights: keyed(&MAJOR_WEIGHTS),
            failure_weights: default_failure_weights(),
        }
    }
}

impl EssenceTables {
    /// Parse tables from JSON text.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tables from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replaces every failure weight with zero except `essence`.
    pub fn with_failure_refund_only(mut self, essence: EssenceType) -> Self {
        for (key, weight) in self.failure_weights.iter_mut() {
            *weight = if *key == essence { 1.0 } else { 0.0 };
        }
        self
    }

    /// Validated dense copies of the four tables.
    pub fn to_dense(&self) -> SimResult<DenseTables> {
        Ok(DenseTables {
            major_prices: dense_prices("major price", &self.major_prices)?,
            minor_prices: dense_prices("minor price", &self.minor_prices)?,
            major_weights: dense_weights("major weight", &self.major_weights)?,
            failure_weights: dense_weights("failure weight", &self.failure_weights)?,
        })
    }
}

/// Tables checked for completeness, indexed by essence type.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTables {
    pub major_prices: DenseTable,
    pub minor_prices: DenseTable,
    pub major_weights: DenseTable,
    pub failure_weights: DenseTable,
}

fn dense(table_name: &'static str, table: &EssenceTable) -> SimResult<DenseTable> {
    let mut values = [0.0; ESSENCE_TYPE_COUNT];
    for essence in EssenceType::ALL {
        values[essence.index()] =
            *table
                .get(&essence)
                .ok_or(SimError::MissingTableEntry {
                    table: table_name,
                    essence,
                })?;
    }
    Ok(values)
}

fn dense_prices(table_name: &'static str, table: &EssenceTable) -> SimResult<DenseTable> {
    let values = dense(table_name, table)?;
    for essence in EssenceType::ALL {
        let price = values[essence.index()];
        if !price.is_finite() {
            return Err(SimError::invalid(
                "prices",
                format!("{table_name} for {essence} is not finite"),
            ));
        }
    }
    Ok(values)
}

fn dense_weights(table_name: &'static str, table: &EssenceTable) -> SimResult<DenseTable> {
    let values = dense(table_name, table)?;
    for essence in EssenceType::ALL {
        let weight = values[essence.index()];
        if !weight.is_finite() || weight < 0.0 {
            return Err(SimError::InvalidWeight {
                table: table_name,
                essence,
                weight,
            });
        }
    }
    if values.iter().all(|w| *w == 0.0) {
        return Err(SimError::EmptyDistribution { table: table_name });
    }
    Ok(values)
}
