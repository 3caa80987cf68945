//! Conversion engine: one essence session from fresh stock to exhaustion.
//!
//! A session starts with `num_units * 3` lesser essences of the starting
//! type. Each step consumes three lesser essences of one convertible type and
//! either yields a greater essence (drawn from the major weights) or refunds a
//! single lesser essence (drawn from the failure weights). The session ends
//! when no unprotected type holds three or more essences, after which the
//! terminal state is valued.

use super::config::SessionConfig;
use super::types::{EssenceType, MinorInventory};
use crate::core::constants::{BATCH_SIZE, ESSENCE_TYPE_COUNT};
use crate::error::{SimError, SimResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// What a single conversion attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionResult {
    /// Success: a greater essence of this type was obtained.
    Major(EssenceType),
    /// Failure: one lesser essence of this type was refunded.
    Refund(EssenceType),
}

/// One transition of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStep {
    pub consumed: EssenceType,
    pub result: ConversionResult,
}

/// Summary of one finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub initial_cost: f64,
    pub initial_minor_count: u64,
    pub total_conversions: u64,
    pub remaining_inventory: BTreeMap<EssenceType, u64>,
    /// Greater essences obtained, grouped by type (only types obtained)
    pub major_counts: BTreeMap<EssenceType, u64>,
    pub major_value: f64,
    pub protected_value: f64,
    pub total_value: f64,
    pub profit: f64,
}

impl SessionOutcome {
    pub fn majors_obtained(&self) -> u64 {
        self.major_counts.values().sum()
    }

    pub fn is_profitable(&self) -> bool {
        self.profit > 0.0
    }
}

/// A validated session configuration with its weighted distributions built.
///
/// Construct once and share by reference across every session of a run.
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    config: SessionConfig,
    protected: [bool; ESSENCE_TYPE_COUNT],
    major_prices: [f64; ESSENCE_TYPE_COUNT],
    minor_prices: [f64; ESSENCE_TYPE_COUNT],
    major_dist: WeightedIndex<f64>,
    failure_dist: WeightedIndex<f64>,
}

impl ConversionEngine {
    /// Validate `config` and precompute its distributions.
    pub fn new(config: SessionConfig) -> SimResult<Self> {
        config.validate()?;
        let dense = config.tables.to_dense()?;

        let major_dist = WeightedIndex::new(dense.major_weights).map_err(|e| {
            SimError::invalid("major_weights", e.to_string())
        })?;
        let failure_dist = WeightedIndex::new(dense.failure_weights).map_err(|e| {
            SimError::invalid("failure_weights", e.to_string())
        })?;

        let mut protected = [false; ESSENCE_TYPE_COUNT];
        for essence in &config.protected_types {
            protected[essence.index()] = true;
        }

        if protected[config.starting_type.index()] {
            warn!(
                starting_type = %config.starting_type,
                "starting type is protected, sessions will make no conversions"
            );
        }

        Ok(Self {
            config,
            protected,
            major_prices: dense.major_prices,
            minor_prices: dense.minor_prices,
            major_dist,
            failure_dist,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_protected(&self, essence: EssenceType) -> bool {
        self.protected[essence.index()]
    }

    /// Lesser essences bought for one session.
    pub fn initial_minor_count(&self) -> u64 {
        self.config.num_units as u64 * BATCH_SIZE
    }

    /// Fresh state for a new session.
    pub fn start(&self) -> SessionState {
        SessionState {
            inventory: MinorInventory::with_stock(
                self.config.starting_type,
                self.initial_minor_count(),
            ),
            major_log: Vec::new(),
            total_conversions: 0,
        }
    }

    /// Types that can be converted right now, in canonical order.
    pub fn convertible_types(&self, inventory: &MinorInventory) -> Vec<EssenceType> {
        EssenceType::ALL
            .into_iter()
            .filter(|essence| inventory.get(*essence) >= BATCH_SIZE && !self.is_protected(*essence))
            .collect()
    }

    /// Pick the type to convert next.
    ///
    /// The starting type is always preferred while it is convertible, so the
    /// original stock is depleted first. Otherwise the choice is uniform over
    /// the convertible types.
    pub fn choose_conversion_type(
        &self,
        convertible: &[EssenceType],
        rng: &mut impl Rng,
    ) -> Option<EssenceType> {
        if convertible.contains(&self.config.starting_type) {
            return Some(self.config.starting_type);
        }
        convertible.choose(rng).copied()
    }

    pub fn roll_major(&self, rng: &mut impl Rng) -> EssenceType {
        EssenceType::ALL[self.major_dist.sample(rng)]
    }

    pub fn roll_refund(&self, rng: &mut impl Rng) -> EssenceType {
        EssenceType::ALL[self.failure_dist.sample(rng)]
    }

    /// Run one session to exhaustion and value the result.
    pub fn run_session(&self, rng: &mut impl Rng) -> SessionOutcome {
        let mut state = self.start();
        while state.step(self, rng).is_some() {}
        self.value(&state)
    }

    /// Value a terminal (or any) session state.
    ///
    /// Only greater essences and protected lesser essences count. Leftover
    /// unprotected essences (fewer than three of a type at the end) are not
    /// priced.
    pub fn value(&self, state: &SessionState) -> SessionOutcome {
        let initial_minor_count = self.initial_minor_count();
        let initial_cost = initial_minor_count as f64 / self.config.exalted_price;

        let major_value = state
            .major_log
            .iter()
            .fold(0.0, |acc, essence| acc + self.major_prices[essence.index()]);

        let protected_value = state
            .inventory
            .iter()
            .filter(|(essence, _)| self.is_protected(*essence))
            .fold(0.0, |acc, (essence, count)| {
                acc + count as f64 * self.minor_prices[essence.index()]
            });

        let total_value = major_value + protected_value;

        SessionOutcome {
            initial_cost,
            initial_minor_count,
            total_conversions: state.total_conversions,
            remaining_inventory: state.inventory.to_map(),
            major_counts: state.major_counts(),
            major_value,
            protected_value,
            total_value,
            profit: total_value - initial_cost,
        }
    }
}

/// Mutable state of a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub inventory: MinorInventory,
    /// Greater essences in the order they were obtained
    pub major_log: Vec<EssenceType>,
    pub total_conversions: u64,
}

impl SessionState {
    /// Perform one conversion attempt. Returns `None` once terminal.
    pub fn step(&mut self, engine: &ConversionEngine, rng: &mut impl Rng) -> Option<ConversionStep> {
        let convertible = engine.convertible_types(&self.inventory);
        let consumed = engine.choose_conversion_type(&convertible, rng)?;

        self.inventory.remove(consumed, BATCH_SIZE);
        self.total_conversions += 1;

        let result = if rng.gen::<f64>() < engine.config().conversion_probability {
            let major = engine.roll_major(rng);
            self.major_log.push(major);
            ConversionResult::Major(major)
        } else {
            let refund = engine.roll_refund(rng);
            self.inventory.add(refund, 1);
            ConversionResult::Refund(refund)
        };

        Some(ConversionStep { consumed, result })
    }

    pub fn is_terminal(&self, engine: &ConversionEngine) -> bool {
        engine.convertible_types(&self.inventory).is_empty()
    }

    /// Greater essences grouped by type.
    pub fn major_counts(&self) -> BTreeMap<EssenceType, u64> {
        let mut counts = BTreeMap::new();
        for essence in &self.major_log {
            *counts.entry(*essence).or_insert(0) += 1;
        }
        counts
    }
}

/// Validate `config` and run a single session with `rng`.
pub fn run_session(config: &SessionConfig, rng: &mut impl Rng) -> SimResult<SessionOutcome> {
    let engine = ConversionEngine::new(config.clone())?;
    Ok(engine.run_session(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::essence::tables::EssenceTables;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn unprotected(num_units: u32, conversion_probability: f64) -> SessionConfig {
        SessionConfig {
            num_units,
            conversion_probability,
            protected_types: Vec::new(),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_start_puts_all_stock_on_starting_type() {
        let engine = ConversionEngine::new(SessionConfig::default()).unwrap();
        let state = engine.start();
        assert_eq!(state.inventory.get(EssenceType::Torment), 3000);
        assert_eq!(state.inventory.total(), 3000);
        assert!(state.major_log.is_empty());
        assert_eq!(state.total_conversions, 0);
    }

    #[test]
    fn test_starting_type_preferred_while_convertible() {
        let engine = ConversionEngine::new(SessionConfig::default()).unwrap();
        let mut rng = create_test_rng();
        let convertible = [EssenceType::Body, EssenceType::Torment, EssenceType::Ruin];
        for _ in 0..50 {
            assert_eq!(
                engine.choose_conversion_type(&convertible, &mut rng),
                Some(EssenceType::Torment)
            );
        }
    }

    #[test]
    fn test_uniform_choice_without_starting_type() {
        let engine = ConversionEngine::new(SessionConfig::default()).unwrap();
        let mut rng = create_test_rng();
        let convertible = [EssenceType::Body, EssenceType::Mind, EssenceType::Ruin];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let chosen = engine.choose_conversion_type(&convertible, &mut rng).unwrap();
            assert!(convertible.contains(&chosen));
            seen.insert(chosen);
        }
        assert_eq!(seen.len(), 3, "every convertible type should be picked");
        assert_eq!(engine.choose_conversion_type(&[], &mut rng), None);
    }

    #[test]
    fn test_convertible_excludes_protected_and_small_stacks() {
        let engine = ConversionEngine::new(SessionConfig::default()).unwrap();
        let mut inventory = MinorInventory::with_stock(EssenceType::Torment, 3);
        inventory.add(EssenceType::Haste, 10);
        inventory.add(EssenceType::Electricity, 3);
        inventory.add(EssenceType::Body, 2);
        assert_eq!(engine.convertible_types(&inventory), vec![EssenceType::Torment]);
    }

    #[test]
    fn test_step_consumes_batch_and_resolves_once() {
        let engine = ConversionEngine::new(SessionConfig::default()).unwrap();
        let mut rng = create_test_rng();
        let mut state = engine.start();

        while !state.is_terminal(&engine) {
            let before = state.clone();
            let step = state.step(&engine, &mut rng).unwrap();
            assert_eq!(state.total_conversions, before.total_conversions + 1);

            match step.result {
                ConversionResult::Major(major) => {
                    assert_eq!(state.major_log.len(), before.major_log.len() + 1);
                    assert_eq!(state.major_log.last(), Some(&major));
                    assert_eq!(state.inventory.total() + 3, before.inventory.total());
                }
                ConversionResult::Refund(refund) => {
                    assert_eq!(state.major_log.len(), before.major_log.len());
                    assert_eq!(state.inventory.total() + 2, before.inventory.total());
                    let expected = before.inventory.get(refund) + 1
                        - if refund == step.consumed { 3 } else { 0 };
                    assert_eq!(state.inventory.get(refund), expected);
                }
            }
        }
        assert!(state.step(&engine, &mut rng).is_none());
    }

    #[test]
    fn test_single_unit_certain_success() {
        let config = unprotected(1, 1.0);
        let outcome = run_session(&config, &mut create_test_rng()).unwrap();

        assert_eq!(outcome.total_conversions, 1);
        assert_eq!(outcome.majors_obtained(), 1);
        assert!(outcome.remaining_inventory.values().all(|count| *count == 0));
        assert_eq!(outcome.protected_value, 0.0);
    }

    #[test]
    fn test_certain_failure_refunding_starting_type() {
        let config = SessionConfig {
            tables: EssenceTables::default().with_failure_refund_only(EssenceType::Torment),
            ..unprotected(10, 0.0)
        };
        let engine = ConversionEngine::new(config).unwrap();
        let mut rng = create_test_rng();
        let mut state = engine.start();

        let mut expected = 30;
        while let Some(step) = state.step(&engine, &mut rng) {
            assert_eq!(step.consumed, EssenceType::Torment);
            assert_eq!(step.result, ConversionResult::Refund(EssenceType::Torment));
            expected -= 2;
            assert_eq!(state.inventory.get(EssenceType::Torment), expected);
        }

        // 30 -> 28 -> ... -> 2
        assert_eq!(state.total_conversions, 14);
        assert_eq!(state.inventory.get(EssenceType::Torment), 2);
        assert!(state.major_log.is_empty());
    }

    #[test]
    fn test_protected_starting_type_makes_no_conversions() {
        let config = SessionConfig {
            protected_types: vec![EssenceType::Torment],
            ..SessionConfig::default()
        };
        let outcome = run_session(&config, &mut create_test_rng()).unwrap();
        assert_eq!(outcome.total_conversions, 0);
        // Protected stock is valued at the minor price
        assert_eq!(outcome.protected_value, 3000.0 * 0.5);
    }

    #[test]
    fn test_zero_draw_always_succeeds() {
        // StepRng(0, 0) yields 0.0 for every float draw and index 0 for every
        // weighted draw, so each conversion produces a greater Body essence.
        let config = unprotected(4, 0.5);
        let mut rng = StepRng::new(0, 0);
        let outcome = run_session(&config, &mut rng).unwrap();

        assert_eq!(outcome.total_conversions, 4);
        assert_eq!(outcome.major_counts.get(&EssenceType::Body), Some(&4));
        assert!((outcome.major_value - 10.8).abs() < 1e-9);
    }

    #[test]
    fn test_value_of_hand_built_state() {
        let engine = ConversionEngine::new(SessionConfig {
            num_units: 10,
            ..SessionConfig::default()
        })
        .unwrap();
        let mut inventory = MinorInventory::default();
        inventory.add(EssenceType::Haste, 4);
        inventory.add(EssenceType::Electricity, 2);
        inventory.add(EssenceType::Body, 2);
        let state = SessionState {
            inventory,
            major_log: vec![EssenceType::Haste, EssenceType::Mind, EssenceType::Haste],
            total_conversions: 9,
        };

        let outcome = engine.value(&state);
        assert_eq!(outcome.initial_minor_count, 30);
        assert_eq!(outcome.initial_cost, 30.0 / 2.23);
        assert_eq!(outcome.major_value, 186.0 + 26.0 + 186.0);
        // Body leftovers are unprotected and not valued
        assert_eq!(outcome.protected_value, 4.0 * 1.5 + 2.0 * 5.0);
        assert_eq!(outcome.major_counts.get(&EssenceType::Haste), Some(&2));
        assert_eq!(outcome.major_counts.get(&EssenceType::Mind), Some(&1));
        assert_eq!(outcome.major_counts.len(), 2);
        assert_eq!(outcome.total_value, outcome.major_value + outcome.protected_value);
        assert_eq!(outcome.profit, outcome.total_value - outcome.initial_cost);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            conversion_probability: 1.5,
            ..SessionConfig::default()
        };
        let err = run_session(&config, &mut create_test_rng()).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidParameter {
                name: "conversion_probability",
                ..
            }
        ));
    }
}
