//! Session orchestrator: fan out independent sessions, collect the outcomes.
//!
//! Every session gets its own `ChaCha8Rng`. With a base seed the stream for
//! session `i` is seeded from `seed + i`, so runs are reproducible regardless
//! of how rayon schedules them. Without a seed each stream comes from OS
//! entropy.

use super::config::SimConfig;
use crate::error::SimResult;
use crate::essence::{ConversionEngine, SessionConfig, SessionOutcome};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Random stream for one session.
pub fn session_rng(seed: Option<u64>, session_idx: u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(session_idx)),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Run `num_sessions` sessions with identical configuration.
///
/// The configuration is validated once up front; the returned collection is
/// ordered by session index.
pub fn run_many(
    num_sessions: u32,
    config: &SessionConfig,
    seed: Option<u64>,
) -> SimResult<Vec<SessionOutcome>> {
    let engine = ConversionEngine::new(config.clone())?;
    Ok(run_sessions(&engine, num_sessions, seed))
}

/// Run the full simulation described by `config`.
pub fn run_simulation(config: &SimConfig) -> SimResult<Vec<SessionOutcome>> {
    let engine = ConversionEngine::new(config.session.clone())?;

    info!(
        sessions = config.num_sessions,
        units = config.session.num_units,
        starting_type = %config.session.starting_type,
        seed = ?config.seed,
        "starting simulation"
    );
    let started = Instant::now();

    let outcomes = match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads.max(1))
                .build()?;
            pool.install(|| run_sessions(&engine, config.num_sessions, config.seed))
        }
        None => run_sessions(&engine, config.num_sessions, config.seed),
    };

    info!(
        sessions = outcomes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation finished"
    );
    Ok(outcomes)
}

fn run_sessions(
    engine: &ConversionEngine,
    num_sessions: u32,
    seed: Option<u64>,
) -> Vec<SessionOutcome> {
    (0..num_sessions)
        .into_par_iter()
        .map(|session_idx| {
            let mut rng = session_rng(seed, session_idx as u64);
            let outcome = engine.run_session(&mut rng);
            debug!(
                session = session_idx,
                conversions = outcome.total_conversions,
                majors = outcome.majors_obtained(),
                profit = outcome.profit,
                "session complete"
            );
            outcome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    #[test]
    fn test_run_many_returns_one_outcome_per_session() {
        let config = SessionConfig::with_units(20);
        for n in [0, 1, 7, 64] {
            let outcomes = run_many(n, &config, Some(42)).unwrap();
            assert_eq!(outcomes.len(), n as usize);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let config = SessionConfig::with_units(50);
        let first = run_many(16, &config, Some(7)).unwrap();
        let second = run_many(16, &config, Some(7)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sessions_use_independent_streams() {
        let config = SessionConfig::with_units(200);
        let outcomes = run_many(8, &config, Some(1)).unwrap();
        let distinct: std::collections::HashSet<u64> =
            outcomes.iter().map(|o| o.total_conversions).collect();
        assert!(distinct.len() > 1, "sessions should not share a stream");
    }

    #[test]
    fn test_session_order_matches_index() {
        let config = SessionConfig::with_units(30);
        let engine = ConversionEngine::new(config.clone()).unwrap();
        let outcomes = run_many(5, &config, Some(100)).unwrap();
        for (idx, outcome) in outcomes.iter().enumerate() {
            let mut rng = session_rng(Some(100), idx as u64);
            assert_eq!(*outcome, engine.run_session(&mut rng));
        }
    }

    #[test]
    fn test_invalid_config_fails_before_dispatch() {
        let config = SessionConfig {
            exalted_price: 0.0,
            ..SessionConfig::with_units(10)
        };
        assert!(matches!(
            run_many(3, &config, None),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_run_simulation_with_thread_override() {
        let config = SimConfig {
            num_sessions: 12,
            threads: Some(2),
            ..SimConfig::quick(9)
        };
        let outcomes = run_simulation(&config).unwrap();
        assert_eq!(outcomes.len(), 12);
        assert!(outcomes.iter().all(|o| o.initial_minor_count == 300));
    }
}
