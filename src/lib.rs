//! Essence - Monte Carlo simulator for lesser-to-greater essence conversion
//!
//! This module exposes the conversion engine and the session orchestrator for
//! testing and external use.

pub mod core;
pub mod error;
pub mod essence;
pub mod simulator;

pub use error::{SimError, SimResult};
pub use essence::{run_session, ConversionEngine, EssenceType, SessionConfig, SessionOutcome};
pub use simulator::{run_many, SimConfig, SimReport};
