//! Shared constants for the essence simulator.

#![allow(unused_imports)]

pub mod constants;

pub use constants::*;
