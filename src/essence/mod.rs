//! Essence conversion: types, tables, session config, and the conversion engine.

#![allow(unused_imports)]

pub mod config;
pub mod logic;
pub mod tables;
pub mod types;

pub use config::*;
pub use logic::*;
pub use tables::*;
pub use types::*;
