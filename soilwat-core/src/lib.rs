//! Core types of the soilwat daily soil water balance model.
//!
//! # Module Organisation
//!
//! - [`errors`]: error type and result alias
//! - [`tolerance`]: magnitude-scaled floating point comparisons
//! - [`time`]: calendar helpers
//! - [`utils`]: response curves and interpolation
//! - [`swrc`]: soil water retention curves
//! - [`soil`]: soil layers and the soil profile
//! - [`vegetation`]: vegetation composition and daily canopy values
//! - [`weather`]: daily weather and monthly sky climatology
//! - [`markov`]: weather generator parameters
//! - [`site`]: site parameters and TOML configuration
//! - [`state`]: state carried between days and daily fluxes

pub mod errors;
pub mod markov;
pub mod site;
pub mod soil;
pub mod state;
pub mod swrc;
pub mod time;
pub mod tolerance;
pub mod utils;
pub mod vegetation;
pub mod weather;
