//! Process components of the soilwat daily soil water balance model
//!
//! # Module Organisation
//!
//! - `components`: the weather generator, the soil temperature solver and the
//!   water flow engine, each usable on its own
//! - `water_balance`: accounting checks of daily fluxes against state changes
//! - `simulation`: the daily driver that runs a configured site over years
//!
//! # Parameters
//!
//! Components are built from the parameter structs in `soilwat_core`, whose
//! defaults describe a temperate grassland.

pub mod components;
pub mod simulation;
pub mod water_balance;
