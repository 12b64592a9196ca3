//! Daily water balance accounting
//!
//! [`WaterBalanceChecker`] compares the fluxes of a simulated day with the
//! change in storage between the state before and after the day. Every
//! identity that fails by more than the tolerance is counted; nothing is
//! corrected.

use log::warn;
use soilwat_core::state::{DailyFluxes, SoilWaterState};
use std::fmt;

/// Default absolute tolerance of every identity (cm).
pub const BALANCE_TOLERANCE: f64 = 1e-9;

/// One accounting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceCheck {
    /// Actual evapotranspiration does not exceed the potential.
    AetWithinPet,
    /// Actual evapotranspiration equals the sum of its components.
    AetComponents,
    /// Ponded water changes by its inputs minus infiltration, runoff and
    /// evaporation.
    Surface,
    /// Total soil water changes by infiltration minus drainage, soil
    /// evaporation and transpiration.
    Soil,
    /// Each layer changes by its inflow minus outflow, evaporation and
    /// transpiration plus hydraulic redistribution.
    Layer,
    /// The whole column changes by precipitation and run-on minus all losses.
    Column,
}

impl BalanceCheck {
    pub const ALL: [BalanceCheck; 6] = [
        BalanceCheck::AetWithinPet,
        BalanceCheck::AetComponents,
        BalanceCheck::Surface,
        BalanceCheck::Soil,
        BalanceCheck::Layer,
        BalanceCheck::Column,
    ];

    fn index(self) -> usize {
        match self {
            BalanceCheck::AetWithinPet => 0,
            BalanceCheck::AetComponents => 1,
            BalanceCheck::Surface => 2,
            BalanceCheck::Soil => 3,
            BalanceCheck::Layer => 4,
            BalanceCheck::Column => 5,
        }
    }
}

impl fmt::Display for BalanceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BalanceCheck::AetWithinPet => "AET <= PET",
            BalanceCheck::AetComponents => "AET = E + T",
            BalanceCheck::Surface => "surface water",
            BalanceCheck::Soil => "soil water",
            BalanceCheck::Layer => "layer water",
            BalanceCheck::Column => "column water",
        };
        write!(f, "{}", name)
    }
}

/// Counts of failed identities over all checked days.
#[derive(Debug, Clone)]
pub struct WaterBalanceChecker {
    tolerance: f64,
    failures: [usize; 6],
    days: usize,
}

impl Default for WaterBalanceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterBalanceChecker {
    pub fn new() -> Self {
        Self::with_tolerance(BALANCE_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            failures: [0; 6],
            days: 0,
        }
    }

    /// Number of days checked.
    pub fn days(&self) -> usize {
        self.days
    }

    /// Number of days on which `check` failed.
    pub fn failures(&self, check: BalanceCheck) -> usize {
        self.failures[check.index()]
    }

    /// Number of failed identities over all checks and days.
    pub fn total_failures(&self) -> usize {
        self.failures.iter().sum()
    }

    /// Check one day.
    ///
    /// # Arguments
    ///
    /// * `before` - State at the end of the previous day
    /// * `after` - State at the end of the day
    /// * `precipitation` - Precipitation of the day (cm)
    /// * `fluxes` - Fluxes of the day
    ///
    /// # Returns
    ///
    /// The identities that failed today
    pub fn check_day(
        &mut self,
        before: &SoilWaterState,
        after: &SoilWaterState,
        precipitation: f64,
        fluxes: &DailyFluxes,
    ) -> Vec<BalanceCheck> {
        self.days += 1;
        let tol = self.tolerance;
        let mut failed = Vec::new();
        let mut record = |check: BalanceCheck, ok: bool| {
            if !ok {
                failed.push(check);
            }
        };

        record(BalanceCheck::AetWithinPet, fluxes.aet <= fluxes.pet + tol);

        let aet_components = fluxes.snow_loss
            + fluxes.evap_surface()
            + fluxes.evap_soil_total()
            + fluxes.transpiration_total();
        record(
            BalanceCheck::AetComponents,
            (fluxes.aet - aet_components).abs() <= tol,
        );

        let surface_in =
            fluxes.rain - fluxes.interception() + fluxes.snowmelt - fluxes.snow_runoff;
        let standing_expected = before.standing_water.today + fluxes.runon + surface_in
            - fluxes.infiltration
            - fluxes.runoff
            - fluxes.evap_ponded;
        record(
            BalanceCheck::Surface,
            (after.standing_water.today - standing_expected).abs() <= tol,
        );

        let soil_change = after.total_swc() - before.total_swc();
        let soil_net = fluxes.infiltration
            - fluxes.deep_drainage
            - fluxes.evap_soil_total()
            - fluxes.transpiration_total();
        record(BalanceCheck::Soil, (soil_change - soil_net).abs() <= tol);

        let layers_ok = (0..after.n_layers()).all(|i| {
            let inflow = if i == 0 {
                fluxes.infiltration
            } else {
                fluxes.percolation[i - 1]
            };
            let net = inflow - fluxes.percolation[i] - fluxes.evap_soil[i]
                - fluxes.transpiration_layer(i)
                + fluxes.hydraulic_redistribution_layer(i);
            (after.swc.today[i] - before.swc.today[i] - net).abs() <= tol
        });
        record(BalanceCheck::Layer, layers_ok);

        let storage = |s: &SoilWaterState| {
            s.total_swc()
                + s.snowpack.today
                + s.standing_water.today
                + s.veg_interception_storage.iter().sum::<f64>()
                + s.litter_interception_storage
        };
        let column_net = precipitation + fluxes.runon
            - fluxes.aet
            - fluxes.deep_drainage
            - fluxes.runoff
            - fluxes.snow_runoff;
        record(
            BalanceCheck::Column,
            (storage(after) - storage(before) - column_net).abs() <= tol,
        );

        for check in &failed {
            self.failures[check.index()] += 1;
            warn!("water balance check '{}' failed", check);
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soilwat_core::site::SiteConfiguration;

    fn state() -> SoilWaterState {
        let profile = SiteConfiguration::default().build_profile().unwrap();
        SoilWaterState::new(&profile)
    }

    #[test]
    fn test_quiet_day_passes() {
        let before = state();
        let after = before.clone();
        let fluxes = DailyFluxes::new(before.n_layers());
        let mut checker = WaterBalanceChecker::new();

        assert!(checker.check_day(&before, &after, 0.0, &fluxes).is_empty());
        assert_eq!(checker.days(), 1);
        assert_eq!(checker.total_failures(), 0);
    }

    #[test]
    fn test_consistent_infiltration_passes() {
        let before = state();
        let mut after = before.clone();
        after.swc.today[0] += 0.5;
        let mut fluxes = DailyFluxes::new(before.n_layers());
        fluxes.rain = 0.5;
        fluxes.infiltration = 0.5;

        let mut checker = WaterBalanceChecker::new();
        assert!(checker.check_day(&before, &after, 0.5, &fluxes).is_empty());
    }

    #[test]
    fn test_unaccounted_water_is_counted() {
        let before = state();
        let mut after = before.clone();
        after.swc.today[2] += 0.1;
        let fluxes = DailyFluxes::new(before.n_layers());

        let mut checker = WaterBalanceChecker::new();
        let failed = checker.check_day(&before, &after, 0.0, &fluxes);
        assert!(failed.contains(&BalanceCheck::Soil));
        assert!(failed.contains(&BalanceCheck::Layer));
        assert!(failed.contains(&BalanceCheck::Column));
        assert!(!failed.contains(&BalanceCheck::Surface));
        assert_eq!(checker.failures(BalanceCheck::Soil), 1);
        assert_eq!(checker.failures(BalanceCheck::AetWithinPet), 0);
    }

    #[test]
    fn test_aet_above_pet() {
        let before = state();
        let mut fluxes = DailyFluxes::new(before.n_layers());
        fluxes.pet = 0.1;
        fluxes.aet = 0.2;
        fluxes.snow_loss = 0.2;

        let mut after = before.clone();
        after.snowpack.today -= 0.2;
        let mut checker = WaterBalanceChecker::new();
        let failed = checker.check_day(&before, &after, 0.0, &fluxes);
        assert_eq!(failed, vec![BalanceCheck::AetWithinPet]);
    }
}
