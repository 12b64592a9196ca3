//! State carried between days and the fluxes of one day

use crate::soil::SoilProfile;
use crate::vegetation::N_VEG;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Today's and yesterday's value of a state variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoDay<T> {
    pub today: T,
    pub yesterday: T,
}

impl<T: Clone> TwoDay<T> {
    /// Both days set to `value`.
    pub fn new(value: T) -> Self {
        Self {
            today: value.clone(),
            yesterday: value,
        }
    }

    /// Start a new day: yesterday becomes a copy of today.
    pub fn advance(&mut self) {
        self.yesterday.clone_from(&self.today);
    }

    /// Restore today to yesterday's value.
    pub fn revert(&mut self) {
        self.today.clone_from(&self.yesterday);
    }
}

impl TwoDay<f64> {
    /// Change from yesterday to today.
    pub fn delta(&self) -> f64 {
        self.today - self.yesterday
    }
}

/// State of one soil column.
///
/// Water amounts in cm, temperatures in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilWaterState {
    /// Soil water content per layer.
    pub swc: TwoDay<Vec<f64>>,
    /// Snowpack as snow water equivalent.
    pub snowpack: TwoDay<f64>,
    /// Ponded water on the surface.
    pub standing_water: TwoDay<f64>,
    /// Water held on the canopy of each vegetation type.
    pub veg_interception_storage: [f64; N_VEG],
    /// Water held in the litter layer.
    pub litter_interception_storage: f64,
    /// Snow depth (cm).
    pub snow_depth: f64,
    /// Lagged snowpack temperature.
    pub snow_temperature: f64,
    /// Soil temperature per layer.
    pub soil_temperature: TwoDay<Vec<f64>>,
    /// Soil surface temperature.
    pub surface_temperature: f64,
    /// Whether each layer is frozen.
    pub frozen: Vec<bool>,
}

impl SoilWaterState {
    /// Initial state of `profile`: initial water contents and temperatures,
    /// no snow, no surface water.
    pub fn new(profile: &SoilProfile) -> Self {
        let temps: Vec<f64> = profile
            .layers()
            .iter()
            .map(|l| l.initial_temperature)
            .collect();
        let surface_temperature = temps.first().copied().unwrap_or(0.0);
        Self {
            swc: TwoDay::new(profile.initial_swc()),
            snowpack: TwoDay::new(0.0),
            standing_water: TwoDay::new(0.0),
            veg_interception_storage: [0.0; N_VEG],
            litter_interception_storage: 0.0,
            snow_depth: 0.0,
            snow_temperature: 0.0,
            soil_temperature: TwoDay::new(temps),
            surface_temperature,
            frozen: vec![false; profile.len()],
        }
    }

    /// Number of soil layers.
    pub fn n_layers(&self) -> usize {
        self.swc.today.len()
    }

    /// Start a new day.
    pub fn advance(&mut self) {
        self.swc.advance();
        self.snowpack.advance();
        self.standing_water.advance();
        self.soil_temperature.advance();
    }

    /// Total soil water today.
    pub fn total_swc(&self) -> f64 {
        self.swc.today.iter().sum()
    }
}

/// Water fluxes and diagnostics of one simulated day (cm/day unless noted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFluxes {
    /// Precipitation falling as rain.
    pub rain: f64,
    /// Precipitation falling as snow.
    pub snowfall: f64,
    /// Snowmelt.
    pub snowmelt: f64,
    /// Snowmelt that runs off.
    pub snow_runoff: f64,
    /// Sublimation from the snowpack.
    pub snow_loss: f64,
    /// Rain intercepted by each canopy.
    pub veg_interception: [f64; N_VEG],
    /// Rain intercepted by litter.
    pub litter_interception: f64,
    /// Surface water arriving from upslope.
    pub runon: f64,
    /// Ponded water leaving as runoff.
    pub runoff: f64,
    /// Water entering the soil.
    pub infiltration: f64,
    /// Drainage out of each layer into the layer below (last: deep drainage).
    pub percolation: Vec<f64>,
    /// Drainage below the profile.
    pub deep_drainage: f64,
    /// Hydraulic redistribution per vegetation type and layer.
    pub hydraulic_redistribution: Array2<f64>,
    /// Potential evapotranspiration.
    pub pet: f64,
    /// Actual evapotranspiration.
    pub aet: f64,
    /// Evaporation of canopy-intercepted water.
    pub evap_veg: [f64; N_VEG],
    /// Evaporation of litter-intercepted water.
    pub evap_litter: f64,
    /// Evaporation of ponded water.
    pub evap_ponded: f64,
    /// Bare-soil evaporation per layer.
    pub evap_soil: Vec<f64>,
    /// Transpiration per vegetation type and layer.
    pub transpiration: Array2<f64>,
    /// Soil surface temperature (°C).
    pub surface_temperature: f64,
    /// Whether the soil temperature solver failed today.
    pub soil_temperature_error: bool,
}

impl DailyFluxes {
    /// All fluxes zero for a profile of `n_layers`.
    pub fn new(n_layers: usize) -> Self {
        Self {
            rain: 0.0,
            snowfall: 0.0,
            snowmelt: 0.0,
            snow_runoff: 0.0,
            snow_loss: 0.0,
            veg_interception: [0.0; N_VEG],
            litter_interception: 0.0,
            runon: 0.0,
            runoff: 0.0,
            infiltration: 0.0,
            percolation: vec![0.0; n_layers],
            deep_drainage: 0.0,
            hydraulic_redistribution: Array2::zeros((N_VEG, n_layers)),
            pet: 0.0,
            aet: 0.0,
            evap_veg: [0.0; N_VEG],
            evap_litter: 0.0,
            evap_ponded: 0.0,
            evap_soil: vec![0.0; n_layers],
            transpiration: Array2::zeros((N_VEG, n_layers)),
            surface_temperature: 0.0,
            soil_temperature_error: false,
        }
    }

    /// Total interception by canopies and litter.
    pub fn interception(&self) -> f64 {
        self.veg_interception.iter().sum::<f64>() + self.litter_interception
    }

    /// Total transpiration.
    pub fn transpiration_total(&self) -> f64 {
        self.transpiration.sum()
    }

    /// Transpiration from layer `i` summed over vegetation types.
    pub fn transpiration_layer(&self, i: usize) -> f64 {
        self.transpiration.column(i).sum()
    }

    /// Hydraulic redistribution into layer `i` summed over vegetation types.
    pub fn hydraulic_redistribution_layer(&self, i: usize) -> f64 {
        self.hydraulic_redistribution.column(i).sum()
    }

    /// Total bare-soil evaporation.
    pub fn evap_soil_total(&self) -> f64 {
        self.evap_soil.iter().sum()
    }

    /// Evaporation of intercepted and ponded water.
    pub fn evap_surface(&self) -> f64 {
        self.evap_veg.iter().sum::<f64>() + self.evap_litter + self.evap_ponded
    }

    /// Total evaporation including sublimation.
    pub fn evaporation_total(&self) -> f64 {
        self.evap_soil_total() + self.evap_surface() + self.snow_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteConfiguration;
    use approx::assert_relative_eq;
    use is_close::is_close;

    #[test]
    fn test_two_day() {
        let mut v = TwoDay::new(1.0);
        v.today = 3.0;
        assert_relative_eq!(v.delta(), 2.0);
        v.advance();
        assert_relative_eq!(v.yesterday, 3.0);
        v.today = 5.0;
        v.revert();
        assert_relative_eq!(v.today, 3.0);
    }

    #[test]
    fn test_initial_state() {
        let profile = SiteConfiguration::default().build_profile().unwrap();
        let state = SoilWaterState::new(&profile);
        assert_eq!(state.n_layers(), 5);
        assert_eq!(state.swc.today, state.swc.yesterday);
        assert!(state.frozen.iter().all(|&f| !f));
        assert_relative_eq!(state.snowpack.today, 0.0);
    }

    #[test]
    fn test_flux_totals() {
        let mut fluxes = DailyFluxes::new(3);
        fluxes.transpiration[[0, 1]] = 0.1;
        fluxes.transpiration[[3, 1]] = 0.2;
        fluxes.evap_soil[0] = 0.05;
        fluxes.evap_ponded = 0.01;
        fluxes.snow_loss = 0.02;

        assert!(is_close!(fluxes.transpiration_total(), 0.3));
        assert!(is_close!(fluxes.transpiration_layer(1), 0.3));
        assert!(is_close!(fluxes.evaporation_total(), 0.08));
        assert_relative_eq!(fluxes.interception(), 0.0);
    }
}
