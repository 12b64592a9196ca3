//! Daily water flow through one soil column
//!
//! # What This Component Does
//!
//! [`WaterFlow::run_one_day`] moves one day of weather through the column in
//! a fixed order:
//!
//! 1. Partitions precipitation into rain and snow, melts the snowpack
//! 2. Computes Penman potential evapotranspiration
//! 3. Intercepts rain on canopies and, without snow, on litter
//! 4. Adds snowmelt and run-on to the surface, infiltrates surface water
//!    with saturated percolation and removes runoff from ponded water
//! 5. Derives potential bare-soil evaporation and transpiration
//! 6. Consumes demand by priority: sublimation first, then evaporation of
//!    intercepted and ponded water, all scaled to the remaining demand
//! 7. Extracts bare-soil evaporation and transpiration from the layers
//! 8. Redistributes water through roots, deepest-rooted types first
//! 9. Drains unsaturated layers
//! 10. Updates the soil temperature profile
//!
//! Every flux of the day is returned in [`DailyFluxes`]; the column state is
//! updated in place.
//!
//! # Water balance
//!
//! Within a day
//!
//! $$P + R_{on} = AET + D_{deep} + R_{off} + R_{snow} + \Delta S$$
//!
//! where the storage $S$ is soil water, snowpack, ponded water and water held
//! by canopies and litter.

pub mod evapotranspiration;
pub mod infiltration;
pub mod interception;
pub mod pet;
pub mod redistribution;
pub mod snow;

use crate::components::soil_temperature::{SoilTemperatureSolver, SurfaceConditions};
use evapotranspiration::{
    evaporate_from_surface, evaporation_weighted_swp, partition_es_t,
    potential_bare_ground_evaporation, potential_soil_evaporation, potential_transpiration,
    remove_from_soil, transpiration_weighted_swp,
};
use infiltration::{infiltrate_high, percolate_unsaturated};
use interception::{canopy_interception, litter_interception};
use log::debug;
use ndarray::Array1;
use pet::{petfunc, PetInputs};
use redistribution::hydraulic_redistribution;
use snow::{adjust_snow, snow_depth, snow_loss};
use soilwat_core::errors::{SoilwatError, SoilwatResult};
use soilwat_core::site::SiteParameters;
use soilwat_core::soil::SoilProfile;
use soilwat_core::state::{DailyFluxes, SoilWaterState};
use soilwat_core::tolerance::{eq, gt};
use soilwat_core::vegetation::{DailyVegetation, VegetationComposition, VegetationKind, N_VEG};
use soilwat_core::weather::{DailySky, WeatherRecord};

/// Everything that drives one simulated day.
#[derive(Debug, Clone, Copy)]
pub struct DayDrivers<'a> {
    /// Day of year (1-based).
    pub doy: usize,
    /// Today's weather.
    pub weather: &'a WeatherRecord,
    /// Today's sky climatology; fills weather fields that are absent.
    pub sky: &'a DailySky,
    /// Vegetation parameters.
    pub composition: &'a VegetationComposition,
    /// Today's canopy values.
    pub vegetation: &'a [DailyVegetation; N_VEG],
}

/// Daily water flow engine of one site.
#[derive(Debug, Clone)]
pub struct WaterFlow {
    parameters: SiteParameters,
}

impl WaterFlow {
    /// Create the component from site parameters.
    pub fn from_parameters(parameters: SiteParameters) -> Self {
        Self { parameters }
    }

    /// Site parameters of the component.
    pub fn parameters(&self) -> &SiteParameters {
        &self.parameters
    }

    /// Simulate one day.
    ///
    /// # Arguments
    ///
    /// * `day` - Weather, sky and vegetation of the day
    /// * `profile` - Soil profile
    /// * `state` - Column state; advanced to today and updated in place
    /// * `soil_temperature` - Soil temperature solver; stepped when soil
    ///   temperature is enabled
    ///
    /// # Returns
    ///
    /// The fluxes of the day
    pub fn run_one_day(
        &self,
        day: &DayDrivers,
        profile: &SoilProfile,
        state: &mut SoilWaterState,
        soil_temperature: &mut SoilTemperatureSolver,
    ) -> SoilwatResult<DailyFluxes> {
        let n = profile.len();
        if state.n_layers() != n {
            return Err(SoilwatError::Configuration(format!(
                "state has {} layers but the profile has {}",
                state.n_layers(),
                n
            )));
        }
        let site = &self.parameters;
        let weather = day.weather;
        let sky = day.sky;
        let daily = day.vegetation;

        state.advance();
        let mut fluxes = DailyFluxes::new(n);

        // Snow
        let partition = adjust_snow(
            &site.snow,
            day.doy,
            weather.temp_min,
            weather.temp_max,
            weather.precipitation,
            &mut state.snowpack.today,
            &mut state.snow_temperature,
        );
        fluxes.rain = partition.rain;
        fluxes.snowfall = partition.snowfall;
        fluxes.snowmelt = partition.snowmelt;

        // Potential evapotranspiration
        let pet = site.pet_scale
            * petfunc(&PetInputs {
                doy: day.doy,
                temp_avg: weather.temp_avg,
                latitude: site.latitude_radians(),
                elevation: site.elevation,
                slope: site.slope,
                aspect: site.aspect,
                albedo: day.composition.albedo(),
                humidity: weather.humidity.unwrap_or(sky.humidity),
                wind_speed: weather.wind_speed.unwrap_or(sky.wind_speed),
                cloud_cover: weather.cloud_cover.unwrap_or(sky.cloud_cover),
                transmission: sky.transmission,
            });
        fluxes.pet = pet;

        // Canopy cover above the snow
        let snow_depth_start = snow_depth(state.snowpack.today, sky.snow_density);
        let scale_veg: [f64; N_VEG] = std::array::from_fn(|k| {
            let veg = &daily[k];
            if gt(veg.height, 0.0) {
                (veg.cover * (1.0 - snow_depth_start / veg.height)).max(0.0)
            } else {
                veg.cover
            }
        });

        // Interception
        let mut h2o = partition.rain;
        fluxes.veg_interception = canopy_interception(
            &mut h2o,
            &mut state.veg_interception_storage,
            daily,
            day.composition,
            &scale_veg,
            sky.rain_events_per_day,
        );
        if gt(h2o, 0.0) && eq(state.snowpack.today, 0.0) {
            fluxes.litter_interception = litter_interception(
                &mut h2o,
                &mut state.litter_interception_storage,
                daily,
                day.composition,
                sky.rain_events_per_day,
            );
        }

        // Surface water
        let snowmelt = (partition.snowmelt * (1.0 - site.snow.percent_runoff / 100.0)).max(0.0);
        fluxes.snow_runoff = partition.snowmelt - snowmelt;
        h2o += snowmelt;

        if gt(site.percent_runon, 0.0) {
            // Identical upslope neighbour receiving the same water
            let mut up_swc = state.swc.today.clone();
            let mut up_drain = vec![0.0; n];
            let mut up_standing = state.standing_water.today;
            infiltrate_high(
                profile,
                &mut up_swc,
                &mut up_drain,
                h2o,
                &mut up_standing,
                &state.frozen,
            );
            fluxes.runon =
                ((up_standing - state.standing_water.yesterday) * site.percent_runon).max(0.0);
            state.standing_water.today += fluxes.runon;
        }

        // Saturated percolation
        let mut infiltration = h2o + state.standing_water.today;
        let mut deep_drainage = infiltrate_high(
            profile,
            &mut state.swc.today,
            &mut fluxes.percolation,
            h2o,
            &mut state.standing_water.today,
            &state.frozen,
        );
        infiltration -= state.standing_water.today;

        if gt(site.percent_runoff, 0.0) {
            fluxes.runoff = state.standing_water.today * site.percent_runoff;
            state.standing_water.today = (state.standing_water.today - fluxes.runoff).max(0.0);
        }

        // Potential rates
        let snow_free = eq(state.snowpack.today, 0.0);
        let evap_swp = evaporation_weighted_swp(profile, &state.swc.today)?;
        let mut soil_evap_rate_bare = if gt(day.composition.bare_cover, 0.0) && snow_free {
            potential_bare_ground_evaporation(evap_swp, pet, &site.evaporation_rate)
                * day.composition.bare_cover
        } else {
            0.0
        };

        let mut soil_evap_rate = [0.0; N_VEG];
        let mut transp_rate = [0.0; N_VEG];
        for (kind, veg) in day.composition.iter() {
            let k = kind.index();
            if !gt(scale_veg[k], 0.0) {
                continue;
            }
            let (fbse, fbst) = partition_es_t(daily[k].lai_live, veg.es_transp_partitioning);
            if snow_free {
                soil_evap_rate[k] = potential_soil_evaporation(
                    evap_swp,
                    daily[k].total_agb,
                    fbse,
                    pet,
                    veg.es_limit,
                    &site.evaporation_rate,
                ) * veg.cover;
            }
            let transp_swp = transpiration_weighted_swp(profile, &state.swc.today, k)?;
            transp_rate[k] = potential_transpiration(
                transp_swp,
                &daily[k],
                fbst,
                pet,
                &site.transpiration_rate,
                &veg.shade,
                veg.co2_wue_multiplier,
            ) * scale_veg[k];
        }

        // Sublimation takes precedence over all other losses
        fluxes.snow_loss = snow_loss(&mut state.snowpack.today, pet);
        state.snow_depth = snow_depth(state.snowpack.today, sky.snow_density);
        let pet_remaining = (pet - fluxes.snow_loss).max(0.0);

        // Potential evaporation of intercepted and ponded water
        let mut peti = pet_remaining;
        let mut evap_veg_rate = [0.0; N_VEG];
        for k in 0..N_VEG {
            if !gt(scale_veg[k], 0.0) {
                continue;
            }
            evap_veg_rate[k] =
                (peti * scale_veg[k]).min(state.veg_interception_storage[k]).max(0.0);
            peti -= evap_veg_rate[k] / scale_veg[k];
        }
        let mut evap_litter_rate = peti.min(state.litter_interception_storage).max(0.0);
        peti -= evap_litter_rate;
        let mut evap_ponded_rate = peti.min(state.standing_water.today).max(0.0);

        let total_rate = evap_litter_rate
            + evap_ponded_rate
            + soil_evap_rate_bare
            + (0..N_VEG)
                .map(|k| evap_veg_rate[k] + soil_evap_rate[k] + transp_rate[k])
                .sum::<f64>();
        if gt(total_rate, pet_remaining) {
            let factor = pet_remaining / total_rate;
            for k in 0..N_VEG {
                evap_veg_rate[k] *= factor;
                soil_evap_rate[k] *= factor;
                transp_rate[k] *= factor;
            }
            evap_litter_rate *= factor;
            evap_ponded_rate *= factor;
            soil_evap_rate_bare *= factor;
        }

        // Surface evaporation
        let mut aet = fluxes.snow_loss;
        for k in 0..N_VEG {
            evaporate_from_surface(
                &mut state.veg_interception_storage[k],
                &mut evap_veg_rate[k],
                &mut aet,
            );
        }
        fluxes.evap_veg = evap_veg_rate;
        evaporate_from_surface(
            &mut state.litter_interception_storage,
            &mut evap_litter_rate,
            &mut aet,
        );
        fluxes.evap_litter = evap_litter_rate;
        evaporate_from_surface(
            &mut state.standing_water.today,
            &mut evap_ponded_rate,
            &mut aet,
        );
        fluxes.evap_ponded = evap_ponded_rate;

        // Soil evaporation and transpiration
        if gt(soil_evap_rate_bare, 0.0) {
            aet += remove_from_soil(
                profile,
                &mut state.swc.today,
                &mut fluxes.evap_soil,
                profile.n_evap_layers(),
                |l| l.evap_coeff,
                |l| l.swc_halfwiltpt,
                soil_evap_rate_bare,
                &state.frozen,
            )?;
        }
        for kind in VegetationKind::ALL {
            let k = kind.index();
            if !gt(scale_veg[k], 0.0) {
                continue;
            }
            aet += remove_from_soil(
                profile,
                &mut state.swc.today,
                &mut fluxes.evap_soil,
                profile.n_evap_layers(),
                |l| l.evap_coeff,
                |l| l.swc_halfwiltpt,
                soil_evap_rate[k],
                &state.frozen,
            )?;

            let mut transpired = vec![0.0; n];
            aet += remove_from_soil(
                profile,
                &mut state.swc.today,
                &mut transpired,
                profile.n_transp_layers(k),
                |l| l.transp_coeff[k],
                |l| l.swc_at_crit[k],
                transp_rate[k],
                &state.frozen,
            )?;
            fluxes.transpiration.row_mut(k).assign(&Array1::from(transpired));
        }
        fluxes.aet = aet;

        // Hydraulic redistribution, deepest-rooted types first
        for kind in VegetationKind::ALL.iter().rev() {
            let k = kind.index();
            let veg = day.composition.get(*kind);
            if veg.hydraulic_redistribution.enabled
                && gt(veg.cover, 0.0)
                && gt(daily[k].biolive, 0.0)
            {
                let hydred = hydraulic_redistribution(
                    profile,
                    &mut state.swc.today,
                    k,
                    &veg.hydraulic_redistribution,
                    veg.cover,
                    &state.frozen,
                )?;
                fluxes
                    .hydraulic_redistribution
                    .row_mut(k)
                    .assign(&Array1::from(hydred));
            }
        }

        // Unsaturated percolation
        infiltration += state.standing_water.today;
        deep_drainage += percolate_unsaturated(
            profile,
            &mut state.swc.today,
            &mut fluxes.percolation,
            &mut state.standing_water.today,
            site.slow_drain_coeff,
            &state.frozen,
        );
        infiltration -= state.standing_water.today;
        fluxes.infiltration = infiltration;
        fluxes.deep_drainage = deep_drainage;

        // Soil temperature
        if site.soil_temperature.enabled {
            let biomass: f64 = VegetationKind::ALL
                .iter()
                .map(|kind| daily[kind.index()].surface_biomass(*kind))
                .sum();
            let conditions = SurfaceConditions {
                air_temperature: weather.temp_avg,
                pet,
                aet,
                biomass,
                snow_depth: state.snow_depth,
                snowpack: state.snowpack.today,
            };
            let step = soil_temperature.step_one_day(&conditions, profile, &state.swc.today)?;
            state.soil_temperature.today = step.layer_temperatures;
            state.frozen = step.frozen;
            state.surface_temperature = step.surface_temperature;
            fluxes.soil_temperature_error = step.error;
        }
        fluxes.surface_temperature = state.surface_temperature;

        debug!(
            "day {}: pet = {:.4}, aet = {:.4}, infiltration = {:.4}, deep drainage = {:.4}",
            day.doy, fluxes.pet, fluxes.aet, fluxes.infiltration, fluxes.deep_drainage
        );
        Ok(fluxes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use soilwat_core::site::SiteConfiguration;

    struct Column {
        config: SiteConfiguration,
        profile: SoilProfile,
        state: SoilWaterState,
        solver: SoilTemperatureSolver,
        flow: WaterFlow,
    }

    impl Column {
        fn new(config: SiteConfiguration) -> Self {
            let profile = config.build_profile().unwrap();
            let state = SoilWaterState::new(&profile);
            let mut solver =
                SoilTemperatureSolver::from_parameters(config.site.soil_temperature.clone());
            solver
                .initialize(&profile, &state.soil_temperature.today)
                .unwrap();
            let flow = WaterFlow::from_parameters(config.site.clone());
            Self {
                config,
                profile,
                state,
                solver,
                flow,
            }
        }

        fn run(&mut self, doy: usize, weather: &WeatherRecord) -> DailyFluxes {
            let sky = self.config.sky.daily(doy, 2001);
            let vegetation = self.config.vegetation.daily(doy, 2001);
            let drivers = DayDrivers {
                doy,
                weather,
                sky: &sky,
                composition: &self.config.vegetation,
                vegetation: &vegetation,
            };
            self.flow
                .run_one_day(&drivers, &self.profile, &mut self.state, &mut self.solver)
                .unwrap()
        }

        fn storage(&self) -> f64 {
            self.state.total_swc()
                + self.state.snowpack.today
                + self.state.standing_water.today
                + self.state.veg_interception_storage.iter().sum::<f64>()
                + self.state.litter_interception_storage
        }
    }

    #[test]
    fn test_rainy_summer_day_balances() {
        let mut column = Column::new(SiteConfiguration::default());
        let before = column.storage();
        let weather = WeatherRecord::new(25.0, 10.0, 2.0);
        let fluxes = column.run(180, &weather);

        assert!(fluxes.pet > 0.0);
        assert!(fluxes.aet <= fluxes.pet + 1e-12);
        assert!(fluxes.veg_interception[3] > 0.0);
        assert!(fluxes.infiltration > 0.0);

        let after = column.storage();
        let inputs = weather.precipitation + fluxes.runon;
        let outputs = fluxes.aet + fluxes.deep_drainage + fluxes.runoff + fluxes.snow_runoff;
        assert_relative_eq!(inputs - outputs, after - before, epsilon = 1e-9);
    }

    #[test]
    fn test_aet_components() {
        let mut column = Column::new(SiteConfiguration::default());
        column.run(170, &WeatherRecord::new(20.0, 8.0, 1.0));
        let fluxes = column.run(171, &WeatherRecord::new(30.0, 15.0, 0.0));
        let components = fluxes.snow_loss
            + fluxes.evap_surface()
            + fluxes.evap_soil_total()
            + fluxes.transpiration_total();
        assert_relative_eq!(fluxes.aet, components, epsilon = 1e-12);
    }

    #[test]
    fn test_cold_day_builds_snowpack() {
        let mut column = Column::new(SiteConfiguration::default());
        let fluxes = column.run(15, &WeatherRecord::new(-5.0, -15.0, 1.0));
        assert_relative_eq!(fluxes.snowfall, 1.0);
        assert_relative_eq!(fluxes.rain, 0.0);
        assert!(column.state.snowpack.today > 0.0);
        assert!(column.state.snow_depth > 0.0);
        assert_relative_eq!(fluxes.litter_interception, 0.0);
    }

    #[test]
    fn test_runoff_and_runon() {
        let mut config = SiteConfiguration::default();
        config.site.percent_runoff = 0.5;
        config.site.percent_runon = 0.2;
        config.layers.iter_mut().for_each(|l| l.impermeability = 0.9);
        let mut column = Column::new(config);
        let before = column.storage();
        let weather = WeatherRecord::new(20.0, 10.0, 15.0);
        let fluxes = column.run(200, &weather);

        assert!(fluxes.runon > 0.0);
        assert!(fluxes.runoff > 0.0);
        let after = column.storage();
        let inputs = weather.precipitation + fluxes.runon;
        let outputs = fluxes.aet + fluxes.deep_drainage + fluxes.runoff + fluxes.snow_runoff;
        assert_relative_eq!(inputs - outputs, after - before, epsilon = 1e-9);
    }

    #[test]
    fn test_layer_count_mismatch() {
        let mut column = Column::new(SiteConfiguration::default());
        column.state.swc.today.pop();
        let sky = column.config.sky.daily(1, 2001);
        let vegetation = column.config.vegetation.daily(1, 2001);
        let weather = WeatherRecord::new(5.0, 0.0, 0.0);
        let drivers = DayDrivers {
            doy: 1,
            weather: &weather,
            sky: &sky,
            composition: &column.config.vegetation,
            vegetation: &vegetation,
        };
        let err = column
            .flow
            .run_one_day(&drivers, &column.profile, &mut column.state, &mut column.solver)
            .unwrap_err();
        assert!(matches!(err, SoilwatError::Configuration(_)));
    }
}
