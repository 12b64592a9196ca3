//! Conservation tests for the daily water balance.
//!
//! These tests run the full daily sequence over several years of generated
//! weather and verify that:
//! - every daily accounting identity holds
//! - soil water stays between zero and saturation in every layer
//! - water entering the column equals water leaving plus the storage change

use approx::assert_relative_eq;
use soilwat_components::simulation::{Simulation, WeatherSource};
use soilwat_components::water_balance::BalanceCheck;
use soilwat_core::markov::{MarkovParameters, TemperatureCovariance};
use soilwat_core::site::SiteConfiguration;
use soilwat_core::state::SoilWaterState;
use soilwat_core::time::year_length;

fn storage(state: &SoilWaterState) -> f64 {
    state.total_swc()
        + state.snowpack.today
        + state.standing_water.today
        + state.veg_interception_storage.iter().sum::<f64>()
        + state.litter_interception_storage
}

fn generated(config: SiteConfiguration, seed: u64) -> Simulation {
    let config = SiteConfiguration {
        markov: Some(config.markov.clone().unwrap_or_default()),
        ..config
    };
    Simulation::new(config, WeatherSource::Generated, seed)
        .unwrap()
        .with_balance_checks()
}

mod daily_identities {
    use super::*;

    /// Five years of a temperate grassland with runoff, run-on and slow
    /// drainage: no identity may fail on any day.
    #[test]
    fn test_multi_year_grassland() {
        let mut config = SiteConfiguration::default();
        config.site.percent_runoff = 0.3;
        config.site.percent_runon = 0.1;
        let mut sim = generated(config, 11);

        let summaries = sim.run(2001, 2005).unwrap();
        assert_eq!(summaries.len(), 5);

        let balance = sim.balance().unwrap();
        assert_eq!(balance.days(), 365 * 4 + 366);
        for check in BalanceCheck::ALL {
            assert_eq!(balance.failures(check), 0, "{} failed", check);
        }
    }

    /// A cold site where most precipitation falls as snow.
    #[test]
    fn test_snowy_site() {
        let covariance = TemperatureCovariance {
            var_tmax: 9.0,
            cov: 3.0,
            var_tmin: 9.0,
        };
        let config = SiteConfiguration {
            markov: Some(MarkovParameters::constant(
                0.4, 0.2, 0.5, 0.3, -2.0, -12.0, covariance,
            )),
            ..SiteConfiguration::default()
        };
        let mut sim = generated(config, 5);

        let mut snowfall = 0.0;
        for doy in 1..=120 {
            snowfall += sim.run_day(2002, doy).unwrap().fluxes.snowfall;
        }
        assert!(snowfall > 0.0);
        assert!(sim.state().snowpack.today > 0.0);
        assert_eq!(sim.balance().unwrap().total_failures(), 0);
    }
}

mod storage_bounds {
    use super::*;

    #[test]
    fn test_soil_water_within_bounds() {
        let mut sim = generated(SiteConfiguration::default(), 23);
        let profile = sim.profile().clone();

        for year in 2001..=2003 {
            for doy in 1..=year_length(year) {
                sim.run_day(year, doy).unwrap();
                for (layer, &swc) in profile.layers().iter().zip(&sim.state().swc.today) {
                    assert!(swc >= 0.0, "layer {} below zero on {}", layer.index, doy);
                    assert!(
                        swc <= layer.swc_saturated + 1e-9,
                        "layer {} above saturation on {}",
                        layer.index,
                        doy
                    );
                }
                assert!(sim.state().snowpack.today >= 0.0);
                assert!(sim.state().standing_water.today >= 0.0);
            }
        }
    }

    /// Cumulative inputs minus outputs equal the change in column storage.
    #[test]
    fn test_cumulative_balance() {
        let mut sim = generated(SiteConfiguration::default(), 99);
        let initial = storage(sim.state());

        let mut net = 0.0;
        for doy in 1..=365 {
            let day = sim.run_day(2001, doy).unwrap();
            let f = &day.fluxes;
            net += day.weather.precipitation + f.runon
                - f.aet
                - f.deep_drainage
                - f.runoff
                - f.snow_runoff;
        }
        assert_relative_eq!(storage(sim.state()) - initial, net, epsilon = 1e-8);
    }
}
