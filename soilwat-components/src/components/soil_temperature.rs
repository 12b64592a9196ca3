//! Soil temperature solver
//!
//! Daily soil temperature profile after Parton (1978, 1984) with freezing and
//! thawing after Eitzinger et al. (2000).
//!
//! # What This Component Does
//!
//! 1. Sets the soil surface temperature from air temperature, snow cover,
//!    evapotranspiration and standing biomass
//! 2. Diffuses heat through a fixed-spacing temperature grid with an explicit
//!    finite-difference scheme, sub-stepping the day when needed for stability
//! 3. Averages the grid profile back onto the soil layers
//! 4. Holds layers at the freezing point while their latent heat is exchanged
//!    and flags frozen layers
//!
//! # Physics Overview
//!
//! Interior grid nodes follow
//!
//! $$T_i^{t+1} = T_i^t + \frac{\Delta t}{\Delta x^2} \frac{k}{c \rho}
//!   \left(T_{i-1}^{t+1} - 2 T_i^t + T_{i+1}^t\right)$$
//!
//! with thermal conductivity $k = c_{s1} + p_e c_{s2}$, relative soil moisture
//! $p_e = (\theta - \theta_{wp}) / (\theta_{fc} - \theta_{wp})$, specific
//! heat $c = \theta + c_{sh}(1 - \theta)$ and bulk density $\rho$. The scheme
//! is stable while the coefficient in front of the bracket stays below 0.5.
//!
//! The surface node is the surface temperature and the node at the maximum
//! depth is held at a constant temperature.
//!
//! # Grid layout
//!
//! Nodes sit at $0, \Delta x, 2\Delta x, \ldots, z_{max}$. Soil properties of
//! node $i > 0$ are averaged over the depth interval $(z_i - \Delta x, z_i]$;
//! nodes below the soil profile take the values of the deepest layer.
//!
//! # Failure handling
//!
//! A day on which the scheme cannot be stabilized with 16 sub-steps, or on
//! which temperatures leave $\pm 100$ °C, keeps yesterday's temperatures,
//! unfreezes all layers and sets the error flag of the day. The next day
//! starts again from yesterday's grid.

use log::{debug, warn};
use ndarray::{Array1, Array2};
use soilwat_core::errors::{SoilwatError, SoilwatResult};
use soilwat_core::site::SoilTemperatureParameters;
use soilwat_core::soil::SoilProfile;
use soilwat_core::state::TwoDay;
use soilwat_core::tolerance::{gt, le, lt};
use soilwat_core::utils::interpolate::linear;
use soilwat_core::weather::TEMPERATURE_LIMIT;

/// Seconds in a day.
const SEC_PER_DAY: f64 = 86400.0;

/// Maximum number of sub-steps per day.
const MAX_SUBSTEPS: f64 = 16.0;

/// Maximum number of grid nodes including both boundaries.
pub const MAX_GRID_NODES: usize = 100;

/// Temperature at which soil water freezes (°C).
pub const FREEZING_TEMPERATURE: f64 = -1.0;

/// Minimum volumetric water content below saturation for a layer to freeze.
const MIN_VWC_TO_FREEZE: f64 = 0.13;

/// Latent heat of fusion of water (cal/cm3).
const FUSION_HEAT_H2O: f64 = 80.0;

/// Correction factor of the fusion pool.
const FUSION_CORRECTION: f64 = 0.02;

/// Surface conditions of one day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceConditions {
    /// Mean air temperature (°C).
    pub air_temperature: f64,
    /// Potential evapotranspiration (cm/day).
    pub pet: f64,
    /// Actual evapotranspiration (cm/day).
    pub aet: f64,
    /// Standing-crop biomass (g/m2).
    pub biomass: f64,
    /// Snow depth (cm).
    pub snow_depth: f64,
    /// Snow water equivalent (cm).
    pub snowpack: f64,
}

/// Result of one day of the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilTemperatureStep {
    /// Soil surface temperature (°C).
    pub surface_temperature: f64,
    /// Temperature of each soil layer (°C).
    pub layer_temperatures: Vec<f64>,
    /// Whether each soil layer is frozen.
    pub frozen: Vec<bool>,
    /// Whether the solver failed today.
    pub error: bool,
}

/// Surface temperature under a snowpack (Parton et al. 1998).
///
/// # Arguments
///
/// * `air_temperature` - Mean air temperature (°C)
/// * `snowpack` - Snow water equivalent (cm)
pub fn surface_temperature_under_snow(air_temperature: f64, snowpack: f64) -> f64 {
    if snowpack <= 0.0 {
        0.0
    } else if air_temperature >= 0.0 {
        -2.0
    } else {
        let k_snow = (1.0 - 0.15 * snowpack).max(0.0);
        0.3 * air_temperature * k_snow - 2.0
    }
}

/// Fixed-spacing temperature grid of one soil profile.
///
/// Index 0 is the surface, index `n_nodes + 1` the lower boundary; the
/// interior nodes `1..=n_nodes` are simulated.
#[derive(Debug, Clone)]
pub struct SoilTemperatureGrid {
    delta_x: f64,
    max_depth: f64,
    n_nodes: usize,
    /// Share of each interior node's depth interval per soil layer.
    /// Shape: [node][layer], node 0 is the first interior node.
    weights: Array2<f64>,
    bulk_density: Array1<f64>,
    vwc_fieldcap: Array1<f64>,
    vwc_wiltpt: Array1<f64>,
    /// Node temperatures including both boundaries.
    temperature: TwoDay<Array1<f64>>,
    /// Temperature of each soil layer on the previous day.
    layer_temperature: Vec<f64>,
    /// Fusion pool of layers in the middle of freezing or thawing (K).
    fusion_pool: Vec<Option<f64>>,
}

impl SoilTemperatureGrid {
    /// Build the grid of `profile` and seed node temperatures from the initial
    /// layer temperatures and the constant lower boundary.
    ///
    /// Fails if the grid spacing does not divide the maximum depth, if the grid
    /// has too many nodes, or if the maximum depth is shallower than the soil
    /// profile.
    pub fn new(
        parameters: &SoilTemperatureParameters,
        profile: &SoilProfile,
        layer_temperature: &[f64],
    ) -> SoilwatResult<Self> {
        let dx = parameters.delta_x;
        let max_depth = parameters.max_depth;
        if !gt(dx, 0.0) {
            return Err(SoilwatError::Configuration(format!(
                "soil temperature grid spacing {} cm must be > 0",
                dx
            )));
        }
        let intervals = max_depth / dx;
        if (intervals - intervals.round()).abs() > 1e-9 {
            return Err(SoilwatError::Configuration(format!(
                "maximum soil temperature depth {} cm is not a multiple of the grid spacing {} cm",
                max_depth, dx
            )));
        }
        let intervals = intervals.round() as usize;
        if intervals < 2 || intervals + 1 > MAX_GRID_NODES {
            return Err(SoilwatError::Configuration(format!(
                "soil temperature grid needs between 3 and {} nodes, got {}",
                MAX_GRID_NODES,
                intervals + 1
            )));
        }
        if lt(max_depth, profile.depth()) {
            return Err(SoilwatError::Configuration(format!(
                "maximum soil temperature depth {} cm is shallower than the soil profile ({} cm)",
                max_depth,
                profile.depth()
            )));
        }
        if layer_temperature.len() != profile.len() {
            return Err(SoilwatError::Configuration(format!(
                "{} initial soil temperatures for {} layers",
                layer_temperature.len(),
                profile.len()
            )));
        }

        let n_nodes = intervals - 1;
        let layers = profile.layers();
        let n_layers = layers.len();

        let mut weights = Array2::zeros((n_nodes, n_layers));
        for node in 0..n_nodes {
            let bottom = (node + 1) as f64 * dx;
            let top = bottom - dx;
            let mut covered = 0.0;
            for (l, layer) in layers.iter().enumerate() {
                let overlap = bottom.min(layer.depth) - top.max(layer.top());
                if overlap > 0.0 {
                    weights[[node, l]] = overlap / dx;
                    covered += overlap / dx;
                }
            }
            // Below the profile
            if covered < 1.0 {
                weights[[node, n_layers - 1]] += 1.0 - covered;
            }
        }

        let project = |values: Vec<f64>| weights.dot(&Array1::from(values));
        let bulk_density = project(layers.iter().map(|l| l.bulk_density).collect());
        let vwc_fieldcap = project(layers.iter().map(|l| l.swc_fieldcap / l.width).collect());
        let vwc_wiltpt = project(layers.iter().map(|l| l.swc_wiltpt / l.width).collect());

        let mut xs: Vec<f64> = layers.iter().map(|l| l.midpoint()).collect();
        let mut ys = layer_temperature.to_vec();
        xs.push(max_depth);
        ys.push(parameters.tsoil_constant);
        let mut temperature = Array1::from_shape_fn(n_nodes + 2, |i| linear(&xs, &ys, i as f64 * dx));
        temperature[0] = layer_temperature[0];
        temperature[n_nodes + 1] = parameters.tsoil_constant;

        Ok(Self {
            delta_x: dx,
            max_depth,
            n_nodes,
            weights,
            bulk_density,
            vwc_fieldcap,
            vwc_wiltpt,
            temperature: TwoDay::new(temperature),
            layer_temperature: layer_temperature.to_vec(),
            fusion_pool: vec![None; n_layers],
        })
    }

    /// Number of simulated interior nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Number of soil layers the grid was built for.
    pub fn n_layers(&self) -> usize {
        self.weights.ncols()
    }

    /// Depth of each node including both boundaries (cm).
    pub fn depths(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_nodes + 2, |i| i as f64 * self.delta_x)
    }

    /// Today's node temperatures including both boundaries (°C).
    pub fn temperatures(&self) -> &Array1<f64> {
        &self.temperature.today
    }

    /// Mean of the piecewise-linear node profile over `[top, bottom]`.
    fn profile_mean(&self, temps: &Array1<f64>, top: f64, bottom: f64) -> f64 {
        let dx = self.delta_x;
        let value_at = |z: f64| {
            let j = ((z / dx).floor() as usize).min(self.n_nodes);
            let w = (z - j as f64 * dx) / dx;
            temps[j] + w * (temps[j + 1] - temps[j])
        };
        let mut area = 0.0;
        for j in 0..=self.n_nodes {
            let a = top.max(j as f64 * dx);
            let b = bottom.min((j + 1) as f64 * dx).min(self.max_depth);
            if b > a {
                area += 0.5 * (value_at(a) + value_at(b)) * (b - a);
            }
        }
        area / (bottom - top)
    }
}

/// Solver lifecycle: a grid exists once [`SoilTemperatureSolver::initialize`]
/// succeeded.
#[derive(Debug, Clone)]
pub struct SoilTemperatureSolver {
    parameters: SoilTemperatureParameters,
    grid: Option<SoilTemperatureGrid>,
    /// Length of the last successful sub-step (s).
    delta_time: f64,
}

impl SoilTemperatureSolver {
    /// Create an uninitialized solver with default parameters.
    pub fn new() -> Self {
        Self::from_parameters(SoilTemperatureParameters::default())
    }

    /// Create an uninitialized solver from parameters.
    pub fn from_parameters(parameters: SoilTemperatureParameters) -> Self {
        Self {
            parameters,
            grid: None,
            delta_time: SEC_PER_DAY,
        }
    }

    /// Solver parameters.
    pub fn parameters(&self) -> &SoilTemperatureParameters {
        &self.parameters
    }

    /// Whether [`Self::initialize`] has built a grid.
    pub fn is_initialized(&self) -> bool {
        self.grid.is_some()
    }

    /// Temperature grid, once initialized.
    pub fn grid(&self) -> Option<&SoilTemperatureGrid> {
        self.grid.as_ref()
    }

    /// Build (or rebuild) the temperature grid for `profile`.
    pub fn initialize(
        &mut self,
        profile: &SoilProfile,
        layer_temperature: &[f64],
    ) -> SoilwatResult<()> {
        self.grid = Some(SoilTemperatureGrid::new(
            &self.parameters,
            profile,
            layer_temperature,
        )?);
        self.delta_time = SEC_PER_DAY;
        Ok(())
    }

    /// Surface temperature from today's surface conditions.
    ///
    /// Under snow the snow-damped air temperature is used. Otherwise sparse
    /// canopies warm the surface with the evaporative deficit and dense
    /// canopies cool it with biomass.
    pub fn surface_temperature(&self, conditions: &SurfaceConditions) -> f64 {
        let p = &self.parameters;
        let t_air = conditions.air_temperature;
        if gt(conditions.snow_depth, 0.0) {
            surface_temperature_under_snow(t_air, conditions.snowpack)
        } else if le(conditions.biomass, p.bm_limiter) {
            let deficit = if gt(conditions.pet, 0.0) {
                conditions.pet * (1.0 - conditions.aet / conditions.pet)
            } else {
                0.0
            };
            t_air + p.t1_param1 * deficit * (1.0 - conditions.biomass / p.bm_limiter)
        } else {
            t_air + p.t1_param2 * (conditions.biomass - p.bm_limiter) / p.t1_param3
        }
    }

    /// Advance the soil temperature profile by one day.
    ///
    /// # Arguments
    ///
    /// * `conditions` - Today's surface conditions
    /// * `profile` - Soil profile the grid was built for
    /// * `swc` - Today's soil water content per layer (cm)
    ///
    /// # Returns
    ///
    /// Layer temperatures and frozen flags. A numerical failure is reported
    /// through [`SoilTemperatureStep::error`] rather than as an `Err`.
    pub fn step_one_day(
        &mut self,
        conditions: &SurfaceConditions,
        profile: &SoilProfile,
        swc: &[f64],
    ) -> SoilwatResult<SoilTemperatureStep> {
        let surface = self.surface_temperature(conditions);
        let params = self.parameters.clone();
        let grid = self
            .grid
            .as_mut()
            .ok_or_else(|| SoilwatError::NotInitialized("soil temperature solver".into()))?;
        if grid.n_layers() != swc.len() || profile.len() != swc.len() {
            return Err(SoilwatError::Configuration(format!(
                "soil temperature grid built for {} layers, got {}",
                grid.n_layers(),
                swc.len()
            )));
        }

        grid.temperature.advance();
        let layers = profile.layers();
        let vwc: Vec<f64> = layers.iter().zip(swc).map(|(l, &s)| s / l.width).collect();
        let node_vwc = grid.weights.dot(&Array1::from(vwc.clone()));

        // Stability coefficient per interior node for a sub-step of one second
        let coefficient: Array1<f64> = Array1::from_shape_fn(grid.n_nodes, |k| {
            let range = grid.vwc_fieldcap[k] - grid.vwc_wiltpt[k];
            let pe = if gt(range, 0.0) {
                (node_vwc[k] - grid.vwc_wiltpt[k]) / range
            } else {
                0.0
            };
            let cs = params.cs_param1 + pe * params.cs_param2;
            let sh = node_vwc[k] + params.sh_param * (1.0 - node_vwc[k]);
            cs / (sh * grid.bulk_density[k]) / (grid.delta_x * grid.delta_x)
        });
        let max_coefficient = coefficient.fold(0.0_f64, |a, &b| a.max(b));

        let min_delta_time = SEC_PER_DAY / MAX_SUBSTEPS;
        while max_coefficient * self.delta_time >= 0.5 && self.delta_time > min_delta_time {
            self.delta_time /= 2.0;
        }
        let stable = max_coefficient * self.delta_time < 0.5;

        let mut temps = grid.temperature.yesterday.clone();
        temps[0] = surface;
        temps[grid.n_nodes + 1] = params.tsoil_constant;
        let mut exploded = false;
        if stable {
            let n_steps = (SEC_PER_DAY / self.delta_time).round() as usize;
            let parts = &coefficient * self.delta_time;
            'steps: for _ in 0..n_steps {
                let previous = temps.clone();
                for i in 1..=grid.n_nodes {
                    temps[i] = previous[i]
                        + parts[i - 1] * (temps[i - 1] - 2.0 * previous[i] + previous[i + 1]);
                    if !temps[i].is_finite() || temps[i].abs() > TEMPERATURE_LIMIT {
                        exploded = true;
                        break 'steps;
                    }
                }
            }
        }

        if !stable || exploded {
            warn!(
                "soil temperature failed (stable: {}, sub-step {} s); keeping yesterday's temperatures",
                stable, self.delta_time
            );
            grid.temperature.revert();
            grid.fusion_pool.iter_mut().for_each(|p| *p = None);
            return Ok(SoilTemperatureStep {
                surface_temperature: surface,
                layer_temperatures: grid.layer_temperature.clone(),
                frozen: vec![false; swc.len()],
                error: true,
            });
        }

        let unadjusted: Vec<f64> = layers
            .iter()
            .map(|l| grid.profile_mean(&temps, l.top(), l.depth))
            .collect();

        // Latent heat of fusion
        let mut adjusted = unadjusted.clone();
        for (i, layer) in layers.iter().enumerate() {
            let heat_capacity =
                (vwc[i] + params.sh_param * (1.0 - vwc[i])) * layer.bulk_density;
            let pool = -FUSION_HEAT_H2O * vwc[i] / heat_capacity * FUSION_CORRECTION;
            let (t, state) = apply_fusion(
                grid.layer_temperature[i],
                unadjusted[i],
                pool,
                grid.fusion_pool[i],
            );
            adjusted[i] = t;
            grid.fusion_pool[i] = state;
        }
        let change: Array1<f64> = adjusted
            .iter()
            .zip(&unadjusted)
            .map(|(a, u)| a - u)
            .collect();
        if change.iter().any(|c| *c != 0.0) {
            let node_change = grid.weights.dot(&change);
            for k in 0..grid.n_nodes {
                temps[k + 1] += node_change[k];
            }
        }

        let frozen: Vec<bool> = layers
            .iter()
            .zip(&adjusted)
            .zip(swc)
            .map(|((layer, &t), &s)| {
                le(t, FREEZING_TEMPERATURE)
                    && gt(s, layer.swc_saturated - layer.width * MIN_VWC_TO_FREEZE)
            })
            .collect();

        debug!(
            "soil temperature: surface {:.2} °C, top layer {:.2} °C, {} sub-steps",
            surface,
            adjusted.first().copied().unwrap_or(f64::NAN),
            (SEC_PER_DAY / self.delta_time).round()
        );

        grid.temperature.today = temps;
        grid.layer_temperature.clone_from(&adjusted);

        Ok(SoilTemperatureStep {
            surface_temperature: surface,
            layer_temperatures: adjusted,
            frozen,
            error: false,
        })
    }
}

impl Default for SoilTemperatureSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Hold a layer at the freezing point while its fusion pool is exchanged.
///
/// The pool runs from 0 (unfrozen) to `pool` (fully frozen, negative). A layer
/// crossing the freezing point spends its temperature change on the pool first
/// and only the remainder changes its temperature.
///
/// # Arguments
///
/// * `old` - Yesterday's layer temperature (°C)
/// * `new` - Today's layer temperature before the adjustment (°C)
/// * `pool` - Temperature equivalent of the latent heat of the layer (K)
/// * `in_progress` - Pool state if freezing or thawing was not completed
///
/// # Returns
///
/// Adjusted temperature and the pool state for tomorrow.
fn apply_fusion(old: f64, new: f64, pool: f64, in_progress: Option<f64>) -> (f64, Option<f64>) {
    let accumulated = match in_progress {
        Some(actual) => actual + (new - old),
        None if gt(old, FREEZING_TEMPERATURE) && le(new, FREEZING_TEMPERATURE) => {
            new - FREEZING_TEMPERATURE
        }
        None if le(old, FREEZING_TEMPERATURE) && gt(new, FREEZING_TEMPERATURE) => {
            pool + (new - FREEZING_TEMPERATURE)
        }
        None => return (new, None),
    };

    if accumulated <= pool {
        (FREEZING_TEMPERATURE + (accumulated - pool), None)
    } else if accumulated >= 0.0 {
        (FREEZING_TEMPERATURE + accumulated, None)
    } else {
        (FREEZING_TEMPERATURE, Some(accumulated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use soilwat_core::site::SiteConfiguration;

    fn profile() -> SoilProfile {
        SiteConfiguration::default().build_profile().unwrap()
    }

    fn shallow_parameters() -> SoilTemperatureParameters {
        SoilTemperatureParameters {
            max_depth: 180.0,
            ..SoilTemperatureParameters::default()
        }
    }

    #[test]
    fn test_surface_under_snow() {
        assert_relative_eq!(surface_temperature_under_snow(5.0, 0.0), 0.0);
        assert_relative_eq!(surface_temperature_under_snow(5.0, 2.0), -2.0);
        assert_relative_eq!(surface_temperature_under_snow(-10.0, 2.0), -4.1);
        assert_relative_eq!(surface_temperature_under_snow(-10.0, 10.0), -2.0);
    }

    #[test]
    fn test_surface_temperature_regimes() {
        let solver = SoilTemperatureSolver::new();
        let bare = SurfaceConditions {
            air_temperature: 20.0,
            pet: 0.5,
            aet: 0.1,
            ..SurfaceConditions::default()
        };
        assert_relative_eq!(solver.surface_temperature(&bare), 26.0);

        let dense = SurfaceConditions {
            biomass: 900.0,
            ..bare
        };
        assert_relative_eq!(solver.surface_temperature(&dense), 16.0);

        let no_pet = SurfaceConditions {
            air_temperature: 3.0,
            ..SurfaceConditions::default()
        };
        assert_relative_eq!(solver.surface_temperature(&no_pet), 3.0);
    }

    #[test]
    fn test_grid_layout() {
        let profile = profile();
        let temps = vec![5.0; profile.len()];
        let grid = SoilTemperatureGrid::new(&shallow_parameters(), &profile, &temps).unwrap();
        assert_eq!(grid.n_nodes(), 11);
        assert_relative_eq!(grid.depths()[12], 180.0);
        for row in grid.weights.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(grid.temperatures()[12], 4.15);
    }

    #[test]
    fn test_invalid_grids() {
        let profile = profile();
        let temps = vec![5.0; profile.len()];

        let shallow = SoilTemperatureParameters {
            max_depth: 90.0,
            ..SoilTemperatureParameters::default()
        };
        let err = SoilTemperatureGrid::new(&shallow, &profile, &temps).unwrap_err();
        assert!(matches!(err, SoilwatError::Configuration(_)));

        let uneven = SoilTemperatureParameters {
            max_depth: 200.0,
            ..SoilTemperatureParameters::default()
        };
        assert!(SoilTemperatureGrid::new(&uneven, &profile, &temps).is_err());

        let too_fine = SoilTemperatureParameters {
            delta_x: 1.0,
            max_depth: 990.0,
            ..SoilTemperatureParameters::default()
        };
        assert!(SoilTemperatureGrid::new(&too_fine, &profile, &temps).is_err());
    }

    #[test]
    fn test_step_before_initialization() {
        let profile = profile();
        let mut solver = SoilTemperatureSolver::new();
        let err = solver
            .step_one_day(&SurfaceConditions::default(), &profile, &profile.initial_swc())
            .unwrap_err();
        assert!(matches!(err, SoilwatError::NotInitialized(_)));
    }

    #[test]
    fn test_profile_mean_of_linear_profile() {
        let profile = profile();
        let temps = vec![5.0; profile.len()];
        let grid = SoilTemperatureGrid::new(&shallow_parameters(), &profile, &temps).unwrap();
        let linear_profile = grid.depths().mapv(|z| z / 10.0);
        assert_relative_eq!(grid.profile_mean(&linear_profile, 10.0, 20.0), 1.5, epsilon = 1e-12);
        assert_relative_eq!(grid.profile_mean(&linear_profile, 5.0, 40.0), 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_warming_from_surface() {
        let profile = profile();
        let swc = profile.initial_swc();
        let mut solver = SoilTemperatureSolver::from_parameters(shallow_parameters());
        solver.initialize(&profile, &vec![4.15; profile.len()]).unwrap();

        let warm = SurfaceConditions {
            air_temperature: 25.0,
            ..SurfaceConditions::default()
        };
        let step = solver.step_one_day(&warm, &profile, &swc).unwrap();
        assert!(!step.error);
        assert_relative_eq!(step.surface_temperature, 25.0);
        let t = &step.layer_temperatures;
        assert!(t[0] > t[1] && t[1] > t[4]);
        assert!(t[4] >= 4.15);
    }

    #[test]
    fn test_fusion_holds_at_freezing() {
        // Partial freezing: held at the freezing point
        let (t, state) = apply_fusion(0.5, -1.3, -0.6, None);
        assert_relative_eq!(t, FREEZING_TEMPERATURE);
        assert_relative_eq!(state.unwrap(), -0.3, epsilon = 1e-12);

        // Continue freezing past the pool
        let (t, state) = apply_fusion(FREEZING_TEMPERATURE, -1.5, -0.6, Some(-0.3));
        assert_relative_eq!(t, -1.2, epsilon = 1e-12);
        assert!(state.is_none());

        // Thawing a frozen layer
        let (t, state) = apply_fusion(-3.0, -0.8, -0.6, None);
        assert_relative_eq!(t, FREEZING_TEMPERATURE);
        assert_relative_eq!(state.unwrap(), -0.4, epsilon = 1e-12);

        // No crossing
        assert_eq!(apply_fusion(3.0, 2.0, -0.6, None), (2.0, None));
    }
}
