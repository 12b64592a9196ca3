//! Hydraulic redistribution of soil water through roots (Ryel et al. 2002)
//!
//! Roots connect soil layers of different water potential and move water
//! from wet to dry layers at night. The flux between layers $i$ and $j$ is
//!
//! $$HR_{ij} = \frac{10}{24} C_{max} (\psi_j - \psi_i)
//!   \max(c_i, c_j) \frac{R_{so} R_{re}}{1 - R_{so}}$$
//!
//! with the relative soil-root conductance
//! $c = 1 / (1 + (\psi / \psi_{50})^{shape})$ and the rooting fractions $R$
//! of the source and recipient layers.
//!
//! Flows are stored in an antisymmetric matrix: `flows[[i, j]] > 0` means
//! layer `i` gains water from layer `j`. The top layer takes no part.

use ndarray::Array2;
use soilwat_core::errors::{SoilwatError, SoilwatResult};
use soilwat_core::soil::SoilProfile;
use soilwat_core::tolerance::{ge, gt, lt};
use soilwat_core::vegetation::HydraulicRedistributionParameters;

/// Hours per day during which redistribution runs.
const ACTIVE_HOURS: f64 = 10.0;

/// Redistribute water among the soil layers through the roots of one
/// vegetation type.
///
/// # Arguments
///
/// * `profile` - Soil profile
/// * `swc` - Soil water content per layer (cm); updated in place
/// * `veg` - Vegetation type index
/// * `params` - Redistribution parameters of the vegetation type
/// * `cover` - Fractional cover of the vegetation type
/// * `frozen` - Frozen flag per layer
///
/// # Returns
///
/// Net water gained per layer (cm), scaled by cover
pub fn hydraulic_redistribution(
    profile: &SoilProfile,
    swc: &mut [f64],
    veg: usize,
    params: &HydraulicRedistributionParameters,
    cover: f64,
    frozen: &[bool],
) -> SoilwatResult<Vec<f64>> {
    let n = swc.len();
    let layers = profile.layers();
    let mut hydred = vec![0.0; swc.len()];
    if n < 2 {
        return Ok(hydred);
    }

    let mut available = vec![0.0; n];
    let mut swp = vec![0.0; n];
    let mut conductance = vec![0.0; n];
    for i in 0..n {
        let layer = &layers[i];
        available[i] = (swc[i] - layer.swc_wiltpt.min(layer.swc_at_crit[veg])).max(0.0);
        swp[i] = profile.swp(i, swc[i])?;
        conductance[i] = (1.0 / (1.0 + (swp[i] / params.swp50).powf(params.shape_cond)))
            .clamp(0.0, 1.0);
    }

    let mut flows: Array2<f64> = Array2::zeros((n, n));
    for i in 1..n {
        for j in (i + 1)..n {
            let wet = gt(swc[i], layers[i].swc_wiltpt) || gt(swc[j], layers[j].swc_wiltpt);
            if !wet || frozen[i] || frozen[j] {
                continue;
            }
            let (source, recipient) = if lt(swp[i], swp[j]) { (i, j) } else { (j, i) };
            let root_source = layers[source].transp_coeff[veg];
            let mut root_recipient = layers[recipient].transp_coeff[veg];
            if lt(layers[source].width, layers[recipient].width) {
                root_recipient *= layers[source].width / layers[recipient].width;
            }
            if ge(root_source, 1.0) {
                continue;
            }

            let flow = ACTIVE_HOURS / 24.0
                * params.max_condroot
                * (swp[j] - swp[i])
                * conductance[i].max(conductance[j])
                * root_source
                * root_recipient
                / (1.0 - root_source);
            let flow = flow.abs().min(available[source]).copysign(flow);

            flows[[i, j]] = flow;
            flows[[j, i]] = -flow;
        }
    }

    limit_outflows(&mut flows, &available)?;

    for i in 1..n {
        hydred[i] = flows.row(i).iter().skip(1).sum::<f64>() * cover;
        swc[i] += hydred[i];
    }
    Ok(hydred)
}

/// Scale outgoing flows so that no layer loses more than its available water.
///
/// Restricting one layer's outflow changes the inflow of others, so this is
/// repeated until nothing changes, at most once per layer.
fn limit_outflows(flows: &mut Array2<f64>, available: &[f64]) -> SoilwatResult<()> {
    let n = available.len();
    let mut adjusted = true;
    let mut iterations = 0;
    while iterations < n && adjusted {
        iterations += 1;
        adjusted = false;
        for i in 0..n {
            if !gt(available[i], 0.0) {
                continue;
            }
            let (inflow, outflow) = flows.row(i).iter().fold((0.0, 0.0), |(gain, loss), &f| {
                if gt(f, 0.0) {
                    (gain + f, loss)
                } else {
                    (gain, loss + f)
                }
            });
            let net = inflow + outflow;
            if lt(net, 0.0) && gt(-net, available[i]) {
                let factor = -(available[i] + inflow) / outflow;
                adjusted = true;
                for j in 0..n {
                    if lt(flows[[i, j]], 0.0) {
                        flows[[i, j]] *= factor;
                        flows[[j, i]] *= factor;
                    }
                }
            }
        }
    }
    if adjusted {
        return Err(SoilwatError::Numerical(
            "hydraulic redistribution failed to stay above the available water".into(),
        ));
    }
    Ok(())
}
