//! Rain interception by canopies and litter
//!
//! Storage capacity follows a logarithmic function of the leaf (or litter)
//! area (Gash 1979; Vegas-Galdos et al. 2012):
//!
//! $$D = m \, k_{Smax} \log_{10}(1 + LAI) / 10$$
//!
//! where $m$ is the number of rain events per day. Litter uses its biomass
//! (g/m2) in place of LAI. The storage already held from previous days is
//! subtracted from the capacity.

use soilwat_core::vegetation::{DailyVegetation, VegetationComposition, VegetationKind, N_VEG};

/// Intercept rain into one storage.
///
/// # Arguments
///
/// * `ppt` - Rain still reaching the surface (cm); reduced in place
/// * `storage` - Water already held by the storage (cm); increased in place
/// * `scale` - Fractional area of the storage
/// * `area_index` - LAI of the canopy or litter equivalent
/// * `ksmax` - Storage parameter (mm)
/// * `events` - Rain events per day
///
/// # Returns
///
/// Water intercepted today (cm)
fn intercept(
    ppt: &mut f64,
    storage: &mut f64,
    scale: f64,
    area_index: f64,
    ksmax: f64,
    events: f64,
) -> f64 {
    if area_index <= 0.0 || *ppt <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    let capacity = events * ksmax * (1.0 + area_index).log10() / 10.0;
    let intercepted = scale * ppt.min((capacity - *storage / scale).max(0.0));
    *storage += intercepted;
    *ppt -= intercepted;
    intercepted
}

/// Canopy interception of every vegetation type.
///
/// Each canopy intercepts from what passed the taller canopies before it.
/// `scale_veg` is the snow-free canopy cover of each type.
pub fn canopy_interception(
    ppt: &mut f64,
    storage: &mut [f64; N_VEG],
    daily: &[DailyVegetation; N_VEG],
    composition: &VegetationComposition,
    scale_veg: &[f64; N_VEG],
    events: f64,
) -> [f64; N_VEG] {
    let mut intercepted = [0.0; N_VEG];
    for (kind, veg) in composition.iter() {
        let k = kind.index();
        intercepted[k] = intercept(
            ppt,
            &mut storage[k],
            scale_veg[k],
            daily[k].lai_total,
            veg.interception_ksmax,
            events,
        );
    }
    intercepted
}

/// Litter interception of all vegetation types into one litter storage.
pub fn litter_interception(
    ppt: &mut f64,
    storage: &mut f64,
    daily: &[DailyVegetation; N_VEG],
    composition: &VegetationComposition,
    events: f64,
) -> f64 {
    let mut intercepted = 0.0;
    for kind in VegetationKind::ALL {
        let k = kind.index();
        let veg = composition.get(kind);
        let day = &daily[k];
        if day.cover <= 0.0 || day.litter <= 0.0 {
            continue;
        }
        intercepted += intercept(ppt, storage, day.cover, day.litter, veg.litter_ksmax, events);
    }
    intercepted
}
